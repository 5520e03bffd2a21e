// Recruiter accounts: creation, lookup and plan changes.

pub mod handlers;
pub mod store;
