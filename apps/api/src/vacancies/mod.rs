// Vacancies owned by a recruiter account.

pub mod handlers;
pub mod store;
