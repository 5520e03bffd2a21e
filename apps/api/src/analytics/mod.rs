// Dashboard figures over an account's vacancies and candidates.
pub mod handlers;
pub mod store;
