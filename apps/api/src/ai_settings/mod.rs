// Per-account AI preferences: model, temperature and system prompt.

pub mod handlers;
pub mod store;
