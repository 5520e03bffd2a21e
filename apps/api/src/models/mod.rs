pub mod account;
pub mod activity;
pub mod ai_settings;
pub mod candidate;
pub mod chat;
pub mod vacancy;
