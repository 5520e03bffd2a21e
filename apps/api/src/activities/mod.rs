// Per-account activity feed: entries posted by the client plus the ones the
// service records on vacancy and candidate changes.
pub mod handlers;
pub mod store;
