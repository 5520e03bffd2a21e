// Subscription plans and resume quotas.

pub mod handlers;
pub mod limiter;
pub mod tiers;
