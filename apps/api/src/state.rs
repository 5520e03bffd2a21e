use std::sync::Arc;

use sqlx::PgPool;

use crate::analysis::selector::AnalysisProviderSelector;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Routes analysis and chat completions between GigaChat and OpenRouter.
    pub ai: Arc<AnalysisProviderSelector>,
}
