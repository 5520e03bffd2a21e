use anyhow::{Context, Result};

use crate::subscription::tiers::TierTable;

pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_GIGACHAT_OAUTH_URL: &str = "https://ngw.devices.sberbank.ru:9443/api/v2/oauth";
pub const DEFAULT_GIGACHAT_API_URL: &str = "https://gigachat.devices.sberbank.ru/api/v1";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    pub project_name: String,
    /// Comma-separated list; `None` means permissive CORS.
    pub cors_origins: Option<Vec<String>>,
    pub ai: AiConfig,
    pub tiers: TierTable,
}

/// Credentials and routing switches for the two completion providers.
/// Absent keys mean the provider is skipped, never an error.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: String,
    pub gigachat_api_key: Option<String>,
    pub gigachat_scope: String,
    pub gigachat_oauth_url: String,
    pub gigachat_api_url: String,
    /// Sber endpoints are signed by a CA most trust stores lack.
    pub gigachat_accept_invalid_certs: bool,
    /// Route every call to GigaChat first when it is credentialed.
    pub use_gigachat: bool,
    /// Gateway model used whenever the requested model is not valid there.
    pub default_model: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let cors_origins = optional_env("CORS_ORIGINS").map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        });

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            project_name: optional_env("PROJECT_NAME").unwrap_or_else(|| "Nexus AI".to_string()),
            cors_origins,
            ai: AiConfig::from_env()?,
            tiers: TierTable::standard(),
        })
    }
}

impl AiConfig {
    fn from_env() -> Result<Self> {
        Ok(AiConfig {
            openrouter_api_key: optional_env("OPENROUTER_API_KEY"),
            openrouter_base_url: optional_env("OPENROUTER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENROUTER_BASE_URL.to_string()),
            gigachat_api_key: optional_env("GIGACHAT_API_KEY"),
            gigachat_scope: optional_env("GIGACHAT_SCOPE")
                .unwrap_or_else(|| "GIGACHAT_API_PERS".to_string()),
            gigachat_oauth_url: optional_env("GIGACHAT_OAUTH_URL")
                .unwrap_or_else(|| DEFAULT_GIGACHAT_OAUTH_URL.to_string()),
            gigachat_api_url: optional_env("GIGACHAT_API_URL")
                .unwrap_or_else(|| DEFAULT_GIGACHAT_API_URL.to_string()),
            gigachat_accept_invalid_certs: bool_env("GIGACHAT_ACCEPT_INVALID_CERTS", true)?,
            use_gigachat: bool_env("USE_GIGACHAT", false)?,
            default_model: optional_env("AI_MODEL_NAME")
                .unwrap_or_else(|| "deepseek/deepseek-chat".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank values are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn bool_env(key: &str, default: bool) -> Result<bool> {
    match optional_env(key) {
        None => Ok(default),
        Some(raw) => parse_bool(&raw)
            .with_context(|| format!("Environment variable '{key}' must be true or false")),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
