//! GigaChat client. Exchanges the Basic credential for a bearer token,
//! caches it, and refreshes it once when a completion comes back 401.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{api_error, ChatMessage, ChatProvider, CompletionResponse, LlmError};

/// The only model name GigaChat accepts. Also the sentinel a user selects
/// to route analysis to this provider.
pub const GIGACHAT_MODEL: &str = "GigaChat";

const TOKEN_TIMEOUT: Duration = Duration::from_secs(10);
const COMPLETION_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_TOKENS: u32 = 2000;

#[derive(Debug, Serialize)]
struct GigaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    n: u8,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GigaChatSettings {
    pub credential: String,
    pub scope: String,
    pub oauth_url: String,
    pub api_url: String,
    pub accept_invalid_certs: bool,
}

#[derive(Clone)]
pub struct GigaChatClient {
    client: Client,
    settings: GigaChatSettings,
    token: Arc<RwLock<Option<String>>>,
}

impl GigaChatClient {
    pub fn new(mut settings: GigaChatSettings) -> Result<Self, LlmError> {
        settings.api_url = settings.api_url.trim_end_matches('/').to_string();
        Ok(Self {
            client: Client::builder()
                .danger_accept_invalid_certs(settings.accept_invalid_certs)
                .build()?,
            settings,
            token: Arc::new(RwLock::new(None)),
        })
    }

    async fn fetch_token(&self) -> Result<String, LlmError> {
        let response = self
            .client
            .post(&self.settings.oauth_url)
            .timeout(TOKEN_TIMEOUT)
            .header("Accept", "application/json")
            .header("RqUID", Uuid::new_v4().to_string())
            .header("Authorization", format!("Basic {}", self.settings.credential))
            .form(&[("scope", self.settings.scope.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let token = response
            .json::<TokenResponse>()
            .await?
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| LlmError::Auth("token response had no access_token".to_string()))?;

        info!("GigaChat access token obtained");
        *self.token.write().await = Some(token.clone());
        Ok(token)
    }

    async fn current_token(&self) -> Result<String, LlmError> {
        if let Some(token) = self.token.read().await.clone() {
            return Ok(token);
        }
        self.fetch_token().await
    }

    async fn send_completion(
        &self,
        token: &str,
        body: &GigaChatRequest<'_>,
    ) -> Result<reqwest::Response, LlmError> {
        Ok(self
            .client
            .post(format!("{}/chat/completions", self.settings.api_url))
            .timeout(COMPLETION_TIMEOUT)
            .header("Accept", "application/json")
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }
}

#[async_trait]
impl ChatProvider for GigaChatClient {
    fn name(&self) -> &'static str {
        "GigaChat"
    }

    /// `model` is ignored: GigaChat serves a single model.
    async fn complete(
        &self,
        _model: &str,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, LlmError> {
        let body = GigaChatRequest {
            model: GIGACHAT_MODEL,
            messages,
            temperature,
            max_tokens: MAX_TOKENS,
            n: 1,
        };

        let token = self.current_token().await?;
        let mut response = self.send_completion(&token, &body).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("GigaChat token expired, requesting a new one");
            *self.token.write().await = None;
            let token = self.fetch_token().await?;
            response = self.send_completion(&token, &body).await?;
        }

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let text = response.json::<CompletionResponse>().await?.into_text()?;
        debug!("GigaChat returned {} chars", text.len());
        Ok(text)
    }
}
