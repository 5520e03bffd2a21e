use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::{api_error, ChatMessage, ChatProvider, CompletionResponse, LlmError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const REFERER: &str = "http://localhost:3000";

#[derive(Debug, Serialize)]
struct OpenRouterRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

/// Client for the OpenRouter gateway (OpenAI-compatible chat completions).
#[derive(Clone)]
pub struct OpenRouterClient {
    client: Client,
    api_key: String,
    base_url: String,
    app_title: String,
}

impl OpenRouterClient {
    pub fn new(api_key: String, base_url: String, app_title: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            app_title,
        })
    }
}

#[async_trait]
impl ChatProvider for OpenRouterClient {
    fn name(&self) -> &'static str {
        "OpenRouter"
    }

    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, LlmError> {
        let body = OpenRouterRequest {
            model,
            messages,
            temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", REFERER)
            .header("X-Title", &self.app_title)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let text = response.json::<CompletionResponse>().await?.into_text()?;
        debug!("OpenRouter ({model}) returned {} chars", text.len());
        Ok(text)
    }
}
