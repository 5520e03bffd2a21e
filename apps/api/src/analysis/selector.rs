//! Provider selection with a single automatic fallback.
//!
//! Each call runs the same small state machine from scratch:
//!
//! ```text
//! select ──► GigaChat ──ok──► done
//!    │          │ err
//!    │          ▼
//!    └──────► OpenRouter ──ok──► done
//!                 │ err
//!                 ▼
//!            fallback result
//! ```
//!
//! GigaChat is tried when the requested model is its sentinel name, or when
//! the "prefer GigaChat" switch is on and GigaChat is credentialed. A
//! GigaChat failure retries once on OpenRouter with the default model. No
//! provider error ever reaches the caller.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::analysis::prompts::{build_analysis_prompt, DEFAULT_ANALYSIS_SYSTEM};
use crate::analysis::result::{AnalysisResult, PartialAnalysis};
use crate::config::AiConfig;
use crate::llm_client::gigachat::{GigaChatSettings, GIGACHAT_MODEL};
use crate::llm_client::{
    extract_json_object, ChatMessage, ChatProvider, GigaChatClient, LlmError, OpenRouterClient,
};

const MAX_TEMPERATURE: f32 = 2.0;

/// Inputs to one analysis call.
#[derive(Debug, Clone)]
pub struct AnalysisRequest<'a> {
    pub vacancy_description: &'a str,
    pub resume_text: &'a str,
    pub system_prompt: Option<&'a str>,
    pub requested_model: &'a str,
    pub temperature: f32,
}

/// Where the first attempt of a call goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    GigaChat,
    Gateway { model: String },
}

pub struct AnalysisProviderSelector {
    gigachat: Option<Arc<dyn ChatProvider>>,
    gateway: Option<Arc<dyn ChatProvider>>,
    prefer_gigachat: bool,
    default_model: String,
}

impl AnalysisProviderSelector {
    pub fn new(
        gigachat: Option<Arc<dyn ChatProvider>>,
        gateway: Option<Arc<dyn ChatProvider>>,
        prefer_gigachat: bool,
        default_model: String,
    ) -> Self {
        Self {
            gigachat,
            gateway,
            prefer_gigachat,
            default_model,
        }
    }

    /// Builds both clients from configuration. A provider without a
    /// credential is left out and treated as unavailable.
    pub fn from_config(ai: &AiConfig, project_name: &str) -> Result<Self, LlmError> {
        let gigachat = match &ai.gigachat_api_key {
            Some(credential) => Some(Arc::new(GigaChatClient::new(GigaChatSettings {
                credential: credential.clone(),
                scope: ai.gigachat_scope.clone(),
                oauth_url: ai.gigachat_oauth_url.clone(),
                api_url: ai.gigachat_api_url.clone(),
                accept_invalid_certs: ai.gigachat_accept_invalid_certs,
            })?) as Arc<dyn ChatProvider>),
            None => None,
        };
        let gateway = match &ai.openrouter_api_key {
            Some(key) => Some(Arc::new(OpenRouterClient::new(
                key.clone(),
                ai.openrouter_base_url.clone(),
                project_name.to_string(),
            )?) as Arc<dyn ChatProvider>),
            None => None,
        };

        info!(
            "AI providers: gigachat={}, openrouter={}, prefer_gigachat={}, default_model={}",
            gigachat.is_some(),
            gateway.is_some(),
            ai.use_gigachat,
            ai.default_model
        );

        Ok(Self::new(
            gigachat,
            gateway,
            ai.use_gigachat,
            ai.default_model.clone(),
        ))
    }

    /// Picks the provider for the first attempt.
    pub fn route(&self, requested_model: &str) -> Route {
        let sentinel = requested_model == GIGACHAT_MODEL;
        if sentinel || (self.prefer_gigachat && self.gigachat.is_some()) {
            Route::GigaChat
        } else {
            Route::Gateway {
                model: self.gateway_model(requested_model).to_string(),
            }
        }
    }

    /// The sentinel is not a gateway model; substitute the default.
    fn gateway_model<'m>(&'m self, requested_model: &'m str) -> &'m str {
        if requested_model == GIGACHAT_MODEL {
            &self.default_model
        } else {
            requested_model
        }
    }

    /// Scores a resume against a vacancy. Always returns a populated result.
    pub async fn analyze(&self, request: &AnalysisRequest<'_>) -> AnalysisResult {
        let system = request
            .system_prompt
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(DEFAULT_ANALYSIS_SYSTEM);
        let messages = [
            ChatMessage::system(system),
            ChatMessage::user(build_analysis_prompt(
                request.vacancy_description,
                request.resume_text,
            )),
        ];
        let temperature = clamp_temperature(request.temperature);

        let gateway_model = match self.route(request.requested_model) {
            Route::GigaChat => match self.analyze_with_gigachat(&messages, temperature).await {
                Ok(result) => {
                    info!("Analysis completed via GigaChat");
                    return result;
                }
                Err(e) => {
                    warn!(
                        "GigaChat analysis failed, falling back to OpenRouter ({}): {e}",
                        self.default_model
                    );
                    self.default_model.clone()
                }
            },
            Route::Gateway { model } => model,
        };

        match self
            .analyze_with_gateway(&gateway_model, &messages, temperature)
            .await
        {
            Ok(result) => {
                info!("Analysis completed via OpenRouter ({gateway_model})");
                result
            }
            Err(e) => {
                warn!("OpenRouter analysis failed, returning placeholder result: {e}");
                AnalysisResult::fallback(&e.to_string())
            }
        }
    }

    /// Free-text completion with the same routing and single fallback.
    /// Returns `None` when neither provider answered.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        requested_model: &str,
        temperature: f32,
    ) -> Option<String> {
        let temperature = clamp_temperature(temperature);

        let gateway_model = match self.route(requested_model) {
            Route::GigaChat => {
                match call(&self.gigachat, "GigaChat", GIGACHAT_MODEL, messages, temperature).await
                {
                    Ok(text) => {
                        info!("Reply generated via GigaChat");
                        return Some(text);
                    }
                    Err(e) => {
                        warn!("GigaChat reply failed, falling back to OpenRouter: {e}");
                        self.default_model.clone()
                    }
                }
            }
            Route::Gateway { model } => model,
        };

        match call(&self.gateway, "OpenRouter", &gateway_model, messages, temperature).await {
            Ok(text) => {
                info!("Reply generated via OpenRouter ({gateway_model})");
                Some(text)
            }
            Err(e) => {
                warn!("OpenRouter reply failed: {e}");
                None
            }
        }
    }

    async fn analyze_with_gigachat(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<AnalysisResult, LlmError> {
        let text = call(&self.gigachat, "GigaChat", GIGACHAT_MODEL, messages, temperature).await?;
        let json = extract_json_object(&text).ok_or(LlmError::NoJson)?;
        let partial: PartialAnalysis = serde_json::from_str(json)?;
        Ok(partial.complete_with_defaults("GigaChat"))
    }

    async fn analyze_with_gateway(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<AnalysisResult, LlmError> {
        let text = call(&self.gateway, "OpenRouter", model, messages, temperature).await?;
        let json = extract_json_object(&text).ok_or(LlmError::NoJson)?;
        let result: AnalysisResult = serde_json::from_str(json)?;
        Ok(result.normalized())
    }
}

async fn call(
    provider: &Option<Arc<dyn ChatProvider>>,
    label: &'static str,
    model: &str,
    messages: &[ChatMessage],
    temperature: f32,
) -> Result<String, LlmError> {
    let provider = provider.as_ref().ok_or(LlmError::NotConfigured(label))?;
    debug!("Calling {} with model {model}", provider.name());
    provider.complete(model, messages, temperature).await
}

fn clamp_temperature(temperature: f32) -> f32 {
    if temperature.is_finite() {
        temperature.clamp(0.0, MAX_TEMPERATURE)
    } else {
        0.7
    }
}
