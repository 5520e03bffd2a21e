/// LLM clients: every outbound call to a hosted completion API goes through here.
///
/// Two backends implement `ChatProvider`:
/// - `GigaChatClient`: Sber's GigaChat (OAuth token exchange, then completion).
/// - `OpenRouterClient`: the OpenAI-compatible multi-model gateway.
///
/// Which one is called, and what happens when it fails, is decided by
/// `analysis::selector`, never by the clients themselves.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(test)]
pub mod fake;
pub mod gigachat;
pub mod openrouter;
pub mod prompts;

pub use gigachat::GigaChatClient;
pub use openrouter::OpenRouterClient;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("response contained no JSON object")]
    NoJson,

    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A hosted chat-completion backend.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Human-readable provider name used in logs and result summaries.
    fn name(&self) -> &'static str;

    /// Sends one completion request and returns the first choice's text.
    /// Empty text is reported as `LlmError::EmptyContent`.
    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, LlmError>;
}

/// Response shape shared by both providers (OpenAI-compatible).
#[derive(Debug, Deserialize)]
pub(crate) struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl CompletionResponse {
    /// Text of the first choice, if any and non-blank.
    pub(crate) fn into_text(self) -> Result<String, LlmError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Returns the span from the first `{` to the last `}`, i.e. the widest
/// candidate JSON object in a prose or fenced response.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let text = strip_json_fences(text);
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Reads a non-2xx body into `LlmError::Api`, keeping the provider's message.
pub(crate) async fn api_error(response: reqwest::Response) -> LlmError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    LlmError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_extract_json_object_from_prose() {
        let input = "Вот результат анализа:\n{\"score\": 0.5, \"nested\": {\"a\": 1}}\nУдачи!";
        assert_eq!(
            extract_json_object(input),
            Some("{\"score\": 0.5, \"nested\": {\"a\": 1}}")
        );
    }

    #[test]
    fn test_extract_json_object_from_fenced_block() {
        let input = "```json\n{\"score\": 0.9}\n```";
        assert_eq!(extract_json_object(input), Some("{\"score\": 0.9}"));
    }

    #[test]
    fn test_extract_json_object_missing() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("} reversed {"), None);
    }

    #[test]
    fn test_completion_response_first_choice() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"hello"}}]}"#;
        let parsed: CompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.into_text().unwrap(), "hello");
    }

    #[test]
    fn test_completion_response_blank_is_empty_content() {
        let raw = r#"{"choices":[{"message":{"content":"   "}}]}"#;
        let parsed: CompletionResponse = serde_json::from_str(raw).unwrap();
        assert!(matches!(parsed.into_text(), Err(LlmError::EmptyContent)));

        let parsed: CompletionResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(parsed.into_text(), Err(LlmError::EmptyContent)));
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let msg = ChatMessage::system("be brief");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "system");
    }
}
