//! Scripted provider for unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{ChatMessage, ChatProvider, LlmError};

/// Answers every call with a fixed reply (or a 503) and records each call's
/// model and temperature.
pub struct FakeProvider {
    name: &'static str,
    reply: Option<String>,
    calls: Mutex<Vec<(String, f32)>>,
}

impl FakeProvider {
    pub fn answering(name: &'static str, reply: &str) -> Arc<Self> {
        Arc::new(Self {
            name,
            reply: Some(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            reply: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Models requested, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(model, _)| model.clone())
            .collect()
    }

    pub fn temperatures(&self) -> Vec<f32> {
        self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }
}

#[async_trait]
impl ChatProvider for FakeProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn complete(
        &self,
        model: &str,
        _messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, LlmError> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), temperature));
        self.reply.clone().ok_or(LlmError::Api {
            status: 503,
            message: "unavailable".to_string(),
        })
    }
}
