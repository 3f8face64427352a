//! Scripted provider: replays a fixed queue of replies and records every request.
//!
//! Drives the unit and integration tests; never touches the network.

use crate::error::ApiError;
use crate::provider::{
    ChatMessage, CompletionOptions, CompletionResponse, MessageRole, ModelProviderClient,
    TokenUsage,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::time::Instant;

/// One scripted outcome.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Text(String),
    Failure(String),
}

/// A request as the provider saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub received_at: Instant,
}

#[derive(Default)]
struct ScriptState {
    replies: VecDeque<ScriptedReply>,
    fallback: Option<String>,
    requests: Vec<RecordedRequest>,
}

/// Provider that answers from a script. Clones share the same script and request log.
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider that answers each call with the next text, in order.
    pub fn with_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::new();
        for text in texts {
            provider.push_text(text);
        }
        provider
    }

    pub fn push_text(&self, text: impl Into<String>) -> &Self {
        self.state
            .lock()
            .replies
            .push_back(ScriptedReply::Text(text.into()));
        self
    }

    pub fn push_failure(&self, message: impl Into<String>) -> &Self {
        self.state
            .lock()
            .replies
            .push_back(ScriptedReply::Failure(message.into()));
        self
    }

    /// Text returned once the script runs out. Without it, extra calls fail.
    pub fn set_fallback(&self, text: impl Into<String>) -> &Self {
        self.state.lock().fallback = Some(text.into());
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().requests.len()
    }

    pub fn remaining(&self) -> usize {
        self.state.lock().replies.len()
    }
}

#[async_trait]
impl ModelProviderClient for ScriptedProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, ApiError> {
        let system = messages
            .iter()
            .find(|m| m.role == MessageRole::System)
            .map(|m| m.content.clone());
        let prompt = messages
            .iter()
            .filter(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let reply = {
            let mut state = self.state.lock();
            state.requests.push(RecordedRequest {
                system,
                prompt,
                temperature: options.temperature,
                max_tokens: options.max_tokens,
                received_at: Instant::now(),
            });
            match state.replies.pop_front() {
                Some(reply) => reply,
                None => match &state.fallback {
                    Some(text) => ScriptedReply::Text(text.clone()),
                    None => ScriptedReply::Failure("script exhausted".to_string()),
                },
            }
        };

        match reply {
            ScriptedReply::Text(content) => Ok(CompletionResponse {
                content,
                model: "scripted".to_string(),
                usage: TokenUsage::default(),
                finish_reason: Some("stop".to_string()),
            }),
            ScriptedReply::Failure(message) => Err(ApiError::ProviderRequestFailed(message)),
        }
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
