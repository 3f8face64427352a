//! Call gateway: the single point of contact with the generation service.
//!
//! Wraps one provider client with a bounded retry policy. Every higher-level component
//! sends its calls through [`CallGateway::invoke`] and never sees individual provider
//! failures; it either gets text back or [`ApiError::GatewayExhausted`].

use crate::error::ApiError;
use crate::provider::{
    ChatMessage, CompletionOptions, ModelProviderClient, ProviderConfig, ProviderFactory,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};

const MIN_TEMPERATURE: f32 = 0.0;
const MAX_TEMPERATURE: f32 = 2.0;

/// One generation request: prompt, instructions, output budget and sampling temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationCall {
    pub prompt: String,
    pub system_instructions: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl GenerationCall {
    pub fn new(
        prompt: impl Into<String>,
        system_instructions: impl Into<String>,
        max_output_tokens: u32,
        temperature: f32,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            system_instructions: system_instructions.into(),
            max_output_tokens,
            temperature,
        }
    }

    fn messages(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2);
        if !self.system_instructions.is_empty() {
            messages.push(ChatMessage::system(self.system_instructions.clone()));
        }
        messages.push(ChatMessage::user(self.prompt.clone()));
        messages
    }

    fn options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: Some(self.temperature.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE)),
            max_tokens: Some(self.max_output_tokens.max(1)),
            top_p: None,
            stop: None,
        }
    }
}

/// Retry settings as they appear in configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Base backoff in milliseconds; the wait after attempt `n` is `n` times this.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_max_attempts() -> usize {
    3
}

fn default_base_delay_ms() -> u64 {
    1500
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl RetryConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("retry.max_attempts must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Linear backoff: attempt `n` failing waits `base_delay * n` before attempt `n + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
        }
    }
}

impl RetryPolicy {
    /// Policy without waits, for tests.
    pub fn immediate(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::ZERO,
        }
    }

    /// Wait after the given (1-based) failed attempt.
    pub fn delay_after(&self, attempt: usize) -> Duration {
        self.base_delay
            .saturating_mul(u32::try_from(attempt).unwrap_or(u32::MAX))
    }
}

/// Resilient wrapper around a provider client.
pub struct CallGateway {
    client: Box<dyn ModelProviderClient>,
    policy: RetryPolicy,
}

impl CallGateway {
    pub fn new(client: Box<dyn ModelProviderClient>, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Build the gateway for the configured provider.
    pub fn from_config(provider: &ProviderConfig, retry: &RetryConfig) -> Result<Self, ApiError> {
        let model_provider = provider.to_model_provider()?;
        let client = ProviderFactory::create_client(&model_provider)?;
        Ok(Self::new(client, RetryPolicy::from(retry)))
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn provider_name(&self) -> &str {
        self.client.provider_name()
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    /// Send one call, retrying failed attempts with linear backoff.
    ///
    /// An empty reply is a successful result; validating content is the caller's job.
    pub async fn invoke(&self, call: &GenerationCall) -> Result<String, ApiError> {
        let max_attempts = self.policy.max_attempts;
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            debug!(
                provider = self.client.provider_name(),
                model = self.client.model_name(),
                attempt,
                max_attempts,
                max_tokens = call.max_output_tokens,
                temperature = call.temperature,
                "Sending generation request"
            );

            match self.client.complete(call.messages(), call.options()).await {
                Ok(response) => {
                    debug!(
                        attempt,
                        chars = response.content.len(),
                        completion_tokens = response.usage.completion_tokens,
                        "Generation request succeeded"
                    );
                    return Ok(response.content);
                }
                Err(err) => {
                    warn!(attempt, max_attempts, error = %err, "Generation request failed");
                    last_error = Some(err);
                    if attempt < max_attempts {
                        let delay = self.policy.delay_after(attempt);
                        if !delay.is_zero() {
                            sleep(delay).await;
                        }
                    }
                }
            }
        }

        let source = last_error
            .unwrap_or_else(|| ApiError::ProviderError("no attempts were made".to_string()));
        error!(attempts = max_attempts, error = %source, "Generation service exhausted");
        Err(ApiError::GatewayExhausted {
            attempts: max_attempts,
            source: Box::new(source),
        })
    }
}
