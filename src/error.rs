//! Error types for the Storyloom story pipeline.

use thiserror::Error;

/// Errors raised by providers, the call gateway, configuration and the CLI surface.
///
/// The story pipeline itself (analyzer, refinement loop, reviser, branching) only ever
/// surfaces [`ApiError::GatewayExhausted`]; every malformed response is absorbed by the
/// extractors instead.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    #[error("Provider request failed: {0}")]
    ProviderRequestFailed(String),

    #[error("Provider authentication failed: {0}")]
    ProviderAuthFailed(String),

    #[error("Provider rate limit exceeded: {0}")]
    ProviderRateLimit(String),

    #[error("Provider model not found: {0}")]
    ProviderModelNotFound(String),

    #[error("Generation service unavailable after {attempts} attempts: {source}")]
    GatewayExhausted {
        attempts: usize,
        #[source]
        source: Box<ApiError>,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// True when the remote generation service could not be reached after all retries.
    pub fn is_gateway_exhausted(&self) -> bool {
        matches!(self, ApiError::GatewayExhausted { .. })
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for ApiError {
    fn from(err: toml::ser::Error) -> Self {
        ApiError::Serialization(err.to_string())
    }
}

impl From<dialoguer::Error> for ApiError {
    fn from(err: dialoguer::Error) -> Self {
        ApiError::Input(format!("Failed to get user input: {}", err))
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
