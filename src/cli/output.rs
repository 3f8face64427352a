//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;

/// Map domain/service errors to a one-line message for the terminal.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::GatewayExhausted { attempts, source } => format!(
            "The story service could not be reached after {} attempts ({}). Please try again later.",
            attempts, source
        ),
        ApiError::ProviderNotConfigured(msg) => format!("Provider not configured: {}", msg),
        other => other.to_string().replace('\n', "; "),
    }
}
