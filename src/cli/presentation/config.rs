//! Config presentation: the effective configuration, key masked.

use crate::config::StoryloomConfig;
use crate::error::ApiError;

pub fn format_config(config: &StoryloomConfig, format: &str) -> Result<String, ApiError> {
    let redacted = config.redacted();
    match format {
        "toml" => Ok(toml::to_string_pretty(&redacted)?),
        "json" => Ok(serde_json::to_string_pretty(&redacted)?),
        other => Err(ApiError::Input(format!(
            "Unsupported config format '{}' (expected toml or json)",
            other
        ))),
    }
}
