//! Merge rules: defaults first, later sources override earlier ones key by key.

use crate::config::StoryloomConfig;
use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder seeded with every built-in default, so a file that sets only
/// part of a section still deserializes.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let defaults = Config::try_from(&StoryloomConfig::default())?;
    Ok(Config::builder().add_source(defaults))
}
