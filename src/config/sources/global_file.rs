//! Global config file source: $XDG_CONFIG_HOME/storyloom/config.toml or ~/.config/storyloom/config.toml

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::File;
use std::path::PathBuf;
use tracing::debug;

/// Path to global config file.
pub fn global_config_path() -> Option<PathBuf> {
    let xdg = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|dir| !dir.trim().is_empty())
        .map(PathBuf::from);
    let home = || {
        std::env::var("HOME")
            .ok()
            .filter(|dir| !dir.trim().is_empty())
            .map(|home| PathBuf::from(home).join(".config"))
    };
    let platform = || directories::BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf());

    xdg.or_else(home)
        .or_else(platform)
        .map(|dir| dir.join("storyloom").join("config.toml"))
}

/// Add global config file source to builder if it exists.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    match global_config_path() {
        Some(path) if path.exists() => {
            debug!(config_path = %path.display(), "Using global configuration file");
            builder.add_source(File::from(path).required(false))
        }
        Some(path) => {
            debug!(config_path = %path.display(), "No global configuration file");
            builder
        }
        None => builder,
    }
}
