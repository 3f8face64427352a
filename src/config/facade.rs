//! Entry point for loading configuration from every source in precedence order.

use crate::config::merge::merge_policy;
use crate::config::sources::{environment, global_file, workspace_file};
use crate::config::StoryloomConfig;
use crate::error::ApiError;
use config::File;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence (lowest to highest): defaults, global file, `<workspace>/storyloom.toml`,
    /// `STORYLOOM__*` environment variables.
    pub fn load(workspace_root: &Path) -> Result<StoryloomConfig, ApiError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder);
        let builder = workspace_file::add_to_builder(builder, workspace_root);
        let builder = environment::add_to_builder(builder);

        let config: StoryloomConfig = builder.build()?.try_deserialize()?;
        debug!(
            provider = %config.provider.model,
            threshold = config.pipeline.judge_threshold,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Load configuration from one explicit file, in place of the global and workspace files.
    pub fn load_from_file(path: &Path) -> Result<StoryloomConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()).required(true));
        let builder = environment::add_to_builder(builder);
        Ok(builder.build()?.try_deserialize()?)
    }

    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }

    pub fn workspace_config_path(workspace_root: &Path) -> PathBuf {
        workspace_file::workspace_config_path(workspace_root)
    }
}
