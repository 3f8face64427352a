//! Layered configuration loading from isolated directories.

use crate::integration::with_isolated_env;
use std::fs;
use storyloom::config::{ConfigLoader, ProviderType};
use tempfile::TempDir;

fn write_global(test_dir: &TempDir, contents: &str) {
    let dir = test_dir.path().join("config/storyloom");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.toml"), contents).unwrap();
}

#[test]
fn test_defaults_without_any_file() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    with_isolated_env(&test_dir, || {
        let config = ConfigLoader::load(workspace.path()).unwrap();
        assert_eq!(config.pipeline.judge_threshold, 7);
        assert_eq!(config.pipeline.max_rounds, 5);
        assert_eq!(config.pipeline.max_branch_steps, 3);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_delay_ms, 1500);
        assert_eq!(config.provider.provider_type, ProviderType::OpenAI);
        assert_eq!(config.logging.output, "stderr");
    });
}

#[test]
fn test_workspace_file_overrides_global() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    write_global(
        &test_dir,
        "[provider]\nprovider_type = \"ollama\"\nmodel = \"llama3\"\n\n[pipeline]\nmax_rounds = 4\n",
    );
    fs::write(
        workspace.path().join("storyloom.toml"),
        "[pipeline]\nmax_rounds = 2\n",
    )
    .unwrap();

    with_isolated_env(&test_dir, || {
        let config = ConfigLoader::load(workspace.path()).unwrap();
        assert_eq!(config.provider.provider_type, ProviderType::Ollama);
        assert_eq!(config.provider.model, "llama3");
        assert_eq!(config.pipeline.max_rounds, 2);
        assert_eq!(config.pipeline.judge_threshold, 7);
    });
}

#[test]
fn test_explicit_file_skips_global() {
    let test_dir = TempDir::new().unwrap();
    write_global(&test_dir, "[pipeline]\nmax_branch_steps = 9\n");
    let explicit = test_dir.path().join("custom.toml");
    fs::write(&explicit, "[retry]\nmax_attempts = 5\n").unwrap();

    with_isolated_env(&test_dir, || {
        let config = ConfigLoader::load_from_file(&explicit).unwrap();
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.pipeline.max_branch_steps, 3);
    });
}

#[test]
fn test_invalid_values_are_reported() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    fs::write(
        workspace.path().join("storyloom.toml"),
        "[pipeline]\njudge_threshold = 11\n\n[retry]\nmax_attempts = 0\n",
    )
    .unwrap();

    with_isolated_env(&test_dir, || {
        let config = ConfigLoader::load(workspace.path()).unwrap();
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(config.ensure_valid().is_err());
    });
}
