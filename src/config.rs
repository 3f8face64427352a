//! Configuration System
//!
//! Layered configuration for the story pipeline: built-in defaults, a global file, a
//! workspace file and `STORYLOOM__*` environment variables, validated as a whole.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};

pub use crate::gateway::RetryConfig;
pub use crate::logging::LoggingConfig;
pub use crate::provider::{ProviderConfig, ProviderType};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Output budget and sampling temperature for one kind of generation call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CallBudget {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CallBudget {
    pub const fn new(max_tokens: u32, temperature: f32) -> Self {
        Self {
            max_tokens,
            temperature,
        }
    }

    fn validate(&self, name: &str) -> Result<(), String> {
        if self.max_tokens == 0 {
            return Err(format!("{}.max_tokens must be greater than 0", name));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "{}.temperature must be between 0 and 2, got {}",
                name, self.temperature
            ));
        }
        Ok(())
    }
}

/// Loop limits and per-role call budgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Overall score at which judging stops.
    #[serde(default = "default_judge_threshold")]
    pub judge_threshold: u8,

    /// Drafts produced at most, the initial one included.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,

    #[serde(default = "default_max_branch_steps")]
    pub max_branch_steps: usize,

    #[serde(default = "default_analysis")]
    pub analysis: CallBudget,

    #[serde(default = "default_draft")]
    pub draft: CallBudget,

    #[serde(default = "default_judge")]
    pub judge: CallBudget,

    /// Used for judge-driven refinement and reader-requested revision.
    #[serde(default = "default_refine")]
    pub refine: CallBudget,

    #[serde(default = "default_choice")]
    pub choice: CallBudget,

    #[serde(default = "default_continuation")]
    pub continuation: CallBudget,
}

fn default_judge_threshold() -> u8 {
    7
}

fn default_max_rounds() -> usize {
    5
}

fn default_max_branch_steps() -> usize {
    3
}

fn default_analysis() -> CallBudget {
    CallBudget::new(500, 0.2)
}

fn default_draft() -> CallBudget {
    CallBudget::new(2000, 0.8)
}

fn default_judge() -> CallBudget {
    CallBudget::new(900, 0.4)
}

fn default_refine() -> CallBudget {
    CallBudget::new(2000, 0.7)
}

fn default_choice() -> CallBudget {
    CallBudget::new(250, 0.5)
}

fn default_continuation() -> CallBudget {
    CallBudget::new(900, 0.8)
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            judge_threshold: default_judge_threshold(),
            max_rounds: default_max_rounds(),
            max_branch_steps: default_max_branch_steps(),
            analysis: default_analysis(),
            draft: default_draft(),
            judge: default_judge(),
            refine: default_refine(),
            choice: default_choice(),
            continuation: default_continuation(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=10).contains(&self.judge_threshold) {
            return Err(format!(
                "judge_threshold must be between 1 and 10, got {}",
                self.judge_threshold
            ));
        }
        if self.max_rounds == 0 {
            return Err("max_rounds must be at least 1".to_string());
        }
        if self.max_branch_steps == 0 {
            return Err("max_branch_steps must be at least 1".to_string());
        }
        self.analysis.validate("analysis")?;
        self.draft.validate("draft")?;
        self.judge.validate("judge")?;
        self.refine.validate("refine")?;
        self.choice.validate("choice")?;
        self.continuation.validate("continuation")?;
        Ok(())
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoryloomConfig {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Provider(String),
    Pipeline(String),
    Retry(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Provider(msg) => write!(f, "Provider: {}", msg),
            ValidationError::Pipeline(msg) => write!(f, "Pipeline: {}", msg),
            ValidationError::Retry(msg) => write!(f, "Retry: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl StoryloomConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.provider.validate() {
            errors.push(ValidationError::Provider(e));
        }
        if let Err(e) = self.pipeline.validate() {
            errors.push(ValidationError::Pipeline(e));
        }
        if let Err(e) = self.retry.validate() {
            errors.push(ValidationError::Retry(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// [`validate`](Self::validate) folded into a single error.
    pub fn ensure_valid(&self) -> Result<(), ApiError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }

    /// Copy safe to print: any configured API key is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.provider.api_key.is_some() {
            copy.provider.api_key = Some("********".to_string());
        }
        copy
    }
}
