//! CLI parse: clap types for storyloom. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Storyloom CLI - bedtime stories drafted, judged and refined by a language model
#[derive(Parser)]
#[command(name = "storyloom")]
#[command(about = "Draft, judge and refine children's bedtime stories")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (replaces the global and workspace files)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze an idea, write the story and refine it until the judge is satisfied
    Tell {
        /// Story idea in your own words
        idea: String,
        /// Category name or menu number (1-7)
        #[arg(long)]
        category: Option<String>,
        /// Tone name or menu number (1-6)
        #[arg(long)]
        tone: Option<String>,
        /// Setting text, or a preset number (1-9)
        #[arg(long)]
        setting: Option<String>,
        /// Continue the finished story interactively, one choice at a time
        #[arg(long)]
        choices: bool,
        /// Save the final story; without a path it goes to ./<title>.txt
        #[arg(long, num_args = 0..=1, value_name = "PATH")]
        save: Option<Option<PathBuf>>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
        /// Leave the per-round judge feedback out of the output
        #[arg(long)]
        quiet_judge: bool,
    },
    /// Show how an idea is understood, without writing a story
    Analyze {
        /// Story idea in your own words
        idea: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Menu-driven storytelling session
    Session,
    /// Print the effective configuration (API key redacted)
    Config {
        /// Output format (toml or json)
        #[arg(long, default_value = "toml")]
        format: String,
    },
}
