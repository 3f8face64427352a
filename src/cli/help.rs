//! CLI command-name contract for logging.

use crate::cli::parse::Commands;

/// Stable command name used in log events (e.g. "tell", "config").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Tell { .. } => "tell",
        Commands::Analyze { .. } => "analyze",
        Commands::Session => "session",
        Commands::Config { .. } => "config",
    }
}
