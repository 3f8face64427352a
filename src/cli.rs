//! CLI domain: parse, route, help, output, and presentation only.
//! No story logic; a single route table dispatches to the pipeline.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{
    format_config, format_feedback_table, format_latest_feedback, format_request_json,
    format_request_text, format_round_score, format_stop_reason, format_story_text,
    format_tell_json, format_tell_text, TellReport,
};
pub use route::RunContext;
