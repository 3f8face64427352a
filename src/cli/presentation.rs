//! CLI presentation: text and json formatters per command family.

mod config;
mod feedback;
mod request;
mod story;

pub use config::format_config;
pub use feedback::{format_feedback_table, format_latest_feedback, format_round_score, format_stop_reason};
pub use request::{format_request_json, format_request_text};
pub use story::{format_story_text, format_tell_json, format_tell_text, TellReport};
