//! Story presentation: the finished story plus the `tell` report in text or json.

use crate::branching::BranchEnd;
use crate::cli::presentation::feedback::{
    format_feedback_table, format_latest_feedback, format_stop_reason,
};
use crate::error::ApiError;
use crate::refinement::StopReason;
use crate::story::{FeedbackHistory, Story, StoryRequest};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::PathBuf;

/// Everything `storyloom tell` reports about one run.
#[derive(Debug, Serialize)]
pub struct TellReport<'a> {
    pub generated_at: String,
    pub request: &'a StoryRequest,
    pub story: &'a Story,
    pub history: &'a FeedbackHistory,
    pub stop_reason: StopReason,
    pub threshold: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_end: Option<BranchEnd>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_to: Option<PathBuf>,
}

impl<'a> TellReport<'a> {
    pub fn new(
        request: &'a StoryRequest,
        story: &'a Story,
        history: &'a FeedbackHistory,
        stop_reason: StopReason,
        threshold: u8,
    ) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            request,
            story,
            history,
            stop_reason,
            threshold,
            branch_end: None,
            saved_to: None,
        }
    }
}

pub fn format_story_text(story: &Story, color: bool) -> String {
    let title = if color {
        story.title().bold().underline().to_string()
    } else {
        story.title().to_string()
    };
    let mut out = format!("{}\n\n{}\n", title, story.body());
    if !story.moral().is_empty() {
        out.push_str(&format!("\nMoral: {}\n", story.moral()));
    }
    let footer = format!(
        "(version {}, {} words)",
        story.version(),
        story.word_count()
    );
    if color {
        out.push_str(&footer.dimmed().to_string());
    } else {
        out.push_str(&footer);
    }
    out
}

pub fn format_tell_text(report: &TellReport<'_>, include_feedback: bool, color: bool) -> String {
    let mut sections = vec![format_story_text(report.story, color)];

    if include_feedback && !report.history.is_empty() {
        sections.push(format_feedback_table(report.history));
        if let Some(latest) = report.history.latest() {
            sections.push(format_latest_feedback(latest));
        }
    }
    sections.push(format_stop_reason(&report.stop_reason, report.threshold, color));

    if let Some(end) = report.branch_end {
        sections.push(match end {
            BranchEnd::Concluded { step } => format!("The story found its ending at step {}.", step),
            BranchEnd::StepsExhausted { steps } => {
                format!("Interactive mode finished after {} steps.", steps)
            }
            BranchEnd::Stopped { step } => format!("Interactive mode stopped at step {}.", step),
        });
    }
    if let Some(path) = &report.saved_to {
        sections.push(format!("Saved to {}", path.display()));
    }
    sections.join("\n\n")
}

pub fn format_tell_json(report: &TellReport<'_>) -> Result<String, ApiError> {
    Ok(serde_json::to_string_pretty(report)?)
}
