//! Story domain records.
//!
//! A [`Story`] is never edited in place: refinement, revision and branching each produce a
//! new value whose version is exactly one higher than the story it replaces.

pub mod choice;
pub mod feedback;
pub mod request;

pub use choice::{
    Choice, ChoiceProposal, ContinuationResult, DEFAULT_FIRST_CHOICE, DEFAULT_SECOND_CHOICE,
};
pub use feedback::{FeedbackHistory, JudgeFeedback, Score};
pub use request::{
    preset_setting, setting_from_selection, RequestOverrides, StoryCategory, StoryRequest,
    StoryTone, DEFAULT_SETTING, PRESET_SETTINGS,
};

use serde::{Deserialize, Serialize};

/// Title used when a first draft arrives without one.
pub const UNTITLED: &str = "Untitled Story";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    title: String,
    body: String,
    moral: String,
    version: u32,
}

impl Story {
    /// First version of a story.
    pub fn draft(
        title: impl Into<String>,
        body: impl Into<String>,
        moral: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            moral: moral.into(),
            version: 1,
        }
    }

    /// Replacement for `self` with new content and the next version number.
    pub fn revise(
        &self,
        title: impl Into<String>,
        body: impl Into<String>,
        moral: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            moral: moral.into(),
            version: self.version + 1,
        }
    }

    /// Next version with a continuation beat appended after a paragraph break.
    /// A produced moral replaces the current one.
    pub fn with_beat(&self, continuation: &ContinuationResult) -> Self {
        let beat = continuation.beat.trim();
        let body = if beat.is_empty() {
            self.body.clone()
        } else {
            format!("{}\n\n{}", self.body.trim_end(), beat)
                .trim()
                .to_string()
        };
        let moral = continuation
            .moral
            .as_deref()
            .map(str::trim)
            .filter(|moral| !moral.is_empty())
            .unwrap_or(&self.moral)
            .to_string();
        Self {
            title: self.title.clone(),
            body,
            moral,
            version: self.version + 1,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn moral(&self) -> &str {
        &self.moral
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn word_count(&self) -> usize {
        self.body.split_whitespace().count()
    }

    /// Labelled rendering used inside prompts; parses back with the story extractor.
    pub fn to_context_text(&self) -> String {
        format!(
            "TITLE: {}\nSTORY:\n{}\nMORAL: {}\nVERSION: {}",
            self.title, self.body, self.moral, self.version
        )
    }
}
