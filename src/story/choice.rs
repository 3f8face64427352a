//! Branching records: the two options offered at a step and the beat that follows.

use serde::{Deserialize, Serialize};

/// Offered when no usable first option can be read.
pub const DEFAULT_FIRST_CHOICE: &str = "Follow a trail of twinkling lights to see where it leads.";
/// Offered when no usable second option can be read.
pub const DEFAULT_SECOND_CHOICE: &str = "Ask a friendly neighbor for help and a cozy hint.";

/// Which option the reader picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    First,
    Second,
}

/// Exactly two non-empty, distinct options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceProposal {
    first: String,
    second: String,
}

impl Default for ChoiceProposal {
    fn default() -> Self {
        Self::new("", "")
    }
}

impl ChoiceProposal {
    /// Build a proposal, substituting defaults for blank options and de-duplicating.
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        let first = non_blank(first.into()).unwrap_or_else(|| DEFAULT_FIRST_CHOICE.to_string());
        let mut second =
            non_blank(second.into()).unwrap_or_else(|| DEFAULT_SECOND_CHOICE.to_string());

        if same_option(&first, &second) {
            second = if same_option(&first, DEFAULT_SECOND_CHOICE) {
                DEFAULT_FIRST_CHOICE.to_string()
            } else {
                DEFAULT_SECOND_CHOICE.to_string()
            };
        }

        Self { first, second }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }

    pub fn get(&self, choice: Choice) -> &str {
        match choice {
            Choice::First => &self.first,
            Choice::Second => &self.second,
        }
    }
}

fn non_blank(text: String) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn same_option(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// One continuation beat; a moral is present only when the story concluded.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContinuationResult {
    pub beat: String,
    pub moral: Option<String>,
}

impl ContinuationResult {
    pub fn concludes(&self) -> bool {
        self.moral.is_some()
    }
}
