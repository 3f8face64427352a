//! Judge feedback and the per-session feedback log.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A rubric score, always within 1..=10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;
    /// Used whenever a score cannot be read.
    pub const MIDPOINT: Score = Score(5);

    /// Clamp any integer into range.
    pub fn new(value: i64) -> Self {
        Score(value.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Score {
    fn default() -> Self {
        Self::MIDPOINT
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl TryFrom<i64> for Score {
    type Error = std::convert::Infallible;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Ok(Score::new(value))
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One judging round's verdict.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JudgeFeedback {
    pub overall: Score,
    pub age_appropriateness: Score,
    pub engagement: Score,
    pub moral_clarity: Score,
    pub story_structure: Score,
    pub language_quality: Score,
    pub critique: String,
    pub suggestions: Vec<String>,
}

impl JudgeFeedback {
    pub fn meets(&self, threshold: u8) -> bool {
        self.overall.get() >= threshold
    }

    /// Rubric scores in display order, overall excluded.
    pub fn rubric(&self) -> [(&'static str, Score); 5] {
        [
            ("Age Appropriateness", self.age_appropriateness),
            ("Engagement", self.engagement),
            ("Moral Clarity", self.moral_clarity),
            ("Story Structure", self.story_structure),
            ("Language Quality", self.language_quality),
        ]
    }

    /// Labelled block used when showing prior rounds to the judge.
    pub fn to_context_text(&self, round: usize) -> String {
        let suggestions = if self.suggestions.is_empty() {
            "- (no suggestions returned)".to_string()
        } else {
            bullet_list(&self.suggestions)
        };
        format!(
            "ROUND {round} FEEDBACK\n\
             OVERALL_SCORE: {}\n\
             AGE_APPROPRIATENESS: {}\n\
             ENGAGEMENT: {}\n\
             MORAL_CLARITY: {}\n\
             STORY_STRUCTURE: {}\n\
             LANGUAGE_QUALITY: {}\n\
             FEEDBACK: {}\n\
             SUGGESTIONS:\n{suggestions}\n",
            self.overall,
            self.age_appropriateness,
            self.engagement,
            self.moral_clarity,
            self.story_structure,
            self.language_quality,
            self.critique,
        )
    }

    /// Condensed notes handed to the storyteller for a rewrite.
    pub fn improvement_notes(&self) -> String {
        let suggestions = if self.suggestions.is_empty() {
            "- Improve overall clarity and engagement.".to_string()
        } else {
            bullet_list(&self.suggestions)
        };
        format!(
            "Latest judge scores: overall {}/10 (age {}, engagement {}, moral {}, structure {}, language {}).\n\
             Latest feedback: {}\n\
             Concrete suggestions:\n{suggestions}",
            self.overall,
            self.age_appropriateness,
            self.engagement,
            self.moral_clarity,
            self.story_structure,
            self.language_quality,
            self.critique,
        )
    }
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Append-only log of judging rounds; entry `i` is round `i + 1`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedbackHistory {
    rounds: Vec<JudgeFeedback>,
}

impl FeedbackHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a round and return its 1-based round number.
    pub fn record(&mut self, feedback: JudgeFeedback) -> usize {
        self.rounds.push(feedback);
        self.rounds.len()
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn latest(&self) -> Option<&JudgeFeedback> {
        self.rounds.last()
    }

    /// Feedback for a 1-based round.
    pub fn round(&self, round: usize) -> Option<&JudgeFeedback> {
        round.checked_sub(1).and_then(|index| self.rounds.get(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &JudgeFeedback> {
        self.rounds.iter()
    }

    /// Every recorded round rendered as context blocks, oldest first.
    pub fn to_context_text(&self) -> String {
        self.rounds
            .iter()
            .enumerate()
            .map(|(index, feedback)| feedback.to_context_text(index + 1))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
