//! Judge feedback presentation: score table, latest critique, stop summary.

use crate::refinement::StopReason;
use crate::story::{FeedbackHistory, JudgeFeedback, Score};
use comfy_table::Table;
use owo_colors::OwoColorize;

/// One row per judging round.
pub fn format_feedback_table(history: &FeedbackHistory) -> String {
    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL)
        .set_header(vec![
            "Round",
            "Overall",
            "Age",
            "Engagement",
            "Moral",
            "Structure",
            "Language",
        ]);
    for (index, feedback) in history.iter().enumerate() {
        table.add_row(vec![
            (index + 1).to_string(),
            feedback.overall.to_string(),
            feedback.age_appropriateness.to_string(),
            feedback.engagement.to_string(),
            feedback.moral_clarity.to_string(),
            feedback.story_structure.to_string(),
            feedback.language_quality.to_string(),
        ]);
    }
    table.to_string()
}

pub fn format_latest_feedback(feedback: &JudgeFeedback) -> String {
    let mut out = String::from("Judge's notes:");
    if feedback.critique.is_empty() {
        out.push_str("\n  (no critique returned)");
    } else {
        for line in feedback.critique.lines() {
            out.push_str("\n  ");
            out.push_str(line);
        }
    }
    if !feedback.suggestions.is_empty() {
        out.push_str("\nSuggestions:");
        for suggestion in &feedback.suggestions {
            out.push_str("\n  - ");
            out.push_str(suggestion);
        }
    }
    out
}

/// `Round 2: 6/10`, coloured against the threshold when `color` is set.
pub fn format_round_score(round: usize, score: Score, threshold: u8, color: bool) -> String {
    let value = format!("{}/10", score);
    let value = if !color {
        value
    } else if score.get() >= threshold {
        value.green().bold().to_string()
    } else if score.get() + 2 >= threshold {
        value.yellow().to_string()
    } else {
        value.red().to_string()
    };
    format!("Round {}: {}", round, value)
}

pub fn format_stop_reason(reason: &StopReason, threshold: u8, color: bool) -> String {
    let text = match reason {
        StopReason::ThresholdReached { round, score } => format!(
            "Judge score {}/10 met the threshold of {} in round {}.",
            score, threshold, round
        ),
        StopReason::MaxRounds { rounds } => format!(
            "Stopped after {} rounds without reaching {}/10; showing the final draft.",
            rounds, threshold
        ),
    };
    match (color, reason) {
        (false, _) => text,
        (true, StopReason::ThresholdReached { .. }) => text.green().to_string(),
        (true, StopReason::MaxRounds { .. }) => text.yellow().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(overall: i64) -> JudgeFeedback {
        JudgeFeedback {
            overall: Score::new(overall),
            critique: "Lovely pacing.\nThe ending is abrupt.".to_string(),
            suggestions: vec!["Slow the ending".to_string()],
            ..JudgeFeedback::default()
        }
    }

    #[test]
    fn test_table_has_a_row_per_round() {
        let mut history = FeedbackHistory::new();
        history.record(verdict(4));
        history.record(verdict(8));
        let table = format_feedback_table(&history);
        assert!(table.contains("Engagement"));
        assert!(table.contains(" 4 "));
        assert!(table.contains(" 8 "));
    }

    #[test]
    fn test_latest_feedback_lists_suggestions() {
        let text = format_latest_feedback(&verdict(6));
        assert!(text.contains("  The ending is abrupt."));
        assert!(text.contains("  - Slow the ending"));
    }

    #[test]
    fn test_plain_round_score() {
        assert_eq!(format_round_score(2, Score::new(6), 7, false), "Round 2: 6/10");
    }

    #[test]
    fn test_stop_reason_text() {
        let text = format_stop_reason(&StopReason::MaxRounds { rounds: 5 }, 7, false);
        assert_eq!(
            text,
            "Stopped after 5 rounds without reaching 7/10; showing the final draft."
        );
    }
}
