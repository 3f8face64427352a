//! Feedback shape: six scored rubric lines, a `FEEDBACK:` paragraph and `SUGGESTIONS:` bullets.

use crate::extract::shape::{FieldSpec, Shape, ShapeMatch};
use crate::story::{JudgeFeedback, Score};
use regex::Regex;
use std::sync::OnceLock;

const FIELDS: &[FieldSpec] = &[
    FieldSpec::number("overall", "OVERALL_SCORE"),
    FieldSpec::number("age", "AGE_APPROPRIATENESS"),
    FieldSpec::number("engagement", "ENGAGEMENT"),
    FieldSpec::number("moral", "MORAL_CLARITY"),
    FieldSpec::number("structure", "STORY_STRUCTURE"),
    FieldSpec::number("language", "LANGUAGE_QUALITY"),
    FieldSpec::until("critique", "FEEDBACK", &["suggestions"]),
    FieldSpec::until("suggestions", "SUGGESTIONS", &[]),
];

fn shape() -> &'static Shape {
    static SHAPE: OnceLock<Shape> = OnceLock::new();
    SHAPE.get_or_init(|| Shape::new(FIELDS))
}

fn bullet() -> &'static Regex {
    static BULLET: OnceLock<Regex> = OnceLock::new();
    BULLET.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*(?:[-•*]|\d+[.)])[ \t]*(\S.*)$")
            .unwrap_or_else(|e| panic!("invalid bullet pattern: {e}"))
    })
}

fn score(found: &ShapeMatch<'_>, key: &str) -> Score {
    found.number(key).map(Score::new).unwrap_or_default()
}

/// Bullet lines of a suggestions section; unbulleted text becomes a single suggestion.
pub fn split_suggestions(section: &str) -> Vec<String> {
    let bullets: Vec<String> = bullet()
        .captures_iter(section)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|item| !item.is_empty())
        .collect();

    if bullets.is_empty() && !section.trim().is_empty() {
        vec![section.trim().to_string()]
    } else {
        bullets
    }
}

pub fn parse_feedback(text: &str) -> JudgeFeedback {
    let found = shape().scan(text);

    JudgeFeedback {
        overall: score(&found, "overall"),
        age_appropriateness: score(&found, "age"),
        engagement: score(&found, "engagement"),
        moral_clarity: score(&found, "moral"),
        story_structure: score(&found, "structure"),
        language_quality: score(&found, "language"),
        critique: found.value("critique").unwrap_or_default().to_string(),
        suggestions: found
            .value("suggestions")
            .map(split_suggestions)
            .unwrap_or_default(),
    }
}
