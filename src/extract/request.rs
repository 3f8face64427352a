//! Request shape: `CATEGORY:`, `CHARACTERS:`, `THEMES:`, `SETTING:`, `TONE:` lines.

use crate::extract::shape::{FieldSpec, Shape};
use crate::story::{StoryCategory, StoryRequest, StoryTone, DEFAULT_SETTING};
use std::sync::OnceLock;

const FIELDS: &[FieldSpec] = &[
    FieldSpec::line("category", "CATEGORY"),
    FieldSpec::line("characters", "CHARACTERS"),
    FieldSpec::line("themes", "THEMES"),
    FieldSpec::line("setting", "SETTING"),
    FieldSpec::line("tone", "TONE"),
];

fn shape() -> &'static Shape {
    static SHAPE: OnceLock<Shape> = OnceLock::new();
    SHAPE.get_or_init(|| Shape::new(FIELDS))
}

/// Comma-separated list, entries trimmed, empty entries dropped.
pub fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Build a request from the user's words and the analysis reply.
pub fn parse_request(raw_input: &str, response: &str) -> StoryRequest {
    let found = shape().scan(response);

    StoryRequest {
        raw_input: raw_input.to_string(),
        category: found
            .value("category")
            .map(StoryCategory::parse)
            .unwrap_or_default(),
        characters: found.value("characters").map(split_list).unwrap_or_default(),
        themes: found.value("themes").map(split_list).unwrap_or_default(),
        setting: found
            .value("setting")
            .unwrap_or(DEFAULT_SETTING)
            .to_string(),
        tone: found.value("tone").map(StoryTone::parse).unwrap_or_default(),
    }
}
