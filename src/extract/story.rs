//! Story shape: a `TITLE:` line, a `STORY:` section and a `MORAL:` line.

use crate::extract::shape::{FieldSpec, Shape};
use regex::Regex;
use std::sync::OnceLock;

const FIELDS: &[FieldSpec] = &[
    FieldSpec::line("title", "TITLE"),
    FieldSpec::until("body", "STORY", &["moral", "title", "version"]),
    FieldSpec::until("moral", "MORAL", &["version", "title", "body"]),
    // Only recognized so a context rendering echoed back does not leak into the moral.
    FieldSpec::line("version", "VERSION"),
];

fn shape() -> &'static Shape {
    static SHAPE: OnceLock<Shape> = OnceLock::new();
    SHAPE.get_or_init(|| Shape::new(FIELDS))
}

fn stray_story_label() -> &'static Regex {
    static LABEL: OnceLock<Regex> = OnceLock::new();
    LABEL.get_or_init(|| {
        Regex::new(r"(?i)\A[ \t>#*_\-]*STORY[ \t*]*(?::|\n)")
            .unwrap_or_else(|e| panic!("invalid story label pattern: {e}"))
    })
}

/// The three story fields read from a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryParts {
    pub title: String,
    pub body: String,
    pub moral: String,
}

/// Parse a story reply; `fallback_title` is used when no title can be read.
///
/// Without a usable `STORY` section, the body is whatever remains once the title and moral
/// are cut out.
pub fn parse_story(text: &str, fallback_title: &str) -> StoryParts {
    let found = shape().scan(text);

    let title = found.value("title").unwrap_or(fallback_title).to_string();
    let moral = found.value("moral").unwrap_or_default().to_string();

    let body = match found.value("body") {
        Some(body) => body.to_string(),
        None => found.text_without(&["title", "moral", "version", "body"]),
    };
    let body = stray_story_label().replace(&body, "").trim().to_string();

    StoryParts { title, body, moral }
}
