//! Continuation shape: a `CONTINUATION:` section and an optional trailing `MORAL:`.

use crate::extract::shape::{FieldSpec, Shape};
use crate::story::ContinuationResult;
use regex::Regex;
use std::sync::OnceLock;

const FIELDS: &[FieldSpec] = &[
    FieldSpec::until("beat", "CONTINUATION", &["moral"]),
    FieldSpec::until("moral", "MORAL", &[]),
];

fn shape() -> &'static Shape {
    static SHAPE: OnceLock<Shape> = OnceLock::new();
    SHAPE.get_or_init(|| Shape::new(FIELDS))
}

fn leading_label() -> &'static Regex {
    static LABEL: OnceLock<Regex> = OnceLock::new();
    LABEL.get_or_init(|| {
        Regex::new(r"(?i)\A[ \t>#*_\-]*CONTINUATION[ \t*]*:?")
            .unwrap_or_else(|e| panic!("invalid continuation label pattern: {e}"))
    })
}

/// Without a usable `CONTINUATION` section the whole reply, minus any moral, is the beat.
pub fn parse_continuation(text: &str) -> ContinuationResult {
    let found = shape().scan(text);

    let beat = match found.value("beat") {
        Some(beat) => beat.to_string(),
        None => found.text_without(&["moral"]),
    };
    let beat = leading_label().replace(&beat, "").trim().to_string();

    ContinuationResult {
        beat,
        moral: found.value("moral").map(str::to_string),
    }
}
