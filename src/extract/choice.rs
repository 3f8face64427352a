//! Choice shape: `CHOICE_1:` and `CHOICE_2:` lines, or failing that two numbered lines.

use crate::extract::shape::{FieldSpec, Shape};
use crate::story::ChoiceProposal;
use regex::Regex;
use std::sync::OnceLock;

const FIELDS: &[FieldSpec] = &[
    FieldSpec::line("first", "CHOICE_1"),
    FieldSpec::line("second", "CHOICE_2"),
];

fn shape() -> &'static Shape {
    static SHAPE: OnceLock<Shape> = OnceLock::new();
    SHAPE.get_or_init(|| Shape::new(FIELDS))
}

fn numbered_line() -> &'static Regex {
    static NUMBERED: OnceLock<Regex> = OnceLock::new();
    NUMBERED.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*[12][.)][ \t]*(\S.*)$")
            .unwrap_or_else(|e| panic!("invalid numbered line pattern: {e}"))
    })
}

/// Two distinct options, always. Missing labels fall back to numbered lines, then to the
/// built-in defaults.
pub fn parse_choices(text: &str) -> ChoiceProposal {
    let found = shape().scan(text);
    let mut first = found.value("first").unwrap_or_default();
    let mut second = found.value("second").unwrap_or_default();

    if first.is_empty() || second.is_empty() {
        let numbered: Vec<&str> = numbered_line()
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .take(2)
            .collect();
        if let [one, two] = numbered[..] {
            first = one;
            second = two;
        }
    }

    ChoiceProposal::new(first, second)
}
