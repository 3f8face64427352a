//! Label-anchored span extraction shared by every response shape.
//!
//! A [`Shape`] is a list of labelled fields. Scanning a text finds the first occurrence of
//! each label and works out where its value ends:
//!
//! - [`Extent::Line`]: the rest of the label's line.
//! - [`Extent::Until`]: everything up to the earliest later occurrence of one of the listed
//!   labels, or the end of the text.
//! - [`Extent::Number`]: the run of digits after the label, possibly on the next line.
//!
//! Labels match case-insensitively, accept a space or underscore between words
//! (`OVERALL_SCORE`, `Overall Score`) and tolerate list/markdown decoration in front
//! (`- `, `**`, `#`). Section labels must start a line and need a trailing colon unless they
//! stand alone on it. Number labels match anywhere on a word boundary, so numbered rubrics
//! and several scores on one line still read.
//! Scanning never fails; fields that cannot be located are simply absent, and each shape
//! parser substitutes its own defaults.

use regex::Regex;
use std::ops::Range;

/// How far a field's value reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extent {
    Line,
    Until(&'static [&'static str]),
    Number,
}

/// One labelled field of a shape.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub extent: Extent,
}

impl FieldSpec {
    pub const fn line(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            extent: Extent::Line,
        }
    }

    pub const fn until(
        key: &'static str,
        label: &'static str,
        terminators: &'static [&'static str],
    ) -> Self {
        Self {
            key,
            label,
            extent: Extent::Until(terminators),
        }
    }

    pub const fn number(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            extent: Extent::Number,
        }
    }
}

struct CompiledField {
    def: FieldSpec,
    marker: Regex,
}

/// A compiled set of fields for one response layout.
pub struct Shape {
    fields: Vec<CompiledField>,
}

const LINE_PREFIX: &str = r"(?im)^[ \t>#*_\-]*(?:\d+[.)][ \t*]*)?";

fn label_pattern(label: &str) -> String {
    label
        .split(|c| c == '_' || c == ' ')
        .filter(|word| !word.is_empty())
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"[_ \t]?")
}

fn marker_regex(def: &FieldSpec) -> Regex {
    let label = label_pattern(def.label);
    let pattern = match def.extent {
        Extent::Number => format!(r"(?i)(?:^|[^a-z0-9]){label}[ \t*_]*:?[\s*\[]*(?P<value>\d+)"),
        Extent::Line | Extent::Until(_) => {
            format!(r"{LINE_PREFIX}{label}[ \t*\r]*(?::[ \t*]*|$)")
        }
    };
    // Patterns are built from escaped label text, so compilation cannot fail.
    Regex::new(&pattern).unwrap_or_else(|e| panic!("invalid marker pattern {pattern}: {e}"))
}

impl Shape {
    pub fn new(fields: &[FieldSpec]) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|def| CompiledField {
                    def: *def,
                    marker: marker_regex(def),
                })
                .collect(),
        }
    }

    /// Locate every field of the shape in `text`.
    pub fn scan<'t>(&self, text: &'t str) -> ShapeMatch<'t> {
        let mut found: Vec<FoundField> = self
            .fields
            .iter()
            .filter_map(|field| {
                let caps = field.marker.captures(text)?;
                let whole = caps.get(0)?;
                let value = match field.def.extent {
                    Extent::Number => caps.name("value").map(|m| m.range()),
                    _ => None,
                };
                Some(FoundField {
                    key: field.def.key,
                    extent: field.def.extent,
                    marker: whole.start()..whole.end(),
                    value: value.unwrap_or(whole.end()..whole.end()),
                })
            })
            .collect();

        let markers: Vec<(&'static str, usize)> =
            found.iter().map(|f| (f.key, f.marker.start)).collect();

        for field in &mut found {
            match field.extent {
                Extent::Number => {}
                Extent::Line => {
                    let start = field.value.start;
                    let end = text[start..]
                        .find('\n')
                        .map(|offset| start + offset)
                        .unwrap_or(text.len());
                    field.value = start..end;
                }
                Extent::Until(terminators) => {
                    let start = field.value.start;
                    let end = markers
                        .iter()
                        .filter(|(key, pos)| terminators.contains(key) && *pos >= start)
                        .map(|(_, pos)| *pos)
                        .min()
                        .unwrap_or(text.len());
                    field.value = start..end.max(start);
                }
            }
        }

        ShapeMatch { text, found }
    }
}

#[derive(Debug, Clone)]
struct FoundField {
    key: &'static str,
    extent: Extent,
    marker: Range<usize>,
    value: Range<usize>,
}

/// Result of scanning one text against a shape.
#[derive(Debug, Clone)]
pub struct ShapeMatch<'t> {
    text: &'t str,
    found: Vec<FoundField>,
}

impl<'t> ShapeMatch<'t> {
    fn field(&self, key: &str) -> Option<&FoundField> {
        self.found.iter().find(|f| f.key == key)
    }

    /// Whether the field's label was located at all.
    pub fn has(&self, key: &str) -> bool {
        self.field(key).is_some()
    }

    /// Trimmed value of a field, `None` if the label is missing or the value is blank.
    pub fn value(&self, key: &str) -> Option<&'t str> {
        let field = self.field(key)?;
        let value = self.text[field.value.clone()].trim();
        (!value.is_empty()).then_some(value)
    }

    /// Numeric value of a [`Extent::Number`] field. Digit runs too large for `i64` saturate.
    pub fn number(&self, key: &str) -> Option<i64> {
        let digits = self.value(key)?;
        Some(digits.parse::<i64>().unwrap_or(i64::MAX))
    }

    /// The whole text with the listed fields (label and value) cut out, trimmed.
    pub fn text_without(&self, keys: &[&str]) -> String {
        let mut cuts: Vec<Range<usize>> = self
            .found
            .iter()
            .filter(|f| keys.contains(&f.key))
            .map(|f| f.marker.start..f.value.end.max(f.marker.end))
            .collect();
        cuts.sort_by_key(|r| r.start);

        let mut out = String::with_capacity(self.text.len());
        let mut cursor = 0;
        for cut in cuts {
            if cut.start > cursor {
                out.push_str(&self.text[cursor..cut.start]);
            }
            cursor = cursor.max(cut.end);
        }
        if cursor < self.text.len() {
            out.push_str(&self.text[cursor..]);
        }
        out.trim().to_string()
    }
}
