//! Qualification field grammar.
//!
//! A register qualifications field is a comma separated list of fragments, each of
//! the shape `Degree(Institution) Year` or `Degree(Speciality)(Institution) Year`.
//! Nothing enforces that shape, so parsing is best effort: a fragment that does not
//! fit is dropped and the rest of the field is still used.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::pipeline::processing::normalize::{canonical_upper, DegreeStandardizer};
use crate::types::{DiscardReason, QualificationTuple, SegmentOutcome};

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").expect("digit run regex"));

/// `(...)` at the very end with no parentheses inside.
static TRAILING_GROUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([^()]+)\)$").expect("trailing group regex"));

/// Everything one qualifications field produced, kept and dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedField {
    pub tuples: Vec<QualificationTuple>,
    /// Non-empty fragments the grammar rejected, with the reason
    pub discarded: Vec<(String, DiscardReason)>,
}

pub struct QualificationParser {
    degrees: DegreeStandardizer,
}

impl QualificationParser {
    pub fn new(degrees: DegreeStandardizer) -> Self {
        Self { degrees }
    }

    pub fn degrees(&self) -> &DegreeStandardizer {
        &self.degrees
    }

    /// Extract one qualification from a single comma-free fragment.
    pub fn parse_segment(&self, fragment: &str) -> SegmentOutcome {
        // The first digit run is the year; every digit run is then dropped.
        // A zero year means unknown.
        let year = DIGIT_RUN
            .find(fragment)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .filter(|year| *year != 0);
        let residual = DIGIT_RUN.replace_all(fragment, "");

        let sanitized = residual.replace([',', ';'], "");
        let sanitized = sanitized.trim();
        if sanitized.is_empty() {
            return SegmentOutcome::Discarded(DiscardReason::Empty);
        }

        let Some((head, institution)) = split_trailing_group(sanitized) else {
            let reason = if ends_with_nested_group(sanitized) {
                DiscardReason::NestedGroup
            } else {
                DiscardReason::NoTrailingGroup
            };
            return SegmentOutcome::Discarded(reason);
        };

        // One more level: Degree(Speciality) in front of the institution.
        let (degree, speciality) = if head.contains('(') {
            match split_trailing_group(head) {
                Some((degree, speciality)) => (degree, speciality),
                None => (head, ""),
            }
        } else {
            (head, "")
        };

        if ends_with_nested_group(degree) {
            return SegmentOutcome::Discarded(DiscardReason::NestedGroup);
        }

        SegmentOutcome::Tuple(QualificationTuple {
            year,
            institution: canonical_upper(institution),
            degree: self.degrees.standardize(&degree.to_uppercase()),
            speciality: canonical_upper(speciality),
        })
    }

    /// Split a raw qualifications field on commas and parse every fragment in order.
    pub fn parse_field(&self, raw: &str) -> ParsedField {
        let mut parsed = ParsedField::default();
        for fragment in raw.split(',') {
            match self.parse_segment(fragment) {
                SegmentOutcome::Tuple(tuple) => parsed.tuples.push(tuple),
                SegmentOutcome::Discarded(DiscardReason::Empty) => {}
                SegmentOutcome::Discarded(reason) => {
                    parsed.discarded.push((fragment.trim().to_string(), reason))
                }
            }
        }
        parsed
    }

    /// Ordered qualifications of a raw field; fragments that do not parse are left out.
    pub fn split_and_parse(&self, raw: &str) -> Vec<QualificationTuple> {
        self.parse_field(raw).tuples
    }
}

/// `prefix(inner)` -> (`prefix` trimmed, `inner`).
fn split_trailing_group(text: &str) -> Option<(&str, &str)> {
    let captures = TRAILING_GROUP.captures(text)?;
    let whole = captures.get(0)?;
    let inner = captures.get(1)?;
    Some((text[..whole.start()].trim(), inner.as_str()))
}

/// True when `text` ends in a balanced group that contains another group,
/// e.g. `A((B)C)`. Unbalanced tails such as `M.Med(Gen.Surg` are not nesting.
fn ends_with_nested_group(text: &str) -> bool {
    let text = text.trim_end();
    if !text.ends_with(')') {
        return false;
    }

    let mut depth = 0usize;
    let mut max_depth = 0usize;
    for c in text.chars().rev() {
        match c {
            ')' => {
                depth += 1;
                max_depth = max_depth.max(depth);
            }
            '(' => {
                depth -= 1;
                if depth == 0 {
                    return max_depth > 1;
                }
            }
            _ => {}
        }
    }
    false
}
