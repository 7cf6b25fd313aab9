//! Line-bound explanations for one code block.

use crate::options::DuplicateAnnotationPolicy;
use crate::report::{Violation, ViolationKind};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Explanatory text bound to a 1-indexed source line.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(deserialize_with = "deserialize_line")]
    pub line: i64,
    pub text: String,
}

/// Accepts any whole JSON number. Values beyond `i64` saturate so they are
/// reported as `OutOfRangeAnnotation` instead of failing the whole load.
fn deserialize_line<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    struct LineVisitor;

    impl Visitor<'_> for LineVisitor {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a whole line number")
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<i64, E> {
            Ok(value)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<i64, E> {
            Ok(i64::try_from(value).unwrap_or(i64::MAX))
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<i64, E> {
            if !value.is_finite() || value.fract() != 0.0 {
                return Err(E::invalid_value(de::Unexpected::Float(value), &self));
            }
            // `as` saturates at the i64 bounds.
            Ok(value as i64)
        }
    }

    deserializer.deserialize_any(LineVisitor)
}

impl Annotation {
    pub fn new(line: i64, text: impl Into<String>) -> Self {
        Self {
            line,
            text: text.into(),
        }
    }
}

/// Annotations for one code block, kept in source order and indexed by line.
///
/// Serializes as the plain `[{line, text}]` list used by catalog files.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Annotation>", into = "Vec<Annotation>")]
pub struct LineAnnotationSet {
    annotations: Vec<Annotation>,
    by_line: BTreeMap<i64, Vec<usize>>,
}

impl From<Vec<Annotation>> for LineAnnotationSet {
    fn from(annotations: Vec<Annotation>) -> Self {
        let mut by_line: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (idx, annotation) in annotations.iter().enumerate() {
            by_line.entry(annotation.line).or_default().push(idx);
        }
        Self {
            annotations,
            by_line,
        }
    }
}

impl From<LineAnnotationSet> for Vec<Annotation> {
    fn from(set: LineAnnotationSet) -> Self {
        set.annotations
    }
}

impl FromIterator<Annotation> for LineAnnotationSet {
    fn from_iter<T: IntoIterator<Item = Annotation>>(iter: T) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl LineAnnotationSet {
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Annotations in source order.
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    /// Distinct annotated line numbers, ascending.
    pub fn lines(&self) -> impl Iterator<Item = i64> + '_ {
        self.by_line.keys().copied()
    }

    /// Every explanation for `line`, in source order. Never fails; an
    /// unannotated or out-of-range line yields an empty list.
    pub fn lookup(&self, line: i64) -> Vec<&str> {
        self.by_line
            .get(&line)
            .map(|indices| {
                indices
                    .iter()
                    .map(|&idx| self.annotations[idx].text.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Check every annotation against a block of `line_count` lines.
    ///
    /// Field paths are relative to the annotation list (`[3].line`) so the
    /// caller can prefix them with the owning implementation.
    pub fn validate(&self, line_count: usize, policy: DuplicateAnnotationPolicy) -> Vec<Violation> {
        let mut violations = Vec::new();
        let max_line = i64::try_from(line_count).unwrap_or(i64::MAX);

        for (idx, annotation) in self.annotations.iter().enumerate() {
            if annotation.line < 1 || annotation.line > max_line {
                violations.push(
                    Violation::error(
                        ViolationKind::OutOfRangeAnnotation,
                        format!("[{idx}].line"),
                        format!(
                            "line {} is outside 1..={line_count}",
                            annotation.line
                        ),
                    )
                    .at_line(annotation.line),
                );
            }
            if annotation.text.trim().is_empty() {
                violations.push(
                    Violation::error(
                        ViolationKind::EmptyField,
                        format!("[{idx}].text"),
                        format!("annotation for line {} has no text", annotation.line),
                    )
                    .at_line(annotation.line),
                );
            }
        }

        if policy == DuplicateAnnotationPolicy::Error {
            for (line, indices) in &self.by_line {
                if indices.len() < 2 {
                    continue;
                }
                let positions = indices
                    .iter()
                    .map(|idx| format!("[{idx}]"))
                    .collect::<Vec<_>>()
                    .join(", ");
                violations.push(
                    Violation::error(
                        ViolationKind::DuplicateAnnotation,
                        format!("[{}].line", indices[indices.len() - 1]),
                        format!("line {line} is annotated {} times at {positions}", indices.len()),
                    )
                    .at_line(*line),
                );
            }
        }

        violations
    }
}
