use crate::catalog::annotation::LineAnnotationSet;
use crate::options::DuplicateAnnotationPolicy;
use crate::report::Violation;
use serde::{Deserialize, Serialize};

/// One code block plus the explanations bound to its lines.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct LanguageImplementation {
    pub code: String,
    #[serde(default)]
    pub explanation: LineAnnotationSet,
}

impl LanguageImplementation {
    pub fn new(code: impl Into<String>, explanation: LineAnnotationSet) -> Self {
        Self {
            code: code.into(),
            explanation,
        }
    }

    /// Number of lines in `code`; at least 1 (an empty block is one empty line).
    ///
    /// `\r\n` counts as a single terminator and a trailing terminator opens an
    /// empty final line, matching how the block is numbered when displayed.
    pub fn line_count(&self) -> usize {
        line_count(&self.code)
    }

    /// Text of a 1-indexed line, if it exists.
    pub fn line(&self, number: usize) -> Option<&str> {
        let index = number.checked_sub(1)?;
        self.code
            .split('\n')
            .nth(index)
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
    }

    pub fn explanation_for_line(&self, line: i64) -> Vec<&str> {
        self.explanation.lookup(line)
    }

    /// All annotation violations; field paths are relative to this block.
    pub fn validate(&self, policy: DuplicateAnnotationPolicy) -> Vec<Violation> {
        self.explanation
            .validate(self.line_count(), policy)
            .into_iter()
            .map(|v| v.within("explanation"))
            .collect()
    }
}

fn line_count(code: &str) -> usize {
    // `split` on '\n' also handles "\r\n": the '\r' stays on the previous line.
    code.split('\n').count()
}
