//! Collected validation findings for a catalog.
//!
//! Validation never stops at the first problem: every check appends to a
//! `CatalogValidationReport` so a hand-authored catalog can be fixed in one
//! editing pass.

use crate::catalog::{CategoryId, EntryId, LanguageTag};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum ViolationKind {
    OutOfRangeAnnotation,
    DuplicateAnnotation,
    UnknownCategory,
    EmptyIdentity,
    InvalidSlug,
    EmptyField,
    EmptyApplicabilityList,
    DanglingComparisonColumn,
    MissingComparisonCell,
    DanglingRelatedEntry,
    DuplicateCategory,
    DuplicateEntryId,
    EmptyCategory,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::OutOfRangeAnnotation => "OutOfRangeAnnotation",
            ViolationKind::DuplicateAnnotation => "DuplicateAnnotation",
            ViolationKind::UnknownCategory => "UnknownCategory",
            ViolationKind::EmptyIdentity => "EmptyIdentity",
            ViolationKind::InvalidSlug => "InvalidSlug",
            ViolationKind::EmptyField => "EmptyField",
            ViolationKind::EmptyApplicabilityList => "EmptyApplicabilityList",
            ViolationKind::DanglingComparisonColumn => "DanglingComparisonColumn",
            ViolationKind::MissingComparisonCell => "MissingComparisonCell",
            ViolationKind::DanglingRelatedEntry => "DanglingRelatedEntry",
            ViolationKind::DuplicateCategory => "DuplicateCategory",
            ViolationKind::DuplicateEntryId => "DuplicateEntryId",
            ViolationKind::EmptyCategory => "EmptyCategory",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a record came from: the file it was loaded from (if any) and a JSON
/// pointer to the record inside that document.
#[derive(Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct SourceRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    pub pointer: String,
}

impl SourceRef {
    pub fn new(file: Option<PathBuf>, pointer: impl Into<String>) -> Self {
        Self {
            file,
            pointer: pointer.into(),
        }
    }

    /// Source for the `index`-th item of a top-level document array.
    pub fn item(file: Option<PathBuf>, collection: &str, index: usize) -> Self {
        Self::new(file, format!("/{collection}/{index}"))
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}", file.display(), self.pointer),
            None => f.write_str(&self.pointer),
        }
    }
}

/// One data-quality finding.
///
/// `field` is a dotted path relative to the offending record
/// (`implementations.java.explanation[2].line`).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<EntryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<LanguageTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<i64>,
    pub field: String,
    pub kind: ViolationKind,
    pub severity: Severity,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceRef>,
}

impl Violation {
    pub fn error(kind: ViolationKind, field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            entry_id: None,
            category_id: None,
            language: None,
            line: None,
            field: field.into(),
            kind,
            severity: Severity::Error,
            detail: detail.into(),
            sources: Vec::new(),
        }
    }

    pub fn warning(
        kind: ViolationKind,
        field: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(kind, field, detail)
        }
    }

    pub fn for_entry(mut self, id: &EntryId) -> Self {
        self.entry_id = Some(id.clone());
        self
    }

    pub fn for_category(mut self, id: &CategoryId) -> Self {
        self.category_id = Some(id.clone());
        self
    }

    pub fn for_language(mut self, language: LanguageTag) -> Self {
        self.language = Some(language);
        self
    }

    pub fn at_line(mut self, line: i64) -> Self {
        self.line = Some(line);
        self
    }

    /// Prefix the field path, used when a nested validator reports relative
    /// to its own record.
    pub fn within(mut self, prefix: &str) -> Self {
        self.field = if self.field.is_empty() {
            prefix.to_string()
        } else if self.field.starts_with('[') {
            format!("{prefix}{}", self.field)
        } else {
            format!("{prefix}.{}", self.field)
        };
        self
    }

    pub fn with_source(mut self, source: SourceRef) -> Self {
        self.sources.push(source);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{severity}[{}]", self.kind)?;
        if let Some(id) = &self.entry_id {
            write!(f, " entry '{id}'")?;
        }
        if let Some(id) = &self.category_id {
            write!(f, " category '{id}'")?;
        }
        write!(f, " {}: {}", self.field, self.detail)?;
        if !self.sources.is_empty() {
            let sources = self
                .sources
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            write!(f, " ({sources})")?;
        }
        Ok(())
    }
}

/// Every violation found across a catalog, in discovery order.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct CatalogValidationReport {
    pub violations: Vec<Violation>,
}

impl CatalogValidationReport {
    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub fn extend(&mut self, violations: impl IntoIterator<Item = Violation>) {
        self.violations.extend(violations);
    }

    pub fn error_count(&self) -> usize {
        self.violations.iter().filter(|v| v.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.violations.len() - self.error_count()
    }

    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(Violation::is_error)
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| v.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| !v.is_error())
    }

    /// Violations of one kind, handy for assertions and CLI filtering.
    pub fn of_kind(&self, kind: ViolationKind) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.kind == kind)
    }

    pub fn for_entry<'a>(&'a self, id: &'a EntryId) -> impl Iterator<Item = &'a Violation> {
        self.violations
            .iter()
            .filter(move |v| v.entry_id.as_ref() == Some(id))
    }
}

impl fmt::Display for CatalogValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for violation in &self.violations {
            writeln!(f, "{violation}")?;
        }
        write!(
            f,
            "{} error(s), {} warning(s)",
            self.error_count(),
            self.warning_count()
        )
    }
}
