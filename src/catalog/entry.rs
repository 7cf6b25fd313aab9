//! A documented design pattern: identity, theory, per-language code, and
//! comparison tables.
//!
//! Field presence is explicit: `None` means the author left a field out,
//! `Some` of an empty value means the author wrote it empty. Validation
//! treats the second case as an authoring error.

use crate::catalog::category::CategoryIndex;
use crate::catalog::identity::{CategoryId, EntryId, LanguageTag, is_valid_slug};
use crate::catalog::implementation::LanguageImplementation;
use crate::options::ValidationOptions;
use crate::report::{SourceRef, Violation, ViolationKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Theory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicability: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consequences: Option<Vec<String>>,
}

/// One table row contrasting how language variants handle an aspect.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub title: String,
    #[serde(default)]
    pub cells: BTreeMap<LanguageTag, String>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PatternEntry {
    pub id: EntryId,
    pub category: CategoryId,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theory: Option<Theory>,
    #[serde(default)]
    pub implementations: BTreeMap<LanguageTag, LanguageImplementation>,
    /// Variants discussed in comparison tables without a code sample.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub comparison_only: BTreeSet<LanguageTag>,
    #[serde(default)]
    pub comparisons: Vec<ComparisonRow>,
    /// Cross-pattern links; every id must exist in the catalog.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<EntryId>,
    #[serde(skip)]
    pub source: SourceRef,
}

impl PatternEntry {
    pub fn new(id: &str, category: &str, name: &str, description: &str) -> Self {
        Self {
            id: EntryId::from(id),
            category: CategoryId::from(category),
            name: name.to_string(),
            description: description.to_string(),
            theory: None,
            implementations: BTreeMap::new(),
            comparison_only: BTreeSet::new(),
            comparisons: Vec::new(),
            related: Vec::new(),
            source: SourceRef::default(),
        }
    }

    pub fn with_theory(mut self, theory: Theory) -> Self {
        self.theory = Some(theory);
        self
    }

    pub fn with_implementation(
        mut self,
        language: LanguageTag,
        implementation: LanguageImplementation,
    ) -> Self {
        self.implementations.insert(language, implementation);
        self
    }

    pub fn with_comparison(mut self, row: ComparisonRow) -> Self {
        self.comparisons.push(row);
        self
    }

    pub fn with_comparison_only(mut self, language: LanguageTag) -> Self {
        self.comparison_only.insert(language);
        self
    }

    pub fn with_related(mut self, id: &str) -> Self {
        self.related.push(EntryId::from(id));
        self
    }

    pub fn with_source(mut self, source: SourceRef) -> Self {
        self.source = source;
        self
    }

    pub fn implementation(&self, language: LanguageTag) -> Option<&LanguageImplementation> {
        self.implementations.get(&language)
    }

    pub fn languages(&self) -> impl Iterator<Item = LanguageTag> + '_ {
        self.implementations.keys().copied()
    }

    /// Explanations for `line` of the `language` sample; empty when the
    /// entry has no such sample or the line is unannotated.
    pub fn explanation_for_line(&self, language: LanguageTag, line: i64) -> Vec<&str> {
        self.implementation(language)
            .map(|implementation| implementation.explanation_for_line(line))
            .unwrap_or_default()
    }

    /// Every entry-local violation. Cross-entry checks (id uniqueness,
    /// related links) belong to the registry.
    ///
    /// Each violation is tagged with this entry's id and source.
    pub fn validate(&self, categories: &CategoryIndex, options: &ValidationOptions) -> Vec<Violation> {
        let mut violations = Vec::new();
        self.validate_identity(categories, &mut violations);
        self.validate_theory(&mut violations);
        for (language, implementation) in &self.implementations {
            let prefix = format!("implementations.{language}");
            violations.extend(
                implementation
                    .validate(options.duplicate_annotations)
                    .into_iter()
                    .map(|v| v.within(&prefix).for_language(*language)),
            );
        }
        self.validate_comparisons(&mut violations);

        violations
            .into_iter()
            .map(|v| v.for_entry(&self.id).with_source(self.source.clone()))
            .collect()
    }

    fn validate_identity(&self, categories: &CategoryIndex, out: &mut Vec<Violation>) {
        if self.id.as_str().trim().is_empty() {
            out.push(Violation::error(
                ViolationKind::EmptyIdentity,
                "id",
                "entry id is blank",
            ));
        } else if !is_valid_slug(self.id.as_str()) {
            out.push(Violation::error(
                ViolationKind::InvalidSlug,
                "id",
                format!(
                    "entry id '{}' must be lowercase words separated by hyphens",
                    self.id
                ),
            ));
        }
        if self.name.trim().is_empty() {
            out.push(Violation::error(
                ViolationKind::EmptyIdentity,
                "name",
                "entry name is blank",
            ));
        }
        if self.description.trim().is_empty() {
            out.push(Violation::error(
                ViolationKind::EmptyField,
                "description",
                "entry description is blank",
            ));
        }
        if !categories.contains(&self.category) {
            out.push(
                Violation::error(
                    ViolationKind::UnknownCategory,
                    "category",
                    format!("category '{}' is not in the category index", self.category),
                )
                .for_category(&self.category),
            );
        }
    }

    fn validate_theory(&self, out: &mut Vec<Violation>) {
        let Some(theory) = &self.theory else {
            return;
        };
        for (field, value) in [
            ("theory.background", &theory.background),
            ("theory.problem", &theory.problem),
            ("theory.solution", &theory.solution),
        ] {
            if value.as_deref().is_some_and(|text| text.trim().is_empty()) {
                out.push(Violation::error(
                    ViolationKind::EmptyField,
                    field,
                    "present but blank",
                ));
            }
        }

        if let Some(applicability) = &theory.applicability {
            if applicability.is_empty() {
                out.push(Violation::error(
                    ViolationKind::EmptyApplicabilityList,
                    "theory.applicability",
                    "applicability is present but lists nothing; omit the field instead",
                ));
            }
            blank_items("theory.applicability", applicability, out);
        }
        if let Some(consequences) = &theory.consequences {
            if consequences.is_empty() {
                out.push(Violation::error(
                    ViolationKind::EmptyField,
                    "theory.consequences",
                    "consequences is present but lists nothing; omit the field instead",
                ));
            }
            blank_items("theory.consequences", consequences, out);
        }
    }

    fn validate_comparisons(&self, out: &mut Vec<Violation>) {
        for (row_idx, row) in self.comparisons.iter().enumerate() {
            let row_field = format!("comparisons[{row_idx}]");
            if row.title.trim().is_empty() {
                out.push(Violation::error(
                    ViolationKind::EmptyField,
                    format!("{row_field}.title"),
                    "comparison row has no title",
                ));
            }
            for (language, text) in &row.cells {
                let cell_field = format!("{row_field}.cells.{language}");
                if !self.implementations.contains_key(language)
                    && !self.comparison_only.contains(language)
                {
                    out.push(
                        Violation::error(
                            ViolationKind::DanglingComparisonColumn,
                            cell_field.clone(),
                            format!(
                                "row '{}' has a '{language}' column but the entry has no '{language}' implementation and does not declare it comparison-only",
                                row.title
                            ),
                        )
                        .for_language(*language),
                    );
                }
                if text.trim().is_empty() {
                    out.push(
                        Violation::error(ViolationKind::EmptyField, cell_field, "blank cell")
                            .for_language(*language),
                    );
                }
            }
            for language in self.implementations.keys() {
                if !row.cells.contains_key(language) {
                    out.push(
                        Violation::warning(
                            ViolationKind::MissingComparisonCell,
                            format!("{row_field}.cells"),
                            format!(
                                "row '{}' has no '{language}' cell although the entry implements it",
                                row.title
                            ),
                        )
                        .for_language(*language),
                    );
                }
            }
        }
    }
}

fn blank_items(field: &str, items: &[String], out: &mut Vec<Violation>) {
    for (idx, item) in items.iter().enumerate() {
        if item.trim().is_empty() {
            out.push(Violation::error(
                ViolationKind::EmptyField,
                format!("{field}[{idx}]"),
                "blank list item",
            ));
        }
    }
}
