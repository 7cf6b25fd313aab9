//! The validated, immutable catalog.
//!
//! `CatalogRegistry::build` is the only way to obtain a registry. It runs
//! every check (categories, each entry, then cross-entry invariants) and
//! either returns a fully indexed registry or the complete violation report.
//! No partially built registry is ever exposed, and a built registry is
//! never mutated, so shared references can be handed to any number of
//! readers.

use crate::catalog::category::{Category, CategoryIndex};
use crate::catalog::entry::PatternEntry;
use crate::catalog::identity::{CategoryId, EntryId, LanguageTag};
use crate::error::CatalogError;
use crate::options::ValidationOptions;
use crate::report::{CatalogValidationReport, SourceRef, Violation, ViolationKind};
use std::collections::{BTreeMap, BTreeSet};

/// Read-only query surface consumed by presentation code.
pub trait CatalogQuery {
    fn get_entry(&self, id: &EntryId) -> Result<&PatternEntry, CatalogError>;

    /// Categories in declaration order.
    fn list_categories(&self) -> Vec<&Category>;

    /// Entries in declaration order, optionally limited to one category.
    fn list_entries(&self, category: Option<&CategoryId>) -> Vec<&PatternEntry>;

    fn get_explanation_for_line(
        &self,
        entry_id: &EntryId,
        language: LanguageTag,
        line: i64,
    ) -> Result<Vec<&str>, CatalogError>;

    /// Findings that did not prevent the build (warnings only).
    ///
    /// A catalog with error-severity violations never becomes a registry, so
    /// the full lint (including `OutOfRangeAnnotation` and the other errors)
    /// comes from `CatalogDefinition::validate` or the `Err` of `build`.
    fn validate_catalog(&self) -> &CatalogValidationReport;
}

#[derive(Debug)]
pub struct CatalogRegistry {
    categories: CategoryIndex,
    entries: Vec<PatternEntry>,
    by_id: BTreeMap<EntryId, usize>,
    by_category: BTreeMap<CategoryId, Vec<usize>>,
    report: CatalogValidationReport,
}

impl CatalogRegistry {
    /// Validate and index a catalog.
    ///
    /// Order: category index, each entry, then cross-entry checks (duplicate
    /// ids, related links, empty categories). Returns `Err` with every
    /// violation when any error-severity finding exists.
    ///
    /// Records without a source (built in memory rather than loaded from a
    /// file) are stamped with their position in `entries` / `categories`.
    pub fn build(
        mut entries: Vec<PatternEntry>,
        mut categories: Vec<Category>,
        options: &ValidationOptions,
    ) -> Result<Self, CatalogValidationReport> {
        let span = tracing::info_span!(
            "catalog_build",
            entries = entries.len(),
            categories = categories.len()
        );
        let _guard = span.enter();

        for (idx, category) in categories.iter_mut().enumerate() {
            stamp_position(&mut category.source, "categories", idx);
        }
        for (idx, entry) in entries.iter_mut().enumerate() {
            stamp_position(&mut entry.source, "patterns", idx);
        }

        let mut report = CatalogValidationReport::default();
        let (category_index, category_violations) = CategoryIndex::build(categories);
        report.extend(category_violations);

        for entry in &entries {
            let violations = entry.validate(&category_index, options);
            tracing::debug!(entry = %entry.id, violations = violations.len(), "validated entry");
            report.extend(violations);
        }

        report.extend(duplicate_id_violations(&entries));
        report.extend(related_link_violations(&entries));
        report.extend(empty_category_violations(&category_index, &entries, options));

        for warning in report.warnings() {
            tracing::warn!(kind = %warning.kind, "{warning}");
        }

        if report.has_errors() {
            tracing::info!(
                errors = report.error_count(),
                warnings = report.warning_count(),
                "catalog failed validation"
            );
            return Err(report);
        }

        let mut by_id = BTreeMap::new();
        let mut by_category: BTreeMap<CategoryId, Vec<usize>> = BTreeMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            by_id.insert(entry.id.clone(), idx);
            by_category
                .entry(entry.category.clone())
                .or_default()
                .push(idx);
        }

        tracing::info!(
            entries = entries.len(),
            categories = category_index.len(),
            warnings = report.warning_count(),
            "catalog ready"
        );

        Ok(Self {
            categories: category_index,
            entries,
            by_id,
            by_category,
            report,
        })
    }

    /// Resolve an entry by id.
    pub fn get(&self, id: &EntryId) -> Result<&PatternEntry, CatalogError> {
        self.entry(id).ok_or_else(|| CatalogError::NotFound {
            id: id.to_string(),
        })
    }

    /// Resolve an entry by id, returning `None` instead of an error.
    pub fn entry(&self, id: &EntryId) -> Option<&PatternEntry> {
        self.by_id.get(id).map(|&idx| &self.entries[idx])
    }

    /// Entries of one category in declaration order; empty for an unknown
    /// or unpopulated category.
    pub fn list_by_category(&self, category: &CategoryId) -> Vec<&PatternEntry> {
        self.by_category
            .get(category)
            .map(|indices| indices.iter().map(|&idx| &self.entries[idx]).collect())
            .unwrap_or_default()
    }

    pub fn categories(&self) -> &CategoryIndex {
        &self.categories
    }

    /// All entries in declaration order.
    pub fn entries(&self) -> &[PatternEntry] {
        &self.entries
    }

    /// Entry ids in stable (sorted) order.
    pub fn ids(&self) -> impl Iterator<Item = &EntryId> {
        self.by_id.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CatalogQuery for CatalogRegistry {
    fn get_entry(&self, id: &EntryId) -> Result<&PatternEntry, CatalogError> {
        self.get(id)
    }

    fn list_categories(&self) -> Vec<&Category> {
        self.categories.iter().collect()
    }

    fn list_entries(&self, category: Option<&CategoryId>) -> Vec<&PatternEntry> {
        match category {
            Some(category) => self.list_by_category(category),
            None => self.entries.iter().collect(),
        }
    }

    fn get_explanation_for_line(
        &self,
        entry_id: &EntryId,
        language: LanguageTag,
        line: i64,
    ) -> Result<Vec<&str>, CatalogError> {
        Ok(self.get(entry_id)?.explanation_for_line(language, line))
    }

    fn validate_catalog(&self) -> &CatalogValidationReport {
        &self.report
    }
}

fn stamp_position(source: &mut SourceRef, collection: &str, idx: usize) {
    if *source == SourceRef::default() {
        *source = SourceRef::item(None, collection, idx);
    }
}

fn duplicate_id_violations(entries: &[PatternEntry]) -> Vec<Violation> {
    let mut positions: BTreeMap<&EntryId, Vec<usize>> = BTreeMap::new();
    for (idx, entry) in entries.iter().enumerate() {
        // Blank ids are already reported as EmptyIdentity.
        if entry.id.as_str().trim().is_empty() {
            continue;
        }
        positions.entry(&entry.id).or_default().push(idx);
    }

    positions
        .into_iter()
        .filter(|(_, indices)| indices.len() > 1)
        .map(|(id, indices)| {
            let mut violation = Violation::error(
                ViolationKind::DuplicateEntryId,
                "id",
                format!("entry id '{id}' is defined {} times", indices.len()),
            )
            .for_entry(id);
            for idx in indices {
                violation = violation.with_source(entries[idx].source.clone());
            }
            violation
        })
        .collect()
}

fn related_link_violations(entries: &[PatternEntry]) -> Vec<Violation> {
    let known: BTreeSet<&EntryId> = entries.iter().map(|entry| &entry.id).collect();
    let mut violations = Vec::new();
    for entry in entries {
        for (idx, related) in entry.related.iter().enumerate() {
            if !known.contains(related) {
                violations.push(
                    Violation::error(
                        ViolationKind::DanglingRelatedEntry,
                        format!("related[{idx}]"),
                        format!("related entry '{related}' is not defined in the catalog"),
                    )
                    .for_entry(&entry.id)
                    .with_source(entry.source.clone()),
                );
            }
        }
    }
    violations
}

fn empty_category_violations(
    categories: &CategoryIndex,
    entries: &[PatternEntry],
    options: &ValidationOptions,
) -> Vec<Violation> {
    let populated: BTreeSet<&CategoryId> = entries.iter().map(|entry| &entry.category).collect();
    categories
        .iter()
        .filter(|category| !populated.contains(&category.id))
        .map(|category| {
            let detail = format!("category '{}' has no entries", category.id);
            let violation = if options.require_populated_categories {
                Violation::error(ViolationKind::EmptyCategory, "id", detail)
            } else {
                Violation::warning(ViolationKind::EmptyCategory, "id", detail)
            };
            violation
                .for_category(&category.id)
                .with_source(category.source.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::annotation::Annotation;
    use crate::catalog::implementation::LanguageImplementation;
    use crate::report::Severity;

    fn categories() -> Vec<Category> {
        vec![
            Category::new("creational", "Creational", "Object creation."),
            Category::new("behavioral", "Behavioral", "Object interaction."),
        ]
    }

    fn entry(id: &str, category: &str) -> PatternEntry {
        PatternEntry::new(id, category, "Name", "Description.")
    }

    #[test]
    fn ready_registry_answers_queries() {
        let registry = CatalogRegistry::build(
            vec![
                entry("singleton", "creational"),
                entry("observer", "behavioral"),
                entry("builder", "creational"),
            ],
            categories(),
            &ValidationOptions::default(),
        )
        .expect("valid catalog");

        assert_eq!(registry.len(), 3);
        let creational: Vec<_> = registry
            .list_by_category(&CategoryId::from("creational"))
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(creational, vec!["singleton", "builder"]);
        assert!(
            registry
                .list_by_category(&CategoryId::from("nonexistent"))
                .is_empty()
        );
        assert_eq!(registry.list_entries(None).len(), 3);
        assert_eq!(
            registry
                .list_categories()
                .iter()
                .map(|c| c.id.as_str())
                .collect::<Vec<_>>(),
            vec!["creational", "behavioral"]
        );
        assert!(registry.validate_catalog().is_clean());
    }

    #[test]
    fn get_unknown_id_is_not_found() {
        let registry = CatalogRegistry::build(
            vec![entry("singleton", "creational"), entry("observer", "behavioral")],
            categories(),
            &ValidationOptions::default(),
        )
        .unwrap();
        let err = registry.get(&EntryId::from("visitor")).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { ref id } if id == "visitor"));
        assert!(
            registry
                .get_explanation_for_line(&EntryId::from("visitor"), LanguageTag::Java, 1)
                .is_err()
        );
    }

    #[test]
    fn duplicate_ids_name_every_source() {
        let first = entry("command", "behavioral").with_source(SourceRef::item(None, "patterns", 0));
        let second = entry("command", "behavioral").with_source(SourceRef::item(None, "patterns", 1));
        let report = CatalogRegistry::build(
            vec![first, second, entry("singleton", "creational")],
            categories(),
            &ValidationOptions::default(),
        )
        .unwrap_err();
        let duplicates: Vec<_> = report.of_kind(ViolationKind::DuplicateEntryId).collect();
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].entry_id, Some(EntryId::from("command")));
        assert_eq!(
            duplicates[0].sources,
            vec![
                SourceRef::item(None, "patterns", 0),
                SourceRef::item(None, "patterns", 1)
            ]
        );
    }

    #[test]
    fn in_memory_records_are_named_by_position() {
        let report = CatalogRegistry::build(
            vec![
                entry("command", "behavioral"),
                entry("singleton", "creational"),
                entry("command", "behavioral"),
            ],
            vec![
                Category::new("creational", "Creational", ""),
                Category::new("behavioral", "Behavioral", ""),
                Category::new("creational", "Creational", ""),
            ],
            &ValidationOptions::default(),
        )
        .unwrap_err();

        let duplicates: Vec<_> = report.of_kind(ViolationKind::DuplicateEntryId).collect();
        assert_eq!(duplicates.len(), 1);
        assert_eq!(
            duplicates[0].sources,
            vec![
                SourceRef::item(None, "patterns", 0),
                SourceRef::item(None, "patterns", 2)
            ]
        );
        assert!(duplicates[0].to_string().ends_with("(/patterns/0, /patterns/2)"));

        let categories: Vec<_> = report.of_kind(ViolationKind::DuplicateCategory).collect();
        assert_eq!(categories.len(), 1);
        assert_eq!(
            categories[0].sources,
            vec![
                SourceRef::item(None, "categories", 0),
                SourceRef::item(None, "categories", 2)
            ]
        );
    }

    #[test]
    fn explicit_sources_are_kept() {
        let registry = CatalogRegistry::build(
            vec![
                entry("singleton", "creational")
                    .with_source(SourceRef::item(Some("a.json".into()), "patterns", 7)),
                entry("observer", "behavioral"),
            ],
            categories(),
            &ValidationOptions::default(),
        )
        .unwrap();
        assert_eq!(
            registry.get(&EntryId::from("singleton")).unwrap().source,
            SourceRef::item(Some("a.json".into()), "patterns", 7)
        );
        assert_eq!(
            registry.get(&EntryId::from("observer")).unwrap().source,
            SourceRef::item(None, "patterns", 1)
        );
    }

    #[test]
    fn dangling_related_links_fail_the_build() {
        let report = CatalogRegistry::build(
            vec![
                entry("observer", "behavioral").with_related("mediator"),
                entry("singleton", "creational").with_related("observer"),
            ],
            categories(),
            &ValidationOptions::default(),
        )
        .unwrap_err();
        let dangling: Vec<_> = report.of_kind(ViolationKind::DanglingRelatedEntry).collect();
        assert_eq!(dangling.len(), 1);
        assert_eq!(dangling[0].field, "related[0]");
        assert_eq!(dangling[0].entry_id, Some(EntryId::from("observer")));
    }

    #[test]
    fn empty_categories_warn_unless_required() {
        let entries = vec![entry("singleton", "creational")];
        let registry =
            CatalogRegistry::build(entries.clone(), categories(), &ValidationOptions::default())
                .expect("empty category is only a warning by default");
        let warnings: Vec<_> = registry.validate_catalog().warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, ViolationKind::EmptyCategory);
        assert_eq!(warnings[0].severity, Severity::Warning);

        let strict = ValidationOptions::default().with_require_populated_categories(true);
        let report = CatalogRegistry::build(entries, categories(), &strict).unwrap_err();
        assert_eq!(report.error_count(), 1);
        assert_eq!(
            report.errors().next().map(|v| v.category_id.clone()),
            Some(Some(CategoryId::from("behavioral")))
        );
    }

    #[test]
    fn failed_build_lints_everything_in_one_pass() {
        let drifted = entry("singleton", "creational").with_implementation(
            LanguageTag::Java,
            LanguageImplementation::new(
                "line1\nline2",
                vec![Annotation::new(3, "x"), Annotation::new(9, "y")].into(),
            ),
        );
        let report = CatalogRegistry::build(
            vec![
                drifted,
                entry("observer", "unknown-category"),
                entry("Bad Id", "behavioral"),
            ],
            vec![
                Category::new("creational", "Creational", ""),
                Category::new("creational", "Creational", ""),
                Category::new("behavioral", "Behavioral", ""),
            ],
            &ValidationOptions::default(),
        )
        .unwrap_err();
        let kinds: BTreeSet<_> = report.violations.iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            BTreeSet::from([
                ViolationKind::DuplicateCategory,
                ViolationKind::OutOfRangeAnnotation,
                ViolationKind::UnknownCategory,
                ViolationKind::InvalidSlug,
            ])
        );
        assert_eq!(report.of_kind(ViolationKind::OutOfRangeAnnotation).count(), 2);
    }

    #[test]
    fn registry_is_shareable_across_readers() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CatalogRegistry>();

        let registry = CatalogRegistry::build(
            vec![entry("singleton", "creational"), entry("observer", "behavioral")],
            categories(),
            &ValidationOptions::default(),
        )
        .unwrap();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    assert_eq!(
                        registry.get(&EntryId::from("observer")).unwrap().category,
                        CategoryId::from("behavioral")
                    );
                });
            }
        });
    }
}
