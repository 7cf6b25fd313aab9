//! Language coverage accounting across a built catalog.
//!
//! Helpers here map each entry to the language variants it ships code for,
//! so authors can spot theory-only entries and variants that are only ever
//! discussed in comparison tables.

use crate::catalog::{CatalogRegistry, EntryId, LanguageTag};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Which variants an entry implements, which it only compares, and which it lacks.
pub struct LanguageCoverage {
    pub implemented: Vec<LanguageTag>,
    pub comparison_only: Vec<LanguageTag>,
    pub missing: Vec<LanguageTag>,
    pub annotated_lines: usize,
}

/// Build a mapping of entry id to language coverage, keyed in stable order.
pub fn build_language_coverage(registry: &CatalogRegistry) -> BTreeMap<EntryId, LanguageCoverage> {
    registry
        .entries()
        .iter()
        .map(|entry| {
            let implemented: Vec<LanguageTag> = entry.languages().collect();
            let comparison_only: Vec<LanguageTag> = entry.comparison_only.iter().copied().collect();
            let missing = LanguageTag::ALL
                .into_iter()
                .filter(|tag| !implemented.contains(tag))
                .collect();
            let annotated_lines = entry
                .implementations
                .values()
                .map(|implementation| implementation.explanation.lines().count())
                .sum();
            (
                entry.id.clone(),
                LanguageCoverage {
                    implemented,
                    comparison_only,
                    missing,
                    annotated_lines,
                },
            )
        })
        .collect()
}

/// Entry ids without code for `language`, in stable order.
pub fn entries_missing_language(
    coverage: &BTreeMap<EntryId, LanguageCoverage>,
    language: LanguageTag,
) -> Vec<&EntryId> {
    coverage
        .iter()
        .filter(|(_, entry)| entry.missing.contains(&language))
        .map(|(id, _)| id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Annotation, Category, LanguageImplementation, PatternEntry};
    use crate::options::ValidationOptions;

    #[test]
    fn coverage_lists_implemented_and_missing_languages() {
        let singleton = PatternEntry::new("singleton", "creational", "Singleton", "One.")
            .with_implementation(
                LanguageTag::Java,
                LanguageImplementation::new(
                    "a\nb\nc",
                    vec![
                        Annotation::new(1, "x"),
                        Annotation::new(3, "y"),
                    ]
                    .into(),
                ),
            )
            .with_comparison_only(LanguageTag::CppModern);
        let theory_only = PatternEntry::new("builder", "creational", "Builder", "Steps.");
        let registry = CatalogRegistry::build(
            vec![singleton, theory_only],
            vec![Category::new("creational", "Creational", "")],
            &ValidationOptions::default(),
        )
        .unwrap();

        let coverage = build_language_coverage(&registry);
        let singleton = &coverage[&EntryId::from("singleton")];
        assert_eq!(singleton.implemented, vec![LanguageTag::Java]);
        assert_eq!(singleton.comparison_only, vec![LanguageTag::CppModern]);
        assert_eq!(
            singleton.missing,
            vec![LanguageTag::CppTraditional, LanguageTag::CppModern]
        );
        assert_eq!(singleton.annotated_lines, 2);

        let missing_java = entries_missing_language(&coverage, LanguageTag::Java);
        assert_eq!(missing_java, vec![&EntryId::from("builder")]);
    }
}
