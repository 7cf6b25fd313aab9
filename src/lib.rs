//! Shared library for the patternbook catalog.
//!
//! The crate models a design-pattern catalog (entries, per-language code
//! samples, line-bound explanations, comparison tables) and validates the
//! whole catalog in one pass before exposing it read-only. Public items here
//! form the contract the `patternbook` binary and presentation consumers
//! depend on: repository discovery, catalog loading, `CatalogRegistry`, and
//! the violation report.

use anyhow::{Result, bail};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

pub mod catalog;
pub mod coverage;
pub mod error;
pub mod logging;
pub mod options;
pub mod report;
pub mod schema_loader;

pub use catalog::{
    Annotation, CatalogDefinition, CatalogDocument, CatalogQuery, CatalogRegistry, Category,
    CategoryId, CategoryIndex, ComparisonRow, EntryId, LanguageImplementation, LanguageTag,
    LineAnnotationSet, PatternEntry, Theory, load_catalog, load_catalog_dir,
    load_catalog_from_path,
};
pub use coverage::{LanguageCoverage, build_language_coverage, entries_missing_language};
pub use error::CatalogError;
pub use options::{DuplicateAnnotationPolicy, ValidationOptions};
pub use report::{CatalogValidationReport, Severity, SourceRef, Violation, ViolationKind};
pub use schema_loader::{CatalogSchema, SCHEMA_VERSION};

const ROOT_ENV: &str = "PATTERNBOOK_ROOT";
const CATALOG_DIR: &str = "catalog";

/// Returns true when `candidate` looks like a patternbook checkout.
fn is_repo_root(candidate: &Path) -> bool {
    candidate.join(schema_loader::SCHEMA_RELATIVE_PATH).is_file()
        && candidate.join(CATALOG_DIR).is_dir()
}

fn repo_root_from_hint(hint: &str) -> Option<PathBuf> {
    if hint.is_empty() {
        return None;
    }
    let hint_path = PathBuf::from(hint);
    if !is_repo_root(&hint_path) {
        return None;
    }
    fs::canonicalize(hint_path).ok()
}

fn search_upwards(start: &Path) -> Option<PathBuf> {
    let mut dir = fs::canonicalize(start).ok()?;
    loop {
        if is_repo_root(&dir) {
            return Some(dir);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Locate the repository root holding `catalog/` and `schema/`.
///
/// Search order: `PATTERNBOOK_ROOT` if it points at a real checkout, then the
/// directories above the current executable, then the crate's own manifest
/// directory.
pub fn find_repo_root() -> Result<PathBuf> {
    if let Ok(env_root) = env::var(ROOT_ENV) {
        if let Some(root) = repo_root_from_hint(&env_root) {
            return Ok(root);
        }
    }

    if let Ok(exe_path) = env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            if let Some(root) = search_upwards(exe_dir) {
                return Ok(root);
            }
        }
    }

    if let Some(root) = repo_root_from_hint(env!("CARGO_MANIFEST_DIR")) {
        return Ok(root);
    }

    bail!("Unable to locate the patternbook repository root. Set {ROOT_ENV} to the checkout.");
}

/// The bundled catalog directory for a checkout.
pub fn default_catalog_path(repo_root: &Path) -> PathBuf {
    repo_root.join(CATALOG_DIR)
}

/// Load a catalog (file or directory) and build it with `options`.
///
/// I/O and record-schema failures are `Err`; data-quality problems come
/// back as `Ok(Err(report))` so callers can print the full lint report.
pub fn load_and_build(
    path: &Path,
    options: &ValidationOptions,
) -> std::result::Result<std::result::Result<CatalogRegistry, CatalogValidationReport>, CatalogError>
{
    let definition = load_catalog(path)?;
    Ok(definition.build(options))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_dir_is_a_repo_root() {
        let root = repo_root_from_hint(env!("CARGO_MANIFEST_DIR")).expect("crate checkout");
        assert!(root.join(CATALOG_DIR).is_dir());
        assert_eq!(default_catalog_path(&root), root.join("catalog"));
    }

    #[test]
    fn empty_or_foreign_hints_are_ignored() {
        assert!(repo_root_from_hint("").is_none());
        let dir = tempfile::tempdir().unwrap();
        assert!(repo_root_from_hint(dir.path().to_str().unwrap()).is_none());
        assert!(search_upwards(dir.path()).is_none());
    }

    #[test]
    fn load_and_build_separates_io_from_data_errors() {
        let root = repo_root_from_hint(env!("CARGO_MANIFEST_DIR")).unwrap();
        let built = load_and_build(&default_catalog_path(&root), &ValidationOptions::default())
            .expect("bundled catalog loads");
        assert!(built.is_ok());

        let missing = load_and_build(&root.join("no-such.json"), &ValidationOptions::default());
        assert!(matches!(missing, Err(CatalogError::Io { .. })));
    }
}
