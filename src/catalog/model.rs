//! Deserializable representation of catalog files under `catalog/`.
//!
//! A catalog may live in one file or be split across a directory of files
//! (one per category is the usual layout). Each file is a
//! `CatalogDocument`; loading stamps every record with a `SourceRef` so the
//! validator can point at the exact file and array slot of a problem.

use crate::catalog::category::Category;
use crate::catalog::entry::PatternEntry;
use crate::catalog::registry::{CatalogQuery, CatalogRegistry};
use crate::error::{CatalogError, Result};
use crate::options::ValidationOptions;
use crate::report::{CatalogValidationReport, SourceRef};
use crate::schema_loader::{CatalogSchema, SCHEMA_VERSION};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Serialize, Deserialize)]
/// One catalog file as stored on disk.
pub struct CatalogDocument {
    pub schema_version: String,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub patterns: Vec<PatternEntry>,
}

/// Categories and entries gathered from one or more documents, in load order.
///
/// This is the catalog in its `Unbuilt` state: nothing has been checked
/// beyond the record schema.
#[derive(Clone, Debug, Default)]
pub struct CatalogDefinition {
    pub categories: Vec<Category>,
    pub entries: Vec<PatternEntry>,
}

impl CatalogDefinition {
    pub fn new(categories: Vec<Category>, entries: Vec<PatternEntry>) -> Self {
        Self {
            categories,
            entries,
        }
    }

    /// Append a document, stamping sources relative to `file`.
    pub fn push_document(&mut self, document: CatalogDocument, file: Option<&Path>) {
        let file = file.map(Path::to_path_buf);
        for (idx, mut category) in document.categories.into_iter().enumerate() {
            category.source = SourceRef::item(file.clone(), "categories", idx);
            self.categories.push(category);
        }
        for (idx, mut entry) in document.patterns.into_iter().enumerate() {
            entry.source = SourceRef::item(file.clone(), "patterns", idx);
            self.entries.push(entry);
        }
    }

    pub fn build(
        self,
        options: &ValidationOptions,
    ) -> std::result::Result<CatalogRegistry, CatalogValidationReport> {
        CatalogRegistry::build(self.entries, self.categories, options)
    }

    /// Run every check and return the report without keeping a registry.
    pub fn validate(self, options: &ValidationOptions) -> CatalogValidationReport {
        match self.build(options) {
            Ok(registry) => registry.validate_catalog().clone(),
            Err(report) => report,
        }
    }
}

impl From<CatalogDocument> for CatalogDefinition {
    fn from(document: CatalogDocument) -> Self {
        let mut definition = Self::default();
        definition.push_document(document, None);
        definition
    }
}

/// Parse a document from an in-memory JSON value, checking the record schema.
pub fn parse_catalog_document(
    value: Value,
    schema: &CatalogSchema,
    origin: &Path,
) -> Result<CatalogDocument> {
    schema.validate(&value, origin)?;
    let document: CatalogDocument =
        serde_json::from_value(value).map_err(|source| CatalogError::Json {
            path: origin.to_path_buf(),
            source,
        })?;
    if document.schema_version != SCHEMA_VERSION {
        return Err(CatalogError::SchemaVersion {
            path: origin.to_path_buf(),
            found: document.schema_version,
            expected: SCHEMA_VERSION,
        });
    }
    Ok(document)
}

/// Read, schema-check, and parse one catalog file.
pub fn load_catalog_document(path: &Path, schema: &CatalogSchema) -> Result<CatalogDocument> {
    let data = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&data).map_err(|source| CatalogError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    parse_catalog_document(value, schema, path)
}

/// Load a single catalog file.
pub fn load_catalog_from_path(path: &Path) -> Result<CatalogDefinition> {
    let schema = CatalogSchema::load_for(path)?;
    let document = load_catalog_document(path, &schema)?;
    let mut definition = CatalogDefinition::default();
    definition.push_document(document, Some(path));
    Ok(definition)
}

/// Load every `*.json` file under `dir` (recursively, sorted by path).
pub fn load_catalog_dir(dir: &Path) -> Result<CatalogDefinition> {
    let schema = CatalogSchema::load_for(dir)?;
    let mut definition = CatalogDefinition::default();
    for file in find_json_files(dir)? {
        let document = load_catalog_document(&file, &schema)?;
        tracing::debug!(
            file = %file.display(),
            categories = document.categories.len(),
            patterns = document.patterns.len(),
            "loaded catalog document"
        );
        definition.push_document(document, Some(&file));
    }
    Ok(definition)
}

/// Load a file or a directory, whichever `path` is.
pub fn load_catalog(path: &Path) -> Result<CatalogDefinition> {
    if path.is_dir() {
        load_catalog_dir(path)
    } else {
        load_catalog_from_path(path)
    }
}

fn find_json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_json(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_json(dir: &Path, acc: &mut Vec<PathBuf>) -> Result<()> {
    let io_err = |source: std::io::Error| CatalogError::Io {
        path: dir.to_path_buf(),
        source,
    };
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_dir() {
            collect_json(&path, acc)?;
        } else if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            acc.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ViolationKind;

    #[test]
    fn in_memory_definition_reports_positions() {
        let report = CatalogDefinition::new(
            vec![Category::new("behavioral", "Behavioral", "")],
            vec![
                PatternEntry::new("command", "behavioral", "Command", "Requests."),
                PatternEntry::new("command", "behavioral", "Command", "Requests."),
            ],
        )
        .validate(&ValidationOptions::default());

        let duplicate = report
            .of_kind(ViolationKind::DuplicateEntryId)
            .next()
            .expect("duplicate id reported");
        let pointers: Vec<_> = duplicate.sources.iter().map(|s| s.pointer.as_str()).collect();
        assert_eq!(pointers, vec!["/patterns/0", "/patterns/1"]);
    }

    #[test]
    fn full_lint_comes_from_the_definition() {
        use crate::catalog::annotation::Annotation;
        use crate::catalog::identity::LanguageTag;
        use crate::catalog::implementation::LanguageImplementation;

        let drifted = PatternEntry::new("singleton", "creational", "Singleton", "One.")
            .with_implementation(
                LanguageTag::Java,
                LanguageImplementation::new("a\nb", vec![Annotation::new(3, "x")].into()),
            );
        let definition = CatalogDefinition::new(
            vec![
                Category::new("creational", "Creational", ""),
                Category::new("structural", "Structural", ""),
            ],
            vec![drifted],
        );

        let report = definition.clone().validate(&ValidationOptions::default());
        assert_eq!(report.of_kind(ViolationKind::OutOfRangeAnnotation).count(), 1);
        assert_eq!(report.warning_count(), 1);
        assert_eq!(definition.build(&ValidationOptions::default()).unwrap_err(), report);
    }

    #[test]
    fn pushed_documents_carry_their_file() {
        let document = CatalogDocument {
            schema_version: SCHEMA_VERSION.to_string(),
            categories: vec![Category::new("creational", "Creational", "")],
            patterns: vec![PatternEntry::new("builder", "creational", "Builder", "Steps.")],
        };
        let mut definition = CatalogDefinition::default();
        definition.push_document(document, Some(Path::new("creational.json")));
        assert_eq!(
            definition.entries[0].source,
            SourceRef::item(Some(PathBuf::from("creational.json")), "patterns", 0)
        );
        assert_eq!(
            definition.categories[0].source,
            SourceRef::item(Some(PathBuf::from("creational.json")), "categories", 0)
        );
    }
}
