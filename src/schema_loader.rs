//! JSON Schema gate for catalog files.
//!
//! Every catalog document is checked against
//! `schema/pattern_catalog.schema.json` before it is deserialized, so shape
//! problems (unknown language tags, missing required fields, wrong types)
//! surface together with JSON pointers instead of as one serde error at a
//! time.

use crate::error::{CatalogError, Result};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// The only record schema version this crate reads.
pub const SCHEMA_VERSION: &str = "pattern_catalog_v1";

pub const SCHEMA_RELATIVE_PATH: &str = "schema/pattern_catalog.schema.json";

/// Compiled catalog schema plus the file it came from.
pub struct CatalogSchema {
    path: PathBuf,
    compiled: JSONSchema,
}

impl CatalogSchema {
    /// Read and compile the schema at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: Value = serde_json::from_str(&data).map_err(|source| CatalogError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        Self::compile(&raw, path)
    }

    /// Compile an in-memory schema; `path` is only used in error messages.
    pub fn compile(raw: &Value, path: &Path) -> Result<Self> {
        let declared = raw
            .pointer("/properties/schema_version/const")
            .and_then(Value::as_str);
        if declared != Some(SCHEMA_VERSION) {
            return Err(CatalogError::SchemaVersion {
                path: path.to_path_buf(),
                found: declared.unwrap_or_default().to_string(),
                expected: SCHEMA_VERSION,
            });
        }
        let compiled = JSONSchema::compile(raw).map_err(|err| CatalogError::Schema {
            path: path.to_path_buf(),
            details: format!("schema does not compile: {err}"),
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            compiled,
        })
    }

    /// Locate the schema that governs `catalog_path`.
    ///
    /// Walks up from the catalog looking for `schema/pattern_catalog.schema.json`
    /// and falls back to the copy shipped with the crate, so catalogs kept
    /// outside a checkout still validate.
    pub fn load_for(catalog_path: &Path) -> Result<Self> {
        Self::load(&resolve_catalog_schema_path(catalog_path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validate `instance`, reporting every schema error at once.
    pub fn validate(&self, instance: &Value, origin: &Path) -> Result<()> {
        if let Err(errors) = self.compiled.validate(instance) {
            let details = errors
                .map(|err| {
                    let pointer = err.instance_path.to_string();
                    if pointer.is_empty() {
                        format!("  /: {err}")
                    } else {
                        format!("  {pointer}: {err}")
                    }
                })
                .collect::<Vec<_>>()
                .join("\n");
            return Err(CatalogError::Schema {
                path: origin.to_path_buf(),
                details,
            });
        }
        Ok(())
    }
}

/// The schema bundled with this crate.
pub fn bundled_schema_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(SCHEMA_RELATIVE_PATH)
}

fn resolve_catalog_schema_path(catalog_path: &Path) -> PathBuf {
    for base in catalog_path.ancestors().skip(1) {
        let candidate = base.join(SCHEMA_RELATIVE_PATH);
        if candidate.is_file() {
            return candidate;
        }
    }
    bundled_schema_path()
}
