//! Typed errors surfaced by the catalog library.
//!
//! Data-authoring problems are not errors here: they are collected as
//! [`crate::report::Violation`]s so a whole catalog can be linted in one pass.
//! `CatalogError` covers the remaining cases: a caller asking for something
//! that does not exist, and catalog files that cannot be read at all.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("pattern entry '{id}' not found")]
    NotFound { id: String },

    #[error("unknown language tag '{tag}' (expected cppTraditional|cppModern|java)")]
    UnknownLanguage { tag: String },

    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path} failed schema validation:\n{details}")]
    Schema { path: PathBuf, details: String },

    #[error("{path}: schema_version '{found}' not supported (expected {expected})")]
    SchemaVersion {
        path: PathBuf,
        found: String,
        expected: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, CatalogError>;
