//! Pattern catalog wiring.
//!
//! Catalog files under `catalog/` are loaded into a `CatalogDefinition`,
//! then `CatalogRegistry::build` validates the whole graph and freezes it.
//! Types here mirror the record schema in `schema/pattern_catalog.schema.json`;
//! consumers query through `CatalogQuery`.

pub mod annotation;
pub mod category;
pub mod entry;
pub mod identity;
pub mod implementation;
pub mod model;
pub mod registry;

pub use annotation::{Annotation, LineAnnotationSet};
pub use category::{Category, CategoryIndex};
pub use entry::{ComparisonRow, PatternEntry, Theory};
pub use identity::{CategoryId, EntryId, LanguageTag, is_valid_slug};
pub use implementation::LanguageImplementation;
pub use model::{CatalogDefinition, CatalogDocument};
pub use registry::{CatalogQuery, CatalogRegistry};

pub use model::{
    load_catalog, load_catalog_dir, load_catalog_document, load_catalog_from_path,
    parse_catalog_document,
};
