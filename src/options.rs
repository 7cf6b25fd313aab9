//! Validation policy knobs.
//!
//! Defaults favour strictness: duplicate annotation lines are errors and empty
//! categories only warn. Environment overrides let CI flip a policy without
//! touching code; the CLI layers its own flags on top of `from_env`.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::env;

pub const DUPLICATE_ANNOTATIONS_ENV: &str = "PATTERNBOOK_DUPLICATE_ANNOTATIONS";
pub const REQUIRE_POPULATED_CATEGORIES_ENV: &str = "PATTERNBOOK_REQUIRE_POPULATED_CATEGORIES";

/// What to do when one code block carries two annotations for the same line.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateAnnotationPolicy {
    /// Report `DuplicateAnnotation`; the catalog fails to build.
    #[default]
    Error,
    /// Keep every text for the line, in source order.
    Merge,
}

impl DuplicateAnnotationPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicateAnnotationPolicy::Error => "error",
            DuplicateAnnotationPolicy::Merge => "merge",
        }
    }

    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "merge" => Ok(Self::Merge),
            other => bail!("{DUPLICATE_ANNOTATIONS_ENV} must be 'error' or 'merge', got '{other}'"),
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    pub duplicate_annotations: DuplicateAnnotationPolicy,
    /// Promote `EmptyCategory` from a warning to an error.
    pub require_populated_categories: bool,
}

impl ValidationOptions {
    /// Defaults with any `PATTERNBOOK_*` overrides applied.
    ///
    /// Unparseable values are rejected so a typo in CI configuration does not
    /// silently fall back to the default policy.
    pub fn from_env() -> Result<Self> {
        let mut options = Self::default();
        if let Ok(raw) = env::var(DUPLICATE_ANNOTATIONS_ENV) {
            if !raw.trim().is_empty() {
                options.duplicate_annotations = DuplicateAnnotationPolicy::parse(&raw)?;
            }
        }
        if let Ok(raw) = env::var(REQUIRE_POPULATED_CATEGORIES_ENV) {
            if !raw.trim().is_empty() {
                options.require_populated_categories = parse_flag(&raw)?;
            }
        }
        Ok(options)
    }

    pub fn with_duplicate_annotations(mut self, policy: DuplicateAnnotationPolicy) -> Self {
        self.duplicate_annotations = policy;
        self
    }

    pub fn with_require_populated_categories(mut self, enable: bool) -> Self {
        self.require_populated_categories = enable;
        self
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("{REQUIRE_POPULATED_CATEGORIES_ENV} must be a boolean flag, got '{other}'"),
    }
}
