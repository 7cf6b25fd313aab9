//! Closed category taxonomy.
//!
//! The index is populated once while a catalog is built. Registration
//! collects problems instead of failing so duplicate or malformed categories
//! land in the same report as entry problems.

use crate::catalog::identity::{CategoryId, is_valid_slug};
use crate::report::{SourceRef, Violation, ViolationKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(skip)]
    pub source: SourceRef,
}

impl Category {
    pub fn new(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: CategoryId::from(id),
            name: name.to_string(),
            description: description.to_string(),
            source: SourceRef::default(),
        }
    }
}

#[derive(Clone, Debug, Default)]
/// Categories in registration order plus an id lookup.
pub struct CategoryIndex {
    categories: Vec<Category>,
    by_id: BTreeMap<CategoryId, usize>,
}

impl CategoryIndex {
    /// Register every category, collecting violations along the way.
    ///
    /// The first definition of a duplicated id wins; later ones are reported
    /// and dropped.
    pub fn build(categories: Vec<Category>) -> (Self, Vec<Violation>) {
        let mut index = Self::default();
        let mut violations = Vec::new();
        for category in categories {
            if let Err(violation) = index.register(category) {
                violations.push(violation);
            }
        }
        for category in &index.categories {
            violations.extend(shape_violations(category));
        }
        (index, violations)
    }

    /// Add one category. Fails with `DuplicateCategory` if the id is taken.
    pub fn register(&mut self, category: Category) -> Result<(), Violation> {
        if let Some(&existing) = self.by_id.get(&category.id) {
            let first = &self.categories[existing];
            return Err(Violation::error(
                ViolationKind::DuplicateCategory,
                "id",
                format!("category '{}' is already registered", category.id),
            )
            .for_category(&category.id)
            .with_source(first.source.clone())
            .with_source(category.source.clone()));
        }
        self.by_id
            .insert(category.id.clone(), self.categories.len());
        self.categories.push(category);
        Ok(())
    }

    pub fn contains(&self, id: &CategoryId) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn get(&self, id: &CategoryId) -> Option<&Category> {
        self.by_id.get(id).map(|&idx| &self.categories[idx])
    }

    /// Categories in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

fn shape_violations(category: &Category) -> Vec<Violation> {
    let mut violations = Vec::new();
    if category.id.as_str().trim().is_empty() {
        violations.push(
            Violation::error(ViolationKind::EmptyIdentity, "id", "category id is blank")
                .with_source(category.source.clone()),
        );
    } else if !is_valid_slug(category.id.as_str()) {
        violations.push(
            Violation::error(
                ViolationKind::InvalidSlug,
                "id",
                format!(
                    "category id '{}' must be lowercase words separated by hyphens",
                    category.id
                ),
            )
            .for_category(&category.id)
            .with_source(category.source.clone()),
        );
    }
    if category.name.trim().is_empty() {
        violations.push(
            Violation::error(ViolationKind::EmptyIdentity, "name", "category name is blank")
                .for_category(&category.id)
                .with_source(category.source.clone()),
        );
    }
    violations
}
