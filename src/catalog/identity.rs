use crate::error::CatalogError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Slug identifying one pattern entry (e.g., `chain-of-responsibility`).
///
/// Construction never fails; slug shape is checked during catalog
/// validation so a malformed id shows up in the report instead of aborting
/// the load.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub String);

/// Identifier of a category in the closed category index.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub String);

impl EntryId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl CategoryId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for CategoryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Returns true for lowercase words joined by single hyphens (`factory-method`).
pub fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && value.split('-').all(|word| {
            !word.is_empty()
                && word
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        })
}

/// Code-sample dialect attached to an entry.
///
/// The set is closed: an unknown tag in source data is a schema error, not
/// a new variant.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum LanguageTag {
    CppTraditional,
    CppModern,
    Java,
}

impl LanguageTag {
    pub const ALL: [LanguageTag; 3] = [
        LanguageTag::CppTraditional,
        LanguageTag::CppModern,
        LanguageTag::Java,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageTag::CppTraditional => "cppTraditional",
            LanguageTag::CppModern => "cppModern",
            LanguageTag::Java => "java",
        }
    }
}

impl FromStr for LanguageTag {
    type Err = CatalogError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "cppTraditional" => Ok(LanguageTag::CppTraditional),
            "cppModern" => Ok(LanguageTag::CppModern),
            "java" => Ok(LanguageTag::Java),
            other => Err(CatalogError::UnknownLanguage {
                tag: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LanguageTag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LanguageTag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_tag_uses_wire_names() {
        let json = serde_json::to_string(&LanguageTag::CppModern).unwrap();
        assert_eq!(json, "\"cppModern\"");
        let back: LanguageTag = serde_json::from_str("\"cppTraditional\"").unwrap();
        assert_eq!(back, LanguageTag::CppTraditional);
    }

    #[test]
    fn unknown_language_tag_is_rejected() {
        let err = serde_json::from_str::<LanguageTag>("\"python\"").unwrap_err();
        assert!(err.to_string().contains("python"), "{err}");
        assert!(matches!(
            "Java".parse::<LanguageTag>(),
            Err(CatalogError::UnknownLanguage { .. })
        ));
    }

    #[test]
    fn slug_shape() {
        assert!(is_valid_slug("singleton"));
        assert!(is_valid_slug("chain-of-responsibility"));
        assert!(is_valid_slug("gof-23"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Factory-Method"));
        assert!(!is_valid_slug("double--hyphen"));
        assert!(!is_valid_slug("-leading"));
        assert!(!is_valid_slug("trailing-"));
        assert!(!is_valid_slug("snake_case"));
    }

    #[test]
    fn ids_are_transparent_strings() {
        let id = EntryId::from("command");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"command\"");
        let category: CategoryId = serde_json::from_str("\"behavioral\"").unwrap();
        assert_eq!(category.as_str(), "behavioral");
    }
}
