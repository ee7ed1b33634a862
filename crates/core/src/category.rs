use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Reserved category for rows no keyword has claimed. Always present in a
/// `CategoryMap` and never assigned from keywords.
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CategoryError {
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CategoryEntry {
    name: String,
    keywords: Vec<String>,
}

/// Mapping of category name to its keyword list.
///
/// Iteration order is insertion order, which makes categorization
/// deterministic: when a row's details match keywords in more than one
/// category, the earliest-added category wins. Serializes to a JSON object
/// keyed by category name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMap {
    entries: Vec<CategoryEntry>,
}

impl CategoryMap {
    pub fn new() -> Self {
        CategoryMap {
            entries: vec![CategoryEntry {
                name: UNCATEGORIZED.to_string(),
                keywords: Vec::new(),
            }],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Iterates `(name, keywords)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|e| (e.name.as_str(), e.keywords.as_slice()))
    }

    pub fn keywords(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.keywords.as_slice())
    }

    /// Adds an empty category. Returns false (and changes nothing) when the
    /// trimmed name is empty or the category already exists.
    pub fn add_category(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.entries.push(CategoryEntry {
            name: name.to_string(),
            keywords: Vec::new(),
        });
        true
    }

    /// Appends a keyword to an existing category. The keyword is trimmed
    /// first; empty keywords and exact (case-sensitive) duplicates within
    /// the category are rejected with `Ok(false)`.
    pub fn add_keyword(&mut self, category: &str, keyword: &str) -> Result<bool, CategoryError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.name == category)
            .ok_or_else(|| CategoryError::UnknownCategory(category.to_string()))?;

        let keyword = keyword.trim();
        if keyword.is_empty() || entry.keywords.iter().any(|k| k == keyword) {
            return Ok(false);
        }
        entry.keywords.push(keyword.to_string());
        Ok(true)
    }

    fn ensure_uncategorized(&mut self) {
        if !self.contains(UNCATEGORIZED) {
            self.entries.insert(
                0,
                CategoryEntry {
                    name: UNCATEGORIZED.to_string(),
                    keywords: Vec::new(),
                },
            );
        }
    }
}

impl Default for CategoryMap {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for CategoryMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.name, &entry.keywords)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CategoryMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CategoryMapVisitor;

        impl<'de> Visitor<'de> for CategoryMapVisitor {
            type Value = CategoryMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of category name to keyword list")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, keywords)) = access.next_entry::<String, Vec<String>>()? {
                    entries.push(CategoryEntry { name, keywords });
                }
                let mut map = CategoryMap { entries };
                map.ensure_uncategorized();
                Ok(map)
            }
        }

        deserializer.deserialize_map(CategoryMapVisitor)
    }
}
