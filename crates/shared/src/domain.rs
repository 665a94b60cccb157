use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sentinel tag that matches every article card.
pub const ALL_TAGS: &str = "all";

/// Search form values keyed by field name.
///
/// Values are trimmed on insert and empty values are never stored, so a
/// `SearchParams` only ever carries what the visitor actually typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchParams(BTreeMap<String, String>);

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut params = Self::new();
        for (name, value) in fields {
            params.insert(name, value);
        }
        params
    }

    /// Returns `false` when the trimmed value was empty and nothing was stored.
    pub fn insert(&mut self, name: impl Into<String>, value: impl AsRef<str>) -> bool {
        let value = value.as_ref().trim();
        if value.is_empty() {
            return false;
        }
        self.0.insert(name.into(), value.to_string());
        true
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub category: String,
    pub region: String,
    pub score: f32,
    pub description: String,
}

/// Splits a comma-separated `data-tags` value and checks membership.
pub fn tag_list_contains(tags: &str, tag: &str) -> bool {
    tags.split(',').map(str::trim).any(|t| !t.is_empty() && t == tag)
}
