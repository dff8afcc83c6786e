//! Table implementation
//!
//! Family name -> Family, with implicit family creation on first write.

use std::collections::BTreeMap;

use super::{Family, PLACEHOLDER_FAMILY};

/// The full in-memory data set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    families: BTreeMap<String, Family>,
}

impl Table {
    /// Create a new empty Table
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value, `None` when the family or key is absent
    pub fn get(&self, family: &str, key: &str) -> Option<&str> {
        self.families
            .get(family)
            .and_then(|entries| entries.get(key))
            .map(String::as_str)
    }

    /// Insert or overwrite a key, creating the family if needed
    ///
    /// Returns the family after the write so the caller can persist it.
    pub fn set(
        &mut self,
        family: &str,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> &Family {
        let entries = self.families.entry(family.to_string()).or_default();
        entries.insert(key.into(), value.into());
        entries
    }

    /// Look up a whole family
    pub fn family(&self, family: &str) -> Option<&Family> {
        self.families.get(family)
    }

    /// Replace a family wholesale (used when loading from disk)
    pub fn insert_family(&mut self, family: impl Into<String>, entries: Family) {
        self.families.insert(family.into(), entries);
    }

    /// Names of all families
    pub fn family_names(&self) -> Vec<&str> {
        self.families.keys().map(String::as_str).collect()
    }

    /// Keys within one family; empty when the family is absent
    pub fn keys(&self, family: &str) -> Vec<&str> {
        self.families
            .get(family)
            .map(|entries| entries.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Number of families
    pub fn family_count(&self) -> usize {
        self.families.len()
    }

    /// Check if the table holds no families at all
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Seed a synthetic family so the table is never completely empty
    ///
    /// The placeholder lives in memory only; it is never written to disk
    /// unless a client explicitly sets a key in it.
    pub fn seed_placeholder(&mut self) {
        if self.families.is_empty() {
            let mut entries = Family::new();
            entries.insert(PLACEHOLDER_FAMILY.to_string(), String::new());
            self.families.insert(PLACEHOLDER_FAMILY.to_string(), entries);
        }
    }
}
