//! Result Matrix
//!
//! Query string -> document key -> extracted value. Both levels are
//! `BTreeMap`s, so iteration and serialization order never depend on how the
//! matrix was filled.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One query's values, keyed by document
pub type ResultRow = BTreeMap<String, String>;

/// Extraction results for a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultMatrix {
    rows: BTreeMap<String, ResultRow>,
}

impl ResultMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure `query` has a row, even if it never gets an entry
    pub fn ensure_query(&mut self, query: &str) {
        if !self.rows.contains_key(query) {
            self.rows.insert(query.to_string(), ResultRow::new());
        }
    }

    /// Record a value; a later insert for the same cell replaces it
    pub fn insert(&mut self, query: &str, document: &str, value: String) {
        self.ensure_query(query);
        if let Some(row) = self.rows.get_mut(query) {
            row.insert(document.to_string(), value);
        }
    }

    /// Value of one cell
    pub fn get(&self, query: &str, document: &str) -> Option<&str> {
        self.rows.get(query)?.get(document).map(String::as_str)
    }

    /// All values for one query
    pub fn row(&self, query: &str) -> Option<&ResultRow> {
        self.rows.get(query)
    }

    pub fn contains_query(&self, query: &str) -> bool {
        self.rows.contains_key(query)
    }

    /// Number of query rows (including empty ones)
    pub fn query_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of filled cells
    pub fn entry_count(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResultRow)> {
        self.rows.iter().map(|(query, row)| (query.as_str(), row))
    }

    pub fn into_inner(self) -> BTreeMap<String, ResultRow> {
        self.rows
    }
}
