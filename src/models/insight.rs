//! Insight table: the engine's universal output unit.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Named map of insight tables. BTreeMap keeps render order stable.
pub type InsightMap = BTreeMap<String, InsightTable>;

/// One tabular insight: a description, ordered column headers, and rows of
/// display-ready values. Every row has exactly as many cells as there are
/// headers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightTable {
    pub name: String,
    pub description: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl InsightTable {
    pub fn new(name: &str, description: &str, headers: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Row width must match the header count.
    pub fn push_row(&mut self, row: Vec<String>) {
        assert_eq!(
            row.len(),
            self.headers.len(),
            "row width mismatch in insight table '{}'",
            self.name
        );
        self.rows.push(row);
    }

    /// Wrap this table into a single-entry map keyed by its name.
    pub fn into_map(self) -> InsightMap {
        let mut map = InsightMap::new();
        map.insert(self.name.clone(), self);
        map
    }
}

/// Merge several insight maps into one. Later entries win on name collision,
/// which never happens for the built-in catalog (names are unique).
pub fn merge_insights(maps: impl IntoIterator<Item = InsightMap>) -> InsightMap {
    let mut merged = InsightMap::new();
    for map in maps {
        merged.extend(map);
    }
    merged
}
