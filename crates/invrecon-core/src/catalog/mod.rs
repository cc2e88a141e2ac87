//! Reference catalog index.
//!
//! The index is built once per batch from a catalog snapshot, read by every
//! parse in the batch and cleared when the batch ends. It never outlives the
//! batch and the engine never writes to it.

pub mod matcher;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::invoice::rules::normalize::{normalize_color, normalize_description};
use crate::models::catalog::CatalogRecord;
use crate::models::config::MatchThresholds;
use matcher::TokenSet;

/// How a description was resolved against the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Fuzzy,
    None,
}

/// Result of matching a parsed description against the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogMatch {
    /// Catalog description on a match, else the cleaned input.
    pub description: String,
    pub match_type: MatchType,
    /// 1.0 for exact matches, the base-token score for fuzzy ones.
    pub score: f64,
    /// The size markers of input and candidate differ.
    pub size_mismatch: bool,
    /// A rejected candidate worth mentioning to a reviewer.
    pub alternate: Option<String>,
}

impl CatalogMatch {
    pub fn is_match(&self) -> bool {
        self.match_type != MatchType::None
    }
}

/// All records sharing one normalized description.
#[derive(Debug, Clone)]
pub(crate) struct CatalogEntry {
    pub key: String,
    pub records: Vec<CatalogRecord>,
    pub tokens: TokenSet,
}

impl CatalogEntry {
    /// Description as the catalog spells it.
    pub fn description(&self) -> &str {
        self.records
            .first()
            .map(|r| r.description.trim())
            .unwrap_or(self.key.as_str())
    }
}

/// Normalized description lookup over a catalog snapshot.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    entries: Vec<CatalogEntry>,
    by_key: HashMap<String, usize>,
    by_item_number: HashMap<String, CatalogRecord>,
    record_count: usize,
}

impl CatalogIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from catalog records.
    ///
    /// Records without a description are skipped. Entry order follows the
    /// first appearance of each description, which keeps fuzzy tie-breaks
    /// deterministic.
    pub fn build(records: impl IntoIterator<Item = CatalogRecord>) -> Self {
        let mut index = Self::new();
        for record in records {
            index.insert(record);
        }
        info!(
            "Catalog index built: {} records, {} descriptions",
            index.record_count,
            index.entries.len()
        );
        index
    }

    /// Add one record.
    pub fn insert(&mut self, record: CatalogRecord) {
        let key = normalize_description(&record.description);
        if key.is_empty() {
            return;
        }

        let item_number = record.item_number.trim().to_uppercase();
        if !item_number.is_empty() {
            self.by_item_number
                .entry(item_number)
                .or_insert_with(|| record.clone());
        }

        match self.by_key.get(&key) {
            Some(&idx) => self.entries[idx].records.push(record),
            None => {
                self.by_key.insert(key.clone(), self.entries.len());
                self.entries.push(CatalogEntry {
                    tokens: TokenSet::from_text(&key),
                    key,
                    records: vec![record],
                });
            }
        }
        self.record_count += 1;
    }

    /// Drop every record. The index can be rebuilt with [`insert`](Self::insert).
    pub fn clear(&mut self) {
        self.entries.clear();
        self.by_key.clear();
        self.by_item_number.clear();
        self.record_count = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.record_count
    }

    /// Number of distinct descriptions.
    pub fn description_count(&self) -> usize {
        self.entries.len()
    }

    /// Records whose description normalizes like `description`.
    pub fn lookup(&self, description: &str) -> Option<&[CatalogRecord]> {
        let key = normalize_description(description);
        self.by_key
            .get(&key)
            .map(|&idx| self.entries[idx].records.as_slice())
    }

    /// Record carrying the given item number.
    pub fn by_item_number(&self, item_number: &str) -> Option<&CatalogRecord> {
        self.by_item_number.get(&item_number.trim().to_uppercase())
    }

    /// Record of `description` in the given color.
    pub fn find_color(&self, description: &str, color: &str) -> Option<&CatalogRecord> {
        let wanted = normalize_color(color);
        if wanted.is_empty() {
            return None;
        }
        self.lookup(description)?
            .iter()
            .find(|r| normalize_color(&r.color) == wanted)
    }

    /// Resolve a parsed description, exactly or by token similarity.
    pub fn match_description(&self, raw: &str, thresholds: &MatchThresholds) -> CatalogMatch {
        matcher::match_description(self, raw, thresholds)
    }

    pub(crate) fn entry(&self, key: &str) -> Option<&CatalogEntry> {
        self.by_key.get(key).map(|&idx| &self.entries[idx])
    }

    pub(crate) fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CatalogIndex {
        CatalogIndex::build(vec![
            CatalogRecord::new("BIG BEAUTIFUL HAIR CLIP-IN 18\"", "BBC18", "CBRN", "111"),
            CatalogRecord::new("BIG BEAUTIFUL HAIR CLIP-IN 18\"", "BBC18", "1B", "112"),
            CatalogRecord::new("QW WIG PERRY", "QWPERRY", "1B/30", "200"),
            CatalogRecord::new("", "EMPTY", "1", "300"),
        ])
    }

    #[test]
    fn test_build_groups_by_description() {
        let index = sample();
        assert_eq!(index.len(), 3);
        assert_eq!(index.description_count(), 2);
        assert_eq!(
            index
                .lookup("big beautiful hair clip - in 18”")
                .map(|r| r.len()),
            Some(2)
        );
    }

    #[test]
    fn test_find_color_and_item_number() {
        let index = sample();
        let record = index
            .find_color("BIG BEAUTIFUL HAIR CLIP-IN 18\"", "cbrn")
            .unwrap();
        assert_eq!(record.barcode, "111");
        assert!(index.find_color("QW WIG PERRY", "613").is_none());
        assert_eq!(index.by_item_number("qwperry").unwrap().color, "1B/30");
    }

    #[test]
    fn test_clear_resets_lifecycle() {
        let mut index = sample();
        index.clear();
        assert!(index.is_empty());
        assert!(index.lookup("QW WIG PERRY").is_none());
        assert!(index.by_item_number("QWPERRY").is_none());

        index.insert(CatalogRecord::new("QW WIG PERRY", "QWPERRY", "1B", "1"));
        assert_eq!(index.len(), 1);
    }
}
