//! Reference catalog records.

use serde::{Deserialize, Serialize};

/// One row of the external product catalog.
///
/// Several records usually share a description, one per color variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Product description as written in the catalog.
    pub description: String,
    /// Vendor item number.
    pub item_number: String,
    /// Color code of this variant.
    pub color: String,
    /// Barcode (UPC) of this variant.
    pub barcode: String,
}

impl CatalogRecord {
    pub fn new(
        description: impl Into<String>,
        item_number: impl Into<String>,
        color: impl Into<String>,
        barcode: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            item_number: item_number.into(),
            color: color.into(),
            barcode: barcode.into(),
        }
    }
}
