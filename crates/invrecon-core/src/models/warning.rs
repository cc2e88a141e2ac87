//! Warning taxonomy for degraded-but-recoverable conditions.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A caveat attached to a line item.
///
/// Warnings never abort parsing; they are rendered into the item memo so a
/// reviewer can make the final call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Part of the ordered quantity was not shipped.
    Backordered(u32),
    /// No color lines were found for the item.
    NoColorInformation,
    /// Fewer than three price lines were found in a block.
    MissingPrices { found: usize },
    /// The description did not resolve against the catalog.
    CatalogNoMatch { alternate: Option<String> },
    /// The description resolved through token similarity.
    FuzzyMatched { score: f64 },
    /// The description resolved but no catalog record carries this color.
    ColorNotInCatalog,
    /// The item code does not have the catalog's code shape.
    ItemCodeMalformed,
    /// Neither the item code nor the description is in the catalog.
    ItemNotInCatalog,
    /// Quantity times unit price disagrees with the extended price.
    PriceMismatch { calculated: Decimal, parsed: Decimal },
    /// The extended price was replaced by quantity times unit price.
    ExtPriceSubstituted { calculated: Decimal, parsed: Decimal },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::Backordered(qty) => write!(f, "Backordered: {}", qty),
            Warning::NoColorInformation => f.write_str("No color information"),
            Warning::MissingPrices { found } => {
                write!(f, "Price lines missing ({} of 3 found)", found)
            }
            Warning::CatalogNoMatch { alternate: None } => f.write_str("Not matched in catalog"),
            Warning::CatalogNoMatch {
                alternate: Some(alt),
            } => write!(f, "Not matched in catalog (candidate: {})", alt),
            Warning::FuzzyMatched { score } => {
                write!(f, "Fuzzy catalog match (score {:.2})", score)
            }
            Warning::ColorNotInCatalog => f.write_str("Color not in catalog"),
            Warning::ItemCodeMalformed => f.write_str("Item code malformed"),
            Warning::ItemNotInCatalog => f.write_str("Item not in catalog"),
            Warning::PriceMismatch { calculated, parsed } => write!(
                f,
                "Price mismatch: qty x unit = {}, ext = {}",
                calculated, parsed
            ),
            Warning::ExtPriceSubstituted { calculated, parsed } => write!(
                f,
                "Ext price {} replaced by qty x unit = {}",
                parsed, calculated
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_text() {
        assert_eq!(Warning::Backordered(3).to_string(), "Backordered: 3");
        assert_eq!(
            Warning::MissingPrices { found: 1 }.to_string(),
            "Price lines missing (1 of 3 found)"
        );
        assert_eq!(
            Warning::CatalogNoMatch {
                alternate: Some("PRODUCT 20\"".to_string())
            }
            .to_string(),
            "Not matched in catalog (candidate: PRODUCT 20\")"
        );
        assert_eq!(
            Warning::PriceMismatch {
                calculated: Decimal::new(3400, 2),
                parsed: Decimal::new(8500, 2),
            }
            .to_string(),
            "Price mismatch: qty x unit = 34.00, ext = 85.00"
        );
    }
}
