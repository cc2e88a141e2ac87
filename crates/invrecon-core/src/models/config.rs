//! Configuration structures for the parsing engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{InvreconError, Result};

/// Main configuration for the invrecon engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Line-scanning limits.
    pub scan: ScanConfig,

    /// Catalog matching thresholds.
    pub matching: MatchThresholds,

    /// Price and item validation.
    pub validation: ValidationConfig,

    /// Header totals extraction.
    pub totals: TotalsConfig,
}

/// Scan window limits. These bound every loop over the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Lines examined after a block quantity line.
    pub block_window: usize,

    /// Largest value accepted as a bare block quantity.
    pub max_block_quantity: u32,

    /// Description lines collected before colors are expected.
    pub max_description_lines: usize,

    /// Lines examined for colors after a row item.
    pub color_scan_limit: usize,

    /// Lines after a `QTY SHIPPED` header searched for confirming labels.
    pub table_header_window: usize,

    /// Lines after the header searched for the first quantity line.
    pub table_start_window: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            block_window: 15,
            max_block_quantity: 2000,
            max_description_lines: 3,
            color_scan_limit: 160,
            table_header_window: 10,
            table_start_window: 30,
        }
    }
}

/// Fuzzy description matching thresholds.
///
/// These were tuned against real vendor documents and should be revisited
/// when new document samples are added.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchThresholds {
    /// Minimum Jaccard score over non-size tokens.
    pub min_base_score: f64,

    /// Minimum Jaccard score over all tokens.
    pub min_full_score: f64,

    /// Base score that lets a size mismatch through.
    pub size_mismatch_base_score: f64,

    /// Reject size-mismatched candidates when the input ends in a quote.
    pub reject_trailing_quote_size_mismatch: bool,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            min_base_score: 0.75,
            min_full_score: 0.65,
            size_mismatch_base_score: 0.85,
            reject_trailing_quote_size_mismatch: true,
        }
    }
}

/// Price and item-code validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Difference between qty x unit and ext that raises a warning.
    pub ext_price_tolerance: Decimal,

    /// Difference between line sum and invoice total that raises a warning.
    pub invoice_total_tolerance: Decimal,

    /// Require 7-character item codes when a catalog is loaded.
    pub require_item_code_shape: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            ext_price_tolerance: Decimal::new(50, 2),
            invoice_total_tolerance: Decimal::ONE,
            require_item_code_shape: true,
        }
    }
}

/// Invoice total extraction bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TotalsConfig {
    /// Smallest plausible invoice amount.
    pub min_invoice_amount: Decimal,

    /// Largest plausible invoice amount.
    pub max_invoice_amount: Decimal,

    /// Characters searched after the `INVOICE AMOUNT` label.
    pub amount_label_window: usize,

    /// Leading lines searched for `TOTAL` and `SUBTOTAL`.
    pub summary_scan_lines: usize,

    /// Lines read from the start of the summary block.
    pub summary_block_lines: usize,
}

impl Default for TotalsConfig {
    fn default() -> Self {
        Self {
            min_invoice_amount: Decimal::new(4999, 2),
            max_invoice_amount: Decimal::new(100_000, 0),
            amount_label_window: 200,
            summary_scan_lines: 200,
            summary_block_lines: 20,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the parsers cannot work with.
    pub fn validate(&self) -> Result<()> {
        let m = &self.matching;
        for (name, score) in [
            ("matching.min_base_score", m.min_base_score),
            ("matching.min_full_score", m.min_full_score),
            ("matching.size_mismatch_base_score", m.size_mismatch_base_score),
        ] {
            if !(0.0..=1.0).contains(&score) {
                return Err(InvreconError::Config(format!(
                    "{} must be between 0 and 1, got {}",
                    name, score
                )));
            }
        }

        if self.scan.block_window == 0 {
            return Err(InvreconError::Config(
                "scan.block_window must be at least 1".to_string(),
            ));
        }

        if self.totals.min_invoice_amount > self.totals.max_invoice_amount {
            return Err(InvreconError::Config(format!(
                "totals.min_invoice_amount ({}) exceeds totals.max_invoice_amount ({})",
                self.totals.min_invoice_amount, self.totals.max_invoice_amount
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"matching": {"min_base_score": 0.8}}"#).unwrap();
        assert_eq!(config.matching.min_base_score, 0.8);
        assert_eq!(config.matching.min_full_score, 0.65);
        assert_eq!(config.scan.block_window, 15);
        assert_eq!(config.validation.ext_price_tolerance, Decimal::new(50, 2));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = EngineConfig::default();
        config.scan.color_scan_limit = 40;
        config.save(&path).unwrap();

        let loaded = EngineConfig::from_file(&path).unwrap();
        assert_eq!(loaded.scan.color_scan_limit, 40);
        assert_eq!(loaded.totals.max_invoice_amount, Decimal::new(100_000, 0));
    }

    #[test]
    fn test_validate_rejects_out_of_range_thresholds() {
        assert!(EngineConfig::default().validate().is_ok());

        let mut config = EngineConfig::default();
        config.matching.min_base_score = 1.5;
        assert!(matches!(config.validate(), Err(InvreconError::Config(_))));

        let mut config = EngineConfig::default();
        config.totals.min_invoice_amount = Decimal::new(200_000, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            EngineConfig::from_file(&path),
            Err(InvreconError::Json(_))
        ));
        assert!(matches!(
            EngineConfig::from_file(&dir.path().join("missing.json")),
            Err(InvreconError::Io(_))
        ));
    }
}
