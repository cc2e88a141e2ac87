//! Parsed invoice data models.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::warning::Warning;

/// Invoice issuer recognized from the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Vendor {
    /// Multi-line block layout (quantity line, description, colors, prices).
    Outre,
    /// Single-row layout (quantities, item code, description, prices).
    #[serde(rename = "SNG")]
    ShakeNGo,
    /// Not recognized.
    #[default]
    Unknown,
}

/// Physical arrangement of line items in a vendor's extracted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One item spread over several lines.
    Block,
    /// One item per row, colors on following lines.
    Row,
}

impl Vendor {
    /// Layout used by this vendor's documents.
    pub fn layout(&self) -> Option<Layout> {
        match self {
            Vendor::Outre => Some(Layout::Block),
            Vendor::ShakeNGo => Some(Layout::Row),
            Vendor::Unknown => None,
        }
    }

    /// Short code used in exported rows.
    pub fn code(&self) -> &'static str {
        match self {
            Vendor::Outre => "OUTRE",
            Vendor::ShakeNGo => "SNG",
            Vendor::Unknown => "UNKNOWN",
        }
    }

    /// Brand name printed in the brand column.
    pub fn brand(&self) -> &'static str {
        match self {
            Vendor::Outre => "Outre",
            Vendor::ShakeNGo => "Shake-N-Go",
            Vendor::Unknown => "",
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A fully parsed invoice document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedInvoice {
    /// Detected vendor.
    pub vendor: Vendor,

    /// Invoice number (empty when it could not be recovered).
    pub invoice_number: String,

    /// Invoice date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<NaiveDate>,

    /// Amount due for the whole invoice (best effort, zero if unrecoverable).
    pub total_amount: Decimal,

    /// Merchandise subtotal.
    pub subtotal: Decimal,

    /// Discount applied to the subtotal.
    pub discount: Decimal,

    /// Shipping and handling.
    pub shipping: Decimal,

    /// Sales tax.
    pub tax: Decimal,

    /// Line items, one per (item, color) pair.
    pub line_items: Vec<LineItem>,

    /// Document-level warnings (totals mismatch and similar).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// One invoice line after color splitting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// 1-based position, assigned after all splitting.
    pub line_no: u32,

    /// Vendor item code or catalog item number.
    pub item_id: String,

    /// Catalog barcode for this item and color.
    pub upc: String,

    /// Product description.
    pub description: String,

    /// Vendor brand name.
    pub brand: String,

    /// Color code (empty when the item carried no color information).
    pub color: String,

    /// Length taken from the description (e.g. `18"`).
    pub size_length: String,

    /// Quantity ordered (shipped plus backordered).
    pub qty_ordered: u32,

    /// Quantity shipped.
    pub qty_shipped: u32,

    /// Unit price actually charged.
    pub unit_price: Decimal,

    /// Extended price for this line.
    pub ext_price: Decimal,

    /// Human-readable warnings, joined with `" / "`.
    pub memo: String,
}

impl LineItem {
    /// Quantity ordered but not shipped.
    pub fn backordered(&self) -> u32 {
        self.qty_ordered.saturating_sub(self.qty_shipped)
    }

    /// Append a warning to the memo.
    pub fn add_warning(&mut self, warning: Warning) {
        let text = warning.to_string();
        if self.memo.is_empty() {
            self.memo = text;
        } else {
            self.memo.push_str(" / ");
            self.memo.push_str(&text);
        }
    }
}

impl ParsedInvoice {
    /// Create an empty invoice for the given vendor.
    pub fn new(vendor: Vendor) -> Self {
        Self {
            vendor,
            ..Self::default()
        }
    }

    /// Sum of all line extended prices.
    pub fn ext_price_sum(&self) -> Decimal {
        self.line_items.iter().map(|i| i.ext_price).sum()
    }

    /// Validate the invoice and return any issues found.
    pub fn validate(&self, total_tolerance: Decimal) -> Vec<String> {
        let mut issues = Vec::new();

        if self.invoice_number.is_empty() {
            issues.push("Missing invoice number".to_string());
        }

        if self.invoice_date.is_none() {
            issues.push("Missing invoice date".to_string());
        }

        if self.line_items.is_empty() {
            issues.push("No line items".to_string());
        }

        if self.total_amount.is_zero() {
            issues.push("Invoice amount is zero".to_string());
        } else {
            let sum = self.ext_price_sum();
            let difference = (self.total_amount - sum).abs();
            if difference > total_tolerance {
                issues.push(format!(
                    "Extended price sum ({}) differs from invoice amount ({}) by {}",
                    sum, self.total_amount, difference
                ));
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_layout() {
        assert_eq!(Vendor::Outre.layout(), Some(Layout::Block));
        assert_eq!(Vendor::ShakeNGo.layout(), Some(Layout::Row));
        assert_eq!(Vendor::Unknown.layout(), None);
        assert_eq!(Vendor::ShakeNGo.brand(), "Shake-N-Go");
    }

    #[test]
    fn test_vendor_serde_codes() {
        assert_eq!(serde_json::to_string(&Vendor::ShakeNGo).unwrap(), "\"SNG\"");
        assert_eq!(serde_json::to_string(&Vendor::Outre).unwrap(), "\"OUTRE\"");
    }

    #[test]
    fn test_memo_joins_warnings() {
        let mut item = LineItem::default();
        item.add_warning(Warning::Backordered(2));
        item.add_warning(Warning::NoColorInformation);
        assert_eq!(item.memo, "Backordered: 2 / No color information");
    }

    #[test]
    fn test_validate_reports_total_mismatch() {
        let mut invoice = ParsedInvoice::new(Vendor::Outre);
        invoice.invoice_number = "SINV1".to_string();
        invoice.invoice_date = NaiveDate::from_ymd_opt(2025, 1, 2);
        invoice.total_amount = Decimal::new(10000, 2);
        invoice.line_items.push(LineItem {
            ext_price: Decimal::new(9500, 2),
            ..LineItem::default()
        });

        let issues = invoice.validate(Decimal::ONE);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("differs"));

        invoice.line_items[0].ext_price = Decimal::new(9950, 2);
        assert!(invoice.validate(Decimal::ONE).is_empty());
    }

    #[test]
    fn test_backordered() {
        let item = LineItem {
            qty_ordered: 5,
            qty_shipped: 3,
            ..LineItem::default()
        };
        assert_eq!(item.backordered(), 2);
    }
}
