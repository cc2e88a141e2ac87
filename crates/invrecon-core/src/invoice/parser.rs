//! Invoice engine: vendor dispatch, header fields and line items.

use std::time::Instant;

use tracing::{debug, info, warn};

use super::block::BlockLayoutParser;
use super::row::RowLayoutParser;
use super::rules::amounts::{extract_block_totals, extract_row_totals};
use super::rules::dates::extract_invoice_date;
use super::rules::patterns::SIZE_LENGTH;
use super::vendor::{detect_vendor, extract_invoice_number};
use crate::catalog::CatalogIndex;
use crate::error::ParseError;
use crate::models::config::EngineConfig;
use crate::models::invoice::{Layout, LineItem, ParsedInvoice};
use crate::models::warning::Warning;

/// Trait for layout-specific line item parsers.
pub trait LineItemParser {
    /// Parse every line item of a document, in document order.
    fn parse_items(&self, lines: &[&str], catalog: &CatalogIndex) -> Vec<LineItem>;
}

/// First `NN"` length marker of a description.
pub fn size_length(description: &str) -> String {
    SIZE_LENGTH
        .captures(description)
        .map(|caps| format!("{}\"", &caps[1]))
        .unwrap_or_default()
}

/// Fill item number and barcode from the catalog record of each line's color.
pub(crate) fn enrich_line_items(items: &mut [LineItem], catalog: &CatalogIndex, description: &str) {
    for item in items.iter_mut().filter(|i| !i.color.is_empty()) {
        match catalog.find_color(description, &item.color) {
            Some(record) => {
                let item_number = record.item_number.trim();
                if !item_number.is_empty() {
                    item.item_id = item_number.to_string();
                }
                item.upc = record.barcode.trim().to_string();
            }
            None => item.add_warning(Warning::ColorNotInCatalog),
        }
    }
}

/// Parses vendor invoice text into a [`ParsedInvoice`].
///
/// The engine holds only configuration. The catalog index is passed to each
/// call and never modified, so one engine can serve a whole batch.
#[derive(Debug, Clone, Default)]
pub struct InvoiceEngine {
    config: EngineConfig,
}

impl InvoiceEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parse one document.
    ///
    /// Fails only when the text is empty or the vendor cannot be detected.
    /// Everything else degrades to warnings on the result.
    pub fn parse(
        &self,
        text: &str,
        filename: &str,
        catalog: &CatalogIndex,
    ) -> Result<ParsedInvoice, ParseError> {
        let start = Instant::now();

        if text.trim().is_empty() {
            return Err(ParseError::EmptyText);
        }

        let vendor = detect_vendor(text, filename);
        let Some(layout) = vendor.layout() else {
            return Err(ParseError::VendorUndetected {
                filename: filename.to_string(),
            });
        };
        info!("Parsing {} as {} invoice", filename, vendor);

        let lines: Vec<&str> = text.lines().collect();
        let mut invoice = ParsedInvoice::new(vendor);
        invoice.invoice_number = extract_invoice_number(vendor, text, filename);
        invoice.invoice_date = extract_invoice_date(text);

        let totals = match layout {
            Layout::Block => extract_block_totals(&lines, text, &self.config.totals),
            Layout::Row => extract_row_totals(text, &self.config.totals),
        };
        invoice.total_amount = totals.total_amount;
        invoice.subtotal = totals.subtotal;
        invoice.discount = totals.discount;
        invoice.shipping = totals.shipping;
        invoice.tax = totals.tax;
        debug!(
            "Totals: amount {} subtotal {} discount {} shipping {} tax {}",
            totals.total_amount, totals.subtotal, totals.discount, totals.shipping, totals.tax
        );

        let mut items = match layout {
            Layout::Block => BlockLayoutParser::new(&self.config).parse_items(&lines, catalog),
            Layout::Row => RowLayoutParser::new(&self.config).parse_items(&lines, catalog),
        };
        for (i, item) in items.iter_mut().enumerate() {
            item.line_no = i as u32 + 1;
            item.brand = vendor.brand().to_string();
        }
        invoice.line_items = items;

        invoice.warnings = invoice.validate(self.config.validation.invoice_total_tolerance);
        for issue in &invoice.warnings {
            warn!("{}: {}", filename, issue);
        }

        info!(
            "Parsed invoice {} ({} line items) in {} ms",
            invoice.invoice_number,
            invoice.line_items.len(),
            start.elapsed().as_millis()
        );

        Ok(invoice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::CatalogRecord;
    use crate::models::invoice::Vendor;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    const OUTRE_TEXT: &str = "\
OUTRE
INVOICE #: SINV001234
INVOICE DATE: 01/15/2025
QTY SHIPPED
DESCRIPTION UNIT PRICE DISC PRICE EXT PRICE
10
BIG BEAUTIFUL HAIR CLIP-IN 18\"
CBRN- 2   JBLK- 0 (2)
18.00
17.00
85.00
4
QW WIG PERRY
1B- 4
30.00
25.00
100.00
SUBTOTAL 185.00
TOTAL US$ 185.00";

    #[test]
    fn test_empty_text_is_fatal() {
        let engine = InvoiceEngine::default();
        assert_eq!(
            engine.parse("  \n ", "a.txt", &CatalogIndex::new()),
            Err(ParseError::EmptyText)
        );
    }

    #[test]
    fn test_unknown_vendor_is_fatal() {
        let engine = InvoiceEngine::default();
        let result = engine.parse("ACME SUPPLY\n1 WIDGET 10.00", "scan.txt", &CatalogIndex::new());
        assert_eq!(
            result,
            Err(ParseError::VendorUndetected {
                filename: "scan.txt".to_string()
            })
        );
    }

    #[test]
    fn test_parse_block_invoice() {
        let engine = InvoiceEngine::default();
        let invoice = engine
            .parse(OUTRE_TEXT, "SINV001234.txt", &CatalogIndex::new())
            .unwrap();

        assert_eq!(invoice.vendor, Vendor::Outre);
        assert_eq!(invoice.invoice_number, "SINV001234");
        assert_eq!(
            invoice.invoice_date,
            chrono::NaiveDate::from_ymd_opt(2025, 1, 15)
        );
        assert_eq!(invoice.subtotal, dec("185.00"));
        assert_eq!(invoice.total_amount, dec("185.00"));

        let lines: Vec<(u32, &str, u32)> = invoice
            .line_items
            .iter()
            .map(|i| (i.line_no, i.color.as_str(), i.qty_shipped))
            .collect();
        assert_eq!(lines, vec![(1, "CBRN", 2), (2, "JBLK", 0), (3, "1B", 4)]);
        assert!(invoice.line_items.iter().all(|i| i.brand == "Outre"));
        assert_eq!(invoice.ext_price_sum(), dec("185.00"));
        assert!(invoice.warnings.is_empty());
    }

    #[test]
    fn test_parse_block_invoice_with_catalog() {
        let catalog = CatalogIndex::build(vec![
            CatalogRecord::new("BIG BEAUTIFUL HAIR CLIP-IN 18\"", "BBC18-CBRN", "CBRN", "111"),
            CatalogRecord::new("BIG BEAUTIFUL HAIR CLIP-IN 18\"", "BBC18-JBLK", "JBLK", "112"),
        ]);
        let invoice = InvoiceEngine::default()
            .parse(OUTRE_TEXT, "SINV001234.txt", &catalog)
            .unwrap();

        let first = &invoice.line_items[0];
        assert_eq!(first.item_id, "BBC18-CBRN");
        assert_eq!(first.upc, "111");
        assert_eq!(first.size_length, "18\"");

        let wig = &invoice.line_items[2];
        assert_eq!(wig.description, "QW WIG PERRY");
        assert!(wig.memo.contains("Not matched in catalog"));
    }

    #[test]
    fn test_parse_row_invoice_cross_check() {
        let text = "\
SHAKE-N-GO FASHION
INVOICE DATE 02/03/25
5 T30 SOME PRODUCT NAME 10.00 50.00
INVOICE AMOUNT 80.00";
        let invoice = InvoiceEngine::default()
            .parse(text, "3000123456.txt", &CatalogIndex::new())
            .unwrap();

        assert_eq!(invoice.vendor, Vendor::ShakeNGo);
        assert_eq!(invoice.invoice_number, "3000123456");
        assert_eq!(invoice.total_amount, dec("80.00"));
        assert_eq!(invoice.line_items.len(), 1);
        assert_eq!(invoice.line_items[0].brand, "Shake-N-Go");
        assert!(invoice.warnings.iter().any(|w| w.contains("differs")));
    }

    #[test]
    fn test_size_length() {
        assert_eq!(size_length("BIG BEAUTIFUL HAIR CLIP-IN 18\""), "18\"");
        assert_eq!(size_length("QW WIG PERRY"), "");
    }
}
