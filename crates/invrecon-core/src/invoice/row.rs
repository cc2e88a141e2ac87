//! Row layout line items (Shake-N-Go).
//!
//! Each item is one row: `[packed-by] qty-ordered qty-shipped item-id
//! description list-price list-extended`. An optional next line carries the
//! discounted price triple, sometimes followed by color text, and more color
//! lines may follow until the next item row.

use rust_decimal::Decimal;
use tracing::debug;

use super::allocate::{single_line_item, split_line_items};
use super::parser::{LineItemParser, enrich_line_items, size_length};
use super::rules::colors::{normalize_row_color_text, parse_row_color_text};
use super::rules::normalize::{normalize, parse_amount};
use super::rules::patterns::{
    ITEM_CODE_SHAPE, ITEM_ID, PACKED_BY, PREFIX_WORD, ROW_COLOR_TOKEN, ROW_HEADER, ROW_PRICE,
};
use crate::catalog::{CatalogIndex, MatchType};
use crate::models::config::EngineConfig;
use crate::models::invoice::LineItem;
use crate::models::warning::Warning;

/// Shortest accepted description.
const MIN_DESCRIPTION_LEN: usize = 5;

/// Quantities, item id and description in front of the list prices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemPrefix {
    pub qty_ordered: u32,
    pub qty_shipped: u32,
    pub item_id: String,
    pub description: String,
}

/// A parsed item row.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemLine {
    pub prefix: ItemPrefix,
    pub list_price: Decimal,
    pub list_extended: Decimal,
}

/// The discounted price triple following an item row.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceLine {
    pub your_price: Decimal,
    pub your_extended: Decimal,
    pub discounted: Decimal,
    /// Text after the third price, usually colors.
    pub color_text: String,
}

/// Parse an item row. Returns `None` for headers and noise.
pub fn parse_item_line(line: &str) -> Option<ItemLine> {
    let prices: Vec<_> = ROW_PRICE.find_iter(line).collect();
    if prices.len() < 2 {
        return None;
    }

    let list = prices[prices.len() - 2];
    let extended = prices[prices.len() - 1];

    let prefix_text = normalize(&line[..list.start()]);
    if !PREFIX_WORD.is_match(&prefix_text) {
        return None;
    }

    Some(ItemLine {
        prefix: parse_prefix(&prefix_text)?,
        list_price: parse_amount(list.as_str())?,
        list_extended: parse_amount(extended.as_str())?,
    })
}

fn parse_quantity(token: &str) -> Option<u32> {
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// Split the text before the list prices into quantities, id and description.
///
/// A leading packed-by code is dropped only when two quantities follow it.
pub fn parse_prefix(prefix: &str) -> Option<ItemPrefix> {
    let mut tokens: Vec<&str> = prefix.split_whitespace().collect();
    if tokens.len() < 3 {
        return None;
    }

    if tokens.len() >= 4
        && PACKED_BY.is_match(tokens[0])
        && parse_quantity(tokens[1]).is_some()
        && parse_quantity(tokens[2]).is_some()
    {
        tokens.remove(0);
    }

    let (qty_ordered, qty_shipped, item_id, rest) = match tokens.as_slice() {
        [ordered, shipped, id, rest @ ..]
            if !rest.is_empty()
                && parse_quantity(shipped).is_some()
                && ITEM_ID.is_match(id) =>
        {
            let ordered = parse_quantity(ordered)?;
            let shipped = parse_quantity(shipped)?;
            (ordered, shipped, *id, rest)
        }
        [qty, id, rest @ ..] if ITEM_ID.is_match(id) => {
            let qty = parse_quantity(qty)?;
            (qty, qty, *id, rest)
        }
        _ => return None,
    };

    let description = rest.join(" ");
    if description.chars().count() < MIN_DESCRIPTION_LEN {
        return None;
    }

    Some(ItemPrefix {
        qty_ordered,
        qty_shipped,
        item_id: item_id.to_string(),
        description,
    })
}

/// Parse a line that starts with the discounted price triple.
pub fn parse_price_line(line: &str) -> Option<PriceLine> {
    let text = line.replace('_', " ");
    let text = text.trim();

    let prices: Vec<_> = ROW_PRICE.find_iter(text).take(3).collect();
    if prices.len() < 3 || prices[0].start() != 0 {
        return None;
    }

    Some(PriceLine {
        your_price: parse_amount(prices[0].as_str())?,
        your_extended: parse_amount(prices[1].as_str())?,
        discounted: parse_amount(prices[2].as_str())?,
        color_text: text[prices[2].end()..].trim().to_string(),
    })
}

/// The text holds at least one `COLOR-QTY` shaped token.
pub fn has_color_pattern(text: &str) -> bool {
    ROW_COLOR_TOKEN.is_match(&normalize_row_color_text(text))
}

/// Collect color lines from `start` until the next item row, a price line
/// without colors, or `limit` lines.
///
/// Returns the lines and the index where scanning stopped.
pub fn collect_color_lines<'a>(lines: &[&'a str], start: usize, limit: usize) -> (Vec<&'a str>, usize) {
    let mut collected = Vec::new();
    let mut i = start;

    while i < lines.len() && i - start < limit {
        let raw = lines[i].trim();
        if raw.is_empty() {
            i += 1;
            continue;
        }

        if parse_item_line(raw).is_some() {
            break;
        }

        let normalized = normalize_row_color_text(raw);
        let has_color = ROW_COLOR_TOKEN.is_match(&normalized);

        if !has_color && parse_price_line(raw).is_some() {
            break;
        }

        if has_color {
            if ROW_HEADER.is_match(&normalized) {
                debug!("Color line with header text: '{}'", raw);
            }
            collected.push(raw);
        }
        i += 1;
    }

    (collected, i)
}

/// Parser for the row layout.
pub struct RowLayoutParser<'a> {
    config: &'a EngineConfig,
}

impl<'a> RowLayoutParser<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Resolve the item against the catalog.
    ///
    /// Returns the description to use, whether it came from the catalog and
    /// any item-level warning.
    fn resolve(&self, item: &ItemPrefix, catalog: &CatalogIndex) -> (String, bool, Option<Warning>) {
        let description = normalize(&item.description);
        if catalog.is_empty() {
            return (description, false, None);
        }

        let code = item.item_id.to_uppercase();
        if self.config.validation.require_item_code_shape && !ITEM_CODE_SHAPE.is_match(&code) {
            debug!("Item code '{}' is not a catalog code", code);
            return (description, false, Some(Warning::ItemCodeMalformed));
        }

        if let Some(record) = catalog.by_item_number(&code) {
            return (record.description.trim().to_string(), true, None);
        }

        let found = catalog.match_description(&description, &self.config.matching);
        match found.match_type {
            MatchType::Exact => (found.description, true, None),
            MatchType::Fuzzy => {
                let score = found.score;
                (found.description, true, Some(Warning::FuzzyMatched { score }))
            }
            MatchType::None => (description, false, Some(Warning::ItemNotInCatalog)),
        }
    }

    fn build_items(
        &self,
        item: &ItemLine,
        price: Option<&PriceLine>,
        color_lines: &[&str],
        catalog: &CatalogIndex,
    ) -> Vec<LineItem> {
        let (unit_price, ext_price) = match price {
            Some(p) => (p.your_price, p.your_extended),
            None => (item.list_price, item.list_extended),
        };

        let (description, resolved, warning) = self.resolve(&item.prefix, catalog);

        let mut template = LineItem {
            item_id: item.prefix.item_id.clone(),
            size_length: size_length(&description),
            description: description.clone(),
            unit_price,
            ..LineItem::default()
        };
        if let Some(warning) = warning {
            template.add_warning(warning);
        }

        let colors = parse_row_color_text(&color_lines.join(" "));
        let tolerance = self.config.validation.ext_price_tolerance;

        let mut items = if colors.is_empty() {
            vec![single_line_item(
                &template,
                item.prefix.qty_ordered,
                item.prefix.qty_shipped,
                ext_price,
                tolerance,
            )]
        } else {
            split_line_items(&template, &colors, ext_price, tolerance)
        };

        if resolved {
            enrich_line_items(&mut items, catalog, &description);
        }

        debug!(
            "Row item {} '{}': {} line(s)",
            item.prefix.item_id,
            description,
            items.len()
        );
        items
    }
}

impl LineItemParser for RowLayoutParser<'_> {
    fn parse_items(&self, lines: &[&str], catalog: &CatalogIndex) -> Vec<LineItem> {
        let mut items = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let Some(item) = parse_item_line(lines[i].trim()) else {
                i += 1;
                continue;
            };

            let next = lines.get(i + 1).map(|l| l.trim()).unwrap_or("");
            let price = parse_price_line(next);
            let mut color_lines = Vec::new();
            let mut scan_start = i + 1;

            match &price {
                Some(p) => {
                    scan_start = i + 2;
                    if !p.color_text.is_empty() {
                        if has_color_pattern(&p.color_text) {
                            color_lines.push(p.color_text.as_str());
                        }
                    } else if let Some(after) = lines
                        .get(i + 2)
                        .map(|l| l.trim())
                        .filter(|l| has_color_pattern(l) && parse_item_line(l).is_none())
                    {
                        color_lines.push(after);
                        scan_start = i + 3;
                    }
                }
                None => {
                    if has_color_pattern(next) && parse_item_line(next).is_none() {
                        color_lines.push(next);
                        scan_start = i + 2;
                    }
                }
            }

            let (more, next_index) =
                collect_color_lines(lines, scan_start, self.config.scan.color_scan_limit);
            color_lines.extend(more);

            items.extend(self.build_items(&item, price.as_ref(), &color_lines, catalog));
            i = next_index.max(i + 1);
        }

        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::CatalogRecord;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn parse(text: &str, catalog: &CatalogIndex) -> Vec<LineItem> {
        let config = EngineConfig::default();
        let lines: Vec<&str> = text.lines().collect();
        RowLayoutParser::new(&config).parse_items(&lines, catalog)
    }

    #[test]
    fn test_parse_item_line_single_quantity() {
        let item = parse_item_line("5 T30 SOME PRODUCT NAME 10.00 50.00").unwrap();
        assert_eq!(
            item.prefix,
            ItemPrefix {
                qty_ordered: 5,
                qty_shipped: 5,
                item_id: "T30".to_string(),
                description: "SOME PRODUCT NAME".to_string(),
            }
        );
        assert_eq!(item.list_price, dec("10.00"));
        assert_eq!(item.list_extended, dec("50.00"));
    }

    #[test]
    fn test_parse_item_line_with_packed_by_and_two_quantities() {
        let item = parse_item_line("JD 6 4 SNGB123 DREAM BRAID 3X 24\" 4.50 18.00").unwrap();
        assert_eq!(item.prefix.qty_ordered, 6);
        assert_eq!(item.prefix.qty_shipped, 4);
        assert_eq!(item.prefix.item_id, "SNGB123");
        assert_eq!(item.prefix.description, "DREAM BRAID 3X 24\"");
    }

    #[test]
    fn test_parse_item_line_rejects_noise() {
        assert!(parse_item_line("SUBTOTAL 120.00 130.00").is_none());
        assert!(parse_item_line("5 T30 ABC 10.00 50.00").is_none());
        assert!(parse_item_line("10.00 50.00").is_none());
        assert!(parse_item_line("5 T30 SOME PRODUCT NAME 10.00").is_none());
    }

    #[test]
    fn test_parse_price_line() {
        let price = parse_price_line("9.00_45.00_40.50 1B-3 2-2").unwrap();
        assert_eq!(price.your_price, dec("9.00"));
        assert_eq!(price.your_extended, dec("45.00"));
        assert_eq!(price.discounted, dec("40.50"));
        assert_eq!(price.color_text, "1B-3 2-2");
        assert!(parse_price_line("5 T30 SOME PRODUCT NAME 10.00 50.00").is_none());
    }

    #[test]
    fn test_scenario_b_row_without_colors() {
        let items = parse("5 T30 SOME PRODUCT NAME 10.00 50.00", &CatalogIndex::new());
        assert_eq!(items.len(), 1);

        let item = &items[0];
        assert_eq!(item.color, "");
        assert_eq!(item.qty_shipped, 5);
        assert_eq!(item.unit_price, dec("10.00"));
        assert_eq!(item.ext_price, dec("50.00"));
        assert!(item.memo.contains("No color information"));
    }

    #[test]
    fn test_price_line_and_colors_split_item() {
        let text = "\
6 6 SNGB123 DREAM BRAID 24\" 10.00 60.00
9.00 54.00 54.00 1B-3
2-2 30-0
4-1 (1)
QTY SHIPPED ITEM NUMBER DESCRIPTION
2 SNGC456 OTHER ITEM NAME 5.00 10.00";
        let items = parse(text, &CatalogIndex::new());

        let colors: Vec<(&str, u32, u32)> = items
            .iter()
            .map(|i| (i.color.as_str(), i.qty_shipped, i.qty_ordered))
            .collect();
        assert_eq!(
            colors,
            vec![("1B", 3, 3), ("2", 2, 2), ("4", 1, 2), ("", 2, 2)]
        );

        let split: Decimal = items[..3].iter().map(|i| i.ext_price).sum();
        assert_eq!(split, dec("54.00"));
        assert_eq!(items[0].unit_price, dec("9.00"));
        assert_eq!(items[0].size_length, "24\"");
        assert_eq!(items[3].item_id, "SNGC456");
    }

    #[test]
    fn test_catalog_resolution_by_item_code() {
        let catalog = CatalogIndex::build(vec![
            CatalogRecord::new("DREAM BRAID 24\"", "SNGB123", "1B", "0001"),
            CatalogRecord::new("DREAM BRAID 24\"", "SNGB123", "2", "0002"),
        ]);
        let text = "6 SNGB123 DREAM BRAIDS 24 10.00 60.00\n1B-3 2-2 613-1";
        let items = parse(text, &catalog);

        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|i| i.description == "DREAM BRAID 24\""));
        assert_eq!(items[0].upc, "0001");
        assert_eq!(items[1].upc, "0002");
        assert_eq!(items[2].upc, "");
        assert!(items[2].memo.contains("Color not in catalog"));
    }

    #[test]
    fn test_catalog_rejects_malformed_code() {
        let catalog = CatalogIndex::build(vec![CatalogRecord::new(
            "SOME PRODUCT NAME",
            "SNGT300",
            "1B",
            "1",
        )]);
        let items = parse("5 T30 SOME PRODUCT NAME 10.00 50.00", &catalog);
        assert_eq!(items.len(), 1);
        assert!(items[0].memo.contains("Item code malformed"));
        assert_eq!(items[0].description, "SOME PRODUCT NAME");
    }

    #[test]
    fn test_catalog_miss_warns() {
        let catalog = CatalogIndex::build(vec![CatalogRecord::new(
            "QW WIG PERRY",
            "SNGQ001",
            "1B",
            "1",
        )]);
        let items = parse("5 SNGB999 DREAM BRAID 10.00 50.00", &catalog);
        assert!(items[0].memo.contains("Item not in catalog"));
    }
}
