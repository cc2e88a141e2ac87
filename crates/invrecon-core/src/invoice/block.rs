//! Block layout line items (OUTRE).
//!
//! An item starts at a line holding only a quantity, followed by a product
//! description. The lines after it carry more description, color tokens and
//! a column of three prices (list, discounted, extended), interleaved with
//! page furniture. Each line is classified by an ordered rule table and
//! folded into a [`BlockState`].

use rust_decimal::Decimal;
use tracing::debug;

use super::allocate::{single_line_item, split_line_items};
use super::parser::{LineItemParser, enrich_line_items, size_length};
use super::rules::colors::{
    clean_description_end, parse_color_lines, split_description_and_color, split_paren_colors,
    validate_color_token,
};
use super::rules::normalize::{extract_price_tokens, normalize, strip_price_tokens};
use super::rules::patterns::{
    BARE_QUANTITY, COLOR_TOKEN, CONTINUATION_TOKEN, DESCRIPTION_EXCEPTION, GENERIC_COLOR,
    INCH_MARK, METADATA_LINE, NON_COLOR_BRAND, ORPHAN_BACKORDER_LINE, PRODUCT_KEYWORD,
    TABLE_HEADER, TABLE_HEADER_CONFIRM,
};
use crate::catalog::{CatalogIndex, MatchType};
use crate::models::config::{EngineConfig, ScanConfig};
use crate::models::invoice::LineItem;
use crate::models::warning::Warning;

/// Prices in a complete block: list, discounted, extended.
const BLOCK_PRICES: usize = 3;

/// Classification of one line inside an item block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Price,
    Metadata,
    Boundary,
    DescriptionException,
    ParenColor,
    Description,
    Color,
    OrphanBackorder,
    Noise,
}

/// Why a block scan stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockEnd {
    PricesComplete,
    NextItem,
    WindowExhausted,
}

/// Accumulated content of one item block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockState {
    pub description_lines: Vec<String>,
    pub color_lines: Vec<String>,
    pub prices: Vec<Decimal>,
    /// Once set, no further description lines are accepted.
    pub seen_first_color: bool,
    pub end: Option<BlockEnd>,
}

/// A trimmed line and the next non-empty line after it.
#[derive(Debug, Clone, Copy)]
pub struct ScanLine<'a> {
    pub text: &'a str,
    pub next: Option<&'a str>,
}

impl<'a> ScanLine<'a> {
    pub fn new(text: &'a str, next: Option<&'a str>) -> Self {
        Self {
            text: text.trim(),
            next: next.map(str::trim),
        }
    }
}

struct LineRule {
    kind: LineKind,
    matches: fn(&BlockState, &ScanLine<'_>, &ScanConfig) -> bool,
    apply: fn(BlockState, &ScanLine<'_>) -> BlockState,
}

/// Line rules in priority order; the first match classifies the line.
static LINE_RULES: &[LineRule] = &[
    LineRule {
        kind: LineKind::Price,
        matches: is_price_line,
        apply: push_prices,
    },
    LineRule {
        kind: LineKind::Metadata,
        matches: is_metadata_line,
        apply: skip_line,
    },
    LineRule {
        kind: LineKind::Boundary,
        matches: is_boundary_line,
        apply: end_at_next_item,
    },
    LineRule {
        kind: LineKind::DescriptionException,
        matches: is_description_exception,
        apply: push_description_exception,
    },
    LineRule {
        kind: LineKind::ParenColor,
        matches: is_paren_color_line,
        apply: push_paren_colors,
    },
    LineRule {
        kind: LineKind::Description,
        matches: is_description_candidate,
        apply: push_description,
    },
    LineRule {
        kind: LineKind::Color,
        matches: is_generic_color_line,
        apply: push_color,
    },
    LineRule {
        kind: LineKind::OrphanBackorder,
        matches: is_orphan_backorder,
        apply: push_color,
    },
];

fn is_price_line(_: &BlockState, line: &ScanLine<'_>, _: &ScanConfig) -> bool {
    !extract_price_tokens(line.text).is_empty()
}

fn is_metadata_line(_: &BlockState, line: &ScanLine<'_>, _: &ScanConfig) -> bool {
    METADATA_LINE.is_match(line.text)
}

fn is_boundary_line(_: &BlockState, line: &ScanLine<'_>, config: &ScanConfig) -> bool {
    is_quantity_line(line.text, config.max_block_quantity)
        && line.next.is_some_and(is_description_line)
}

fn is_description_exception(_: &BlockState, line: &ScanLine<'_>, _: &ScanConfig) -> bool {
    DESCRIPTION_EXCEPTION.is_match(line.text)
}

fn is_paren_color_line(_: &BlockState, line: &ScanLine<'_>, _: &ScanConfig) -> bool {
    split_paren_colors(line.text).is_some()
}

fn is_description_candidate(state: &BlockState, line: &ScanLine<'_>, config: &ScanConfig) -> bool {
    !state.seen_first_color
        && state.description_lines.len() < config.max_description_lines
        && (is_description_line(line.text) || CONTINUATION_TOKEN.is_match(line.text))
        && !is_color_line(line.text)
}

fn is_generic_color_line(_: &BlockState, line: &ScanLine<'_>, _: &ScanConfig) -> bool {
    is_color_line(line.text)
}

fn is_orphan_backorder(state: &BlockState, line: &ScanLine<'_>, _: &ScanConfig) -> bool {
    state.seen_first_color && ORPHAN_BACKORDER_LINE.is_match(line.text)
}

fn push_prices(mut state: BlockState, line: &ScanLine<'_>) -> BlockState {
    let room = BLOCK_PRICES.saturating_sub(state.prices.len());
    state
        .prices
        .extend(extract_price_tokens(line.text).into_iter().take(room));
    if state.prices.len() >= BLOCK_PRICES {
        state.end = Some(BlockEnd::PricesComplete);
    }
    state
}

fn skip_line(state: BlockState, _: &ScanLine<'_>) -> BlockState {
    state
}

fn end_at_next_item(mut state: BlockState, _: &ScanLine<'_>) -> BlockState {
    state.end = Some(BlockEnd::NextItem);
    state
}

fn push_description_exception(mut state: BlockState, line: &ScanLine<'_>) -> BlockState {
    let Some(m) = DESCRIPTION_EXCEPTION.find(line.text) else {
        return state;
    };

    let name = line.text[..m.end()].trim();
    let suffix = line.text[m.end()..].trim();
    state.description_lines.push(name.to_string());

    let has_color = COLOR_TOKEN
        .captures_iter(suffix)
        .any(|caps| validate_color_token(&caps[2]));
    if has_color {
        state.color_lines.push(suffix.to_string());
        state.seen_first_color = true;
    }
    state
}

fn push_paren_colors(mut state: BlockState, line: &ScanLine<'_>) -> BlockState {
    if let Some((description, colors)) = split_paren_colors(line.text) {
        if !description.is_empty() {
            state.description_lines.push(description);
        }
        state.color_lines.push(colors);
        state.seen_first_color = true;
    }
    state
}

fn push_description(mut state: BlockState, line: &ScanLine<'_>) -> BlockState {
    state.description_lines.push(line.text.to_string());
    state
}

fn push_color(mut state: BlockState, line: &ScanLine<'_>) -> BlockState {
    state.color_lines.push(line.text.to_string());
    state.seen_first_color = true;
    state
}

/// A line holding only a quantity no larger than `max`.
pub fn is_quantity_line(text: &str, max: u32) -> bool {
    let text = text.trim();
    BARE_QUANTITY.is_match(text) && text.parse::<u32>().is_ok_and(|qty| qty <= max)
}

/// A line that plausibly reads as a product description.
pub fn is_description_line(text: &str) -> bool {
    let text = text.trim();
    let Some(first) = text.chars().next() else {
        return false;
    };

    (first.is_ascii_uppercase() || first.is_ascii_digit())
        && text.chars().any(|c| c.is_ascii_uppercase())
        && text.chars().count() >= 3
        && (PRODUCT_KEYWORD.is_match(text) || text.chars().count() >= 5)
        && !METADATA_LINE.is_match(text)
        && !starts_with_color_token(text)
}

fn starts_with_color_token(text: &str) -> bool {
    COLOR_TOKEN
        .captures(text)
        .is_some_and(|caps| caps.get(0).is_some_and(|m| m.start() == 0) && validate_color_token(&caps[2]))
}

/// A line carrying at least one valid `COLOR-QTY` token that is not a size
/// marker or a brand name.
pub fn is_color_line(text: &str) -> bool {
    GENERIC_COLOR.is_match(text)
        && !INCH_MARK.is_match(text)
        && !NON_COLOR_BRAND.is_match(text)
        && COLOR_TOKEN
            .captures_iter(text)
            .any(|caps| validate_color_token(&caps[2]))
}

/// Classify a line against the current block state.
pub fn classify(state: &BlockState, line: &ScanLine<'_>, config: &ScanConfig) -> LineKind {
    LINE_RULES
        .iter()
        .find(|rule| (rule.matches)(state, line, config))
        .map(|rule| rule.kind)
        .unwrap_or(LineKind::Noise)
}

/// Fold one line into the block state.
pub fn step(state: BlockState, line: &ScanLine<'_>, config: &ScanConfig) -> BlockState {
    match LINE_RULES.iter().find(|rule| (rule.matches)(&state, line, config)) {
        Some(rule) => {
            debug!("{:?}: '{}'", rule.kind, line.text);
            (rule.apply)(state, line)
        }
        None => state,
    }
}

fn next_non_empty<'a>(lines: &[&'a str], from: usize) -> Option<&'a str> {
    lines
        .iter()
        .skip(from)
        .map(|l| l.trim())
        .find(|l| !l.is_empty())
}

/// A quantity line followed by a description starts an item block.
pub fn is_block_start(lines: &[&str], index: usize, config: &ScanConfig) -> bool {
    lines
        .get(index)
        .is_some_and(|line| is_quantity_line(line, config.max_block_quantity))
        && next_non_empty(lines, index + 1).is_some_and(is_description_line)
}

/// One scanned item block.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemBlock {
    pub quantity: u32,
    pub state: BlockState,
    pub end: BlockEnd,
    /// Where scanning resumes. A next-item boundary line is not consumed.
    pub next_index: usize,
}

/// Scan the block whose quantity line is at `start`.
pub fn scan_block(lines: &[&str], start: usize, config: &ScanConfig) -> ItemBlock {
    let quantity = lines
        .get(start)
        .and_then(|l| l.trim().parse::<u32>().ok())
        .unwrap_or(0);

    let last = (start + config.block_window).min(lines.len().saturating_sub(1));
    let mut state = BlockState::default();
    let mut next_index = last + 1;

    for idx in start + 1..=last {
        let text = lines[idx].trim();
        if text.is_empty() {
            continue;
        }

        let line = ScanLine::new(text, next_non_empty(lines, idx + 1));
        state = step(state, &line, config);

        match state.end {
            Some(BlockEnd::NextItem) => {
                next_index = idx;
                break;
            }
            Some(_) => {
                next_index = idx + 1;
                break;
            }
            None => {}
        }
    }

    let end = state.end.unwrap_or(BlockEnd::WindowExhausted);
    ItemBlock {
        quantity,
        state,
        end,
        next_index,
    }
}

/// First item block after a confirmed `QTY SHIPPED` table header.
pub fn find_table_start(lines: &[&str], config: &ScanConfig) -> Option<usize> {
    for (i, line) in lines.iter().enumerate() {
        if !TABLE_HEADER.is_match(line) {
            continue;
        }

        let confirm_end = (i + config.table_header_window + 1).min(lines.len());
        if !lines[i..confirm_end]
            .iter()
            .any(|l| TABLE_HEADER_CONFIRM.is_match(l))
        {
            continue;
        }

        let start_end = (i + 1 + config.table_start_window).min(lines.len());
        if let Some(start) = (i + 1..start_end).find(|&j| is_block_start(lines, j, config)) {
            debug!("Item table starts at line {}", start + 1);
            return Some(start);
        }
    }
    None
}

/// Parser for the block layout.
pub struct BlockLayoutParser<'a> {
    config: &'a EngineConfig,
}

impl<'a> BlockLayoutParser<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    fn build_items(&self, block: &ItemBlock, catalog: &CatalogIndex) -> Vec<LineItem> {
        let mut color_lines = block.state.color_lines.clone();
        let raw = normalize(&block.state.description_lines.join(" "));

        let found = catalog.match_description(&raw, &self.config.matching);
        let mut warnings = Vec::new();

        let description = match found.match_type {
            MatchType::Exact => found.description.clone(),
            MatchType::Fuzzy => {
                warnings.push(Warning::FuzzyMatched { score: found.score });
                found.description.clone()
            }
            MatchType::None => {
                let mut base = found.description.clone();
                if let Some((description, colors)) = split_description_and_color(&raw, false) {
                    debug!("Split colors '{}' out of description '{}'", colors, description);
                    base = description;
                    color_lines.insert(0, colors);
                }
                if !catalog.is_empty() {
                    warnings.push(Warning::CatalogNoMatch {
                        alternate: found.alternate.clone(),
                    });
                }
                strip_price_tokens(&clean_description_end(&base))
            }
        };

        if description.is_empty() {
            debug!("Skipping block without a description");
            return Vec::new();
        }

        let prices = &block.state.prices;
        let (unit_price, ext_price) = if prices.len() >= BLOCK_PRICES {
            (prices[1], prices[2])
        } else {
            warnings.push(Warning::MissingPrices {
                found: prices.len(),
            });
            (Decimal::ZERO, Decimal::ZERO)
        };

        let mut template = LineItem {
            size_length: size_length(&description),
            description: description.clone(),
            unit_price,
            ..LineItem::default()
        };
        for warning in warnings {
            template.add_warning(warning);
        }

        let colors = parse_color_lines(&color_lines, Some(description.as_str()));
        let tolerance = self.config.validation.ext_price_tolerance;

        let mut items = if colors.is_empty() {
            vec![single_line_item(
                &template,
                block.quantity,
                block.quantity,
                ext_price,
                tolerance,
            )]
        } else {
            split_line_items(&template, &colors, ext_price, tolerance)
        };

        if found.is_match() {
            enrich_line_items(&mut items, catalog, &description);
        }

        debug!(
            "Block '{}' ({:?}): {} color(s), {} price(s)",
            description,
            block.end,
            colors.len(),
            prices.len()
        );
        items
    }
}

impl LineItemParser for BlockLayoutParser<'_> {
    fn parse_items(&self, lines: &[&str], catalog: &CatalogIndex) -> Vec<LineItem> {
        let scan = &self.config.scan;
        let mut items = Vec::new();
        let mut i = find_table_start(lines, scan).unwrap_or(0);

        while i < lines.len() {
            if !is_block_start(lines, i, scan) {
                i += 1;
                continue;
            }

            let block = scan_block(lines, i, scan);
            items.extend(self.build_items(&block, catalog));
            i = block.next_index.max(i + 1);
        }

        items
    }
}
