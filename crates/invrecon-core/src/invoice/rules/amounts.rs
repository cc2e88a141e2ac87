//! Invoice totals extraction.
//!
//! Totals are best effort: a value that cannot be recovered stays zero. The
//! block layout's total is resolved through a preference cascade, each step
//! exposed on its own so it can be checked against synthetic line windows.

use rust_decimal::Decimal;
use tracing::debug;

use super::normalize::{parse_amount, round_cents};
use super::patterns::{
    DISCOUNT_LABEL, INVOICE_AMOUNT_LABEL, PRICE_TOKEN, SHIPPING_LABEL, SIGNED_AMOUNT,
    SUBTOTAL_LABEL, SUBTOTAL_WORD, SUMMARY_END, SUMMARY_LABEL, TAX_LABEL, TOTAL_CURRENCY,
    TOTAL_NEAR_AMOUNT,
};
use super::{ExtractionMatch, FieldExtractor};
use crate::models::config::TotalsConfig;

/// Characters scanned after `SUBTOTAL` for a nearby total.
const SUBTOTAL_NEIGHBORHOOD: usize = 500;

/// Money amount extractor.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        PRICE_TOKEN
            .find_iter(text)
            .filter_map(|m| {
                let amount = parse_amount(m.as_str())?;
                Some(ExtractionMatch::new(amount, 0.8, m.as_str()).with_position(m.start(), m.end()))
            })
            .collect()
    }
}

/// Header money fields of an invoice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceTotals {
    pub total_amount: Decimal,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
}

/// What a `SUBTOTAL ... TOTAL` summary block yields.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryBlock {
    /// First amount of the block.
    pub subtotal: Decimal,
    /// Accepted total, if any.
    pub total: Option<Decimal>,
    /// Discount inferred when the total had to be derived.
    pub inferred_discount: Option<Decimal>,
}

/// Totals for the row layout: the amount after the last `INVOICE AMOUNT`.
pub fn extract_row_totals(text: &str, config: &TotalsConfig) -> InvoiceTotals {
    let mut totals = InvoiceTotals {
        total_amount: find_invoice_amount(text, config).unwrap_or_default(),
        subtotal: find_subtotal(text).unwrap_or_default(),
        ..InvoiceTotals::default()
    };
    apply_adjustments(text, &mut totals);
    totals
}

/// Totals for the block layout.
///
/// The subtotal is read first since it bounds every total candidate. The
/// total is then taken from, in order: a `TOTAL US$` label, an amount near
/// `TOTAL` in the leading lines, the summary block, the text right after
/// `SUBTOTAL`, and finally the subtotal itself.
pub fn extract_block_totals(lines: &[&str], text: &str, config: &TotalsConfig) -> InvoiceTotals {
    let mut totals = InvoiceTotals {
        subtotal: find_subtotal(text).unwrap_or_default(),
        ..InvoiceTotals::default()
    };
    apply_adjustments(text, &mut totals);

    if let Some(total) = total_from_currency_label(text) {
        debug!("Total from currency label: {}", total);
        totals.total_amount = total;
        return totals;
    }

    if let Some(total) = total_near_label(lines, totals.subtotal, config) {
        debug!("Total near TOTAL label: {}", total);
        totals.total_amount = total;
        return totals;
    }

    if let Some(summary) = summary_block(lines, config) {
        if totals.subtotal.is_zero() {
            totals.subtotal = summary.subtotal;
        }
        if let Some(total) = summary.total {
            debug!("Total from summary block: {}", total);
            totals.total_amount = total;
            if let Some(discount) = summary.inferred_discount {
                if totals.discount.is_zero() {
                    totals.discount = discount;
                }
            }
            return totals;
        }
    }

    if let Some(total) = total_near_subtotal(text, totals.subtotal) {
        debug!("Total near SUBTOTAL: {}", total);
        totals.total_amount = total;
        return totals;
    }

    debug!("Falling back to subtotal as total");
    totals.total_amount = totals.subtotal;
    totals
}

/// The last plausible amount within the window after the last
/// `INVOICE AMOUNT` label.
pub fn find_invoice_amount(text: &str, config: &TotalsConfig) -> Option<Decimal> {
    let label = INVOICE_AMOUNT_LABEL.find_iter(text).last()?;
    let window = char_window(&text[label.start()..], config.amount_label_window);

    AmountExtractor::new()
        .extract_all(window)
        .into_iter()
        .map(|m| m.value)
        .filter(|amount| {
            *amount >= config.min_invoice_amount && *amount <= config.max_invoice_amount
        })
        .last()
}

/// Amount following the first `SUBTOTAL` label.
pub fn find_subtotal(text: &str) -> Option<Decimal> {
    SUBTOTAL_LABEL
        .captures(text)
        .and_then(|caps| parse_amount(&caps[1]))
}

/// Total from a `TOTAL US$ 1,234.56` label.
pub fn total_from_currency_label(text: &str) -> Option<Decimal> {
    TOTAL_CURRENCY
        .captures(text)
        .and_then(|caps| parse_amount(&caps[1]))
        .filter(|amount| *amount > Decimal::ZERO)
}

/// An amount shortly after the word `TOTAL` in the leading lines.
///
/// Accepted when it is at least 100 and, once a subtotal is known, lies
/// within 50-100 % of it. Small values are usually phone number fragments.
pub fn total_near_label(lines: &[&str], subtotal: Decimal, config: &TotalsConfig) -> Option<Decimal> {
    let top = lines[..lines.len().min(config.summary_scan_lines)].join("\n");
    let hundred = Decimal::ONE_HUNDRED;

    TOTAL_NEAR_AMOUNT
        .captures_iter(&top)
        .filter_map(|caps| parse_amount(&caps[1]))
        .find(|amount| {
            *amount >= hundred
                && (subtotal.is_zero() || (*amount * Decimal::TWO >= subtotal && *amount <= subtotal))
        })
}

/// Read the summary block that starts at the first `SUBTOTAL` line.
///
/// Amounts that appear both positive and negative cancel out (a discount
/// printed with its reversal). When the last amount is not a usable total,
/// the total is derived as the subtotal minus the largest unpaired positive
/// amount below it, and that amount is reported as the discount.
pub fn summary_block(lines: &[&str], config: &TotalsConfig) -> Option<SummaryBlock> {
    let scan = lines.len().min(config.summary_scan_lines);
    let start = lines[..scan]
        .iter()
        .position(|line| SUBTOTAL_WORD.is_match(line))?;
    let end = lines.len().min(start + config.summary_block_lines);

    let mut amounts = Vec::new();
    let mut has_labels = false;
    for line in &lines[start..end] {
        if SUMMARY_END.is_match(line) {
            break;
        }
        if SUMMARY_LABEL.is_match(line) {
            has_labels = true;
        }
        amounts.extend(
            SIGNED_AMOUNT
                .find_iter(line)
                .filter_map(|m| parse_amount(m.as_str())),
        );
    }

    if !has_labels || amounts.len() < 2 {
        return None;
    }

    let subtotal = amounts[0];
    let last = amounts[amounts.len() - 1];

    let is_paired = |amount: Decimal| {
        let abs = amount.abs();
        amounts.iter().any(|a| *a == abs) && amounts.iter().any(|a| *a == -abs)
    };

    let max_positive = amounts
        .iter()
        .copied()
        .filter(|a| {
            *a > Decimal::ZERO && subtotal > Decimal::ZERO && *a < subtotal && !is_paired(*a)
        })
        .max();

    let derived = max_positive
        .filter(|_| subtotal > Decimal::ZERO)
        .map(|discount| round_cents(subtotal - discount));

    let too_small = subtotal > Decimal::ZERO && last > Decimal::ZERO && last * Decimal::TWO < subtotal;
    let selected = if last <= Decimal::ZERO || is_paired(last) {
        None
    } else {
        Some(last)
    };

    let mut block = SummaryBlock {
        subtotal,
        total: selected,
        inferred_discount: None,
    };

    if let Some(derived) = derived.filter(|d| *d > Decimal::ZERO) {
        if selected.is_none() || too_small {
            block.total = Some(derived);
            block.inferred_discount = max_positive;
        }
    }

    Some(block)
}

/// A total in the text right after `SUBTOTAL`.
///
/// Takes the first amount of at least 100 that lies within 70-100 % of the
/// subtotal, else the largest such amount.
pub fn total_near_subtotal(text: &str, subtotal: Decimal) -> Option<Decimal> {
    let label = SUBTOTAL_WORD.find(text)?;
    let window = char_window(&text[label.start()..], SUBTOTAL_NEIGHBORHOOD);
    let cent = Decimal::new(1, 2);

    let amounts: Vec<Decimal> = AmountExtractor::new()
        .extract_all(window)
        .into_iter()
        .map(|m| m.value)
        .filter(|a| *a >= Decimal::ONE_HUNDRED && (*a - subtotal).abs() > cent)
        .collect();

    let lower = subtotal * Decimal::new(7, 1);
    amounts
        .iter()
        .copied()
        .find(|a| *a >= lower && *a <= subtotal)
        .or_else(|| amounts.iter().copied().max())
}

/// Fill discount, shipping and tax from their labels.
fn apply_adjustments(text: &str, totals: &mut InvoiceTotals) {
    let labeled = |re: &regex::Regex| {
        re.captures(text)
            .and_then(|caps| parse_amount(&caps[1]))
            .unwrap_or_default()
    };

    totals.discount = labeled(&*DISCOUNT_LABEL);
    totals.shipping = labeled(&*SHIPPING_LABEL);
    totals.tax = labeled(&*TAX_LABEL);
}

/// At most `max_chars` characters from the start of `text`.
fn char_window(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
