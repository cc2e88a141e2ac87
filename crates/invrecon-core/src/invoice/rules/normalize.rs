//! Text normalization and price-token extraction.
//!
//! Every function here is pure; parsers share them so that the same input
//! always canonicalizes the same way.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use super::patterns::{
    HYPHEN_RUN, PRICE_LINE_CHARS, PRICE_TOKEN, QUOTE_VARIANTS, SPACED_HYPHEN, WHITESPACE_RUN,
};

/// Canonicalize free text.
///
/// Unifies quote variants to `"`, removes underscores, collapses hyphen
/// runs and whitespace runs, and trims. Applying it twice is a no-op.
pub fn normalize(text: &str) -> String {
    let text = QUOTE_VARIANTS.replace_all(text, "\"");
    let text = text.replace('_', "");
    let text = HYPHEN_RUN.replace_all(&text, "-");
    let text = WHITESPACE_RUN.replace_all(&text, " ");
    text.trim().to_string()
}

/// Canonical key for catalog description lookups.
///
/// Same as [`normalize`] plus uppercase and no spaces around hyphens, so
/// `"CLIP - IN  18”"` and `"clip-in 18\""` share a key.
pub fn normalize_description(text: &str) -> String {
    let text = normalize(text);
    SPACED_HYPHEN
        .replace_all(&text, "-")
        .trim()
        .to_uppercase()
}

/// Canonical color for catalog comparisons (`"1b - 30"` becomes `"1B30"`).
pub fn normalize_color(color: &str) -> String {
    color
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_uppercase)
        .collect()
}

/// Parse an amount such as `1,234.56` or `$85.00`.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    Decimal::from_str(&cleaned).ok()
}

/// Price tokens of a line that holds nothing but amounts.
///
/// Returns an empty list when the line contains any character other than
/// digits, commas, periods, whitespace or `$`.
pub fn extract_price_tokens(line: &str) -> Vec<Decimal> {
    if !PRICE_LINE_CHARS.is_match(line) {
        return Vec::new();
    }

    PRICE_TOKEN
        .find_iter(line)
        .filter_map(|m| parse_amount(m.as_str()))
        .collect()
}

/// Remove every price token from a text.
pub fn strip_price_tokens(text: &str) -> String {
    let stripped = PRICE_TOKEN.replace_all(text, " ");
    WHITESPACE_RUN.replace_all(&stripped, " ").trim().to_string()
}

/// Round to cents, half away from zero.
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
