//! Color/quantity token extraction.
//!
//! A color token is written `COLOR-SHIPPED`, optionally with a one-letter
//! parenthesized prefix (`(P)M950-3`) and a parenthesized backorder count
//! (`JBLK- 0 (2)`). Tokens can wrap across lines, and the backorder count of
//! the last token on a line sometimes lands alone on the next one.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::normalize::normalize;
use super::patterns::{
    COLOR_SHAPE, COLOR_TOKEN, DESCRIPTION_EXCEPTION, INCH_MARK, LEADING_TRIPLE_PRICE,
    LINE_REFERENCE_TAIL, NUMERIC_COMPOSITE, ORPHAN_BACKORDER, PHONE_NUMBER, TOLL_FREE_LABEL,
    TRAILING_TRIPLE_PRICE, TRIPLE_PRICE,
};

/// Longest string accepted as a color code.
const MAX_COLOR_LEN: usize = 20;

/// Words that mark a token as metadata or leftover description text.
///
/// Entries shorter than four characters only match a whole segment of the
/// token, so `IN` rejects `18IN` but not `GINGER`.
const REJECTED_WORDS: &[&str] = &[
    // metadata
    "SHIP", "SOLD", "WEIGHT", "SUBTOTAL", "RICHMOND", "LLC", "PKWAY", "COD", "FEE", "TAG", "DATE",
    "PAGE", "VIA", "PAYMENT", "TERMS", "TOTAL", "PRICE", "UNIT", "DISC", "EXT",
    // product words
    "HAIR", "WIG", "LACE", "WEAVE", "CLOSURE", "CLIP", "PCS", "WAVE", "PERUVIAN", "BRAZILIAN",
    "STRAIGHT", "CURLY", "BUNDLE", "FRONTAL", "PONYTAIL", "CROCHET", "PACK", "INCH", "IN",
];

/// A `(color, shipped, backordered)` triple recovered from text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorToken {
    pub color: String,
    pub shipped: u32,
    pub backordered: u32,
}

impl ColorToken {
    pub fn new(color: impl Into<String>, shipped: u32, backordered: u32) -> Self {
        Self {
            color: color.into(),
            shipped,
            backordered,
        }
    }

    /// Shipped plus backordered.
    pub fn ordered(&self) -> u32 {
        self.shipped + self.backordered
    }
}

/// Decide whether a candidate string is a color code.
///
/// Accepts codes with a letter (`T30`, `1B/30`), plain 1-3 digit codes
/// (`613`) and `+`-joined numeric composites (`130+530`). Other digit-only
/// shapes such as `201-549` are line references, not colors.
pub fn validate_color_token(token: &str) -> bool {
    let token = token.trim();
    if token.is_empty() || token.chars().count() > MAX_COLOR_LEN {
        return false;
    }

    if !COLOR_SHAPE.is_match(token) {
        return false;
    }

    let upper = token.to_uppercase();
    if contains_rejected_word(&upper) {
        return false;
    }

    if upper.chars().any(|c| c.is_ascii_alphabetic()) {
        return true;
    }

    let plain_number = upper.len() <= 3 && upper.chars().all(|c| c.is_ascii_digit());
    plain_number || NUMERIC_COMPOSITE.is_match(&upper)
}

fn contains_rejected_word(upper: &str) -> bool {
    let segments: Vec<&str> = upper
        .split(['-', '/', '+'])
        .map(|s| s.trim_start_matches(|c: char| c.is_ascii_digit()))
        .collect();

    REJECTED_WORDS.iter().any(|word| {
        if word.len() >= 4 {
            upper.contains(word)
        } else {
            segments.iter().any(|s| s == word)
        }
    })
}

/// Extract color tokens from accumulated color lines.
///
/// When `description` is given, its significant words are removed first so
/// that description fragments are never read as colors. A second pass links
/// standalone `(N)` backorder counts to colors that show neither shipped nor
/// backordered quantity.
pub fn parse_color_lines<S: AsRef<str>>(lines: &[S], description: Option<&str>) -> Vec<ColorToken> {
    let joined = lines
        .iter()
        .map(|l| l.as_ref())
        .collect::<Vec<_>>()
        .join(" ");
    let mut text = normalize(&joined);

    if let Some(description) = description {
        text = remove_description_words(&text, description);
    }

    text = normalize(&TRIPLE_PRICE.replace_all(&text, " "));
    text = normalize(&PHONE_NUMBER.replace_all(&text, " "));
    text = normalize(&TOLL_FREE_LABEL.replace_all(&text, " "));

    let mut tokens = Vec::new();
    for caps in COLOR_TOKEN.captures_iter(&text) {
        let color = caps[2].trim();
        if !validate_color_token(color) {
            debug!("Rejected color candidate '{}'", color);
            continue;
        }

        let Ok(shipped) = caps[3].parse::<u32>() else {
            continue;
        };
        let backordered = caps
            .get(4)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .unwrap_or(0);

        tokens.push(ColorToken::new(color.to_uppercase(), shipped, backordered));
    }

    link_orphan_backorders(&text, &mut tokens);

    debug!("Parsed {} color tokens from '{}'", tokens.len(), text);
    tokens
}

/// Colors from a row-layout color line.
///
/// Underscores act as separators here, a price triple glued to either end
/// is dropped, and tokens without any quantity are discarded.
pub fn parse_row_color_text(text: &str) -> Vec<ColorToken> {
    let text = normalize_row_color_text(text);
    parse_color_lines(&[text], None)
        .into_iter()
        .filter(|t| t.shipped > 0 || t.backordered > 0)
        .collect()
}

/// Canonicalize a row-layout color line.
pub fn normalize_row_color_text(text: &str) -> String {
    let text = normalize(&text.replace('_', " "));
    let text = LEADING_TRIPLE_PRICE.replace(&text, "");
    let text = TRAILING_TRIPLE_PRICE.replace(&text, "");
    text.trim().to_string()
}

fn remove_description_words(text: &str, description: &str) -> String {
    let mut text = text.to_string();

    for word in description.split_whitespace() {
        if word.chars().count() <= 2 {
            continue;
        }

        let starts_word = word.chars().next().is_some_and(char::is_alphanumeric);
        let ends_word = word.chars().last().is_some_and(char::is_alphanumeric);
        let pattern = format!(
            "(?i){}{}{}",
            if starts_word { r"\b" } else { "" },
            regex::escape(word),
            if ends_word { r"\b" } else { "" },
        );

        if let Ok(re) = Regex::new(&pattern) {
            text = re.replace_all(&text, " ").into_owned();
        }
    }

    normalize(&text)
}

fn link_orphan_backorders(text: &str, tokens: &mut [ColorToken]) {
    let orphans: Vec<u32> = ORPHAN_BACKORDER
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .filter(|qty| *qty > 0 && !tokens.iter().any(|t| t.backordered == *qty))
        .collect();

    let mut orphans = orphans.into_iter();
    for token in tokens.iter_mut() {
        if token.shipped == 0 && token.backordered == 0 {
            match orphans.next() {
                Some(qty) => {
                    debug!("Linked orphan backorder ({}) to {}", qty, token.color);
                    token.backordered = qty;
                }
                None => break,
            }
        }
    }
}

/// Split a line that starts with description text and carries
/// parenthesized color tokens, e.g. `HD LACE WIG (P)M950-3 (S)30-2`.
///
/// Returns the description remainder (possibly empty) and the color text,
/// or `None` when the line has no valid parenthesized color.
pub fn split_paren_colors(line: &str) -> Option<(String, String)> {
    let mut split_at = None;
    let mut has_paren = false;

    for caps in COLOR_TOKEN.captures_iter(line) {
        if !validate_color_token(&caps[2]) {
            continue;
        }
        if split_at.is_none() {
            split_at = caps.get(0).map(|m| m.start());
        }
        if caps.get(1).is_some() {
            has_paren = true;
            break;
        }
    }

    let split_at = split_at.filter(|_| has_paren)?;
    Some((
        line[..split_at].trim().to_string(),
        line[split_at..].trim().to_string(),
    ))
}

/// Separate color text baked into a description.
///
/// Needs at least two color-shaped matches of which at least two validate;
/// a single match is too weak to split on. Descriptions with an inch mark
/// are left alone unless `allow_inch` is set.
pub fn split_description_and_color(text: &str, allow_inch: bool) -> Option<(String, String)> {
    let text = normalize(text);
    if !allow_inch && INCH_MARK.is_match(&text) {
        return None;
    }

    let matches: Vec<Captures> = COLOR_TOKEN.captures_iter(&text).collect();
    if matches.len() < 2 {
        return None;
    }

    let valid: Vec<&Captures> = matches
        .iter()
        .filter(|caps| validate_color_token(&caps[2]))
        .collect();
    if valid.len() < 2 {
        return None;
    }

    let start = valid[0].get(0)?.start();
    let description = text[..start].trim();
    if description.is_empty() {
        return None;
    }

    Some((description.to_string(), text[start..].trim().to_string()))
}

/// Remove every valid color token from a text.
pub fn strip_color_tokens(text: &str) -> String {
    let stripped = COLOR_TOKEN.replace_all(text, |caps: &Captures| {
        if validate_color_token(&caps[2]) {
            " ".to_string()
        } else {
            caps[0].to_string()
        }
    });
    normalize(&stripped)
}

/// Drop a trailing color token and a trailing line reference (`201-549`).
pub fn clean_description_end(description: &str) -> String {
    let mut text = normalize(description);

    let trailing = COLOR_TOKEN
        .captures_iter(&text)
        .last()
        .filter(|caps| validate_color_token(&caps[2]))
        .and_then(|caps| caps.get(0))
        .filter(|m| m.end() == text.len())
        .map(|m| m.start());
    if let Some(start) = trailing {
        text = text[..start].trim().to_string();
    }

    if !DESCRIPTION_EXCEPTION.is_match(&text) {
        text = LINE_REFERENCE_TAIL.replace(&text, "").into_owned();
    }

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validate_color_token_cases() {
        for token in ["1", "30", "613", "T30", "1B/30", "130+530", "GINGER", "M4/30"] {
            assert!(validate_color_token(token), "expected valid: {}", token);
        }
        for token in ["201-549", "346/843", "1234", "18IN", "HAIR", "SHIP", "CLIP", ""] {
            assert!(!validate_color_token(token), "expected invalid: {}", token);
        }
        assert!(!validate_color_token("ABCDEFGHIJKLMNOPQRSTU"));
    }

    #[test]
    fn test_validate_color_token_is_deterministic() {
        for token in ["1B/30", "201-549", "130+530", "PAGE2"] {
            assert_eq!(validate_color_token(token), validate_color_token(token));
        }
    }

    #[test]
    fn test_parse_scenario_a_colors() {
        let tokens = parse_color_lines(
            &["CBRN- 2   JBLK- 0 (2)"],
            Some("BIG BEAUTIFUL HAIR CLIP-IN 18\""),
        );
        assert_eq!(
            tokens,
            vec![ColorToken::new("CBRN", 2, 0), ColorToken::new("JBLK", 0, 2)]
        );
    }

    #[test]
    fn test_phone_number_is_never_a_color() {
        let tokens = parse_color_lines(&["1B-60 M4/30-55", "TOLL FREE: 346-843-2709"], None);
        assert_eq!(
            tokens,
            vec![ColorToken::new("1B", 60, 0), ColorToken::new("M4/30", 55, 0)]
        );
    }

    #[test]
    fn test_paren_prefix_and_composite() {
        let tokens = parse_color_lines(&["(P)M950/425-3 130+530-1"], None);
        assert_eq!(
            tokens,
            vec![
                ColorToken::new("M950/425", 3, 0),
                ColorToken::new("130+530", 1, 0)
            ]
        );
    }

    #[test]
    fn test_orphan_backorder_second_pass() {
        // The count is separated from its color, so only the second pass links it.
        let tokens = parse_color_lines(&["1B- 0 30- 2", "NOTE (4)"], None);
        assert_eq!(
            tokens,
            vec![ColorToken::new("1B", 0, 4), ColorToken::new("30", 2, 0)]
        );

        // A count already attached to a color is not reused.
        let tokens = parse_color_lines(&["1B- 0 (4) 30- 0", "NOTE (4)"], None);
        assert_eq!(
            tokens,
            vec![ColorToken::new("1B", 0, 4), ColorToken::new("30", 0, 0)]
        );
    }

    #[test]
    fn test_trailing_prices_are_ignored() {
        let tokens = parse_color_lines(&["1B- 2 18.00 17.00 34.00"], None);
        assert_eq!(tokens, vec![ColorToken::new("1B", 2, 0)]);
    }

    #[test]
    fn test_row_color_text() {
        let tokens = parse_row_color_text("1B-2__4-0__T30-1(2)  10.00 20.00 18.00");
        assert_eq!(
            tokens,
            vec![ColorToken::new("1B", 2, 0), ColorToken::new("T30", 1, 2)]
        );
    }

    #[test]
    fn test_split_paren_colors() {
        let (desc, colors) = split_paren_colors("HD LACE WIG (P)M950-3 (S)30-2").unwrap();
        assert_eq!(desc, "HD LACE WIG");
        assert_eq!(colors, "(P)M950-3 (S)30-2");

        assert!(split_paren_colors("1B-2 30-1").is_none());
    }

    #[test]
    fn test_split_description_and_color() {
        let (desc, colors) =
            split_description_and_color("MELTED HAIRLINE PERRY 1B-2 2-1", false).unwrap();
        assert_eq!(desc, "MELTED HAIRLINE PERRY");
        assert_eq!(colors, "1B-2 2-1");

        // One match is not enough.
        assert!(split_description_and_color("MELTED HAIRLINE 1B-2", false).is_none());
        // Inch marks block the split.
        assert!(split_description_and_color("CLIP 18\" 1B-2 2-1", false).is_none());
    }

    #[test]
    fn test_clean_description_end() {
        assert_eq!(clean_description_end("QW WIG PERRY 1B-2"), "QW WIG PERRY");
        assert_eq!(clean_description_end("QW WIG PERRY 201-549"), "QW WIG PERRY");
        assert_eq!(clean_description_end("REMI TARA 2-4-6"), "REMI TARA 2-4-6");
    }

    #[test]
    fn test_strip_color_tokens() {
        assert_eq!(strip_color_tokens("PRODUCT 18\" 1B-2"), "PRODUCT 18\"");
        assert_eq!(strip_color_tokens("REMI TARA 2-4-6"), "REMI TARA 2-4-6");
    }
}
