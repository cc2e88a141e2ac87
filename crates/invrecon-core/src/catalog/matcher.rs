//! Exact and token-similarity description matching.
//!
//! Size and pack markers (`18"`, `3X`, `4PCS`, `10IN`) are scored apart from
//! the rest of the description. Two products that differ only in length
//! would otherwise look nearly identical.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use super::{CatalogEntry, CatalogIndex, CatalogMatch, MatchType};
use crate::invoice::rules::colors::strip_color_tokens;
use crate::invoice::rules::normalize::{normalize, normalize_description};
use crate::invoice::rules::patterns::{SIZE_QUOTE_JOIN, SIZE_TOKEN, SIZE_UNIT_JOIN};
use crate::models::config::MatchThresholds;

/// Tokens of a description, split into size markers and the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSet {
    pub tokens: BTreeSet<String>,
    pub base: BTreeSet<String>,
    pub sizes: BTreeSet<String>,
}

impl TokenSet {
    pub fn from_text(text: &str) -> Self {
        let upper = normalize(text).to_uppercase();
        let joined = SIZE_UNIT_JOIN.replace_all(&upper, "${1}${2}");
        let joined = SIZE_QUOTE_JOIN.replace_all(&joined, "${1}\"");

        let mut set = TokenSet::default();
        for token in joined.split(|c: char| c.is_whitespace() || c == '-') {
            let token = token.trim_matches(|c: char| matches!(c, ',' | '(' | ')' | '.'));
            if token.is_empty() {
                continue;
            }
            if SIZE_TOKEN.is_match(token) {
                set.sizes.insert(token.to_string());
            } else {
                set.base.insert(token.to_string());
            }
            set.tokens.insert(token.to_string());
        }
        set
    }

    /// Size markers of the two sets differ.
    pub fn size_mismatch(&self, other: &TokenSet) -> bool {
        self.sizes != other.sizes
    }
}

/// Jaccard similarity; zero when both sets are empty.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Score of one catalog entry against an input.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub description: String,
    pub base_score: f64,
    pub full_score: f64,
    pub size_mismatch: bool,
}

impl Candidate {
    fn score(input: &TokenSet, entry: &CatalogEntry) -> Self {
        Self {
            description: entry.description().to_string(),
            base_score: jaccard(&input.base, &entry.tokens.base),
            full_score: jaccard(&input.tokens, &entry.tokens.tokens),
            size_mismatch: input.size_mismatch(&entry.tokens),
        }
    }

    /// Passes the score thresholds.
    pub fn is_acceptable(&self, thresholds: &MatchThresholds) -> bool {
        self.base_score >= thresholds.min_base_score
            && (self.full_score >= thresholds.min_full_score
                || (self.size_mismatch && self.base_score >= thresholds.size_mismatch_base_score))
    }
}

/// The highest-scoring entry: best base score, then best full score, then
/// catalog order.
pub fn best_candidate(input: &TokenSet, index: &CatalogIndex) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;

    for entry in index.entries() {
        let candidate = Candidate::score(input, entry);
        let better = match &best {
            None => true,
            Some(current) => {
                candidate.base_score > current.base_score
                    || (candidate.base_score == current.base_score
                        && candidate.full_score > current.full_score)
            }
        };
        if better {
            best = Some(candidate);
        }
    }

    best
}

/// Resolve a raw parsed description against the catalog.
///
/// Color tokens are stripped first, then the normalized text is looked up
/// exactly. On a miss the best token-similarity candidate is accepted if it
/// clears the thresholds. An input that ends in a quote may be a truncated
/// size marker, so a size-mismatched candidate is then only reported as an
/// alternate.
pub fn match_description(
    index: &CatalogIndex,
    raw: &str,
    thresholds: &MatchThresholds,
) -> CatalogMatch {
    let cleaned = strip_color_tokens(raw);
    let key = normalize_description(&cleaned);

    let unmatched = |alternate: Option<String>| CatalogMatch {
        description: cleaned.clone(),
        match_type: MatchType::None,
        score: 0.0,
        size_mismatch: false,
        alternate,
    };

    if key.is_empty() || index.is_empty() {
        return unmatched(None);
    }

    if let Some(entry) = index.entry(&key) {
        debug!("Exact catalog match: {}", entry.description());
        return CatalogMatch {
            description: entry.description().to_string(),
            match_type: MatchType::Exact,
            score: 1.0,
            size_mismatch: false,
            alternate: None,
        };
    }

    let input = TokenSet::from_text(&key);
    let Some(best) = best_candidate(&input, index) else {
        return unmatched(None);
    };

    if !best.is_acceptable(thresholds) {
        debug!(
            "No catalog match for '{}' (best '{}', base {:.2}, full {:.2})",
            key, best.description, best.base_score, best.full_score
        );
        return unmatched(None);
    }

    if best.size_mismatch && thresholds.reject_trailing_quote_size_mismatch && key.ends_with('"') {
        warn!(
            "Rejected size-mismatched match '{}' for '{}'",
            best.description, key
        );
        return CatalogMatch {
            size_mismatch: true,
            ..unmatched(Some(best.description))
        };
    }

    debug!(
        "Fuzzy catalog match '{}' -> '{}' (base {:.2})",
        key, best.description, best.base_score
    );
    CatalogMatch {
        description: best.description,
        match_type: MatchType::Fuzzy,
        score: best.base_score,
        size_mismatch: best.size_mismatch,
        alternate: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::CatalogRecord;
    use pretty_assertions::assert_eq;

    fn index(descriptions: &[&str]) -> CatalogIndex {
        CatalogIndex::build(
            descriptions
                .iter()
                .enumerate()
                .map(|(i, d)| CatalogRecord::new(*d, format!("ITEM{:03}", i), "1B", "")),
        )
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_tokenize_isolates_sizes() {
        let tokens = TokenSet::from_text("Braid 3X Pre-Stretched 10 inch 4 pcs 18 ”");
        assert_eq!(tokens.sizes, set(&["3X", "10INCH", "4PCS", "18\""]));
        assert_eq!(tokens.base, set(&["BRAID", "PRE", "STRETCHED"]));
    }

    #[test]
    fn test_jaccard() {
        assert_eq!(jaccard(&set(&["A", "B"]), &set(&["B", "C"])), 1.0 / 3.0);
        assert_eq!(jaccard(&set(&[]), &set(&[])), 0.0);
    }

    #[test]
    fn test_exact_match_ignores_colors_and_spacing() {
        let index = index(&["BIG BEAUTIFUL HAIR CLIP-IN 18\""]);
        let result = index.match_description(
            "big beautiful hair clip - in 18”  1B-2",
            &MatchThresholds::default(),
        );
        assert_eq!(result.match_type, MatchType::Exact);
        assert_eq!(result.score, 1.0);
        assert_eq!(result.description, "BIG BEAUTIFUL HAIR CLIP-IN 18\"");
    }

    #[test]
    fn test_scenario_c_size_mismatch_rejected_with_alternate() {
        let index = index(&["PRODUCT 20\""]);
        let result = index.match_description("PRODUCT 18\"", &MatchThresholds::default());
        assert_eq!(result.match_type, MatchType::None);
        assert_eq!(result.description, "PRODUCT 18\"");
        assert_eq!(result.alternate, Some("PRODUCT 20\"".to_string()));
        assert!(result.size_mismatch);
    }

    #[test]
    fn test_size_mismatch_accepted_without_trailing_quote() {
        let index = index(&["PASSION TWIST 3X 24\""]);
        let result = index.match_description("PASSION TWIST 3X", &MatchThresholds::default());
        assert_eq!(result.match_type, MatchType::Fuzzy);
        assert!(result.size_mismatch);
        assert_eq!(result.description, "PASSION TWIST 3X 24\"");
    }

    #[test]
    fn test_fuzzy_match_on_reordered_tokens() {
        let index = index(&["MELTED HAIRLINE HD LACE WIG PERRY"]);
        let result = index.match_description(
            "MELTED HAIRLINE LACE WIG PERRY HD",
            &MatchThresholds::default(),
        );
        assert_eq!(result.match_type, MatchType::Fuzzy);
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn test_low_similarity_is_no_match() {
        let index = index(&["QW WIG PERRY"]);
        let result = index.match_description("BATIK DUBY WEAVE", &MatchThresholds::default());
        assert_eq!(result.match_type, MatchType::None);
        assert_eq!(result.alternate, None);
    }

    #[test]
    fn test_higher_base_score_always_preferred() {
        // The first entry has a better full score but a worse base score.
        let index = index(&["LACE WIG PERRY 18\"", "HD LACE WIG PERRY"]);
        let input = TokenSet::from_text("HD LACE WIG PERRY 18\"");
        let best = best_candidate(&input, &index).unwrap();
        assert_eq!(best.description, "HD LACE WIG PERRY");

        for entry in index.entries() {
            let other = Candidate::score(&input, entry);
            assert!(other.base_score <= best.base_score);
        }
    }

    #[test]
    fn test_empty_index_never_matches() {
        let result = CatalogIndex::new().match_description("QW WIG", &MatchThresholds::default());
        assert_eq!(result.match_type, MatchType::None);
        assert_eq!(result.description, "QW WIG");
    }
}
