//! Rule-based text extractors shared by both invoice layouts.

pub mod amounts;
pub mod colors;
pub mod dates;
pub mod normalize;
pub mod patterns;

pub use amounts::{AmountExtractor, InvoiceTotals, SummaryBlock, extract_block_totals, extract_row_totals};
pub use colors::{ColorToken, parse_color_lines, parse_row_color_text, validate_color_token};
pub use dates::{DateExtractor, extract_invoice_date};
pub use normalize::{extract_price_tokens, normalize, normalize_color, normalize_description};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// Extraction context with confidence scores.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
