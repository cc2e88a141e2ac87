//! Invoice date extraction (US month/day/year).

use chrono::NaiveDate;

use super::patterns::{DATE_MDY, INVOICE_DATE_LABEL, SHIPPED_DATE_LABEL};
use super::{ExtractionMatch, FieldExtractor};

/// Date field extractor.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for caps in DATE_MDY.captures_iter(text) {
            let Some(date) = parse_mdy(&caps[0]) else {
                continue;
            };
            if let Some(full_match) = caps.get(0) {
                results.push(
                    ExtractionMatch::new(date, 0.7, full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                );
            }
        }

        results
    }
}

/// Find the invoice date.
///
/// Prefers an `INVOICE DATE` label, then `DATE SHIPPED`, then the first
/// bare date anywhere in the text.
pub fn extract_invoice_date(text: &str) -> Option<NaiveDate> {
    for label in [&*INVOICE_DATE_LABEL, &*SHIPPED_DATE_LABEL] {
        if let Some(date) = label.captures(text).and_then(|caps| parse_mdy(&caps[1])) {
            return Some(date);
        }
    }

    DateExtractor::new().extract(text).map(|m| m.value)
}

/// Parse `M/D/YY` or `M/D/YYYY`. Two-digit years are in the 2000s.
pub fn parse_mdy(s: &str) -> Option<NaiveDate> {
    let caps = DATE_MDY.captures(s)?;
    let month: u32 = caps[1].parse().ok()?;
    let day: u32 = caps[2].parse().ok()?;
    let year = parse_year(&caps[3])?;

    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    if s.len() == 2 { Some(2000 + year) } else { Some(year) }
}
