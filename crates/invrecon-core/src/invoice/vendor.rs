//! Vendor classification and invoice number recovery.

use std::path::Path;

use tracing::debug;

use super::rules::patterns::{
    FILENAME_INVOICE_NUMBER, OUTRE_BRAND, OUTRE_INVOICE_ID, OUTRE_INVOICE_LABEL, SNG_BRAND,
    SNG_INVOICE_ID,
};
use crate::models::invoice::Vendor;

/// File name component of a path-like string.
fn file_name(filename: &str) -> &str {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename)
}

/// Detect the issuing vendor from brand strings and invoice number shapes.
///
/// Shake-N-Go is checked first: its 10-digit invoice numbers are the more
/// specific signal.
pub fn detect_vendor(text: &str, filename: &str) -> Vendor {
    let name = file_name(filename);

    if SNG_BRAND.is_match(text) || name.starts_with("3000") || SNG_INVOICE_ID.is_match(text) {
        debug!("Vendor detected as SNG");
        return Vendor::ShakeNGo;
    }

    if OUTRE_BRAND.is_match(text)
        || name.to_uppercase().contains("SINV")
        || OUTRE_INVOICE_ID.is_match(text)
    {
        debug!("Vendor detected as OUTRE");
        return Vendor::Outre;
    }

    Vendor::Unknown
}

/// Recover the invoice number.
///
/// Shake-N-Go numbers come from the file name, falling back to the first
/// 10-digit id in the text. OUTRE numbers come from the `INVOICE #` label,
/// then any `SINV` code in the text, then the file name.
pub fn extract_invoice_number(vendor: Vendor, text: &str, filename: &str) -> String {
    let name = file_name(filename);

    let number = match vendor {
        Vendor::ShakeNGo => FILENAME_INVOICE_NUMBER
            .captures(name)
            .map(|caps| caps[1].to_string())
            .or_else(|| SNG_INVOICE_ID.find(text).map(|m| m.as_str().to_string())),
        Vendor::Outre => OUTRE_INVOICE_LABEL
            .captures(text)
            .map(|caps| caps[1].to_string())
            .or_else(|| OUTRE_INVOICE_ID.find(text).map(|m| m.as_str().to_string()))
            .or_else(|| OUTRE_INVOICE_ID.find(name).map(|m| m.as_str().to_string())),
        Vendor::Unknown => None,
    };

    number.map(|n| n.to_uppercase()).unwrap_or_default()
}
