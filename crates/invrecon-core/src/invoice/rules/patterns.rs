//! Common regex patterns for vendor invoice text.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Money amounts (1,234.56 or 1234.56)
    pub static ref PRICE_TOKEN: Regex = Regex::new(
        r"\b(?:\d{1,3}(?:,\d{3})+|\d+)\.\d{2}\b"
    ).unwrap();

    pub static ref PRICE_LINE_CHARS: Regex = Regex::new(
        r"^[0-9,.\s$]+$"
    ).unwrap();

    pub static ref SIGNED_AMOUNT: Regex = Regex::new(
        r"-?\d[\d,]*\.\d{2}"
    ).unwrap();

    pub static ref TRIPLE_PRICE: Regex = Regex::new(
        r"\d+\.\d{2}\s+\d+\.\d{2}\s+\d+\.\d{2}"
    ).unwrap();

    pub static ref LEADING_TRIPLE_PRICE: Regex = Regex::new(
        r"^\d+\.\d{2}\s*\d+\.\d{2}\s*\d+\.\d{2}\s*"
    ).unwrap();

    pub static ref TRAILING_TRIPLE_PRICE: Regex = Regex::new(
        r"\d+\.\d{2}\s*\d+\.\d{2}\s*\d+\.\d{2}\s*$"
    ).unwrap();

    // Vendor markers
    pub static ref SNG_BRAND: Regex = Regex::new(
        r"(?i)SHAKE-N-GO"
    ).unwrap();

    pub static ref SNG_INVOICE_ID: Regex = Regex::new(
        r"\b3\d{9}\b"
    ).unwrap();

    pub static ref OUTRE_BRAND: Regex = Regex::new(
        r"(?i)\bOUTRE\b|BEAUTIFUL HAIR"
    ).unwrap();

    pub static ref OUTRE_INVOICE_ID: Regex = Regex::new(
        r"(?i)\bSINV\d+\b"
    ).unwrap();

    // Invoice number
    pub static ref OUTRE_INVOICE_LABEL: Regex = Regex::new(
        r"(?i)INVOICE\s*#?\s*:?\s*(SINV\d+)"
    ).unwrap();

    pub static ref FILENAME_INVOICE_NUMBER: Regex = Regex::new(
        r"(\d{10})"
    ).unwrap();

    // Dates (M/D/Y)
    pub static ref INVOICE_DATE_LABEL: Regex = Regex::new(
        r"(?i)INVOICE\s+DATE\s*:?\s*(\d{1,2}/\d{1,2}/\d{2,4})"
    ).unwrap();

    pub static ref SHIPPED_DATE_LABEL: Regex = Regex::new(
        r"(?i)DATE\s+SHIPPED\s*:?\s*(\d{1,2}/\d{1,2}/\d{2,4})"
    ).unwrap();

    pub static ref DATE_MDY: Regex = Regex::new(
        r"\b(\d{1,2})/(\d{1,2})/(\d{4}|\d{2})\b"
    ).unwrap();

    // Totals
    pub static ref INVOICE_AMOUNT_LABEL: Regex = Regex::new(
        r"(?i)INVOICE\s+AMOUNT"
    ).unwrap();

    pub static ref SUBTOTAL_LABEL: Regex = Regex::new(
        r"(?i)SUBTOTAL\s*:?\s*([\d,.]+)"
    ).unwrap();

    pub static ref SUBTOTAL_WORD: Regex = Regex::new(
        r"(?i)SUBTOTAL"
    ).unwrap();

    pub static ref TOTAL_CURRENCY: Regex = Regex::new(
        r"(?i)\bTOTAL\s+US\$\s*(\d[\d,]*(?:\.\d{1,2})?)"
    ).unwrap();

    pub static ref TOTAL_NEAR_AMOUNT: Regex = Regex::new(
        r"(?i)\bTOTAL[\s\S]{0,50}?(\d[\d,]*\.\d{2})"
    ).unwrap();

    pub static ref SUMMARY_END: Regex = Regex::new(
        r"(?i)TOTAL\s+CARTON|TOTAL\s+LB|AR\s+BALANCE|AGING\s+AS"
    ).unwrap();

    pub static ref SUMMARY_LABEL: Regex = Regex::new(
        r"(?i)SUBTOTAL|DISCOUNT|TAX|COD|S\s*&\s*H|TOTAL"
    ).unwrap();

    pub static ref DISCOUNT_LABEL: Regex = Regex::new(
        r"(?i)DISCOUNT\s*:?\s*-?\s*(\d[\d,]*\.\d{2})"
    ).unwrap();

    pub static ref SHIPPING_LABEL: Regex = Regex::new(
        r"(?i)(?:SHIPPING|S\s*&\s*H)(?:\s+CHARGE)?\s*:?\s*(\d[\d,]*\.\d{2})"
    ).unwrap();

    pub static ref TAX_LABEL: Regex = Regex::new(
        r"(?i)\bTAX\s*:?\s*(\d[\d,]*\.\d{2})"
    ).unwrap();

    // Block layout lines
    pub static ref TABLE_HEADER: Regex = Regex::new(
        r"(?i)QTY\s+SHIPPED"
    ).unwrap();

    pub static ref TABLE_HEADER_CONFIRM: Regex = Regex::new(
        r"(?i)DESCRIPTION|UNIT.*PRICE|DISC.*PRICE|EXT.*PRICE"
    ).unwrap();

    pub static ref BARE_QUANTITY: Regex = Regex::new(
        r"^\d+$"
    ).unwrap();

    pub static ref PRODUCT_KEYWORD: Regex = Regex::new(
        r"(?i)HAIR|WIG|LACE|WEAVE|CLIP|REMI|BATIK|SUGARPUNCH|X-PRESSION|BEAUTIFUL|MELTED|BRAID|CLOSURE|WAVE|CURL|STRAIGHT|BUNDLE|PONYTAIL|TARA|QW|BIG|BOHEMIAN|HD|PERUVIAN|TWIST|FEED|LOOKS|PASSION"
    ).unwrap();

    pub static ref METADATA_LINE: Regex = Regex::new(
        r"(?i)\bSHIP\s+TO\b|\bSOLD\s+TO\b|\bWEIGHT\b|\bSUBTOTAL\b|\bRICHMOND\b|\bLLC\b|\bPKWAY\b|\bCOD\b|\bFEE\b|\bTAG\b|\bDATE\s+SHIPPED\b|\bPAGE\b|\bSHIP\s+VIA\b|\bPAYMENT\b|\bTERMS\b|\b\d{3}-\d{3}-\d{4}\b"
    ).unwrap();

    pub static ref DESCRIPTION_EXCEPTION: Regex = Regex::new(
        r"(?i)REMI[\s\-]*TARA[\s\-]*\d+[\-/]\d+[\-/]\d+"
    ).unwrap();

    pub static ref GENERIC_COLOR: Regex = Regex::new(
        r"[A-Z0-9\-/]+\s*-\s*\d+"
    ).unwrap();

    pub static ref PAREN_COLOR: Regex = Regex::new(
        r"\([A-Z]\)[A-Z0-9\-/]+\s*-\s*\d+"
    ).unwrap();

    pub static ref INCH_MARK: Regex = Regex::new(
        r#"\d+["″'`’”]"#
    ).unwrap();

    pub static ref NON_COLOR_BRAND: Regex = Regex::new(
        r"(?i)X-PRESSION|SHAKE-N-GO|BATIK|SUGARPUNCH"
    ).unwrap();

    pub static ref ORPHAN_BACKORDER_LINE: Regex = Regex::new(
        r"^\(\d+\)$"
    ).unwrap();

    pub static ref CONTINUATION_TOKEN: Regex = Regex::new(
        r#"(?i)^\d{1,3}\s*(?:X|"|IN|PCS|PC)$"#
    ).unwrap();

    // Color tokens
    pub static ref COLOR_TOKEN: Regex = Regex::new(
        r"(?i)(\([A-Z]\))?([A-Z0-9/+\-]+)\s*-\s*(\d+)(?:\s*\((\d+)\))?"
    ).unwrap();

    pub static ref ROW_COLOR_TOKEN: Regex = Regex::new(
        r"([A-Z0-9][A-Z0-9\-/]{0,20})\s*-\s*(\d+)\s*(?:\((\d+)\))?"
    ).unwrap();

    pub static ref ORPHAN_BACKORDER: Regex = Regex::new(
        r"\((\d+)\)"
    ).unwrap();

    pub static ref PHONE_NUMBER: Regex = Regex::new(
        r"\b\d{3}-\d{3}-\d{4}\b"
    ).unwrap();

    pub static ref TOLL_FREE_LABEL: Regex = Regex::new(
        r"(?i)\bTOLL[\s\-]*FREE\b:?"
    ).unwrap();

    pub static ref COLOR_SHAPE: Regex = Regex::new(
        r"^[A-Za-z0-9\-/+]+$"
    ).unwrap();

    pub static ref NUMERIC_COMPOSITE: Regex = Regex::new(
        r"^\d{1,3}(?:\+\d{1,3})+$"
    ).unwrap();

    pub static ref LINE_REFERENCE_TAIL: Regex = Regex::new(
        r"\s+\d+(?:-\d+){1,2}$"
    ).unwrap();

    // Row layout
    pub static ref ROW_PRICE: Regex = Regex::new(
        r"(?:\d{1,3}(?:,\d{3})+|\d+)\.\d{2}"
    ).unwrap();

    pub static ref PREFIX_WORD: Regex = Regex::new(
        r"[A-Z][A-Z0-9]+"
    ).unwrap();

    pub static ref PACKED_BY: Regex = Regex::new(
        r"^(?:[A-Z]\d{1,3}|[A-Z]{2,3})$"
    ).unwrap();

    // Three characters, so short codes like `T30` still parse as items
    pub static ref ITEM_ID: Regex = Regex::new(
        r"^[A-Z][A-Z0-9]{2,}$"
    ).unwrap();

    pub static ref ITEM_CODE_SHAPE: Regex = Regex::new(
        r"^[A-Z0-9]{7}$"
    ).unwrap();

    pub static ref ROW_HEADER: Regex = Regex::new(
        r"(?i)INVOICE DATE|DUE DATE|SHIP VIA|ORDER DATE|SALESPERSON|TERMS|C\.O\.D|PACKED BY|QTY ORDERED|QTY SHIPPED|ITEM NUMBER|DESCRIPTION|LIST PRICE|YOUR PRICE|LIST EXTENDED|YOUR EXTENDED|DISCOUNTED"
    ).unwrap();

    // Description normalization
    pub static ref QUOTE_VARIANTS: Regex = Regex::new(
        r#"[″'`‘’“”]"#
    ).unwrap();

    pub static ref WHITESPACE_RUN: Regex = Regex::new(
        r"\s+"
    ).unwrap();

    pub static ref HYPHEN_RUN: Regex = Regex::new(
        r"-+"
    ).unwrap();

    pub static ref SPACED_HYPHEN: Regex = Regex::new(
        r"\s*-\s*"
    ).unwrap();

    // Size markers
    pub static ref SIZE_UNIT_JOIN: Regex = Regex::new(
        r"(?i)(\d+)\s*(PCS|PC|INCH|IN)\b"
    ).unwrap();

    pub static ref SIZE_QUOTE_JOIN: Regex = Regex::new(
        r#"(\d+)\s+""#
    ).unwrap();

    pub static ref SIZE_TOKEN: Regex = Regex::new(
        r#"^\d+(?:"|X|PCS|PC|INCH|IN)$"#
    ).unwrap();

    pub static ref SIZE_LENGTH: Regex = Regex::new(
        r#"(\d+)\s*""#
    ).unwrap();
}
