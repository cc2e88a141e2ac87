//! Catalog snapshot loading from CSV.

use std::path::Path;

use anyhow::Context;
use tracing::{debug, info};

use invrecon_core::{CatalogIndex, CatalogRecord};

const DESCRIPTION_HEADERS: &[&str] = &["ITEM NAME", "DESCRIPTION"];
const ITEM_NUMBER_HEADERS: &[&str] = &["ITEM NUMBER", "ITEM CODE"];
const COLOR_HEADERS: &[&str] = &["COLOR"];
const BARCODE_HEADERS: &[&str] = &["BARCODE", "UPC"];

fn column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
}

/// Read catalog records from a CSV file.
///
/// Accepts `ITEM NUMBER, ITEM NAME, COLOR, BARCODE` or
/// `Item Code, Description, Color, Barcode` headers in any order.
pub fn load_records(path: &Path) -> anyhow::Result<Vec<CatalogRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open catalog {}", path.display()))?;

    let headers = reader.headers()?.clone();
    let description = column(&headers, DESCRIPTION_HEADERS).ok_or_else(|| {
        anyhow::anyhow!(
            "Catalog {} has no description column (expected ITEM NAME or Description)",
            path.display()
        )
    })?;
    let item_number = column(&headers, ITEM_NUMBER_HEADERS);
    let color = column(&headers, COLOR_HEADERS);
    let barcode = column(&headers, BARCODE_HEADERS);

    let field = |record: &csv::StringRecord, idx: Option<usize>| {
        idx.and_then(|i| record.get(i)).unwrap_or("").to_string()
    };

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        records.push(CatalogRecord::new(
            field(&row, Some(description)),
            field(&row, item_number),
            field(&row, color),
            field(&row, barcode),
        ));
    }

    debug!("Read {} catalog rows from {}", records.len(), path.display());
    Ok(records)
}

/// Build the batch catalog index, empty when no catalog is given.
pub fn build_index(path: Option<&Path>) -> anyhow::Result<CatalogIndex> {
    match path {
        Some(path) => {
            let index = CatalogIndex::build(load_records(path)?);
            info!(
                "Loaded catalog {} ({} records)",
                path.display(),
                index.len()
            );
            Ok(index)
        }
        None => Ok(CatalogIndex::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_records_accepts_both_header_styles() {
        let mut upper = tempfile::NamedTempFile::new().unwrap();
        writeln!(upper, "ITEM NUMBER,ITEM NAME,COLOR,BARCODE").unwrap();
        writeln!(upper, "QW1,QW WIG PERRY,1B,0001").unwrap();

        let mut titled = tempfile::NamedTempFile::new().unwrap();
        writeln!(titled, "Barcode,Color,Description,Item Code").unwrap();
        writeln!(titled, "0001,1B,QW WIG PERRY,QW1").unwrap();

        for file in [&upper, &titled] {
            let records = load_records(file.path()).unwrap();
            assert_eq!(
                records,
                vec![CatalogRecord::new("QW WIG PERRY", "QW1", "1B", "0001")]
            );
        }
    }

    #[test]
    fn test_load_records_requires_description() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "SKU,COLOR").unwrap();
        assert!(load_records(file.path()).is_err());
    }
}
