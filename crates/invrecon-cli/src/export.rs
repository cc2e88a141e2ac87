//! Rendering parsed invoices as JSON, CSV rows or a text summary.

use rust_decimal::Decimal;

use invrecon_core::{LineItem, ParsedInvoice};

/// Columns of the tabular export, one row per line item.
pub const EXPORT_COLUMNS: [&str; 20] = [
    "VENDOR",
    "Invoice No",
    "Invoice Date",
    "Total Amount",
    "Subtotal",
    "Discount",
    "Shipping",
    "Tax",
    "Line No",
    "Item ID",
    "UPC",
    "Description",
    "Brand",
    "Color",
    "Size/Length",
    "Qty Ordered",
    "Qty Shipped",
    "Unit Price",
    "Ext Price",
    "Memo",
];

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension for written outputs.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

fn money(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

fn invoice_date(invoice: &ParsedInvoice) -> String {
    invoice
        .invoice_date
        .map(|d| d.format("%m/%d/%Y").to_string())
        .unwrap_or_default()
}

/// Export row for one line item.
pub fn export_row(invoice: &ParsedInvoice, item: &LineItem) -> [String; 20] {
    [
        invoice.vendor.code().to_string(),
        invoice.invoice_number.clone(),
        invoice_date(invoice),
        money(invoice.total_amount),
        money(invoice.subtotal),
        money(invoice.discount),
        money(invoice.shipping),
        money(invoice.tax),
        item.line_no.to_string(),
        item.item_id.clone(),
        item.upc.clone(),
        item.description.clone(),
        item.brand.clone(),
        item.color.clone(),
        item.size_length.clone(),
        item.qty_ordered.to_string(),
        item.qty_shipped.to_string(),
        money(item.unit_price),
        money(item.ext_price),
        item.memo.clone(),
    ]
}

pub fn format_invoice(invoice: &ParsedInvoice, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(invoice)?),
        OutputFormat::Csv => format_csv(invoice),
        OutputFormat::Text => Ok(format_text(invoice)),
    }
}

fn format_csv(invoice: &ParsedInvoice) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(EXPORT_COLUMNS)?;
    for item in &invoice.line_items {
        wtr.write_record(export_row(invoice, item))?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(invoice: &ParsedInvoice) -> String {
    let mut output = String::new();

    output.push_str(&format!("Vendor: {}\n", invoice.vendor));
    output.push_str(&format!("Invoice: {}\n", invoice.invoice_number));
    output.push_str(&format!("Date: {}\n", invoice_date(invoice)));
    output.push('\n');

    output.push_str("Totals:\n");
    output.push_str(&format!("  Amount:   {}\n", money(invoice.total_amount)));
    output.push_str(&format!("  Subtotal: {}\n", money(invoice.subtotal)));
    output.push_str(&format!("  Discount: {}\n", money(invoice.discount)));
    output.push_str(&format!("  Shipping: {}\n", money(invoice.shipping)));
    output.push_str(&format!("  Tax:      {}\n", money(invoice.tax)));
    output.push('\n');

    output.push_str(&format!("Line items ({}):\n", invoice.line_items.len()));
    for item in &invoice.line_items {
        output.push_str(&format!(
            "  {:>3}  {:<8} {:>4}/{:<4} {:>9} {:>10}  {}\n",
            item.line_no,
            item.color,
            item.qty_shipped,
            item.qty_ordered,
            money(item.unit_price),
            money(item.ext_price),
            item.description
        ));
        if !item.memo.is_empty() {
            output.push_str(&format!("       {}\n", item.memo));
        }
    }

    if !invoice.warnings.is_empty() {
        output.push_str("\nWarnings:\n");
        for warning in &invoice.warnings {
            output.push_str(&format!("  - {}\n", warning));
        }
    }

    output
}
