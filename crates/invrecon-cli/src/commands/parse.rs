//! Parse command - extract line items from a single invoice text file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Args;
use console::style;
use tracing::{debug, info};

use invrecon_core::InvoiceEngine;

use super::config::load_config;
use crate::catalog::build_index;
use crate::export::{format_invoice, OutputFormat};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input file (text extracted from the invoice PDF)
    #[arg(required = true)]
    input: PathBuf,

    /// Catalog CSV used for item enrichment
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Original document name used for vendor detection (default: input file name)
    #[arg(long)]
    name: Option<String>,
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Parsing file: {}", args.input.display());

    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let index = build_index(args.catalog.as_deref())?;

    let filename = args.name.clone().unwrap_or_else(|| {
        args.input
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string()
    });

    let engine = InvoiceEngine::new(config);
    let invoice = engine.parse(&text, &filename, &index)?;

    if !invoice.warnings.is_empty() {
        eprintln!("{}", style("Validation issues:").yellow());
        for issue in &invoice.warnings {
            eprintln!("  - {}", issue);
        }
    }

    let output = format_invoice(&invoice, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} {} line items written to {}",
            style("✓").green(),
            invoice.line_items.len(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
