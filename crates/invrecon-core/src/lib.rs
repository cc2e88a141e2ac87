//! Core library for vendor invoice parsing and reconciliation.
//!
//! This crate provides:
//! - Vendor detection for block-layout (OUTRE) and row-layout (Shake-N-Go) text
//! - Line item extraction with per-color splitting and price allocation
//! - Header totals, invoice number and date extraction
//! - Catalog matching (exact and token-similarity) with item enrichment
//!
//! The crate performs no I/O: callers pass extracted text and a
//! [`CatalogIndex`] built from their catalog snapshot.

pub mod catalog;
pub mod error;
pub mod invoice;
pub mod models;

pub use catalog::{CatalogIndex, CatalogMatch, MatchType};
pub use error::{InvreconError, ParseError, Result};
pub use invoice::{InvoiceEngine, LineItemParser};
pub use models::{
    CatalogRecord, EngineConfig, Layout, LineItem, MatchThresholds, ParsedInvoice, ScanConfig,
    TotalsConfig, ValidationConfig, Vendor, Warning,
};
