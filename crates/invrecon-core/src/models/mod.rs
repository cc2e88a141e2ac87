//! Data models for parsed invoices, catalog records and configuration.

pub mod catalog;
pub mod config;
pub mod invoice;
pub mod warning;

pub use catalog::CatalogRecord;
pub use config::{EngineConfig, MatchThresholds, ScanConfig, TotalsConfig, ValidationConfig};
pub use invoice::{Layout, LineItem, ParsedInvoice, Vendor};
pub use warning::Warning;
