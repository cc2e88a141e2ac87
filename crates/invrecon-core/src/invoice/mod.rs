//! Invoice text parsing.

pub mod allocate;
pub mod block;
mod parser;
pub mod row;
pub mod rules;
pub mod vendor;

pub use block::BlockLayoutParser;
pub use parser::{InvoiceEngine, LineItemParser, size_length};
pub use row::RowLayoutParser;
pub use vendor::{detect_vendor, extract_invoice_number};
