//! CSV parsing for bank exports
//!
//! - [`parser`] reads CSV text into rows keyed by header
//! - [`columns`] works out which header holds which field
//! - [`normalize`] turns a row into a dated, signed amount
//!
//! Storage-backed preview and import live in
//! [`crate::services::ImportService`].

pub mod columns;
pub mod normalize;
pub mod parser;

pub use columns::{detect_columns, ColumnMapping};
pub use normalize::{normalize_row, parse_date, ParsedTransaction};
pub use parser::{parse_csv, read_csv, CsvRow, CsvTable};
