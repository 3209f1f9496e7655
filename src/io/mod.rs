//! I/O module
//!
//! Command-file parsing and report output:
//! - `csv_format` - Row parsing and accounts/audit CSV serialization
//! - `sync_reader` - Streaming synchronous command reader
//! - `async_reader` - Batched asynchronous command reader

pub mod async_reader;
pub mod csv_format;
pub mod sync_reader;

pub use csv_format::{write_accounts_csv, write_audit_csv, Command};
