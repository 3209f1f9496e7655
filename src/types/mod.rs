//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account-related types
//! - `transaction`: Transfer requests, transaction records, and outcomes
//! - `error`: Error types for the ledger engine

pub mod account;
pub mod error;
pub mod transaction;

pub use account::{Account, AccountId};
pub use error::LedgerError;
pub use transaction::{TransactionRecord, TransactionStatus, TransferOutcome, TransferRequest};
