//! Bank Ledger Engine Library
//! # Overview
//!
//! This library records bank accounts, moves money between them, and keeps a
//! durable audit trail of every attempted transfer, successful or failed.
//! Money is never created, destroyed, or silently lost: balances change only
//! through completed transfers, and every failure is recorded with a reason.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, TransactionRecord, errors)
//! - [`cli`] - CLI argument parsing
//! - [`core`] - Business logic components:
//!   - [`core::engine`] - The transfer-processing pipeline and audit recording
//!   - [`core::account_manager`] - Account creation and lookup
//!   - [`core::traits`] - Storage collaborator abstractions
//!   - [`core::memory`] - In-memory store implementations
//! - [`io`] - Command-file parsing and report output
//! - [`strategy`] - Replay strategies (synchronous and batched asynchronous)
//!
//! # Transfer Outcomes
//!
//! Processing a transfer always yields a [`TransferOutcome`] carrying the
//! persisted transaction record:
//!
//! - **Completed**: both balances were updated atomically
//! - **Failed**: nothing moved; the record holds the failure reason
//!   (unknown account, same-account transfer, missing or non-positive
//!   amount, insufficient balance, storage failure)
//!
//! # Concurrency
//!
//! Account rows carry an optimistic-concurrency version; the engine retries
//! conflicted saves after re-validating, so concurrent transfers against a
//! shared account cannot jointly overdraw it.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use crate::core::{
    AccountManager, AccountStore, InMemoryAccountStore, InMemoryTransactionStore,
    TransactionEngine, TransactionStore,
};
pub use io::{write_accounts_csv, write_audit_csv};
pub use types::{
    Account, AccountId, LedgerError, TransactionRecord, TransactionStatus, TransferOutcome,
    TransferRequest,
};
