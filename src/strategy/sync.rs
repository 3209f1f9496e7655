//! Synchronous replay strategy
//!
//! This module provides a synchronous, single-threaded implementation of
//! the ProcessingStrategy trait. Commands are applied strictly in file
//! order, which makes it the reference strategy: given the same input it
//! always produces the same account states and the same audit outcomes.
//!
//! # Design
//!
//! The SyncReplayStrategy focuses on orchestration, delegating:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - Account creation to `AccountManager`
//! - Transfer processing to `TransactionEngine`
//! - CSV output to the `csv_format` module
//!
//! # Memory Efficiency
//!
//! Commands stream through one at a time; memory usage is
//! O(accounts + transaction_records), not O(command_file).

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use crate::core::{
    AccountManager, InMemoryAccountStore, InMemoryTransactionStore, TransactionEngine,
};
use crate::io::csv_format::{write_accounts_csv, write_audit_csv};
use crate::io::sync_reader::SyncReader;
use crate::io::Command;
use crate::strategy::ProcessingStrategy;

/// Synchronous replay strategy
///
/// Implements the ProcessingStrategy trait using single-threaded,
/// in-file-order processing.
#[derive(Debug, Clone, Copy)]
pub struct SyncReplayStrategy;

impl ProcessingStrategy for SyncReplayStrategy {
    /// Replay commands from the input file and write reports
    ///
    /// This method orchestrates the complete synchronous pipeline:
    /// 1. Creates the in-memory stores, account manager, and engine
    /// 2. Streams commands from the CSV file
    /// 3. Applies each command; rejected account creations are logged,
    ///    transfer outcomes are collected for the audit trail
    /// 4. Writes final account states (and optionally the audit trail)
    ///
    /// # Error Handling
    ///
    /// Fatal errors (file not found, output I/O) are returned immediately.
    /// Individual command failures are logged or audited and processing
    /// continues with the next command.
    fn process(
        &self,
        input_path: &Path,
        accounts_out: &mut dyn Write,
        audit_out: Option<&mut dyn Write>,
    ) -> Result<(), String> {
        let accounts = Arc::new(InMemoryAccountStore::new());
        let transactions = Arc::new(InMemoryTransactionStore::new());
        let manager = AccountManager::new(Arc::clone(&accounts));
        let engine = TransactionEngine::new(Arc::clone(&accounts), Arc::clone(&transactions));

        let reader = SyncReader::new(input_path)?;
        let mut audit = Vec::new();

        for result in reader {
            match result {
                Ok(Command::Open {
                    ref_id,
                    initial_balance,
                }) => {
                    // Creation failures are hard rejections with no record;
                    // log and continue the replay
                    if let Err(error) = manager.create_account(&ref_id, initial_balance) {
                        tracing::warn!(account = %ref_id, %error, "account creation rejected");
                    }
                }
                Ok(Command::Transfer(request)) => {
                    let outcome = engine.process_transfer(request);
                    audit.push(outcome.into_record());
                }
                Err(error) => {
                    tracing::warn!(%error, "skipping malformed command row");
                }
            }
        }

        write_accounts_csv(&accounts.snapshot(), accounts_out)?;
        if let Some(audit_out) = audit_out {
            write_audit_csv(&audit, audit_out)?;
        }

        Ok(())
    }
}
