//! Asynchronous batched replay strategy
//!
//! This module provides a multi-threaded implementation of the
//! ProcessingStrategy trait. Commands are read in batches; within a batch,
//! account openings are applied first in file order, then transfers are
//! partitioned by source account and the partitions run concurrently on a
//! tokio runtime.
//!
//! # Ordering
//!
//! - Batches are processed sequentially, so per-source ordering holds
//!   across the whole file.
//! - Within a batch, transfers from the same source account stay in file
//!   order; transfers from different sources may interleave.
//! - Credits are unconditional additions and transfers against a shared
//!   destination are serialized by the store's version checks, so
//!   concurrent partitions cannot corrupt balances.
//!
//! # Architecture
//!
//! ```text
//! AsyncReplayStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncReader (batch CSV reading)
//!     ├── BatchProcessor (source partitioning + task spawning)
//!     └── TransactionEngine (shared, thread-safe)
//! ```

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use crate::core::traits::{AccountStore, TransactionStore};
use crate::core::{
    AccountManager, InMemoryAccountStore, InMemoryTransactionStore, TransactionEngine,
};
use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::{write_accounts_csv, write_audit_csv};
use crate::io::Command;
use crate::strategy::ProcessingStrategy;
use crate::types::{TransactionRecord, TransferRequest};

/// Configuration for batch processing
///
/// Controls how many commands are read per batch and the number of worker
/// threads used to process partitions within a batch.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Number of commands per batch
    pub batch_size: usize,
    /// Maximum number of partitions processing concurrently
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    ///
    /// Zero values fall back to the defaults with a warning.
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            tracing::warn!(
                "invalid batch_size (0), using default ({})",
                default.batch_size
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            tracing::warn!(
                "invalid max_concurrent_batches (0), using default ({})",
                default.max_concurrent_batches
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Batch processor with source-account partitioning
///
/// Partitions a batch of transfers by source account so that transfers
/// debiting different accounts run concurrently while each account's
/// debits keep their file order.
pub struct BatchProcessor<A: AccountStore + 'static, T: TransactionStore + 'static> {
    /// Shared transfer-processing engine
    engine: Arc<TransactionEngine<A, T>>,
}

impl<A: AccountStore + 'static, T: TransactionStore + 'static> Clone for BatchProcessor<A, T> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<A: AccountStore + 'static, T: TransactionStore + 'static> BatchProcessor<A, T> {
    /// Create a new BatchProcessor over a shared engine
    pub fn new(engine: Arc<TransactionEngine<A, T>>) -> Self {
        Self { engine }
    }

    /// Partition a batch of transfers by source account
    ///
    /// # Guarantees
    ///
    /// - Each transfer appears in exactly one partition
    /// - Transfers for each source keep their original order
    pub fn partition_by_source(
        &self,
        batch: Vec<TransferRequest>,
    ) -> HashMap<String, Vec<TransferRequest>> {
        let mut partitions: HashMap<String, Vec<TransferRequest>> = HashMap::new();

        for request in batch {
            partitions
                .entry(request.source_ref.clone())
                .or_default()
                .push(request);
        }

        partitions
    }

    /// Process all transfers for a single source account sequentially
    ///
    /// Returns one transaction record per transfer, in input order.
    pub async fn process_source_transfers(
        &self,
        transfers: Vec<TransferRequest>,
    ) -> Vec<TransactionRecord> {
        let mut records = Vec::with_capacity(transfers.len());

        for request in transfers {
            records.push(self.engine.process_transfer(request).into_record());
        }

        records
    }

    /// Process a batch of transfers with source-account partitioning
    ///
    /// Spawns one tokio task per partition and waits for all of them.
    /// Records may come back in a different order than the input due to
    /// concurrent processing; every transfer yields exactly one record.
    pub async fn process_batch(&self, batch: Vec<TransferRequest>) -> Vec<TransactionRecord> {
        let partitions = self.partition_by_source(batch);

        let mut tasks = Vec::new();
        for (_source_ref, transfers) in partitions {
            let processor = self.clone();
            tasks.push(tokio::spawn(async move {
                processor.process_source_transfers(transfers).await
            }));
        }

        let mut records = Vec::new();
        for task in tasks {
            match task.await {
                Ok(partition_records) => records.extend(partition_records),
                Err(e) => tracing::error!(error = %e, "batch partition task panicked"),
            }
        }

        records
    }
}

/// Asynchronous batched replay strategy
///
/// Implements the ProcessingStrategy trait using batched, multi-threaded
/// replay over thread-safe shared state (Arc-wrapped engine, DashMap-backed
/// stores with optimistic version checks).
#[derive(Debug, Clone)]
pub struct AsyncReplayStrategy {
    /// Batch processing configuration
    config: BatchConfig,
}

impl AsyncReplayStrategy {
    /// Create a new AsyncReplayStrategy with the specified configuration
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }
}

impl ProcessingStrategy for AsyncReplayStrategy {
    /// Replay commands from the input file and write reports
    ///
    /// This method implements the complete asynchronous pipeline:
    /// 1. Creates the shared stores, account manager, and engine
    /// 2. Creates a tokio multi-threaded runtime
    /// 3. Reads commands in batches using AsyncReader
    /// 4. Applies each batch's account openings first, in file order
    /// 5. Partitions the batch's transfers by source account and processes
    ///    partitions concurrently
    /// 6. Waits for each batch before reading the next, preserving
    ///    per-source ordering across batches
    /// 7. Writes final account states (and optionally the audit trail)
    fn process(
        &self,
        input_path: &Path,
        accounts_out: &mut dyn Write,
        audit_out: Option<&mut dyn Write>,
    ) -> Result<(), String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {e}"))?;

        runtime.block_on(async {
            let accounts = Arc::new(InMemoryAccountStore::new());
            let transactions = Arc::new(InMemoryTransactionStore::new());
            let manager = AccountManager::new(Arc::clone(&accounts));
            let engine = Arc::new(TransactionEngine::new(
                Arc::clone(&accounts),
                Arc::clone(&transactions),
            ));
            let processor = BatchProcessor::new(Arc::clone(&engine));

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| format!("Failed to open file '{}': {}", input_path.display(), e))?;

            // Wrap tokio file in a compatibility layer for csv-async
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);

            let mut audit = Vec::new();

            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                // Openings first so transfers in the same batch can see the
                // accounts they reference
                let mut transfers = Vec::new();
                for command in batch {
                    match command {
                        Command::Open {
                            ref_id,
                            initial_balance,
                        } => {
                            if let Err(error) = manager.create_account(&ref_id, initial_balance) {
                                tracing::warn!(account = %ref_id, %error, "account creation rejected");
                            }
                        }
                        Command::Transfer(request) => transfers.push(request),
                    }
                }

                // Wait for the whole batch so a source spanning multiple
                // batches keeps its debits in order
                let records = processor.process_batch(transfers).await;
                audit.extend(records);
            }

            write_accounts_csv(&accounts.snapshot(), accounts_out)?;
            if let Some(audit_out) = audit_out {
                write_audit_csv(&audit, audit_out)?;
            }

            Ok(())
        })
    }
}
