//! Processing strategy module for command replay
//!
//! This module defines the Strategy pattern for complete replay pipelines,
//! encompassing command-file parsing, engine processing, and report output.
//! This allows different processing implementations (synchronous,
//! asynchronous batch) to be selected at runtime.

use std::io::Write;
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncReplayStrategy, BatchConfig};
pub use sync::SyncReplayStrategy;

use crate::cli::StrategyType;

/// Processing strategy trait for complete replay pipelines
///
/// Each strategy reads ledger commands from a CSV file, applies them
/// through the account manager and transaction engine, writes the final
/// account states to `accounts_out`, and optionally writes the transaction
/// audit trail to `audit_out`.
pub trait ProcessingStrategy: Send + Sync {
    /// Replay commands from the input file and write reports
    ///
    /// # Arguments
    ///
    /// * `input_path` - Path to the command CSV file
    /// * `accounts_out` - Writer for the final account states CSV
    /// * `audit_out` - Optional writer for the transaction audit trail CSV
    ///
    /// # Returns
    ///
    /// * `Ok(())` if all processing completed (individual command failures
    ///   are recorded in the audit trail, not surfaced here)
    /// * `Err(String)` if a fatal error occurred (file not found, I/O
    ///   error, output failure)
    fn process(
        &self,
        input_path: &Path,
        accounts_out: &mut dyn Write,
        audit_out: Option<&mut dyn Write>,
    ) -> Result<(), String>;
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create
/// * `config` - Optional configuration for async batch processing (ignored
///   for sync)
///
/// # Returns
///
/// A boxed trait object implementing the ProcessingStrategy trait
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncReplayStrategy),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncReplayStrategy::new(config))
        }
    }
}
