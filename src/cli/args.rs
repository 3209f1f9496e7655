use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::strategy::BatchConfig;

/// Replay bank account and transfer commands against the ledger engine
#[derive(Parser, Debug)]
#[command(name = "bank-ledger-engine")]
#[command(
    about = "Replay account and transfer commands, producing final balances and an audit trail",
    long_about = None
)]
pub struct CliArgs {
    /// Input CSV file path containing ledger commands
    #[arg(value_name = "INPUT", help = "Path to the input command CSV file")]
    pub input_file: PathBuf,

    /// Processing strategy to use for replaying commands
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "sync",
        help = "Processing strategy: 'sync' for in-order replay or 'async' for batched concurrent replay"
    )]
    pub strategy: StrategyType,

    /// Where to write the transaction audit trail CSV
    #[arg(
        long = "audit",
        value_name = "PATH",
        help = "Write the transaction audit trail to this CSV file"
    )]
    pub audit_file: Option<PathBuf>,

    /// Number of commands per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of commands per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Maximum number of concurrent partitions (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Maximum number of partitions processing concurrently (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,
}

/// Available processing strategies for command replay
#[derive(Clone, Debug, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Uses the CLI values where provided and falls back to defaults
    /// otherwise; zero values are rejected by `BatchConfig::new` with a
    /// warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent_batches.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent_batches
                    .unwrap_or(default.max_concurrent_batches),
            )
        } else {
            BatchConfig::default()
        }
    }
}
