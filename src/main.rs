//! Bank Ledger Engine CLI
//!
//! Command-line interface for replaying ledger commands from CSV files.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- commands.csv > accounts.csv
//! cargo run -- --strategy sync commands.csv > accounts.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 commands.csv > accounts.csv
//! cargo run -- --audit audit.csv commands.csv > accounts.csv
//! ```
//!
//! The program reads account and transfer commands from the input CSV file,
//! replays them through the ledger engine using the selected strategy, and
//! outputs the final account states to stdout. With `--audit`, the full
//! transaction audit trail (including failed transfers and their reasons)
//! is written to the given file.
//!
//! Log output goes to stderr and is controlled with `RUST_LOG`.
//!
//! # Processing Strategies
//!
//! - **sync**: single-threaded replay in strict file order (default)
//! - **async**: batched replay, concurrent across source accounts
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, output failure, etc.)

use std::fs::File;
use std::io::Write;
use std::process;

use tracing_subscriber::EnvFilter;

use bank_ledger_engine::cli;
use bank_ledger_engine::strategy;

fn main() {
    // Log to stderr so stdout stays a clean CSV stream
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Parse command-line arguments using clap
    let args = cli::parse_args();

    // Create the appropriate processing strategy based on CLI arguments
    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, config)
    };

    let mut audit_file = match &args.audit_file {
        Some(path) => match File::create(path) {
            Ok(file) => Some(file),
            Err(e) => {
                eprintln!("Error: failed to create audit file '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => None,
    };

    // Replay commands using the selected strategy; accounts go to stdout
    let mut output = std::io::stdout();
    let audit_out = audit_file.as_mut().map(|file| file as &mut dyn Write);
    if let Err(e) = strategy.process(&args.input_file, &mut output, audit_out) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
