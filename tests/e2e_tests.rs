//! End-to-end integration tests
//!
//! These tests validate the complete replay pipeline: command CSV in,
//! account states and audit trail out. Each scenario:
//! 1. Writes a command file to a temporary location
//! 2. Replays it through a processing strategy
//! 3. Asserts on the final account CSV and the audit CSV
//!
//! Every scenario is run with both the synchronous and the asynchronous
//! strategy; the fixtures only use command sequences whose outcomes are
//! independent of cross-source interleaving, so both strategies must agree.

use std::io::Write;
use std::path::Path;

use rstest::rstest;
use rust_decimal::Decimal;
use tempfile::NamedTempFile;

use bank_ledger_engine::cli::StrategyType;
use bank_ledger_engine::strategy::create_strategy;

/// Replay a command file and return (accounts CSV, audit CSV)
fn run_replay(commands: &str, strategy_type: StrategyType) -> (String, String) {
    let mut input = NamedTempFile::new().expect("Failed to create temp file");
    input
        .write_all(commands.as_bytes())
        .expect("Failed to write commands");
    input.flush().expect("Failed to flush commands");

    let strategy = create_strategy(strategy_type, None);
    let mut accounts = Vec::new();
    let mut audit = Vec::new();

    strategy
        .process(input.path(), &mut accounts, Some(&mut audit))
        .unwrap_or_else(|e| panic!("Replay failed: {e}"));

    (
        String::from_utf8(accounts).expect("accounts output is not UTF-8"),
        String::from_utf8(audit).expect("audit output is not UTF-8"),
    )
}

/// Parse the accounts CSV into (reference, balance) pairs, header dropped
fn balances(accounts_csv: &str) -> Vec<(String, Decimal)> {
    accounts_csv
        .lines()
        .skip(1)
        .map(|line| {
            let (reference, balance) = line.split_once(',').expect("malformed account row");
            (
                reference.to_string(),
                balance.parse().expect("unparseable balance"),
            )
        })
        .collect()
}

/// Count audit rows (excluding the header) with the given status column
fn audit_rows_with_status(audit_csv: &str, status: &str) -> usize {
    audit_csv
        .lines()
        .skip(1)
        .filter(|line| line.split(',').nth(4) == Some(status))
        .count()
}

#[rstest]
fn test_happy_path_transfer(#[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType) {
    let (accounts, audit) = run_replay(
        "op,account,counterparty,amount\n\
         open,A,,1000.00\n\
         open,B,,500.00\n\
         transfer,A,B,300.00\n",
        strategy,
    );

    assert_eq!(accounts, "account,balance\nA,700.00\nB,800.00\n");
    assert_eq!(audit_rows_with_status(&audit, "COMPLETED"), 1);
    assert_eq!(audit_rows_with_status(&audit, "FAILED"), 0);
}

#[rstest]
fn test_insufficient_balance_leaves_balances_unchanged(
    #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
) {
    let (accounts, audit) = run_replay(
        "op,account,counterparty,amount\n\
         open,A,,1000.00\n\
         open,B,,500.00\n\
         transfer,A,B,1500.00\n",
        strategy,
    );

    assert_eq!(accounts, "account,balance\nA,1000.00\nB,500.00\n");
    assert_eq!(audit_rows_with_status(&audit, "FAILED"), 1);
    assert!(audit.contains("Available: 1000.00"));
    assert!(audit.contains("Required: 1500.00"));
}

#[rstest]
fn test_same_account_transfer_fails(
    #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
) {
    let (accounts, audit) = run_replay(
        "op,account,counterparty,amount\n\
         open,A,,1000.00\n\
         transfer,A,A,100.00\n",
        strategy,
    );

    assert_eq!(accounts, "account,balance\nA,1000.00\n");
    assert_eq!(audit_rows_with_status(&audit, "FAILED"), 1);
    assert!(audit.contains("Source and destination accounts cannot be the same"));
}

#[rstest]
fn test_unknown_source_is_audited(
    #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
) {
    let (accounts, audit) = run_replay(
        "op,account,counterparty,amount\n\
         open,B,,500.00\n\
         transfer,X,B,100.00\n",
        strategy,
    );

    assert_eq!(accounts, "account,balance\nB,500.00\n");
    assert_eq!(audit_rows_with_status(&audit, "FAILED"), 1);
    assert!(audit.contains("Account with ID X not found"));
}

#[rstest]
fn test_duplicate_account_keeps_first_row(
    #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
) {
    let (accounts, _audit) = run_replay(
        "op,account,counterparty,amount\n\
         open,DUP,,100.00\n\
         open,DUP,,999.00\n",
        strategy,
    );

    assert_eq!(accounts, "account,balance\nDUP,100.00\n");
}

#[rstest]
fn test_non_positive_initial_balances_are_rejected(
    #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
) {
    let (accounts, _audit) = run_replay(
        "op,account,counterparty,amount\n\
         open,A,,0.00\n\
         open,B,,-50.00\n\
         open,C,,25.00\n",
        strategy,
    );

    assert_eq!(accounts, "account,balance\nC,25.00\n");
}

#[rstest]
fn test_amountless_transfer_is_audited_not_dropped(
    #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
) {
    let (accounts, audit) = run_replay(
        "op,account,counterparty,amount\n\
         open,A,,100.00\n\
         open,B,,100.00\n\
         transfer,A,B,\n",
        strategy,
    );

    assert_eq!(accounts, "account,balance\nA,100.00\nB,100.00\n");
    assert_eq!(audit_rows_with_status(&audit, "FAILED"), 1);
    assert!(audit.contains("Transaction amount is required"));
}

#[rstest]
fn test_total_balance_is_conserved(
    #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
) {
    // Sources all hold enough for their own debits regardless of incoming
    // credits, so both strategies settle on the same balances.
    let (accounts, audit) = run_replay(
        "op,account,counterparty,amount\n\
         open,A,,1000.00\n\
         open,B,,500.00\n\
         open,C,,250.00\n\
         transfer,A,B,300.00\n\
         transfer,B,C,450.00\n\
         transfer,C,A,100.00\n\
         transfer,A,C,5000.00\n\
         transfer,C,B,0.01\n",
        strategy,
    );

    let total: Decimal = balances(&accounts)
        .iter()
        .map(|(_, balance)| *balance)
        .sum();
    assert_eq!(total, Decimal::new(175000, 2));

    // Every transfer command left exactly one audit row
    assert_eq!(audit.lines().count() - 1, 5);
    assert_eq!(audit_rows_with_status(&audit, "COMPLETED"), 4);
    assert_eq!(audit_rows_with_status(&audit, "FAILED"), 1);
}

#[rstest]
fn test_missing_input_file_is_a_fatal_error(
    #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
) {
    let strategy = create_strategy(strategy, None);
    let mut accounts = Vec::new();

    let result = strategy.process(Path::new("no-such-file.csv"), &mut accounts, None);

    assert!(result.is_err());
    assert!(result.unwrap_err().contains("Failed to open file"));
}
