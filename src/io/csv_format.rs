//! CSV format handling for ledger commands and report output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization of command rows
//! - Conversion from CSV records to ledger commands
//! - Account state and audit trail serialization
//!
//! All functions are pure (no I/O) for easy testing.

use std::io::Write;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::{Account, TransactionRecord, TransferRequest};

/// CSV record structure for deserialization
///
/// Matches the command file format with columns: op, account, counterparty,
/// amount. The counterparty column is empty for `open` commands, and the
/// amount may be absent on malformed transfer rows (which the engine
/// records as failed transactions rather than this layer rejecting them).
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    pub op: String,
    pub account: String,
    pub counterparty: Option<String>,
    pub amount: Option<String>,
}

/// A single replayable ledger command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Create an account with an opening balance
    Open {
        /// Account reference to create
        ref_id: String,
        /// Opening balance
        initial_balance: Decimal,
    },

    /// Move money between two accounts
    Transfer(TransferRequest),
}

/// Convert a CsvRecord to a ledger Command
///
/// This function:
/// - Parses the op column (`open` or `transfer`, case-insensitive)
/// - Parses the amount string into a Decimal (if present)
/// - Requires an amount for `open` commands
///
/// A `transfer` row with a missing amount or empty counterparty is NOT an
/// error here: it converts into a request the engine will fail and record,
/// which is exactly the audit behavior the ledger promises.
///
/// # Arguments
///
/// * `csv_record` - The deserialized CSV record
///
/// # Returns
///
/// Result containing either:
/// - Ok(Command) - Successfully converted record
/// - Err(String) - Error message describing the conversion failure
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<Command, String> {
    // Parse amount if present
    let amount = match csv_record.amount {
        Some(amount_str) if !amount_str.trim().is_empty() => {
            match Decimal::from_str(amount_str.trim()) {
                Ok(decimal) => Some(decimal),
                Err(_) => {
                    return Err(format!(
                        "Invalid amount '{}' for account {}",
                        amount_str, csv_record.account
                    ))
                }
            }
        }
        _ => None,
    };

    match csv_record.op.to_lowercase().as_str() {
        "open" => {
            if csv_record.account.is_empty() {
                return Err("open command requires an account reference".to_string());
            }
            let initial_balance = amount.ok_or_else(|| {
                format!(
                    "open command for account {} requires an amount",
                    csv_record.account
                )
            })?;
            Ok(Command::Open {
                ref_id: csv_record.account,
                initial_balance,
            })
        }
        "transfer" => Ok(Command::Transfer(TransferRequest {
            source_ref: csv_record.account,
            destination_ref: csv_record.counterparty.unwrap_or_default(),
            amount,
        })),
        other => Err(format!(
            "Invalid operation '{}' for account {}",
            other, csv_record.account
        )),
    }
}

/// Write account states to CSV format
///
/// Writes accounts in CSV format with columns: account, balance.
/// Accounts are sorted by reference for deterministic output.
///
/// # Arguments
///
/// * `accounts` - Slice of account states to write
/// * `output` - Mutable reference to a writer for outputting CSV
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_accounts_csv(accounts: &[Account], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut sorted: Vec<&Account> = accounts.iter().collect();
    sorted.sort_by(|a, b| a.ref_id.cmp(&b.ref_id));

    let mut writer = Writer::from_writer(output);
    writer
        .write_record(["account", "balance"])
        .map_err(|e| format!("Failed to write CSV header: {e}"))?;

    for account in sorted {
        let balance = account.balance.to_string();
        writer
            .write_record([account.ref_id.as_str(), balance.as_str()])
            .map_err(|e| format!("Failed to write account record: {e}"))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {e}"))?;
    Ok(())
}

/// Write the transaction audit trail to CSV format
///
/// Writes one row per transaction record with columns: transaction, source,
/// destination, amount, status, error. The amount column is empty when the
/// original request carried no amount.
///
/// # Arguments
///
/// * `records` - Slice of transaction records to write
/// * `output` - Mutable reference to a writer for outputting CSV
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_audit_csv(records: &[TransactionRecord], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);
    writer
        .write_record([
            "transaction",
            "source",
            "destination",
            "amount",
            "status",
            "error",
        ])
        .map_err(|e| format!("Failed to write CSV header: {e}"))?;

    for record in records {
        let amount = record
            .amount
            .map(|amount| amount.to_string())
            .unwrap_or_default();
        writer
            .write_record([
                record.ref_id.as_str(),
                record.source_ref.as_str(),
                record.destination_ref.as_str(),
                amount.as_str(),
                record.status.as_str(),
                record.error_message.as_deref().unwrap_or_default(),
            ])
            .map_err(|e| format!("Failed to write audit record: {e}"))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {e}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionStatus;
    use rstest::rstest;

    fn record(
        op: &str,
        account: &str,
        counterparty: Option<&str>,
        amount: Option<&str>,
    ) -> CsvRecord {
        CsvRecord {
            op: op.to_string(),
            account: account.to_string(),
            counterparty: counterparty.map(str::to_string),
            amount: amount.map(str::to_string),
        }
    }

    #[test]
    fn test_convert_open_command() {
        let command = convert_csv_record(record("open", "ACC-1", None, Some("1000.00"))).unwrap();

        assert_eq!(
            command,
            Command::Open {
                ref_id: "ACC-1".to_string(),
                initial_balance: Decimal::new(100000, 2),
            }
        );
    }

    #[test]
    fn test_convert_transfer_command() {
        let command =
            convert_csv_record(record("transfer", "ACC-1", Some("ACC-2"), Some("300.00"))).unwrap();

        match command {
            Command::Transfer(request) => {
                assert_eq!(request.source_ref, "ACC-1");
                assert_eq!(request.destination_ref, "ACC-2");
                assert_eq!(request.amount, Some(Decimal::new(30000, 2)));
            }
            other => panic!("Expected transfer, got {other:?}"),
        }
    }

    #[test]
    fn test_op_is_case_insensitive() {
        assert!(convert_csv_record(record("OPEN", "ACC-1", None, Some("1.00"))).is_ok());
        assert!(convert_csv_record(record("Transfer", "A", Some("B"), Some("1.00"))).is_ok());
    }

    #[test]
    fn test_transfer_without_amount_converts_to_amountless_request() {
        let command = convert_csv_record(record("transfer", "ACC-1", Some("ACC-2"), None)).unwrap();

        match command {
            Command::Transfer(request) => assert_eq!(request.amount, None),
            other => panic!("Expected transfer, got {other:?}"),
        }
    }

    #[test]
    fn test_transfer_without_counterparty_converts_to_empty_destination() {
        let command = convert_csv_record(record("transfer", "ACC-1", None, Some("5.00"))).unwrap();

        match command {
            Command::Transfer(request) => assert_eq!(request.destination_ref, ""),
            other => panic!("Expected transfer, got {other:?}"),
        }
    }

    #[rstest]
    #[case::open_without_amount(record("open", "ACC-1", None, None))]
    #[case::open_without_account(record("open", "", None, Some("1.00")))]
    #[case::unknown_op(record("close", "ACC-1", None, None))]
    #[case::unparseable_amount(record("transfer", "A", Some("B"), Some("abc")))]
    fn test_invalid_records_are_rejected(#[case] csv_record: CsvRecord) {
        assert!(convert_csv_record(csv_record).is_err());
    }

    #[test]
    fn test_write_accounts_csv_sorts_by_reference() {
        let accounts = vec![
            Account::new("B", Decimal::new(80000, 2)),
            Account::new("A", Decimal::new(70000, 2)),
        ];
        let mut output = Vec::new();

        write_accounts_csv(&accounts, &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text, "account,balance\nA,700.00\nB,800.00\n");
    }

    #[test]
    fn test_write_audit_csv_includes_failure_reason() {
        let records = vec![TransactionRecord {
            ref_id: "tx-1".to_string(),
            source_ref: "A".to_string(),
            destination_ref: "B".to_string(),
            amount: Some(Decimal::new(150000, 2)),
            status: TransactionStatus::Failed,
            error_message: Some("Insufficient balance in source account. Available: 1000.00, Required: 1500.00".to_string()),
        }];
        let mut output = Vec::new();

        write_audit_csv(&records, &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.starts_with("transaction,source,destination,amount,status,error\n"));
        assert!(text.contains("tx-1,A,B,1500.00,FAILED,"));
        assert!(text.contains("Available: 1000.00"));
    }
}
