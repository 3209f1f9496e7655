//! Transaction-related types for the bank ledger engine
//!
//! This module defines the transfer request, the durable transaction record
//! that forms the audit trail, and the tagged outcome returned by the engine.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Processing state of a transaction record
///
/// `Processing` is the sole initial state, reached only once the engine has
/// committed to attempting the balance mutation. `Completed` and `Failed`
/// are terminal: no transitions are possible out of them, and the stores
/// refuse to overwrite a terminal record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    /// The engine has persisted the record and is mutating balances
    Processing,

    /// The transfer landed; both balances were updated
    Completed,

    /// The transfer did not happen; `error_message` holds the reason
    Failed,
}

impl TransactionStatus {
    /// Whether this status admits no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TransactionStatus::Completed | TransactionStatus::Failed
        )
    }

    /// The canonical wire spelling of this status
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionStatus::Processing => "PROCESSING",
            TransactionStatus::Completed => "COMPLETED",
            TransactionStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transfer request as received from the caller
///
/// The amount is optional because a request without one is still a request:
/// the engine records it as a failed transaction rather than rejecting it
/// at the door.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    /// Reference of the account to debit
    pub source_ref: String,

    /// Reference of the account to credit
    pub destination_ref: String,

    /// Requested amount, if the caller supplied one
    pub amount: Option<Decimal>,
}

/// Durable record of a single transfer attempt
///
/// One record is created per processed request, successful or not; together
/// they are the audit trail. Account references are captured verbatim from
/// the request even when no such account exists, so failed lookups still
/// leave a traceable row.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    /// System-generated unique reference (UUID), fixed at the start of
    /// processing regardless of outcome
    pub ref_id: String,

    /// Source account reference, verbatim from the request
    pub source_ref: String,

    /// Destination account reference, verbatim from the request
    pub destination_ref: String,

    /// Requested amount, recorded even on failure
    ///
    /// `None` only when the request itself carried no amount, which is
    /// itself one of the recorded failure modes.
    pub amount: Option<Decimal>,

    /// Current processing state
    pub status: TransactionStatus,

    /// Failure reason; `None` unless `status` is `Failed`
    pub error_message: Option<String>,
}

impl TransactionRecord {
    /// Create a record in the `Processing` state for a committed attempt
    pub fn processing(ref_id: &str, request: &TransferRequest) -> Self {
        TransactionRecord {
            ref_id: ref_id.to_string(),
            source_ref: request.source_ref.clone(),
            destination_ref: request.destination_ref.clone(),
            amount: request.amount,
            status: TransactionStatus::Processing,
            error_message: None,
        }
    }

    /// Create a record in the `Failed` state with the given reason
    pub fn failed(ref_id: &str, request: &TransferRequest, error_message: String) -> Self {
        TransactionRecord {
            ref_id: ref_id.to_string(),
            source_ref: request.source_ref.clone(),
            destination_ref: request.destination_ref.clone(),
            amount: request.amount,
            status: TransactionStatus::Failed,
            error_message: Some(error_message),
        }
    }
}

/// Result of processing a transfer
///
/// A failed transfer is a legitimate, audited outcome rather than an error:
/// both variants carry the persisted transaction record, and the caller
/// always receives a transaction reference and a status.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferOutcome {
    /// The transfer landed; the record is `Completed`
    Completed(TransactionRecord),

    /// The transfer did not happen; the record is `Failed` and carries the
    /// reason
    Failed(TransactionRecord),
}

impl TransferOutcome {
    /// Borrow the transaction record, whichever way the transfer went
    pub fn record(&self) -> &TransactionRecord {
        match self {
            TransferOutcome::Completed(record) | TransferOutcome::Failed(record) => record,
        }
    }

    /// Consume the outcome, yielding the transaction record
    pub fn into_record(self) -> TransactionRecord {
        match self {
            TransferOutcome::Completed(record) | TransferOutcome::Failed(record) => record,
        }
    }

    /// Whether the transfer completed
    pub fn is_completed(&self) -> bool {
        matches!(self, TransferOutcome::Completed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn request() -> TransferRequest {
        TransferRequest {
            source_ref: "ACC-1".to_string(),
            destination_ref: "ACC-2".to_string(),
            amount: Some(Decimal::new(30000, 2)),
        }
    }

    #[rstest]
    #[case::processing(TransactionStatus::Processing, false, "PROCESSING")]
    #[case::completed(TransactionStatus::Completed, true, "COMPLETED")]
    #[case::failed(TransactionStatus::Failed, true, "FAILED")]
    fn test_status_terminality_and_display(
        #[case] status: TransactionStatus,
        #[case] terminal: bool,
        #[case] display: &str,
    ) {
        assert_eq!(status.is_terminal(), terminal);
        assert_eq!(status.to_string(), display);
    }

    #[test]
    fn test_processing_record_captures_request_fields() {
        let record = TransactionRecord::processing("tx-1", &request());

        assert_eq!(record.ref_id, "tx-1");
        assert_eq!(record.source_ref, "ACC-1");
        assert_eq!(record.destination_ref, "ACC-2");
        assert_eq!(record.amount, Some(Decimal::new(30000, 2)));
        assert_eq!(record.status, TransactionStatus::Processing);
        assert_eq!(record.error_message, None);
    }

    #[test]
    fn test_failed_record_carries_reason() {
        let record = TransactionRecord::failed("tx-1", &request(), "no good".to_string());

        assert_eq!(record.status, TransactionStatus::Failed);
        assert_eq!(record.error_message.as_deref(), Some("no good"));
    }

    #[test]
    fn test_outcome_exposes_record_for_both_variants() {
        let record = TransactionRecord::failed("tx-1", &request(), "no good".to_string());

        let failed = TransferOutcome::Failed(record.clone());
        assert!(!failed.is_completed());
        assert_eq!(failed.record(), &record);
        assert_eq!(failed.into_record(), record);
    }
}
