//! Error types for the bank ledger engine
//!
//! This module defines all error types that can occur while managing accounts
//! and processing transfers.
//!
//! # Error Categories
//!
//! - **Account Errors**: unknown references, duplicate creation, invalid
//!   initial balances
//! - **Transfer Errors**: malformed requests, insufficient balance
//! - **Storage Errors**: unexpected persistence failures and optimistic
//!   concurrency conflicts

use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the ledger engine
///
/// This enum represents all failures that can occur while creating accounts,
/// looking up records, or processing transfers. Each variant includes the
/// context needed to produce a precise, human-readable reason, because these
/// messages end up in the audit trail of failed transactions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Referenced account id has no matching record
    ///
    /// Raised both for lookups of unknown accounts and for transfer requests
    /// that name an account that does not exist (including an empty id).
    #[error("Account with ID {ref_id} not found")]
    AccountNotFound {
        /// The account reference that could not be resolved
        ref_id: String,
    },

    /// Creation was requested for an account id that already exists
    #[error("Account with ID {ref_id} already exists")]
    AccountAlreadyExists {
        /// The account reference that is already taken
        ref_id: String,
    },

    /// Initial balance fails the positivity policy
    ///
    /// Accounts must be opened with a strictly positive balance; zero and
    /// negative values are both rejected.
    #[error("Initial balance must be positive: {balance}")]
    InvalidBalance {
        /// The rejected initial balance
        balance: Decimal,
    },

    /// Malformed transfer request
    ///
    /// Covers a missing amount, a non-positive amount, and a transfer whose
    /// source and destination resolve to the same account.
    #[error("{message}")]
    InvalidTransaction {
        /// Description of what makes the request invalid
        message: String,
    },

    /// Source balance is less than the requested amount
    ///
    /// Carries both sides of the comparison so the audit trail records what
    /// was available and what was asked for.
    #[error(
        "Insufficient balance in source account. Available: {available}, Required: {required}"
    )]
    InsufficientBalance {
        /// Balance of the source account at validation time
        available: Decimal,
        /// The requested transfer amount
        required: Decimal,
    },

    /// Lookup of a transaction id that does not exist
    #[error("Transaction with ID {ref_id} not found")]
    TransactionNotFound {
        /// The transaction reference that could not be resolved
        ref_id: String,
    },

    /// Unexpected failure from the persistence collaborator
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage failure
        message: String,
    },

    /// An optimistic save lost the race against a concurrent update
    ///
    /// The stored row's version no longer matches the version that was read.
    /// Unlike [`LedgerError::Storage`] this is retryable: re-fetch the row
    /// and re-apply the mutation.
    #[error("Concurrent update conflict on account {ref_id}")]
    StorageConflict {
        /// The account reference whose save was rejected
        ref_id: String,
    },
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create an AccountNotFound error
    pub fn account_not_found(ref_id: &str) -> Self {
        LedgerError::AccountNotFound {
            ref_id: ref_id.to_string(),
        }
    }

    /// Create an AccountAlreadyExists error
    pub fn account_already_exists(ref_id: &str) -> Self {
        LedgerError::AccountAlreadyExists {
            ref_id: ref_id.to_string(),
        }
    }

    /// Create an InvalidBalance error
    pub fn invalid_balance(balance: Decimal) -> Self {
        LedgerError::InvalidBalance { balance }
    }

    /// Create an InvalidTransaction error for a request without an amount
    pub fn missing_amount() -> Self {
        LedgerError::InvalidTransaction {
            message: "Transaction amount is required".to_string(),
        }
    }

    /// Create an InvalidTransaction error for a zero or negative amount
    pub fn non_positive_amount(amount: Decimal) -> Self {
        LedgerError::InvalidTransaction {
            message: format!("Transaction amount must be positive: {amount}"),
        }
    }

    /// Create an InvalidTransaction error for a self-transfer
    pub fn same_account() -> Self {
        LedgerError::InvalidTransaction {
            message: "Source and destination accounts cannot be the same".to_string(),
        }
    }

    /// Create an InsufficientBalance error
    pub fn insufficient_balance(available: Decimal, required: Decimal) -> Self {
        LedgerError::InsufficientBalance {
            available,
            required,
        }
    }

    /// Create a TransactionNotFound error
    pub fn transaction_not_found(ref_id: &str) -> Self {
        LedgerError::TransactionNotFound {
            ref_id: ref_id.to_string(),
        }
    }

    /// Create a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        LedgerError::Storage {
            message: message.into(),
        }
    }

    /// Create a StorageConflict error
    pub fn conflict(ref_id: &str) -> Self {
        LedgerError::StorageConflict {
            ref_id: ref_id.to_string(),
        }
    }
}
