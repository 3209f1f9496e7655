//! Transaction processing engine
//!
//! This module provides the TransactionEngine that orchestrates transfer
//! processing against the account and transaction storage collaborators.
//!
//! The engine enforces the transfer pipeline, in order and short-circuiting
//! on the first failure:
//! 1. Structural validation (amount present and positive, non-empty refs)
//! 2. Account resolution (source before destination)
//! 3. Business rules (distinct accounts, sufficient balance)
//! 4. Commit (audit record, debit, credit, completion)
//!
//! Every processed request leaves a transaction record, successful or not.
//! A failed transfer is returned as a [`TransferOutcome::Failed`] value
//! carrying the persisted record, never as an error: processing failures
//! are business outcomes, not transport errors.

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::core::traits::{AccountStore, TransactionStore};
use crate::types::{
    Account, LedgerError, TransactionRecord, TransactionStatus, TransferOutcome, TransferRequest,
};

/// Upper bound on optimistic save retries for a single balance mutation
///
/// A conflict means another transfer touched the same account between our
/// read and our save; each retry re-fetches and re-validates.
const MAX_COMMIT_ATTEMPTS: usize = 8;

/// Transaction processing engine
///
/// Orchestrates transfer processing across the account and transaction
/// stores. The engine holds no mutable state of its own; it is safe to
/// share across threads and all methods take `&self`.
pub struct TransactionEngine<A: AccountStore, T: TransactionStore> {
    /// Storage collaborator for account rows
    accounts: Arc<A>,

    /// Storage collaborator for the transaction audit trail
    transactions: Arc<T>,
}

impl<A: AccountStore, T: TransactionStore> TransactionEngine<A, T> {
    /// Create a new TransactionEngine over the given stores
    ///
    /// The account store is typically shared with an
    /// [`crate::core::AccountManager`] so transfers see the accounts it
    /// creates.
    pub fn new(accounts: Arc<A>, transactions: Arc<T>) -> Self {
        TransactionEngine {
            accounts,
            transactions,
        }
    }

    /// Process a single transfer request
    ///
    /// A fresh transaction reference is generated up front and is fixed for
    /// the remainder of processing regardless of outcome, so the caller
    /// always receives a transaction identifier and a status.
    ///
    /// # Arguments
    ///
    /// * `request` - The transfer to attempt
    ///
    /// # Returns
    ///
    /// * `TransferOutcome::Completed(record)` - balances were mutated and
    ///   the record is `Completed`
    /// * `TransferOutcome::Failed(record)` - nothing was transferred; the
    ///   record is `Failed` and `error_message` holds the reason
    pub fn process_transfer(&self, request: TransferRequest) -> TransferOutcome {
        let ref_id = Uuid::new_v4().to_string();
        tracing::info!(
            transaction = %ref_id,
            source = %request.source_ref,
            destination = %request.destination_ref,
            "starting transfer processing"
        );

        match self.attempt_transfer(&ref_id, &request) {
            Ok(record) => {
                tracing::info!(transaction = %ref_id, "transfer completed");
                TransferOutcome::Completed(record)
            }
            Err(error) => self.record_failure(&ref_id, &request, &error),
        }
    }

    /// Retrieve a transaction record by its reference
    ///
    /// Read-only and idempotent; terminal records never change between
    /// calls.
    ///
    /// # Errors
    ///
    /// * `LedgerError::TransactionNotFound` - no record carries this
    ///   reference
    /// * `LedgerError::Storage` - the store failed
    pub fn get_transaction(&self, ref_id: &str) -> Result<TransactionRecord, LedgerError> {
        self.transactions
            .find_by_ref(ref_id)?
            .ok_or_else(|| LedgerError::transaction_not_found(ref_id))
    }

    /// Run the full transfer pipeline, returning the completed record
    fn attempt_transfer(
        &self,
        ref_id: &str,
        request: &TransferRequest,
    ) -> Result<TransactionRecord, LedgerError> {
        let amount = validate_request(request)?;

        // Resolve source before destination so error precedence is
        // deterministic
        let source = self.resolve_account(&request.source_ref)?;
        let destination = self.resolve_account(&request.destination_ref)?;

        validate_business_rules(&source, &destination, amount)?;

        self.commit(ref_id, request, source, amount)
    }

    /// Look up an account, mapping absence to AccountNotFound
    fn resolve_account(&self, ref_id: &str) -> Result<Account, LedgerError> {
        self.accounts
            .find_by_ref(ref_id)?
            .ok_or_else(|| LedgerError::account_not_found(ref_id))
    }

    /// Persist the audit record and apply the balance mutation
    ///
    /// The record is written with status `Processing` before any balance
    /// changes, then transitioned to `Completed` once both account saves
    /// have landed.
    fn commit(
        &self,
        ref_id: &str,
        request: &TransferRequest,
        source: Account,
        amount: Decimal,
    ) -> Result<TransactionRecord, LedgerError> {
        let mut record = self
            .transactions
            .save(TransactionRecord::processing(ref_id, request))?;
        tracing::debug!(transaction = %ref_id, "transaction record created with PROCESSING status");

        let debited = self.debit_with_retry(source, amount)?;
        if let Err(error) = self.credit_with_retry(&request.destination_ref, amount) {
            // the debit already landed; put the money back before failing
            self.restore_debit(&debited.ref_id, amount);
            return Err(error);
        }

        record.status = TransactionStatus::Completed;
        self.transactions.save(record)
    }

    /// Debit the source account under optimistic concurrency
    ///
    /// On a version conflict the account is re-fetched and the balance
    /// re-validated before retrying, so two racing transfers can never
    /// jointly overdraw the source.
    fn debit_with_retry(
        &self,
        mut source: Account,
        amount: Decimal,
    ) -> Result<Account, LedgerError> {
        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            if source.balance < amount {
                return Err(LedgerError::insufficient_balance(source.balance, amount));
            }

            let mut updated = source.clone();
            updated.balance = source.balance.checked_sub(amount).ok_or_else(|| {
                LedgerError::storage(format!(
                    "arithmetic underflow debiting account {}",
                    source.ref_id
                ))
            })?;

            match self.accounts.save(updated) {
                Ok(saved) => return Ok(saved),
                Err(LedgerError::StorageConflict { .. }) => {
                    tracing::debug!(
                        account = %source.ref_id,
                        attempt,
                        "debit lost a concurrent update race, retrying"
                    );
                    source = self.resolve_account(&source.ref_id)?;
                }
                Err(error) => return Err(error),
            }
        }

        Err(LedgerError::storage(format!(
            "could not debit account {} after {} attempts",
            source.ref_id, MAX_COMMIT_ATTEMPTS
        )))
    }

    /// Credit an account under optimistic concurrency
    ///
    /// A credit is an unconditional addition, so every retry re-fetches and
    /// re-applies; there is no balance pre-condition to re-validate.
    fn credit_with_retry(&self, ref_id: &str, amount: Decimal) -> Result<Account, LedgerError> {
        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            let destination = self.resolve_account(ref_id)?;

            let mut updated = destination.clone();
            updated.balance = destination.balance.checked_add(amount).ok_or_else(|| {
                LedgerError::storage(format!("arithmetic overflow crediting account {ref_id}"))
            })?;

            match self.accounts.save(updated) {
                Ok(saved) => return Ok(saved),
                Err(LedgerError::StorageConflict { .. }) => {
                    tracing::debug!(
                        account = %ref_id,
                        attempt,
                        "credit lost a concurrent update race, retrying"
                    );
                }
                Err(error) => return Err(error),
            }
        }

        Err(LedgerError::storage(format!(
            "could not credit account {ref_id} after {MAX_COMMIT_ATTEMPTS} attempts"
        )))
    }

    /// Re-credit a source whose debit landed but whose transfer failed
    ///
    /// Best-effort: a failure here is logged and swallowed so the original
    /// failure reason is what reaches the caller.
    fn restore_debit(&self, source_ref: &str, amount: Decimal) {
        if let Err(error) = self.credit_with_retry(source_ref, amount) {
            tracing::error!(
                account = %source_ref,
                %error,
                "failed to restore source balance after an aborted transfer"
            );
        }
    }

    /// Persist a failed record and wrap it in a Failed outcome
    ///
    /// The record is written best-effort: an error while saving the failed
    /// record itself is logged and swallowed, never propagated, so it
    /// cannot mask the original failure reason.
    fn record_failure(
        &self,
        ref_id: &str,
        request: &TransferRequest,
        error: &LedgerError,
    ) -> TransferOutcome {
        tracing::warn!(transaction = %ref_id, %error, "transfer failed");

        let record = TransactionRecord::failed(ref_id, request, error.to_string());
        let record = match self.transactions.save(record.clone()) {
            Ok(saved) => saved,
            Err(save_error) => {
                tracing::error!(
                    transaction = %ref_id,
                    %save_error,
                    "failed to save failed transaction record"
                );
                record
            }
        };

        TransferOutcome::Failed(record)
    }
}

/// Structural validation of the raw request
///
/// Check order matches the recording contract: missing amount, empty
/// source, empty destination, non-positive amount.
fn validate_request(request: &TransferRequest) -> Result<Decimal, LedgerError> {
    let amount = request.amount.ok_or_else(LedgerError::missing_amount)?;

    if request.source_ref.is_empty() {
        return Err(LedgerError::account_not_found(&request.source_ref));
    }
    if request.destination_ref.is_empty() {
        return Err(LedgerError::account_not_found(&request.destination_ref));
    }
    if amount <= Decimal::ZERO {
        return Err(LedgerError::non_positive_amount(amount));
    }

    Ok(amount)
}

/// Business-rule validation over the resolved accounts
///
/// Same-account detection compares storage identities, not the request
/// strings; insufficient balance is checked after.
fn validate_business_rules(
    source: &Account,
    destination: &Account,
    amount: Decimal,
) -> Result<(), LedgerError> {
    if source.id == destination.id {
        return Err(LedgerError::same_account());
    }

    if source.balance < amount {
        return Err(LedgerError::insufficient_balance(source.balance, amount));
    }

    Ok(())
}
