//! Account management module
//!
//! This module provides the `AccountManager` struct which creates and
//! retrieves accounts against an [`AccountStore`].
//!
//! The AccountManager is responsible for:
//! - Enforcing reference uniqueness at creation
//! - Enforcing the initial balance policy (strictly positive)
//! - Read-only account lookups
//!
//! Balance mutation is not its concern; once an account exists, only the
//! transaction engine's debit/credit protocol touches the balance.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::core::traits::AccountStore;
use crate::types::{Account, LedgerError};

/// Creates and retrieves accounts
///
/// Errors from this manager propagate to the caller as typed failures;
/// unlike transfer processing, a rejected account creation leaves no record
/// behind.
pub struct AccountManager<S: AccountStore> {
    /// Storage collaborator for account rows
    accounts: Arc<S>,
}

impl<S: AccountStore> AccountManager<S> {
    /// Create a new AccountManager over the given account store
    pub fn new(accounts: Arc<S>) -> Self {
        AccountManager { accounts }
    }

    /// Create a new account with the given reference and initial balance
    ///
    /// # Arguments
    ///
    /// * `ref_id` - Caller-supplied unique account reference
    /// * `initial_balance` - Opening balance; must be strictly positive
    ///
    /// # Returns
    ///
    /// The persisted account, with its storage id assigned.
    ///
    /// # Errors
    ///
    /// * `LedgerError::AccountAlreadyExists` - the reference is taken
    /// * `LedgerError::InvalidBalance` - the initial balance is zero or
    ///   negative
    /// * `LedgerError::Storage` - the store failed
    pub fn create_account(
        &self,
        ref_id: &str,
        initial_balance: Decimal,
    ) -> Result<Account, LedgerError> {
        if self.accounts.find_by_ref(ref_id)?.is_some() {
            tracing::warn!(account = %ref_id, "account creation rejected, reference already exists");
            return Err(LedgerError::account_already_exists(ref_id));
        }

        if initial_balance <= Decimal::ZERO {
            tracing::warn!(
                account = %ref_id,
                balance = %initial_balance,
                "account creation rejected, non-positive initial balance"
            );
            return Err(LedgerError::invalid_balance(initial_balance));
        }

        let account = self.accounts.save(Account::new(ref_id, initial_balance))?;
        tracing::info!(account = %ref_id, balance = %account.balance, "account created");
        Ok(account)
    }

    /// Retrieve an account by its reference
    ///
    /// Read-only; no side effects.
    ///
    /// # Errors
    ///
    /// * `LedgerError::AccountNotFound` - no account carries this reference
    /// * `LedgerError::Storage` - the store failed
    pub fn get_account(&self, ref_id: &str) -> Result<Account, LedgerError> {
        self.accounts
            .find_by_ref(ref_id)?
            .ok_or_else(|| LedgerError::account_not_found(ref_id))
    }
}
