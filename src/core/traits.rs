//! Storage collaborator traits for accounts and transaction records
//!
//! This module defines the narrow persistence interfaces the ledger core is
//! written against. The engine and account manager only ever call
//! `find_by_ref` and `save`; everything else (transactional scope, row
//! locking or version checks, timeouts) is the implementation's concern.

use crate::types::{Account, LedgerError, TransactionRecord};

/// Durable keyed storage of accounts
///
/// Implementations must enforce reference uniqueness and reject saves that
/// carry a stale [`Account::version`] with
/// [`LedgerError::StorageConflict`], so that concurrent read-modify-write
/// cycles against the same account cannot both land.
pub trait AccountStore: Send + Sync {
    /// Look up an account by its reference id
    ///
    /// # Returns
    ///
    /// * `Ok(Some(account))` - if the reference is known
    /// * `Ok(None)` - if no account carries this reference
    /// * `Err(LedgerError::Storage)` - on connectivity or constraint problems
    fn find_by_ref(&self, ref_id: &str) -> Result<Option<Account>, LedgerError>;

    /// Persist an account, inserting or updating by reference id
    ///
    /// # Returns
    ///
    /// The saved account with its storage id assigned and version bumped.
    ///
    /// # Errors
    ///
    /// * `LedgerError::StorageConflict` - the stored version differs from
    ///   the version being saved
    /// * `LedgerError::Storage` - constraint violations and other
    ///   persistence failures
    fn save(&self, account: Account) -> Result<Account, LedgerError>;
}

/// Durable append-oriented storage of transaction records
///
/// Records transition `Processing -> Completed` or `Processing -> Failed`
/// and are immutable afterwards; implementations must refuse to overwrite a
/// terminal record.
pub trait TransactionStore: Send + Sync {
    /// Look up a transaction record by its reference id
    fn find_by_ref(&self, ref_id: &str) -> Result<Option<TransactionRecord>, LedgerError>;

    /// Persist a transaction record, inserting or updating by reference id
    ///
    /// # Errors
    ///
    /// * `LedgerError::Storage` - the stored record is already terminal, or
    ///   another persistence failure occurred
    fn save(&self, record: TransactionRecord) -> Result<TransactionRecord, LedgerError>;
}
