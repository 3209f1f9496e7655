//! In-memory reference implementations of the storage collaborators
//!
//! This module provides `DashMap`-backed implementations of
//! [`AccountStore`] and [`TransactionStore`], used by the CLI replay
//! strategies, the tests, and the benches.
//!
//! # Concurrency
//!
//! Both stores are safe to share across threads (`&self` methods, DashMap
//! sharding). Lost updates on accounts are prevented with optimistic
//! version checks rather than in-process locks: every successful save bumps
//! [`Account::version`], and a save whose version no longer matches the
//! stored row fails with [`LedgerError::StorageConflict`]. Two concurrent
//! debits that both read the same starting balance therefore cannot both
//! land; one of them must re-fetch and re-validate.
//!
//! # Audit Immutability
//!
//! The transaction store refuses to overwrite a record that is already in a
//! terminal state. Once a transfer is `Completed` or `Failed` its row is
//! the audit trail and never changes.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::core::traits::{AccountStore, TransactionStore};
use crate::types::{Account, LedgerError, TransactionRecord};

/// In-memory account store with optimistic concurrency control
///
/// Rows are keyed by the caller-supplied reference id. Storage ids are
/// assigned from an atomic counter on first save.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    /// Account rows keyed by reference id
    accounts: DashMap<String, Account>,

    /// Source of storage-assigned account ids
    next_id: AtomicU64,
}

impl InMemoryAccountStore {
    /// Create an empty account store
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot all accounts, sorted by reference id
    ///
    /// The snapshot is a point-in-time copy; concurrent saves are not
    /// reflected in the returned vector.
    pub fn snapshot(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        accounts.sort_by(|a, b| a.ref_id.cmp(&b.ref_id));
        accounts
    }
}

impl AccountStore for InMemoryAccountStore {
    fn find_by_ref(&self, ref_id: &str) -> Result<Option<Account>, LedgerError> {
        Ok(self.accounts.get(ref_id).map(|entry| entry.value().clone()))
    }

    fn save(&self, mut account: Account) -> Result<Account, LedgerError> {
        match self.accounts.entry(account.ref_id.clone()) {
            Entry::Occupied(mut entry) => {
                if account.id.is_none() {
                    // insert raced against another insert of the same reference
                    return Err(LedgerError::storage(format!(
                        "account reference {} already exists",
                        account.ref_id
                    )));
                }
                if entry.get().version != account.version {
                    return Err(LedgerError::conflict(&account.ref_id));
                }
                account.version += 1;
                entry.insert(account.clone());
                Ok(account)
            }
            Entry::Vacant(entry) => {
                if account.id.is_some() {
                    return Err(LedgerError::storage(format!(
                        "account {} has a storage id but no stored row",
                        account.ref_id
                    )));
                }
                account.id = Some(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
                account.version += 1;
                entry.insert(account.clone());
                Ok(account)
            }
        }
    }
}

/// In-memory transaction store
///
/// Rows are keyed by the system-generated transaction reference. Terminal
/// records are immutable.
#[derive(Debug, Default)]
pub struct InMemoryTransactionStore {
    /// Transaction records keyed by reference id
    transactions: DashMap<String, TransactionRecord>,
}

impl InMemoryTransactionStore {
    /// Create an empty transaction store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored transaction records
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

impl TransactionStore for InMemoryTransactionStore {
    fn find_by_ref(&self, ref_id: &str) -> Result<Option<TransactionRecord>, LedgerError> {
        Ok(self
            .transactions
            .get(ref_id)
            .map(|entry| entry.value().clone()))
    }

    fn save(&self, record: TransactionRecord) -> Result<TransactionRecord, LedgerError> {
        match self.transactions.entry(record.ref_id.clone()) {
            Entry::Occupied(mut entry) => {
                if entry.get().status.is_terminal() {
                    return Err(LedgerError::storage(format!(
                        "transaction {} is already {} and cannot be modified",
                        record.ref_id,
                        entry.get().status
                    )));
                }
                entry.insert(record.clone());
                Ok(record)
            }
            Entry::Vacant(entry) => {
                entry.insert(record.clone());
                Ok(record)
            }
        }
    }
}
