//! Account-related types for the bank ledger engine
//!
//! This module defines the Account structure that tracks a single
//! customer balance.

use rust_decimal::Decimal;

/// Storage-assigned account identifier
///
/// Distinct from the caller-supplied reference id. Assigned by the account
/// store on first save; never reused.
pub type AccountId = u64;

/// A single account row
///
/// Balances are exact decimal values; the `balance >= 0` invariant is
/// enforced at creation and preserved by every transfer. The `version`
/// field is the optimistic-concurrency token: every successful save bumps
/// it, and a save carrying a stale version is rejected by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// Storage-assigned identifier, `None` until the account is first saved
    pub id: Option<AccountId>,

    /// Caller-supplied unique reference, immutable after creation
    pub ref_id: String,

    /// Current balance
    ///
    /// Mutated only by the transaction engine's debit/credit protocol.
    pub balance: Decimal,

    /// Optimistic-concurrency version, bumped by the store on every save
    pub version: u64,
}

impl Account {
    /// Create a new, not-yet-persisted account
    ///
    /// # Arguments
    ///
    /// * `ref_id` - The caller-supplied account reference
    /// * `balance` - The initial balance
    ///
    /// # Returns
    ///
    /// An Account with no storage id and version 0. Both are assigned by
    /// the store on first save.
    pub fn new(ref_id: impl Into<String>, balance: Decimal) -> Self {
        Account {
            id: None,
            ref_id: ref_id.into(),
            balance,
            version: 0,
        }
    }
}
