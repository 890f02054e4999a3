//! Unit-of-work abstraction for the ledger
//!
//! Every ledger operation runs inside exactly one [`UnitOfWork`]. Writes are
//! visible to other units only after [`UnitOfWork::commit`]; dropping a unit
//! without committing discards everything it did.
//!
//! Lock order is always transaction row first, then item row.

use async_trait::async_trait;

use super::error::LedgerError;
use super::types::{NewTransaction, TransactionRecord};
use crate::core_types::{ItemId, TransactionId, UserId};
use crate::inventory::Item;

/// Backing store that can open atomic units of work
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Store name for logging
    fn name(&self) -> &'static str;

    /// Open a new unit of work
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, LedgerError>;
}

/// One atomic unit over transactions, items and users
#[async_trait]
pub trait UnitOfWork: Send {
    /// Read a live item without locking it
    async fn find_item(&mut self, item_id: ItemId) -> Result<Option<Item>, LedgerError>;

    /// Read a live item and hold its lock until the unit ends
    async fn lock_item(&mut self, item_id: ItemId) -> Result<Option<Item>, LedgerError>;

    /// Add `delta` to a live item's quantity
    ///
    /// Returns the new quantity, or `None` when the item is gone or the
    /// result would be negative (nothing is written in that case).
    async fn adjust_item_quantity(
        &mut self,
        item_id: ItemId,
        delta: i32,
    ) -> Result<Option<i32>, LedgerError>;

    async fn user_exists(&mut self, user_id: UserId) -> Result<bool, LedgerError>;

    /// Insert a pending transaction and return the stored row
    async fn insert_transaction(
        &mut self,
        new: NewTransaction,
    ) -> Result<TransactionRecord, LedgerError>;

    async fn find_transaction(
        &mut self,
        id: TransactionId,
    ) -> Result<Option<TransactionRecord>, LedgerError>;

    /// Read a transaction and hold its lock until the unit ends
    async fn lock_transaction(
        &mut self,
        id: TransactionId,
    ) -> Result<Option<TransactionRecord>, LedgerError>;

    /// Persist every mutable column of `record`; bumps `updated_at`
    async fn save_transaction(
        &mut self,
        record: &TransactionRecord,
    ) -> Result<TransactionRecord, LedgerError>;

    /// Transactions where `user_id` is buyer or seller, newest first
    async fn list_for_user(
        &mut self,
        user_id: UserId,
    ) -> Result<Vec<TransactionRecord>, LedgerError>;

    /// Make all writes of this unit visible
    async fn commit(self: Box<Self>) -> Result<(), LedgerError>;
}
