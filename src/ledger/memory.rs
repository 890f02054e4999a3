//! In-process ledger store
//!
//! Backs the unit and scenario tests; the server itself always runs on
//! [`super::PgLedgerStore`]. A unit of work holds the single state mutex
//! for its whole lifetime and edits a staged copy; commit swaps the copy in,
//! drop throws it away.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::error::LedgerError;
use super::state::TransactionStatus;
use super::store::{LedgerStore, UnitOfWork};
use super::types::{NewTransaction, TransactionRecord};
use crate::core_types::{ItemId, TransactionId, UserId};
use crate::inventory::{Item, ItemStatus};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    users: HashSet<UserId>,
    items: BTreeMap<ItemId, Item>,
    transactions: BTreeMap<TransactionId, TransactionRecord>,
    next_item_id: ItemId,
    next_transaction_id: TransactionId,
}

impl MemoryState {
    fn live_item(&self, item_id: ItemId) -> Option<&Item> {
        self.items.get(&item_id).filter(|item| !item.is_deleted())
    }
}

/// Mutex-guarded in-memory store
#[derive(Clone, Default)]
pub struct MemoryLedgerStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user id
    pub async fn add_user(&self, user_id: UserId) {
        self.state.lock().await.users.insert(user_id);
    }

    /// Create a live item and return its id
    pub async fn add_item(
        &self,
        owner_id: UserId,
        price: Decimal,
        quantity: i32,
        status: ItemStatus,
    ) -> ItemId {
        let mut state = self.state.lock().await;
        state.next_item_id += 1;
        let id = state.next_item_id;
        let now = Utc::now();
        state.items.insert(
            id,
            Item {
                id,
                owner_id,
                name: format!("item-{}", id),
                description: None,
                price,
                quantity,
                status,
                category_id: 1,
                group_id: None,
                image_url: None,
                search_text: None,
                created_at: now,
                updated_at: now,
                deleted_at: None,
            },
        );
        id
    }

    /// Snapshot of an item, including soft-deleted ones
    pub async fn item(&self, item_id: ItemId) -> Option<Item> {
        self.state.lock().await.items.get(&item_id).cloned()
    }

    /// Mark an item deleted without removing it
    pub async fn soft_delete_item(&self, item_id: ItemId) -> bool {
        let mut state = self.state.lock().await;
        match state.items.get_mut(&item_id) {
            Some(item) if !item.is_deleted() => {
                item.deleted_at = Some(Utc::now());
                true
            }
            _ => false,
        }
    }

    /// Snapshot of a committed transaction
    pub async fn transaction(&self, id: TransactionId) -> Option<TransactionRecord> {
        self.state.lock().await.transactions.get(&id).cloned()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, LedgerError> {
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryUnitOfWork { guard, staged }))
    }
}

struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn find_item(&mut self, item_id: ItemId) -> Result<Option<Item>, LedgerError> {
        Ok(self.staged.live_item(item_id).cloned())
    }

    async fn lock_item(&mut self, item_id: ItemId) -> Result<Option<Item>, LedgerError> {
        // the whole store is already held by this unit
        self.find_item(item_id).await
    }

    async fn adjust_item_quantity(
        &mut self,
        item_id: ItemId,
        delta: i32,
    ) -> Result<Option<i32>, LedgerError> {
        let Some(item) = self
            .staged
            .items
            .get_mut(&item_id)
            .filter(|item| !item.is_deleted())
        else {
            return Ok(None);
        };

        match item.quantity.checked_add(delta) {
            Some(quantity) if quantity >= 0 => {
                item.quantity = quantity;
                item.updated_at = Utc::now();
                Ok(Some(quantity))
            }
            _ => Ok(None),
        }
    }

    async fn user_exists(&mut self, user_id: UserId) -> Result<bool, LedgerError> {
        Ok(self.staged.users.contains(&user_id))
    }

    async fn insert_transaction(
        &mut self,
        new: NewTransaction,
    ) -> Result<TransactionRecord, LedgerError> {
        if new.buyer_id == new.seller_id {
            return Err(LedgerError::InvalidState(
                "buyer and seller must differ".to_string(),
            ));
        }

        self.staged.next_transaction_id += 1;
        let id = self.staged.next_transaction_id;
        let now = Utc::now();
        let record = TransactionRecord {
            id,
            item_id: new.item_id,
            seller_id: new.seller_id,
            buyer_id: new.buyer_id,
            status: TransactionStatus::Pending,
            agreed_price: new.agreed_price,
            amount: new.amount,
            buyer_accept: false,
            buyer_accept_at: None,
            seller_accept: false,
            seller_accept_at: None,
            cancelled_at: None,
            paid_at: None,
            created_at: now,
            updated_at: now,
        };
        self.staged.transactions.insert(id, record.clone());
        Ok(record)
    }

    async fn find_transaction(
        &mut self,
        id: TransactionId,
    ) -> Result<Option<TransactionRecord>, LedgerError> {
        Ok(self.staged.transactions.get(&id).cloned())
    }

    async fn lock_transaction(
        &mut self,
        id: TransactionId,
    ) -> Result<Option<TransactionRecord>, LedgerError> {
        self.find_transaction(id).await
    }

    async fn save_transaction(
        &mut self,
        record: &TransactionRecord,
    ) -> Result<TransactionRecord, LedgerError> {
        let stored = self
            .staged
            .transactions
            .get_mut(&record.id)
            .ok_or_else(|| LedgerError::NotFound(format!("Transaction {} not found", record.id)))?;

        *stored = TransactionRecord {
            updated_at: Utc::now(),
            ..record.clone()
        };
        Ok(stored.clone())
    }

    async fn list_for_user(
        &mut self,
        user_id: UserId,
    ) -> Result<Vec<TransactionRecord>, LedgerError> {
        Ok(self
            .staged
            .transactions
            .values()
            .rev()
            .filter(|record| record.is_party(user_id))
            .cloned()
            .collect())
    }

    async fn commit(self: Box<Self>) -> Result<(), LedgerError> {
        let MemoryUnitOfWork { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    async fn seeded() -> (MemoryLedgerStore, ItemId) {
        let store = MemoryLedgerStore::new();
        store.add_user(1).await;
        let item_id = store
            .add_item(1, Decimal::from_str("10.00").unwrap(), 5, ItemStatus::Available)
            .await;
        (store, item_id)
    }

    #[tokio::test]
    async fn test_drop_without_commit_rolls_back() {
        let (store, item_id) = seeded().await;

        {
            let mut uow = store.begin().await.unwrap();
            assert_eq!(uow.adjust_item_quantity(item_id, -3).await.unwrap(), Some(2));
        }

        assert_eq!(store.item(item_id).await.unwrap().quantity, 5);
    }

    #[tokio::test]
    async fn test_commit_publishes_writes() {
        let (store, item_id) = seeded().await;

        let mut uow = store.begin().await.unwrap();
        uow.adjust_item_quantity(item_id, -3).await.unwrap();
        uow.commit().await.unwrap();

        assert_eq!(store.item(item_id).await.unwrap().quantity, 2);
    }

    #[tokio::test]
    async fn test_adjust_rejects_negative_and_deleted() {
        let (store, item_id) = seeded().await;

        let mut uow = store.begin().await.unwrap();
        assert_eq!(uow.adjust_item_quantity(item_id, -6).await.unwrap(), None);
        assert_eq!(uow.adjust_item_quantity(999, 1).await.unwrap(), None);
        drop(uow);

        assert!(store.soft_delete_item(item_id).await);
        let mut uow = store.begin().await.unwrap();
        assert!(uow.find_item(item_id).await.unwrap().is_none());
        assert_eq!(uow.adjust_item_quantity(item_id, 1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_for_user_newest_first() {
        let (store, item_id) = seeded().await;
        store.add_user(2).await;
        store.add_user(3).await;

        let mut uow = store.begin().await.unwrap();
        for buyer_id in [2, 3, 2] {
            uow.insert_transaction(NewTransaction {
                item_id,
                seller_id: 1,
                buyer_id,
                agreed_price: Decimal::from_str("10.00").unwrap(),
                amount: 1,
            })
            .await
            .unwrap();
        }
        uow.commit().await.unwrap();

        let mut uow = store.begin().await.unwrap();
        let ids: Vec<_> = uow
            .list_for_user(2)
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(uow.list_for_user(1).await.unwrap().len(), 3);
    }
}
