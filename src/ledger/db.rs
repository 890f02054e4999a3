//! PostgreSQL ledger store
//!
//! One unit of work is one `BEGIN … COMMIT`. Row locks come from
//! `SELECT … FOR UPDATE` and are held until commit or rollback. A lock wait
//! longer than [`LOCK_TIMEOUT`] aborts the unit with SQLSTATE 55P03, which the
//! ledger treats as contention and retries.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use super::error::LedgerError;
use super::store::{LedgerStore, UnitOfWork};
use super::types::{NewTransaction, TransactionRecord};
use crate::account::UserRepository;
use crate::core_types::{ItemId, TransactionId, UserId};
use crate::inventory::{Item, ItemRepository};

const TRANSACTION_COLUMNS: &str = "id, item_id, seller_id, buyer_id, status, agreed_price, amount, \
     buyer_accept, buyer_accept_at, seller_accept, seller_accept_at, \
     cancelled_at, paid_at, created_at, updated_at";

/// Upper bound on a single row-lock wait
pub const LOCK_TIMEOUT: &str = "5s";

/// Ledger store backed by a PostgreSQL pool
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, LedgerError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(&format!("SET LOCAL lock_timeout = '{LOCK_TIMEOUT}'"))
            .execute(&mut *tx)
            .await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

/// Open database transaction; rolled back on drop unless committed
struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn find_item(&mut self, item_id: ItemId) -> Result<Option<Item>, LedgerError> {
        Ok(ItemRepository::fetch(&mut *self.tx, item_id).await?)
    }

    async fn lock_item(&mut self, item_id: ItemId) -> Result<Option<Item>, LedgerError> {
        Ok(ItemRepository::fetch_for_update(&mut *self.tx, item_id).await?)
    }

    async fn adjust_item_quantity(
        &mut self,
        item_id: ItemId,
        delta: i32,
    ) -> Result<Option<i32>, LedgerError> {
        Ok(ItemRepository::adjust_quantity(&mut *self.tx, item_id, delta).await?)
    }

    async fn user_exists(&mut self, user_id: UserId) -> Result<bool, LedgerError> {
        Ok(UserRepository::exists(&mut *self.tx, user_id).await?)
    }

    async fn insert_transaction(
        &mut self,
        new: NewTransaction,
    ) -> Result<TransactionRecord, LedgerError> {
        let record = sqlx::query_as::<_, TransactionRecord>(&format!(
            r#"
            INSERT INTO transactions (item_id, seller_id, buyer_id, status, agreed_price, amount)
            VALUES ($1, $2, $3, 'pending', $4, $5)
            RETURNING {TRANSACTION_COLUMNS}
            "#
        ))
        .bind(new.item_id)
        .bind(new.seller_id)
        .bind(new.buyer_id)
        .bind(new.agreed_price)
        .bind(new.amount)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(record)
    }

    async fn find_transaction(
        &mut self,
        id: TransactionId,
    ) -> Result<Option<TransactionRecord>, LedgerError> {
        let record = sqlx::query_as::<_, TransactionRecord>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(record)
    }

    async fn lock_transaction(
        &mut self,
        id: TransactionId,
    ) -> Result<Option<TransactionRecord>, LedgerError> {
        let record = sqlx::query_as::<_, TransactionRecord>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(record)
    }

    async fn save_transaction(
        &mut self,
        record: &TransactionRecord,
    ) -> Result<TransactionRecord, LedgerError> {
        let saved = sqlx::query_as::<_, TransactionRecord>(&format!(
            r#"
            UPDATE transactions
            SET status = $1, agreed_price = $2, amount = $3,
                buyer_accept = $4, buyer_accept_at = $5,
                seller_accept = $6, seller_accept_at = $7,
                cancelled_at = $8, paid_at = $9, updated_at = NOW()
            WHERE id = $10
            RETURNING {TRANSACTION_COLUMNS}
            "#
        ))
        .bind(record.status.as_str())
        .bind(record.agreed_price)
        .bind(record.amount)
        .bind(record.buyer_accept)
        .bind(record.buyer_accept_at)
        .bind(record.seller_accept)
        .bind(record.seller_accept_at)
        .bind(record.cancelled_at)
        .bind(record.paid_at)
        .bind(record.id)
        .fetch_optional(&mut *self.tx)
        .await?;

        saved.ok_or_else(|| LedgerError::NotFound(format!("Transaction {} not found", record.id)))
    }

    async fn list_for_user(
        &mut self,
        user_id: UserId,
    ) -> Result<Vec<TransactionRecord>, LedgerError> {
        let records = sqlx::query_as::<_, TransactionRecord>(&format!(
            r#"
            SELECT {TRANSACTION_COLUMNS} FROM transactions
            WHERE buyer_id = $1 OR seller_id = $1
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(records)
    }

    async fn commit(self: Box<Self>) -> Result<(), LedgerError> {
        let this = *self;
        this.tx.commit().await?;
        Ok(())
    }
}
