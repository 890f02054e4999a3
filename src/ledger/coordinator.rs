//! Transaction Ledger
//!
//! Drives every transaction state transition. Each public operation opens
//! one unit of work, runs all reads, checks and writes inside it, and
//! commits or rolls back as a whole. Units aborted by lock contention are
//! re-run from scratch up to `max_retries` times.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::acceptance::{self, AcceptanceOutcome};
use super::error::LedgerError;
use super::state::{AcceptRole, TransactionStatus};
use super::store::{LedgerStore, UnitOfWork};
use super::types::{NewTransaction, TransactionRecord};
use crate::core_types::{ItemId, TransactionId, UserId};
use crate::money;

/// Default number of re-runs after a contention abort
pub const DEFAULT_MAX_RETRIES: u32 = 3;

const RETRY_BACKOFF: Duration = Duration::from_millis(10);

/// Transaction ledger over a pluggable unit-of-work store
pub struct TransactionLedger {
    store: Arc<dyn LedgerStore>,
    max_retries: u32,
}

impl TransactionLedger {
    pub fn new(store: Arc<dyn LedgerStore>, max_retries: u32) -> Self {
        Self { store, max_retries }
    }

    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    /// Open an offer from `caller` for `amount` units of an item
    ///
    /// The item quantity is not touched until both parties accept.
    pub async fn create(
        &self,
        caller: UserId,
        item_id: ItemId,
        amount: i32,
    ) -> Result<TransactionRecord, LedgerError> {
        self.with_retry("create", move || self.create_once(caller, item_id, amount))
            .await
    }

    /// Set the buyer's or seller's acceptance flag
    ///
    /// When both flags end up true the item is re-checked and debited in the
    /// same unit; if stock is short nothing is persisted.
    pub async fn set_acceptance(
        &self,
        caller: UserId,
        transaction_id: TransactionId,
        role: AcceptRole,
        accept: bool,
        accepted_at: DateTime<Utc>,
    ) -> Result<TransactionRecord, LedgerError> {
        self.with_retry("set_acceptance", move || {
            self.set_acceptance_once(caller, transaction_id, role, accept, accepted_at)
        })
        .await
    }

    /// Cancel a pending or accepted transaction
    ///
    /// An accepted transaction gets its amount credited back to the item.
    /// Only the seller may cancel once accepted.
    pub async fn cancel(
        &self,
        caller: UserId,
        transaction_id: TransactionId,
    ) -> Result<TransactionRecord, LedgerError> {
        self.with_retry("cancel", move || self.cancel_once(caller, transaction_id))
            .await
    }

    /// Buyer marks the transaction paid; repeated calls are no-ops
    pub async fn mark_paid(
        &self,
        caller: UserId,
        transaction_id: TransactionId,
    ) -> Result<TransactionRecord, LedgerError> {
        self.with_retry("mark_paid", move || self.mark_paid_once(caller, transaction_id))
            .await
    }

    /// Overwrite price and amount of a pending transaction
    ///
    /// No recomputation from the item price and no stock check; stock is
    /// checked when both parties accept.
    pub async fn update_terms(
        &self,
        caller: UserId,
        transaction_id: TransactionId,
        agreed_price: Decimal,
        amount: i32,
    ) -> Result<TransactionRecord, LedgerError> {
        self.with_retry("update_terms", move || {
            self.update_terms_once(caller, transaction_id, agreed_price, amount)
        })
        .await
    }

    /// Every transaction where `caller` is buyer or seller
    pub async fn list_mine(&self, caller: UserId) -> Result<Vec<TransactionRecord>, LedgerError> {
        self.with_retry("list_mine", move || self.list_mine_once(caller))
            .await
    }

    /// One transaction, visible to its parties only
    pub async fn get(
        &self,
        caller: UserId,
        transaction_id: TransactionId,
    ) -> Result<TransactionRecord, LedgerError> {
        self.with_retry("get", move || self.get_once(caller, transaction_id))
            .await
    }

    async fn with_retry<T, F, Fut>(&self, op: &'static str, mut run: F) -> Result<T, LedgerError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LedgerError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match run().await {
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        op = op,
                        attempt = attempt,
                        store = self.store.name(),
                        error = %e,
                        "Ledger unit aborted by contention, retrying"
                    );
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                }
                other => return other,
            }
        }
    }

    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, LedgerError> {
        self.store.begin().await
    }

    async fn locked(
        uow: &mut Box<dyn UnitOfWork>,
        transaction_id: TransactionId,
    ) -> Result<TransactionRecord, LedgerError> {
        uow.lock_transaction(transaction_id)
            .await?
            .ok_or_else(|| not_found(transaction_id))
    }

    async fn create_once(
        &self,
        caller: UserId,
        item_id: ItemId,
        amount: i32,
    ) -> Result<TransactionRecord, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidArgument(
                "amount must be greater than 0".to_string(),
            ));
        }

        let mut uow = self.begin().await?;

        let item = uow
            .find_item(item_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("Item {} not found", item_id)))?;

        if item.owner_id == caller {
            return Err(LedgerError::Forbidden(
                "You cannot perform this action on your own item".to_string(),
            ));
        }
        if !item.can_supply(amount) {
            return Err(LedgerError::InvalidState("Item is not available".to_string()));
        }
        if !uow.user_exists(item.owner_id).await? {
            return Err(LedgerError::NotFound("seller not found".to_string()));
        }

        let agreed_price = money::line_total(item.price, amount)?;
        let record = uow
            .insert_transaction(NewTransaction {
                item_id,
                seller_id: item.owner_id,
                buyer_id: caller,
                agreed_price,
                amount,
            })
            .await?;
        uow.commit().await?;

        info!(
            transaction_id = record.id,
            item_id = item_id,
            buyer_id = caller,
            seller_id = record.seller_id,
            amount = amount,
            agreed_price = %agreed_price,
            "Transaction created"
        );
        Ok(record)
    }

    async fn set_acceptance_once(
        &self,
        caller: UserId,
        transaction_id: TransactionId,
        role: AcceptRole,
        accept: bool,
        accepted_at: DateTime<Utc>,
    ) -> Result<TransactionRecord, LedgerError> {
        let mut uow = self.begin().await?;
        let mut record = Self::locked(&mut uow, transaction_id).await?;

        acceptance::authorize(&record, caller, role)?;
        acceptance::ensure_negotiable(&record)?;

        let outcome = acceptance::apply(&mut record, role, accept, accepted_at);
        if outcome == AcceptanceOutcome::Completed {
            let item = uow.lock_item(record.item_id).await?.ok_or_else(|| {
                LedgerError::NotFound(format!("Item {} not found", record.item_id))
            })?;
            if item.quantity < record.amount {
                return Err(LedgerError::InvalidState(format!(
                    "Item is not available, remaining: {}",
                    item.quantity
                )));
            }
            let remaining = uow
                .adjust_item_quantity(item.id, -record.amount)
                .await?
                .ok_or_else(|| {
                    LedgerError::Internal(format!("debit failed on locked item {}", item.id))
                })?;
            debug!(item_id = item.id, remaining = remaining, "Item debited");
        }

        let saved = uow.save_transaction(&record).await?;
        uow.commit().await?;

        info!(
            transaction_id = transaction_id,
            role = %role,
            accept = accept,
            status = %saved.status,
            "Acceptance updated"
        );
        Ok(saved)
    }

    async fn cancel_once(
        &self,
        caller: UserId,
        transaction_id: TransactionId,
    ) -> Result<TransactionRecord, LedgerError> {
        let mut uow = self.begin().await?;
        let mut record = Self::locked(&mut uow, transaction_id).await?;

        if !record.is_party(caller) {
            return Err(LedgerError::Forbidden(
                "You are not a party of this transaction".to_string(),
            ));
        }
        if record.status == TransactionStatus::Accepted && caller == record.buyer_id {
            return Err(LedgerError::Forbidden(
                "This transaction is already accepted, buyer cannot cancel".to_string(),
            ));
        }
        if !record.status.is_cancellable() {
            return Err(LedgerError::InvalidState(format!(
                "Transaction cannot be cancelled because it is {}",
                record.status
            )));
        }

        if record.status == TransactionStatus::Accepted {
            let credit_failed = || {
                LedgerError::Internal(format!(
                    "compensating credit failed: item {} not found",
                    record.item_id
                ))
            };
            let item = uow
                .lock_item(record.item_id)
                .await?
                .ok_or_else(credit_failed)?;
            if item.quantity.checked_add(record.amount).is_none() {
                return Err(LedgerError::Internal(format!(
                    "compensating credit failed: quantity of item {} would overflow",
                    item.id
                )));
            }
            let remaining = uow
                .adjust_item_quantity(item.id, record.amount)
                .await?
                .ok_or_else(credit_failed)?;
            debug!(item_id = item.id, remaining = remaining, "Item credited back");
        }

        record.status = TransactionStatus::Cancelled;
        record.cancelled_at = Some(Utc::now());
        let saved = uow.save_transaction(&record).await?;
        uow.commit().await?;

        info!(transaction_id = transaction_id, caller = caller, "Transaction cancelled");
        Ok(saved)
    }

    async fn mark_paid_once(
        &self,
        caller: UserId,
        transaction_id: TransactionId,
    ) -> Result<TransactionRecord, LedgerError> {
        let mut uow = self.begin().await?;
        let mut record = Self::locked(&mut uow, transaction_id).await?;

        acceptance::authorize(&record, caller, AcceptRole::Buyer)?;

        match record.status {
            TransactionStatus::Cancelled => Err(LedgerError::InvalidState(
                "Transaction cannot be paid because it is cancelled".to_string(),
            )),
            TransactionStatus::Paid => {
                debug!(transaction_id = transaction_id, "Already paid");
                Ok(record)
            }
            TransactionStatus::Pending | TransactionStatus::Accepted => {
                record.status = TransactionStatus::Paid;
                record.paid_at = Some(Utc::now());
                let saved = uow.save_transaction(&record).await?;
                uow.commit().await?;

                info!(transaction_id = transaction_id, "Transaction marked paid");
                Ok(saved)
            }
        }
    }

    async fn update_terms_once(
        &self,
        caller: UserId,
        transaction_id: TransactionId,
        agreed_price: Decimal,
        amount: i32,
    ) -> Result<TransactionRecord, LedgerError> {
        let mut uow = self.begin().await?;
        let mut record = Self::locked(&mut uow, transaction_id).await?;

        if !record.is_party(caller) {
            return Err(LedgerError::Forbidden(
                "You are not a party of this transaction".to_string(),
            ));
        }
        acceptance::ensure_negotiable(&record)?;

        if amount <= 0 {
            return Err(LedgerError::InvalidArgument(
                "amount must be greater than 0".to_string(),
            ));
        }
        record.agreed_price = money::validate_price(agreed_price)?;
        record.amount = amount;

        let saved = uow.save_transaction(&record).await?;
        uow.commit().await?;

        info!(
            transaction_id = transaction_id,
            agreed_price = %saved.agreed_price,
            amount = amount,
            "Transaction terms updated"
        );
        Ok(saved)
    }

    async fn list_mine_once(&self, caller: UserId) -> Result<Vec<TransactionRecord>, LedgerError> {
        let mut uow = self.begin().await?;
        let records = uow.list_for_user(caller).await?;
        uow.commit().await?;
        Ok(records)
    }

    async fn get_once(
        &self,
        caller: UserId,
        transaction_id: TransactionId,
    ) -> Result<TransactionRecord, LedgerError> {
        let mut uow = self.begin().await?;
        let record = uow
            .find_transaction(transaction_id)
            .await?
            .ok_or_else(|| not_found(transaction_id))?;
        uow.commit().await?;

        if !record.is_party(caller) {
            return Err(LedgerError::Forbidden(
                "You are not a party of this transaction".to_string(),
            ));
        }
        Ok(record)
    }
}

fn not_found(transaction_id: TransactionId) -> LedgerError {
    LedgerError::NotFound(format!("Transaction {} not found", transaction_id))
}
