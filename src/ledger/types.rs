//! Ledger record types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use super::state::{AcceptRole, TransactionStatus};
use crate::core_types::{ItemId, TransactionId, UserId};

/// Peer-to-peer transaction row
///
/// References its item and both parties by id only.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub item_id: ItemId,
    pub seller_id: UserId,
    pub buyer_id: UserId,
    #[sqlx(try_from = "String")]
    pub status: TransactionStatus,
    #[schema(value_type = String, example = "200.00")]
    pub agreed_price: Decimal,
    pub amount: i32,
    pub buyer_accept: bool,
    pub buyer_accept_at: Option<DateTime<Utc>>,
    pub seller_accept: bool,
    pub seller_accept_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Whether `user_id` is the buyer or the seller
    pub fn is_party(&self, user_id: UserId) -> bool {
        self.buyer_id == user_id || self.seller_id == user_id
    }

    /// The user allowed to act as `role`
    pub fn party(&self, role: AcceptRole) -> UserId {
        match role {
            AcceptRole::Buyer => self.buyer_id,
            AcceptRole::Seller => self.seller_id,
        }
    }

    /// Current acceptance flag of `role`
    pub fn flag(&self, role: AcceptRole) -> bool {
        match role {
            AcceptRole::Buyer => self.buyer_accept,
            AcceptRole::Seller => self.seller_accept,
        }
    }

    pub fn both_accepted(&self) -> bool {
        self.buyer_accept && self.seller_accept
    }
}

/// Insert payload for a new pending transaction
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub item_id: ItemId,
    pub seller_id: UserId,
    pub buyer_id: UserId,
    pub agreed_price: Decimal,
    pub amount: i32,
}
