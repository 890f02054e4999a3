//! Data models for the item store

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::error::ItemError;
use crate::core_types::{ItemId, UserId};
use crate::money;

/// Item listing status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    Available,
    Reserved,
    Sold,
    Hidden,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Available => "available",
            ItemStatus::Reserved => "reserved",
            ItemStatus::Sold => "sold",
            ItemStatus::Hidden => "hidden",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(ItemStatus::Available),
            "reserved" => Ok(ItemStatus::Reserved),
            "sold" => Ok(ItemStatus::Sold),
            "hidden" => Ok(ItemStatus::Hidden),
            other => Err(format!("Unknown item status: {}", other)),
        }
    }
}

impl TryFrom<String> for ItemStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Item listing
///
/// `quantity` is never negative; the ledger is its only writer outside of
/// owner edits.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct Item {
    pub id: ItemId,
    pub owner_id: UserId,
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = String, example = "100.00")]
    pub price: Decimal,
    pub quantity: i32,
    #[sqlx(try_from = "String")]
    pub status: ItemStatus,
    pub category_id: i64,
    pub group_id: Option<i64>,
    pub image_url: Option<String>,
    pub search_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Item {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Whether a new offer for `amount` units can be opened
    pub fn can_supply(&self, amount: i32) -> bool {
        !self.is_deleted() && self.status == ItemStatus::Available && self.quantity >= amount
    }
}

/// Owner-supplied item fields, shared by create and update
#[derive(Debug, Clone)]
pub struct ItemDraft {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
    pub status: ItemStatus,
    pub category_id: i64,
    pub group_id: Option<i64>,
    pub image_url: Option<String>,
    pub search_text: Option<String>,
}

impl ItemDraft {
    /// Validate the draft and normalize the price scale
    pub fn validate(mut self) -> Result<Self, ItemError> {
        if self.name.trim().is_empty() {
            return Err(ItemError::InvalidArgument("name must not be empty".into()));
        }
        if self.quantity < 0 {
            return Err(ItemError::InvalidArgument(
                "quantity must be >= 0".into(),
            ));
        }
        if self.category_id <= 0 {
            return Err(ItemError::InvalidArgument(
                "category_id must be > 0".into(),
            ));
        }
        self.price =
            money::validate_price(self.price).map_err(|e| ItemError::InvalidArgument(e.to_string()))?;
        Ok(self)
    }
}

/// Search and pagination for the public item listing
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub category_id: Option<i64>,
    pub skip: i64,
    pub limit: i64,
}

/// Price change record, written on create and on every price change
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct PriceHistory {
    pub id: i64,
    pub item_id: ItemId,
    pub user_id: UserId,
    #[schema(value_type = String, example = "100.00")]
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}


#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ItemDraft {
        ItemDraft {
            name: "Lamp".into(),
            description: None,
            price: Decimal::from_str("12.5").unwrap(),
            quantity: 3,
            status: ItemStatus::Available,
            category_id: 1,
            group_id: None,
            image_url: None,
            search_text: None,
        }
    }

    #[test]
    fn test_status_roundtrip_text() {
        for status in [
            ItemStatus::Available,
            ItemStatus::Reserved,
            ItemStatus::Sold,
            ItemStatus::Hidden,
        ] {
            assert_eq!(status.as_str().parse::<ItemStatus>(), Ok(status));
        }
        assert!("gone".parse::<ItemStatus>().is_err());
    }

    #[test]
    fn test_can_supply() {
        let mut item = fixtures::item(1, 7, "100.00", 10);
        assert!(item.can_supply(10));
        assert!(!item.can_supply(11));

        item.status = ItemStatus::Hidden;
        assert!(!item.can_supply(1));

        item.status = ItemStatus::Available;
        item.deleted_at = Some(Utc::now());
        assert!(!item.can_supply(1));
    }

    #[test]
    fn test_draft_validation() {
        let ok = draft().validate().unwrap();
        assert_eq!(ok.price.to_string(), "12.50");

        let mut bad = draft();
        bad.quantity = -1;
        assert!(matches!(bad.validate(), Err(ItemError::InvalidArgument(_))));

        let mut bad = draft();
        bad.name = "  ".into();
        assert!(bad.validate().is_err());

        let mut bad = draft();
        bad.price = Decimal::from_str("1.999").unwrap();
        assert!(bad.validate().is_err());

        let mut bad = draft();
        bad.category_id = 0;
        assert!(bad.validate().is_err());
    }
}
