//! HTTP handlers

pub mod health;
pub mod item;
pub mod transaction;

pub use health::{HealthResponse, health_check};
pub use item::{
    ItemQuery, ItemRequest, Pagination, create_item, delete_item, get_item, list_items,
    list_user_items, price_history, update_item,
};
pub use transaction::{
    buyer_acceptance, cancel_transaction, create_transaction, get_transaction,
    list_my_transactions, mark_paid, seller_acceptance, update_terms,
};
