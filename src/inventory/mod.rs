//! Item store
//!
//! Item listings with soft delete and price history. The transaction ledger
//! reads and locks items through [`ItemRepository::fetch_for_update`] and
//! moves stock with [`ItemRepository::adjust_quantity`].

pub mod error;
pub mod models;
pub mod repository;

pub use error::ItemError;
pub use models::{Item, ItemDraft, ItemFilter, ItemStatus, PriceHistory};
pub use repository::ItemRepository;
