//! Market Ledger - peer-to-peer marketplace backend
//!
//! Users list items with a price and a stock quantity; buyers open
//! transactions against them. A transaction reserves stock only once both
//! parties have accepted, and cancelling an accepted transaction gives the
//! stock back.
//!
//! # Modules
//!
//! - [`core_types`] - Identifier aliases (UserId, ItemId, TransactionId)
//! - [`money`] - Decimal price parsing and validation
//! - [`ledger`] - Transaction state machine, unit-of-work stores, retry coordinator
//! - [`inventory`] - Items and price history
//! - [`account`] - User rows
//! - [`user_auth`] - Registration, login, JWT middleware
//! - [`gateway`] - axum router, handlers, OpenAPI
//! - [`db`] - PostgreSQL pool and schema bootstrap
//! - [`config`] / [`logging`] - YAML configuration and tracing setup

// Core types - must be first!
pub mod core_types;
pub mod money;

// Domain
pub mod account;
pub mod inventory;
pub mod ledger;
pub mod user_auth;

// Infrastructure
pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;

// Convenient re-exports at crate root
pub use core_types::{ItemId, TransactionId, UserId};
pub use ledger::{
    LedgerError, LedgerStore, MemoryLedgerStore, PgLedgerStore, TransactionLedger,
    TransactionRecord, TransactionStatus,
};
