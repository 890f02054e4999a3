//! Transaction Ledger
//!
//! Peer-to-peer transactions between a buyer and the owner of an item.
//!
//! ```text
//!                 both accept (debit item)
//!   create ──► Pending ────────────────────► Accepted
//!                │  ▲ one flag set/unset        │
//!                │  └──┘                        │ seller cancels (credit item)
//!                │ cancel                       ▼
//!                └────────────────────────► Cancelled
//!
//!   Pending | Accepted ── buyer marks paid ──► Paid  (idempotent)
//! ```
//!
//! The item quantity is debited exactly once, when the second flag turns
//! true, and credited back exactly once, when an accepted transaction is
//! cancelled. Every operation takes the caller id explicitly and runs as one
//! unit of work on a [`LedgerStore`].

pub mod acceptance;
pub mod api;
pub mod coordinator;
pub mod db;
pub mod error;
pub mod memory;
pub mod state;
pub mod store;
pub mod types;


pub use acceptance::AcceptanceOutcome;
pub use api::{AcceptanceRequest, CreateTransactionRequest, TermsRequest};
pub use coordinator::{DEFAULT_MAX_RETRIES, TransactionLedger};
pub use db::PgLedgerStore;
pub use error::LedgerError;
pub use memory::MemoryLedgerStore;
pub use state::{AcceptRole, TransactionStatus, UnknownStatus};
pub use store::{LedgerStore, UnitOfWork};
pub use types::{NewTransaction, TransactionRecord};
