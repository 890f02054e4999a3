//! Core types used throughout the system
//!
//! Identifier aliases shared by every module. All identifiers are
//! PostgreSQL `BIGSERIAL` keys, so they are signed 64-bit integers.

/// User ID - primary key of `users`, immutable after assignment.
///
/// # Usage:
/// - Caller identity threaded explicitly into every ledger operation
/// - Owner reference on items, buyer/seller references on transactions
pub type UserId = i64;

/// Item ID - primary key of `items`
pub type ItemId = i64;

/// Transaction ID - primary key of `transactions`
pub type TransactionId = i64;
