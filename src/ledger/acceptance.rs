//! Bilateral acceptance
//!
//! Pure rules for the buyer/seller handshake. No I/O: the coordinator loads
//! and locks the record, runs these checks, then persists what they produced.
//!
//! ```text
//!   buyer_accept  seller_accept   status
//!   ------------  -------------   --------
//!      false          false       pending
//!      true           false       pending
//!      false          true        pending
//!      true           true        accepted  (item debited)
//! ```

use chrono::{DateTime, Utc};

use super::error::LedgerError;
use super::state::{AcceptRole, TransactionStatus};
use super::types::TransactionRecord;
use crate::core_types::UserId;

/// Result of applying one party's flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptanceOutcome {
    /// At least one flag is still false
    Pending,
    /// Both flags are true; the caller must debit the item in the same unit
    Completed,
}

/// Check that `caller` may act as `role` on this record
pub fn authorize(
    record: &TransactionRecord,
    caller: UserId,
    role: AcceptRole,
) -> Result<(), LedgerError> {
    if record.party(role) != caller {
        return Err(LedgerError::Forbidden(format!(
            "You are not the {} of this transaction",
            role
        )));
    }
    Ok(())
}

/// Check that flags and terms are still open for change
pub fn ensure_negotiable(record: &TransactionRecord) -> Result<(), LedgerError> {
    if !record.status.is_negotiable() {
        return Err(LedgerError::InvalidState(format!(
            "Transaction cannot be modified because it is {}",
            record.status
        )));
    }
    Ok(())
}

/// Set `role`'s flag and timestamp, then derive the status from both flags
///
/// Un-accepting (`accept == false`) is allowed and always yields `Pending`.
pub fn apply(
    record: &mut TransactionRecord,
    role: AcceptRole,
    accept: bool,
    at: DateTime<Utc>,
) -> AcceptanceOutcome {
    match role {
        AcceptRole::Buyer => {
            record.buyer_accept = accept;
            record.buyer_accept_at = Some(at);
        }
        AcceptRole::Seller => {
            record.seller_accept = accept;
            record.seller_accept_at = Some(at);
        }
    }

    if record.both_accepted() {
        record.status = TransactionStatus::Accepted;
        AcceptanceOutcome::Completed
    } else {
        record.status = TransactionStatus::Pending;
        AcceptanceOutcome::Pending
    }
}
