//! Transaction State Definitions
//!
//! Stored as lowercase text in `transactions.status`. Decoding is strict:
//! an unknown stored value is a decode error, never a default.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Transaction lifecycle states
///
/// Terms and acceptance flags are frozen in every state except `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Offer created, at most one party has accepted
    Pending,

    /// Both parties accepted - item quantity has been debited
    Accepted,

    /// Terminal: withdrawn by a party (credited back if it was accepted)
    Cancelled,

    /// Buyer marked the transaction as paid
    Paid,
}

/// Unknown status text read from storage or a request
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown transaction status: {0}")]
pub struct UnknownStatus(pub String);

impl TransactionStatus {
    /// Whether terms and acceptance flags can still change
    #[inline]
    pub fn is_negotiable(&self) -> bool {
        matches!(self, TransactionStatus::Pending)
    }

    /// Whether a cancellation is a legal transition from this state
    #[inline]
    pub fn is_cancellable(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Pending | TransactionStatus::Accepted
        )
    }

    /// Get the storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Accepted => "accepted",
            TransactionStatus::Cancelled => "cancelled",
            TransactionStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransactionStatus::Pending),
            "accepted" => Ok(TransactionStatus::Accepted),
            "cancelled" => Ok(TransactionStatus::Cancelled),
            "paid" => Ok(TransactionStatus::Paid),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for TransactionStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Party acting in the bilateral acceptance sub-protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AcceptRole {
    Buyer,
    Seller,
}

impl AcceptRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AcceptRole::Buyer => "buyer",
            AcceptRole::Seller => "seller",
        }
    }
}

impl fmt::Display for AcceptRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negotiable_states() {
        assert!(TransactionStatus::Pending.is_negotiable());

        assert!(!TransactionStatus::Accepted.is_negotiable());
        assert!(!TransactionStatus::Cancelled.is_negotiable());
        assert!(!TransactionStatus::Paid.is_negotiable());
    }

    #[test]
    fn test_cancellable_states() {
        assert!(TransactionStatus::Pending.is_cancellable());
        assert!(TransactionStatus::Accepted.is_cancellable());

        assert!(!TransactionStatus::Cancelled.is_cancellable());
        assert!(!TransactionStatus::Paid.is_cancellable());
    }

    #[test]
    fn test_parse_stored_status() {
        assert_eq!(
            "accepted".parse::<TransactionStatus>(),
            Ok(TransactionStatus::Accepted)
        );
        assert_eq!(
            TransactionStatus::try_from("paid".to_string()),
            Ok(TransactionStatus::Paid)
        );
        assert_eq!(
            "ACCEPTED".parse::<TransactionStatus>(),
            Err(UnknownStatus("ACCEPTED".to_string()))
        );
        assert!("refunded".parse::<TransactionStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_storage_names() {
        let json = serde_json::to_string(&TransactionStatus::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");
        let role: AcceptRole = serde_json::from_str("\"seller\"").unwrap();
        assert_eq!(role, AcceptRole::Seller);
    }

    #[test]
    fn test_display() {
        assert_eq!(TransactionStatus::Pending.to_string(), "pending");
        assert_eq!(AcceptRole::Buyer.to_string(), "buyer");
    }
}
