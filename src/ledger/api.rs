//! Transaction request bodies
//!
//! Shape checks only (`validator`); business rules live in the ledger.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::core_types::ItemId;
use crate::money::StrictPrice;

/// POST /api/v1/transaction
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTransactionRequest {
    #[schema(example = 1)]
    pub item_id: ItemId,
    #[validate(range(min = 1, message = "amount must be greater than 0"))]
    #[schema(example = 2)]
    pub amount: i32,
}

/// PATCH /api/v1/transaction/{buyer|seller}/acception/{id}
#[derive(Debug, Deserialize, ToSchema)]
pub struct AcceptanceRequest {
    /// `false` withdraws an earlier acceptance
    #[schema(example = true)]
    pub accepter: bool,
    #[schema(example = "2026-01-01T12:00:00Z")]
    pub accept_at: DateTime<Utc>,
}

/// PATCH /api/v1/transaction/{id}
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TermsRequest {
    #[schema(value_type = String, example = "180.00")]
    pub agreed_price: StrictPrice,
    #[validate(range(min = 1, message = "amount must be greater than 0"))]
    #[schema(example = 2)]
    pub amount: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_rejects_zero_amount() {
        let req: CreateTransactionRequest =
            serde_json::from_str(r#"{"item_id": 1, "amount": 0}"#).unwrap();
        assert!(req.validate().is_err());

        let req: CreateTransactionRequest =
            serde_json::from_str(r#"{"item_id": 1, "amount": 3}"#).unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_acceptance_request_parses_rfc3339() {
        let req: AcceptanceRequest =
            serde_json::from_str(r#"{"accepter": false, "accept_at": "2026-01-01T12:00:00Z"}"#)
                .unwrap();
        assert!(!req.accepter);
        assert_eq!(req.accept_at.to_rfc3339(), "2026-01-01T12:00:00+00:00");
    }

    #[test]
    fn test_terms_request_requires_string_price() {
        let ok: TermsRequest =
            serde_json::from_str(r#"{"agreed_price": "180.5", "amount": 2}"#).unwrap();
        assert_eq!(ok.agreed_price.inner().to_string(), "180.50");

        assert!(serde_json::from_str::<TermsRequest>(r#"{"agreed_price": 180.5, "amount": 2}"#).is_err());
        assert!(serde_json::from_str::<TermsRequest>(r#"{"agreed_price": "1.234", "amount": 2}"#).is_err());
    }
}
