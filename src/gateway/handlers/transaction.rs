//! Transaction handlers
//!
//! Thin wrappers: authenticate via the `Caller` extension, check the body
//! shape, call one ledger operation, map its error.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use validator::Validate;

use super::super::state::AppState;
use super::super::types::{
    ApiResponse, ApiResult, created, map_ledger_error, map_validation_error, ok,
};
use crate::core_types::TransactionId;
use crate::ledger::{
    AcceptRole, AcceptanceRequest, CreateTransactionRequest, TermsRequest, TransactionRecord,
};
use crate::user_auth::Caller;

/// Open a transaction on someone else's item
#[utoipa::path(
    post,
    path = "/api/v1/transaction",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transaction created", body = ApiResponse<TransactionRecord>),
        (status = 400, description = "Invalid amount or item not available"),
        (status = 401, description = "Authentication failed"),
        (status = 403, description = "Own item"),
        (status = 404, description = "Item or seller not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Transaction"
)]
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<CreateTransactionRequest>,
) -> ApiResult<TransactionRecord> {
    req.validate().map_err(map_validation_error)?;

    let record = state
        .ledger
        .create(caller.user_id, req.item_id, req.amount)
        .await
        .map_err(map_ledger_error)?;
    created(record)
}

/// Set or withdraw the buyer's acceptance
#[utoipa::path(
    patch,
    path = "/api/v1/transaction/buyer/acception/{id}",
    params(("id" = i64, Path, description = "Transaction ID")),
    request_body = AcceptanceRequest,
    responses(
        (status = 200, description = "Acceptance updated", body = ApiResponse<TransactionRecord>),
        (status = 400, description = "Not modifiable or item not available"),
        (status = 403, description = "Caller is not the buyer"),
        (status = 404, description = "Transaction not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Transaction"
)]
pub async fn buyer_acceptance(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<TransactionId>,
    Json(req): Json<AcceptanceRequest>,
) -> ApiResult<TransactionRecord> {
    set_acceptance(&state, caller, id, AcceptRole::Buyer, req).await
}

/// Set or withdraw the seller's acceptance
#[utoipa::path(
    patch,
    path = "/api/v1/transaction/seller/acception/{id}",
    params(("id" = i64, Path, description = "Transaction ID")),
    request_body = AcceptanceRequest,
    responses(
        (status = 200, description = "Acceptance updated", body = ApiResponse<TransactionRecord>),
        (status = 400, description = "Not modifiable or item not available"),
        (status = 403, description = "Caller is not the seller"),
        (status = 404, description = "Transaction not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Transaction"
)]
pub async fn seller_acceptance(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<TransactionId>,
    Json(req): Json<AcceptanceRequest>,
) -> ApiResult<TransactionRecord> {
    set_acceptance(&state, caller, id, AcceptRole::Seller, req).await
}

async fn set_acceptance(
    state: &AppState,
    caller: Caller,
    id: TransactionId,
    role: AcceptRole,
    req: AcceptanceRequest,
) -> ApiResult<TransactionRecord> {
    let record = state
        .ledger
        .set_acceptance(caller.user_id, id, role, req.accepter, req.accept_at)
        .await
        .map_err(map_ledger_error)?;
    ok(record)
}

/// Cancel a transaction
#[utoipa::path(
    patch,
    path = "/api/v1/transaction/cancel/{id}",
    params(("id" = i64, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Transaction cancelled", body = ApiResponse<TransactionRecord>),
        (status = 400, description = "Already cancelled or paid"),
        (status = 403, description = "Not a party, or buyer cancelling an accepted transaction"),
        (status = 404, description = "Transaction not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Transaction"
)]
pub async fn cancel_transaction(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<TransactionId>,
) -> ApiResult<TransactionRecord> {
    let record = state
        .ledger
        .cancel(caller.user_id, id)
        .await
        .map_err(map_ledger_error)?;
    ok(record)
}

/// Buyer marks a transaction paid
#[utoipa::path(
    patch,
    path = "/api/v1/transaction/paid/{id}",
    params(("id" = i64, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Transaction paid", body = ApiResponse<TransactionRecord>),
        (status = 400, description = "Transaction cancelled"),
        (status = 403, description = "Caller is not the buyer"),
        (status = 404, description = "Transaction not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Transaction"
)]
pub async fn mark_paid(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<TransactionId>,
) -> ApiResult<TransactionRecord> {
    let record = state
        .ledger
        .mark_paid(caller.user_id, id)
        .await
        .map_err(map_ledger_error)?;
    ok(record)
}

/// Renegotiate price and amount of a pending transaction
#[utoipa::path(
    patch,
    path = "/api/v1/transaction/{id}",
    params(("id" = i64, Path, description = "Transaction ID")),
    request_body = TermsRequest,
    responses(
        (status = 200, description = "Terms updated", body = ApiResponse<TransactionRecord>),
        (status = 400, description = "Invalid terms or not modifiable"),
        (status = 403, description = "Not a party"),
        (status = 404, description = "Transaction not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Transaction"
)]
pub async fn update_terms(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<TransactionId>,
    Json(req): Json<TermsRequest>,
) -> ApiResult<TransactionRecord> {
    req.validate().map_err(map_validation_error)?;

    let record = state
        .ledger
        .update_terms(caller.user_id, id, req.agreed_price.inner(), req.amount)
        .await
        .map_err(map_ledger_error)?;
    ok(record)
}

/// Transactions where the caller is buyer or seller
#[utoipa::path(
    get,
    path = "/api/v1/transaction/my",
    responses(
        (status = 200, description = "Caller's transactions, newest first", body = ApiResponse<Vec<TransactionRecord>>),
        (status = 401, description = "Authentication failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Transaction"
)]
pub async fn list_my_transactions(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Vec<TransactionRecord>> {
    let records = state
        .ledger
        .list_mine(caller.user_id)
        .await
        .map_err(map_ledger_error)?;
    ok(records)
}

/// One transaction, visible to its parties
#[utoipa::path(
    get,
    path = "/api/v1/transaction/{id}",
    params(("id" = i64, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Transaction", body = ApiResponse<TransactionRecord>),
        (status = 403, description = "Not a party"),
        (status = 404, description = "Transaction not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Transaction"
)]
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<TransactionId>,
) -> ApiResult<TransactionRecord> {
    let record = state
        .ledger
        .get(caller.user_id, id)
        .await
        .map_err(map_ledger_error)?;
    ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    use crate::inventory::ItemStatus;
    use crate::ledger::{MemoryLedgerStore, TransactionLedger, TransactionStatus};
    use crate::user_auth::TokenIssuer;

    const SELLER: Caller = Caller { user_id: 1 };
    const BUYER: Caller = Caller { user_id: 2 };

    async fn state_with_item() -> (Arc<AppState>, MemoryLedgerStore, i64) {
        let store = MemoryLedgerStore::new();
        store.add_user(SELLER.user_id).await;
        store.add_user(BUYER.user_id).await;
        let item_id = store
            .add_item(
                SELLER.user_id,
                Decimal::from_str("100.00").unwrap(),
                10,
                ItemStatus::Available,
            )
            .await;

        let ledger = Arc::new(TransactionLedger::new(Arc::new(store.clone()), 3));
        let tokens = Arc::new(TokenIssuer::new("test", Duration::minutes(5)));
        (Arc::new(AppState::new(None, ledger, tokens)), store, item_id)
    }

    fn accept_body() -> Json<AcceptanceRequest> {
        Json(AcceptanceRequest {
            accepter: true,
            accept_at: Utc::now(),
        })
    }

    #[tokio::test]
    async fn test_handshake_through_handlers() {
        let (state, store, item_id) = state_with_item().await;

        let (status, Json(body)) = create_transaction(
            State(state.clone()),
            Extension(BUYER),
            Json(CreateTransactionRequest { item_id, amount: 2 }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        let record = body.data.unwrap();
        assert_eq!(record.agreed_price.to_string(), "200.00");

        buyer_acceptance(State(state.clone()), Extension(BUYER), Path(record.id), accept_body())
            .await
            .unwrap();
        let (_, Json(body)) =
            seller_acceptance(State(state.clone()), Extension(SELLER), Path(record.id), accept_body())
                .await
                .unwrap();
        assert_eq!(body.data.unwrap().status, TransactionStatus::Accepted);
        assert_eq!(store.item(item_id).await.unwrap().quantity, 8);
    }

    #[tokio::test]
    async fn test_business_errors_map_to_status() {
        let (state, _store, item_id) = state_with_item().await;

        let (status, Json(body)) = create_transaction(
            State(state.clone()),
            Extension(SELLER),
            Json(CreateTransactionRequest { item_id, amount: 1 }),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body.msg, "You cannot perform this action on your own item");

        let (status, _) = create_transaction(
            State(state.clone()),
            Extension(BUYER),
            Json(CreateTransactionRequest { item_id, amount: 0 }),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = cancel_transaction(State(state.clone()), Extension(BUYER), Path(404))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_buyer_cancel_after_accept_is_forbidden() {
        let (state, _store, item_id) = state_with_item().await;
        let (_, Json(body)) = create_transaction(
            State(state.clone()),
            Extension(BUYER),
            Json(CreateTransactionRequest { item_id, amount: 1 }),
        )
        .await
        .unwrap();
        let id = body.data.unwrap().id;
        buyer_acceptance(State(state.clone()), Extension(BUYER), Path(id), accept_body())
            .await
            .unwrap();
        seller_acceptance(State(state.clone()), Extension(SELLER), Path(id), accept_body())
            .await
            .unwrap();

        let (status, Json(body)) = cancel_transaction(State(state.clone()), Extension(BUYER), Path(id))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            body.msg,
            "This transaction is already accepted, buyer cannot cancel"
        );

        let (_, Json(body)) = list_my_transactions(State(state.clone()), Extension(BUYER))
            .await
            .unwrap();
        assert_eq!(body.data.unwrap().len(), 1);
    }
}
