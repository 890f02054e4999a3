//! Item handlers
//!
//! Public listing and owner-side CRUD over `ItemRepository`. All of them need
//! PostgreSQL and answer 503 when it is not configured.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use sqlx::PgPool;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::super::state::AppState;
use super::super::types::{
    ApiError, ApiResponse, ApiResult, created, map_item_error, map_validation_error, ok,
    service_unavailable,
};
use crate::core_types::{ItemId, UserId};
use crate::inventory::{Item, ItemDraft, ItemFilter, ItemRepository, ItemStatus, PriceHistory};
use crate::money::StrictPrice;
use crate::user_auth::Caller;

const DEFAULT_PAGE_SIZE: i64 = 20;

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// Create / replace body for an item
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ItemRequest {
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    #[schema(example = "Desk lamp")]
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = String, example = "100.00")]
    pub price: StrictPrice,
    #[validate(range(min = 0, message = "quantity must be >= 0"))]
    #[schema(example = 10)]
    pub quantity: i32,
    #[serde(default)]
    pub status: ItemStatus,
    #[validate(range(min = 1, message = "category_id must be > 0"))]
    #[schema(example = 1)]
    pub category_id: i64,
    pub group_id: Option<i64>,
    pub image_url: Option<String>,
    pub search_text: Option<String>,
}

impl From<ItemRequest> for ItemDraft {
    fn from(req: ItemRequest) -> Self {
        ItemDraft {
            name: req.name,
            description: req.description,
            price: req.price.inner(),
            quantity: req.quantity,
            status: req.status,
            category_id: req.category_id,
            group_id: req.group_id,
            image_url: req.image_url,
            search_text: req.search_text,
        }
    }
}

/// Query string of the public listing
#[derive(Debug, Deserialize, IntoParams)]
pub struct ItemQuery {
    /// Case-insensitive name substring
    pub search: Option<String>,
    #[param(value_type = Option<String>)]
    pub min_price: Option<StrictPrice>,
    #[param(value_type = Option<String>)]
    pub max_price: Option<StrictPrice>,
    pub category_id: Option<i64>,
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl From<ItemQuery> for ItemFilter {
    fn from(q: ItemQuery) -> Self {
        ItemFilter {
            search: q.search,
            min_price: q.min_price.map(StrictPrice::inner),
            max_price: q.max_price.map(StrictPrice::inner),
            category_id: q.category_id,
            skip: q.skip,
            limit: q.limit,
        }
    }
}

/// Offset pagination
#[derive(Debug, Deserialize, IntoParams)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn pool(state: &AppState) -> Result<&PgPool, ApiError> {
    state
        .db
        .as_ref()
        .map(|db| db.pool())
        .ok_or_else(|| service_unavailable("Database"))
}

fn db_error(e: sqlx::Error) -> ApiError {
    map_item_error(e.into())
}

/// List live items
#[utoipa::path(
    get,
    path = "/api/v1/item",
    params(ItemQuery),
    responses(
        (status = 200, description = "Items", body = ApiResponse<Vec<Item>>),
        (status = 503, description = "Database unavailable")
    ),
    tag = "Item"
)]
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ItemQuery>,
) -> ApiResult<Vec<Item>> {
    let filter = ItemFilter::from(query);
    let items = ItemRepository::list(pool(&state)?, &filter)
        .await
        .map_err(db_error)?;
    ok(items)
}

/// Get one live item
#[utoipa::path(
    get,
    path = "/api/v1/item/{id}",
    params(("id" = i64, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item", body = ApiResponse<Item>),
        (status = 404, description = "Item not found")
    ),
    tag = "Item"
)]
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ItemId>,
) -> ApiResult<Item> {
    let item = ItemRepository::fetch(pool(&state)?, id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| map_item_error(crate::inventory::ItemError::NotFound(id)))?;
    ok(item)
}

/// Live items of one owner
#[utoipa::path(
    get,
    path = "/api/v1/item/user/{user_id}",
    params(("user_id" = i64, Path, description = "Owner ID"), Pagination),
    responses(
        (status = 200, description = "Items", body = ApiResponse<Vec<Item>>)
    ),
    tag = "Item"
)]
pub async fn list_user_items(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
    Query(page): Query<Pagination>,
) -> ApiResult<Vec<Item>> {
    let items = ItemRepository::list_by_owner(pool(&state)?, user_id, page.skip, page.limit)
        .await
        .map_err(db_error)?;
    ok(items)
}

/// Create an item owned by the caller
#[utoipa::path(
    post,
    path = "/api/v1/item/my",
    request_body = ItemRequest,
    responses(
        (status = 201, description = "Item created", body = ApiResponse<Item>),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Duplicate name for this owner")
    ),
    security(("bearer_auth" = [])),
    tag = "Item"
)]
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<ItemRequest>,
) -> ApiResult<Item> {
    req.validate().map_err(map_validation_error)?;

    let item = ItemRepository::create(pool(&state)?, caller.user_id, req.into())
        .await
        .map_err(map_item_error)?;
    created(item)
}

/// Replace every field of an item the caller owns
#[utoipa::path(
    put,
    path = "/api/v1/item/my/{id}",
    params(("id" = i64, Path, description = "Item ID")),
    request_body = ItemRequest,
    responses(
        (status = 200, description = "Item updated", body = ApiResponse<Item>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Item"
)]
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<ItemId>,
    Json(req): Json<ItemRequest>,
) -> ApiResult<Item> {
    req.validate().map_err(map_validation_error)?;

    let item = ItemRepository::update(pool(&state)?, caller.user_id, id, req.into())
        .await
        .map_err(map_item_error)?;
    ok(item)
}

/// Soft-delete an item the caller owns
#[utoipa::path(
    delete,
    path = "/api/v1/item/my/{id}",
    params(("id" = i64, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item deleted", body = ApiResponse<i64>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Item"
)]
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<ItemId>,
) -> ApiResult<ItemId> {
    ItemRepository::soft_delete(pool(&state)?, caller.user_id, id)
        .await
        .map_err(map_item_error)?;
    ok(id)
}

/// Price changes the caller made on an item, newest first
#[utoipa::path(
    get,
    path = "/api/v1/item/my/{id}/pricehistories",
    params(("id" = i64, Path, description = "Item ID"), Pagination),
    responses(
        (status = 200, description = "Price history", body = ApiResponse<Vec<PriceHistory>>),
        (status = 404, description = "Item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Item"
)]
pub async fn price_history(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<ItemId>,
    Query(page): Query<Pagination>,
) -> ApiResult<Vec<PriceHistory>> {
    let rows = ItemRepository::price_history(pool(&state)?, caller.user_id, id, page.skip, page.limit)
        .await
        .map_err(map_item_error)?;
    ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::Duration;

    use crate::ledger::{MemoryLedgerStore, TransactionLedger};
    use crate::user_auth::TokenIssuer;

    fn state_without_db() -> Arc<AppState> {
        let ledger = Arc::new(TransactionLedger::new(Arc::new(MemoryLedgerStore::new()), 3));
        let tokens = Arc::new(TokenIssuer::new("test", Duration::minutes(5)));
        Arc::new(AppState::new(None, ledger, tokens))
    }

    #[test]
    fn test_item_request_defaults_and_validation() {
        let req: ItemRequest = serde_json::from_str(
            r#"{"name": "Lamp", "price": "12.5", "quantity": 3, "category_id": 1}"#,
        )
        .unwrap();
        assert_eq!(req.status, ItemStatus::Available);
        assert!(req.validate().is_ok());

        let draft = ItemDraft::from(req);
        assert_eq!(draft.price.to_string(), "12.50");

        let bad: ItemRequest = serde_json::from_str(
            r#"{"name": "", "price": "1", "quantity": -1, "category_id": 0}"#,
        )
        .unwrap();
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("quantity"));
        assert!(fields.contains_key("category_id"));
    }

    #[test]
    fn test_query_defaults() {
        let q: ItemQuery = serde_json::from_str(r#"{"min_price": "5"}"#).unwrap();
        let filter = ItemFilter::from(q);
        assert_eq!(filter.limit, DEFAULT_PAGE_SIZE);
        assert_eq!(filter.skip, 0);
        assert_eq!(filter.min_price.unwrap().to_string(), "5.00");
    }

    #[tokio::test]
    async fn test_item_routes_need_database() {
        let (status, Json(body)) = get_item(State(state_without_db()), Path(1))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.msg, "Database unavailable");
    }
}
