//! HTTP gateway
//!
//! All routes live under `/api/v1`. Transaction routes and the owner-side
//! item routes sit behind the JWT middleware; the item listing, login and
//! registration are public.

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use anyhow::Context;
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, patch, post, put},
};
use std::sync::Arc;
use tokio::net::TcpListener;

// OpenAPI / Swagger UI
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::user_auth::jwt_auth_middleware;
use state::AppState;

/// Build the complete application router
pub fn router(state: Arc<AppState>) -> Router {
    // ==========================================================================
    // Auth Routes
    // ==========================================================================
    let auth_routes = Router::new()
        .route("/register", post(crate::user_auth::handlers::register))
        .route("/login", post(crate::user_auth::handlers::login));

    // ==========================================================================
    // Public Routes (no auth required)
    // ==========================================================================
    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/item", get(handlers::list_items))
        .route("/item/{id}", get(handlers::get_item))
        .route("/item/user/{user_id}", get(handlers::list_user_items));

    // ==========================================================================
    // Private Routes (JWT required)
    // ==========================================================================
    let private_routes = Router::new()
        // Transactions
        .route("/transaction", post(handlers::create_transaction))
        .route("/transaction/my", get(handlers::list_my_transactions))
        .route(
            "/transaction/{id}",
            get(handlers::get_transaction).patch(handlers::update_terms),
        )
        .route(
            "/transaction/buyer/acception/{id}",
            patch(handlers::buyer_acceptance),
        )
        .route(
            "/transaction/seller/acception/{id}",
            patch(handlers::seller_acceptance),
        )
        .route("/transaction/cancel/{id}", patch(handlers::cancel_transaction))
        .route("/transaction/paid/{id}", patch(handlers::mark_paid))
        // Owner-side items
        .route("/item/my", post(handlers::create_item))
        .route(
            "/item/my/{id}",
            put(handlers::update_item).delete(handlers::delete_item),
        )
        .route("/item/my/{id}/pricehistories", get(handlers::price_history))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    let api = Router::new()
        .nest("/auth", auth_routes)
        .merge(public_routes)
        .merge(private_routes);

    Router::new()
        .nest("/api/v1", api)
        .with_state(state)
        // OpenAPI / Swagger UI (stateless, added after with_state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Bind and serve until the process is stopped
pub async fn run_server(state: Arc<AppState>, host: &str, port: u16) -> anyhow::Result<()> {
    let app = router(state.clone());

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {} (port may already be in use)", addr))?;

    tracing::info!(
        addr = %addr,
        ledger_store = state.ledger.store_name(),
        postgres = state.db.is_some(),
        "Gateway listening"
    );
    tracing::info!("API Docs: http://{}/docs", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
