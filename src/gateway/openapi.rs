//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::gateway::handlers::{HealthResponse, ItemRequest};
use crate::inventory::{Item, ItemStatus, PriceHistory};
use crate::ledger::{
    AcceptRole, AcceptanceRequest, CreateTransactionRequest, TermsRequest, TransactionRecord,
    TransactionStatus,
};
use crate::user_auth::{AuthResponse, LoginRequest, RegisterRequest};

/// JWT bearer authentication security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token from POST /api/v1/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Market Ledger API",
        version = "1.0.0",
        description = "Marketplace items and peer-to-peer transactions with bilateral acceptance and inventory reservation."
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::user_auth::handlers::register,
        crate::user_auth::handlers::login,
        crate::gateway::handlers::transaction::create_transaction,
        crate::gateway::handlers::transaction::buyer_acceptance,
        crate::gateway::handlers::transaction::seller_acceptance,
        crate::gateway::handlers::transaction::cancel_transaction,
        crate::gateway::handlers::transaction::mark_paid,
        crate::gateway::handlers::transaction::update_terms,
        crate::gateway::handlers::transaction::list_my_transactions,
        crate::gateway::handlers::transaction::get_transaction,
        crate::gateway::handlers::item::list_items,
        crate::gateway::handlers::item::get_item,
        crate::gateway::handlers::item::list_user_items,
        crate::gateway::handlers::item::create_item,
        crate::gateway::handlers::item::update_item,
        crate::gateway::handlers::item::delete_item,
        crate::gateway::handlers::item::price_history,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            TransactionRecord,
            TransactionStatus,
            AcceptRole,
            CreateTransactionRequest,
            AcceptanceRequest,
            TermsRequest,
            Item,
            ItemStatus,
            ItemRequest,
            PriceHistory,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "System", description = "Health"),
        (name = "Auth", description = "Registration and login"),
        (name = "Transaction", description = "Peer-to-peer transactions"),
        (name = "Item", description = "Item listings"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_transaction_routes() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/api/v1/transaction"));
        assert!(paths.contains_key("/api/v1/transaction/buyer/acception/{id}"));
        assert!(paths.contains_key("/api/v1/transaction/my"));
        assert!(paths.contains_key("/api/v1/item/my/{id}/pricehistories"));
    }

    #[test]
    fn test_openapi_has_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
