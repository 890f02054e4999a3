//! Market Ledger - HTTP entry point
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌───────────────────┐    ┌────────────┐
//! │  Config  │───▶│ Gateway  │───▶│ TransactionLedger │───▶│ LedgerStore│
//! │  (YAML)  │    │  (axum)  │    │  (retry, rules)   │    │ (PG / mem) │
//! └──────────┘    └──────────┘    └───────────────────┘    └────────────┘
//! ```
//!
//! Usage: `market_ledger [--env dev] [--port 8080]`

use std::sync::Arc;

use anyhow::Context;
use market_ledger::config::AppConfig;
use market_ledger::db::Database;
use market_ledger::gateway::{self, state::AppState};
use market_ledger::ledger::{PgLedgerStore, TransactionLedger};
use market_ledger::user_auth::TokenIssuer;

/// Get environment from command line (--env / -e), default "dev"
fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let app_config = AppConfig::load(&env)?;
    let _log_guard = market_ledger::logging::init_logging(&app_config);

    tracing::info!(env = %env, version = env!("GIT_HASH"), "Starting Market Ledger");

    let db = Database::connect(app_config.database_url()?)
        .await
        .context("Failed to connect to PostgreSQL")?;
    db.init_schema()
        .await
        .context("Failed to initialize schema")?;
    tracing::info!("PostgreSQL connected, schema ready");
    let db = Arc::new(db);

    let store = Arc::new(PgLedgerStore::new(db.pool().clone()));
    let ledger = Arc::new(TransactionLedger::new(
        store,
        app_config.ledger.max_conflict_retries,
    ));
    let tokens = Arc::new(TokenIssuer::new(
        app_config.auth.jwt_secret.clone(),
        chrono::Duration::minutes(app_config.auth.token_ttl_minutes),
    ));

    let state = Arc::new(AppState::new(Some(db), ledger, tokens));

    let port = get_port_override().unwrap_or(app_config.gateway.port);
    gateway::run_server(state, &app_config.gateway.host, port).await
}
