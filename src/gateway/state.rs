use std::sync::Arc;

use crate::db::Database;
use crate::ledger::TransactionLedger;
use crate::user_auth::{TokenIssuer, UserAuthService};

/// Shared gateway state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL database; the server always sets it, handler tests may not
    pub db: Option<Arc<Database>>,
    /// Transaction ledger (Postgres in the server, in-memory in tests)
    pub ledger: Arc<TransactionLedger>,
    /// Bearer token verification
    pub tokens: Arc<TokenIssuer>,
    /// Registration and login (requires PostgreSQL)
    pub user_auth: Option<Arc<UserAuthService>>,
}

impl AppState {
    pub fn new(
        db: Option<Arc<Database>>,
        ledger: Arc<TransactionLedger>,
        tokens: Arc<TokenIssuer>,
    ) -> Self {
        let user_auth = db
            .as_ref()
            .map(|db| Arc::new(UserAuthService::new(db.pool().clone(), tokens.clone())));
        Self {
            db,
            ledger,
            tokens,
            user_auth,
        }
    }
}
