//! PostgreSQL schema
//!
//! Idempotent DDL executed at startup by `Database::init_schema`.
//! Column constraints mirror the ledger invariants so a bug in application
//! code cannot persist a negative stock or a self-trade.

pub const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        user_id       BIGSERIAL PRIMARY KEY,
        username      VARCHAR(64)  NOT NULL UNIQUE,
        email         VARCHAR(255) NOT NULL UNIQUE,
        password_hash TEXT         NOT NULL,
        is_active     BOOLEAN      NOT NULL DEFAULT TRUE,
        created_at    TIMESTAMPTZ  NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS items (
        id          BIGSERIAL PRIMARY KEY,
        owner_id    BIGINT        NOT NULL REFERENCES users (user_id),
        name        TEXT          NOT NULL,
        description TEXT,
        price       NUMERIC(10,2) NOT NULL CHECK (price >= 0),
        quantity    INTEGER       NOT NULL CHECK (quantity >= 0),
        status      VARCHAR(16)   NOT NULL DEFAULT 'available'
                    CHECK (status IN ('available', 'reserved', 'sold', 'hidden')),
        category_id BIGINT        NOT NULL,
        group_id    BIGINT,
        image_url   TEXT,
        search_text TEXT,
        created_at  TIMESTAMPTZ   NOT NULL DEFAULT NOW(),
        updated_at  TIMESTAMPTZ   NOT NULL DEFAULT NOW(),
        deleted_at  TIMESTAMPTZ
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_items_owner ON items (owner_id) WHERE deleted_at IS NULL",
    // item names are unique per owner among live items
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_items_owner_name ON items (owner_id, name) WHERE deleted_at IS NULL",
    r#"
    CREATE TABLE IF NOT EXISTS price_histories (
        id         BIGSERIAL PRIMARY KEY,
        item_id    BIGINT        NOT NULL REFERENCES items (id),
        user_id    BIGINT        NOT NULL REFERENCES users (user_id),
        price      NUMERIC(10,2) NOT NULL,
        created_at TIMESTAMPTZ   NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_price_histories_item ON price_histories (item_id, created_at)",
    r#"
    CREATE TABLE IF NOT EXISTS transactions (
        id               BIGSERIAL PRIMARY KEY,
        item_id          BIGINT        NOT NULL REFERENCES items (id),
        seller_id        BIGINT        NOT NULL REFERENCES users (user_id),
        buyer_id         BIGINT        NOT NULL REFERENCES users (user_id),
        status           VARCHAR(16)   NOT NULL DEFAULT 'pending'
                         CHECK (status IN ('pending', 'accepted', 'cancelled', 'paid')),
        agreed_price     NUMERIC(10,2) NOT NULL CHECK (agreed_price >= 0),
        amount           INTEGER       NOT NULL CHECK (amount > 0),
        buyer_accept     BOOLEAN       NOT NULL DEFAULT FALSE,
        buyer_accept_at  TIMESTAMPTZ,
        seller_accept    BOOLEAN       NOT NULL DEFAULT FALSE,
        seller_accept_at TIMESTAMPTZ,
        cancelled_at     TIMESTAMPTZ,
        paid_at          TIMESTAMPTZ,
        created_at       TIMESTAMPTZ   NOT NULL DEFAULT NOW(),
        updated_at       TIMESTAMPTZ   NOT NULL DEFAULT NOW(),
        CHECK (buyer_id <> seller_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_transactions_buyer ON transactions (buyer_id)",
    "CREATE INDEX IF NOT EXISTS idx_transactions_seller ON transactions (seller_id)",
];
