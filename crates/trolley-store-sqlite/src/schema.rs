//! SQL schema for the trolley SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS carts (
    cart_id                TEXT PRIMARY KEY,
    session_id             TEXT NOT NULL,
    user_id                TEXT,
    status                 TEXT NOT NULL DEFAULT 'active',  -- 'active' | 'abandoned' | 'recovered'
    items                  TEXT NOT NULL DEFAULT '[]',      -- JSON [{product_id, quantity}]
    cart_total             REAL NOT NULL DEFAULT 0,
    customer_email         TEXT,
    customer_name          TEXT,
    customer_phone         TEXT,
    created_at             TEXT NOT NULL,                   -- ISO 8601 UTC; store-assigned
    last_activity_at       TEXT NOT NULL,
    reminder_stage         INTEGER NOT NULL DEFAULT 0,
    recovery_email_sent_at TEXT,
    notes                  TEXT NOT NULL DEFAULT ''
);

-- At most one live tracking record per browsing session. Recovered carts
-- are terminal audit rows and fall outside the uniqueness scope.
CREATE UNIQUE INDEX IF NOT EXISTS carts_open_session_idx
    ON carts(session_id) WHERE status != 'recovered';

-- The sweeper and scheduler both select on (status, last_activity_at).
CREATE INDEX IF NOT EXISTS carts_status_activity_idx
    ON carts(status, last_activity_at);

-- Product read model: the join target when reconstructing line items for
-- recovery emails. Populated out-of-band from the storefront catalog.
CREATE TABLE IF NOT EXISTS products (
    product_id INTEGER PRIMARY KEY,
    name       TEXT NOT NULL,
    price      REAL NOT NULL,
    image_url  TEXT
);

PRAGMA user_version = 1;
";
