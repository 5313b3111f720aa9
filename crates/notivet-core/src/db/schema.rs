//! SQLite schema definition.

/// Complete database schema for the drug store.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Drugs
-- ============================================================================

CREATE TABLE IF NOT EXISTS drugs (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    generic_name TEXT,
    active_ingredient TEXT NOT NULL DEFAULT '',
    manufacturer TEXT NOT NULL DEFAULT '',
    description TEXT,
    dosage TEXT,
    contraindications TEXT,
    warnings TEXT,
    farad_info TEXT,
    withdrawal_time TEXT,
    product_code TEXT,
    establishment_code TEXT,
    subsidiaries TEXT,
    trade_name TEXT,
    distributors TEXT,
    species TEXT NOT NULL DEFAULT '[]',           -- JSON array of species codes
    delivery_methods TEXT NOT NULL DEFAULT '[]',  -- JSON array of strings
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Recency ordering for bounded retrieval
CREATE INDEX IF NOT EXISTS idx_drugs_created_at ON drugs(created_at);
CREATE INDEX IF NOT EXISTS idx_drugs_name ON drugs(name);
"#;
