// SQLite persistence. The connection is opened once at process start and
// passed in explicitly; every query is a free function over &Connection so
// tests can run against Connection::open_in_memory().

pub mod connections;
pub mod holding;
pub mod tracker;
pub mod transactions;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::path::Path;

pub use connections::*;
pub use holding::*;
pub use tracker::*;
pub use transactions::*;

/// Open (or create) the database file and ensure the schema exists.
pub fn open_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database at {:?}", path))?;
    setup_database(&conn)?;
    Ok(conn)
}

/// In-memory database with the full schema, for tests.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    setup_database(&conn)?;
    Ok(conn)
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS holding_accounts (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS companies (
            id TEXT PRIMARY KEY,
            holding_account_id TEXT NOT NULL,
            name TEXT NOT NULL,
            color TEXT NOT NULL,
            display_order INTEGER NOT NULL,
            active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS profit_centers (
            id TEXT PRIMARY KEY,
            holding_account_id TEXT NOT NULL,
            company_id TEXT NOT NULL,
            name TEXT NOT NULL,
            display_order INTEGER NOT NULL,
            active INTEGER NOT NULL DEFAULT 1,
            -- NULL means included: legacy rows predate the flag
            include_in_projection INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS normalized_transactions (
            id TEXT PRIMARY KEY,
            holding_account_id TEXT NOT NULL,
            profit_center_id TEXT NOT NULL,
            company_id TEXT NOT NULL,
            txn_date TEXT NOT NULL,
            amount_cents INTEGER NOT NULL,
            currency TEXT NOT NULL,
            provider TEXT NOT NULL,
            external_id TEXT,
            description TEXT NOT NULL,
            raw_event_id TEXT,
            is_projected INTEGER NOT NULL DEFAULT 0,
            -- Set only by the bulk importer; NULLs never collide
            idempotency_hash TEXT UNIQUE,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS note_entries (
            id TEXT PRIMARY KEY,
            profit_center_id TEXT NOT NULL,
            text TEXT NOT NULL,
            created_by TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS overhead_items (
            id TEXT PRIMARY KEY,
            profit_center_id TEXT NOT NULL,
            name TEXT NOT NULL,
            amount_cents INTEGER NOT NULL,
            frequency TEXT NOT NULL DEFAULT 'monthly',
            note TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS financial_connections (
            id TEXT PRIMARY KEY,
            holding_account_id TEXT NOT NULL,
            provider TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'disconnected',
            external_account_id TEXT,
            metadata TEXT NOT NULL DEFAULT '{}',
            last_synced_at TEXT,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS mapping_rules (
            id TEXT PRIMARY KEY,
            holding_account_id TEXT NOT NULL,
            provider TEXT NOT NULL,
            match_type TEXT NOT NULL,
            match_value TEXT NOT NULL,
            profit_center_id TEXT NOT NULL,
            priority INTEGER NOT NULL DEFAULT 0,
            active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS team_members (
            id TEXT PRIMARY KEY,
            holding_account_id TEXT NOT NULL,
            name TEXT NOT NULL,
            role TEXT,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS kanban_columns (
            id TEXT PRIMARY KEY,
            holding_account_id TEXT NOT NULL,
            title TEXT NOT NULL,
            color TEXT NOT NULL,
            display_order INTEGER NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS kanban_cards (
            id TEXT PRIMARY KEY,
            holding_account_id TEXT NOT NULL,
            profit_center_id TEXT,
            column_id TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            amount_cents INTEGER,
            due_date TEXT,
            priority TEXT,
            display_order INTEGER NOT NULL,
            completed INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS rocks (
            id TEXT PRIMARY KEY,
            holding_account_id TEXT NOT NULL,
            profit_center_id TEXT,
            company_id TEXT,
            title TEXT NOT NULL,
            description TEXT,
            owner_id TEXT,
            due_date TEXT,
            status TEXT NOT NULL DEFAULT 'active',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS resources (
            id TEXT PRIMARY KEY,
            holding_account_id TEXT NOT NULL,
            scope_type TEXT NOT NULL,
            scope_id TEXT NOT NULL,
            title TEXT NOT NULL,
            url TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_companies_holding ON companies(holding_account_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_profit_centers_holding ON profit_centers(holding_account_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_profit_centers_company ON profit_centers(company_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_txn_holding_date
         ON normalized_transactions(holding_account_id, txn_date)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_txn_profit_center
         ON normalized_transactions(profit_center_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_notes_profit_center ON note_entries(profit_center_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_overhead_profit_center ON overhead_items(profit_center_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_cards_holding ON kanban_cards(holding_account_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_cards_column ON kanban_cards(column_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_rocks_holding_status ON rocks(holding_account_id, status)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_resources_scope ON resources(scope_type, scope_id)",
        [],
    )?;

    Ok(())
}

/// Parse an RFC 3339 timestamp column.
pub(crate) fn parse_ts(value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Parse an optional RFC 3339 timestamp column.
pub(crate) fn parse_opt_ts(value: Option<String>) -> Option<DateTime<Utc>> {
    value
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Per-table row counts, for the CLI summary.
pub fn table_counts(conn: &Connection) -> Result<Vec<(String, i64)>> {
    let tables = [
        "holding_accounts",
        "companies",
        "profit_centers",
        "normalized_transactions",
        "note_entries",
        "overhead_items",
        "financial_connections",
        "mapping_rules",
        "team_members",
        "kanban_columns",
        "kanban_cards",
        "rocks",
        "resources",
    ];
    let mut counts = Vec::with_capacity(tables.len());
    for table in tables {
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?;
        counts.push((table.to_string(), count));
    }
    Ok(counts)
}
