use std::path::Path;

use rusqlite::{params, Connection};

use crate::error::Result;
use crate::models::Tenant;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS tenants (
    id INTEGER PRIMARY KEY,
    apartment TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    alt_names TEXT NOT NULL DEFAULT '[]',
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS grid_columns (
    id INTEGER PRIMARY KEY,
    label TEXT NOT NULL UNIQUE,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS grid_rows (
    id INTEGER PRIMARY KEY,
    apartment TEXT NOT NULL UNIQUE,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS grid_cells (
    row_id INTEGER NOT NULL,
    column_id INTEGER NOT NULL,
    amount REAL NOT NULL,
    underpaid INTEGER DEFAULT 0,
    PRIMARY KEY (row_id, column_id),
    FOREIGN KEY (row_id) REFERENCES grid_rows(id),
    FOREIGN KEY (column_id) REFERENCES grid_columns(id)
);

CREATE TABLE IF NOT EXISTS audit_log (
    id INTEGER PRIMARY KEY,
    date TEXT NOT NULL,
    amount REAL NOT NULL,
    payer TEXT NOT NULL,
    apartment TEXT NOT NULL,
    reference TEXT,
    receipt_link TEXT,
    months_covered TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS receipts (
    id INTEGER PRIMARY KEY,
    number TEXT NOT NULL UNIQUE,
    year INTEGER NOT NULL,
    seq INTEGER NOT NULL,
    apartment TEXT NOT NULL,
    payer TEXT NOT NULL,
    amount REAL NOT NULL,
    date TEXT NOT NULL,
    reference TEXT,
    created_at TEXT DEFAULT (datetime('now')),
    UNIQUE (year, seq)
);

CREATE TABLE IF NOT EXISTS processed (
    txn_id TEXT PRIMARY KEY,
    processed_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS unmatched (
    id INTEGER PRIMARY KEY,
    txn_id TEXT NOT NULL UNIQUE,
    date TEXT NOT NULL,
    amount REAL NOT NULL,
    description TEXT NOT NULL,
    method TEXT NOT NULL,
    seen_at TEXT DEFAULT (datetime('now'))
);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Tenants in insertion order; alternate names are stored as a JSON array.
pub fn load_tenants(conn: &Connection) -> Result<Vec<Tenant>> {
    let mut stmt = conn.prepare("SELECT apartment, name, alt_names FROM tenants ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;
    let mut tenants = Vec::new();
    for row in rows {
        let (apartment, name, alt_json) = row?;
        let alt_names: Vec<String> = serde_json::from_str(&alt_json).unwrap_or_default();
        tenants.push(Tenant {
            apartment,
            name,
            alt_names,
        });
    }
    Ok(tenants)
}

pub fn upsert_tenant(conn: &Connection, tenant: &Tenant) -> Result<()> {
    let alt_json =
        serde_json::to_string(&tenant.alt_names).unwrap_or_else(|_| "[]".to_string());
    conn.execute(
        "INSERT INTO tenants (apartment, name, alt_names) VALUES (?1, ?2, ?3) \
         ON CONFLICT(apartment) DO UPDATE SET name = excluded.name, alt_names = excluded.alt_names",
        params![tenant.apartment, tenant.name, alt_json],
    )?;
    Ok(())
}
