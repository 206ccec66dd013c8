use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS ledgers (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    original_filename TEXT NOT NULL,
    bank_name TEXT,
    statement_date TEXT,
    period_start TEXT,
    period_end TEXT,
    total_transactions INTEGER NOT NULL DEFAULT 0,
    total_amount REAL NOT NULL DEFAULT 0,
    matched_count INTEGER NOT NULL DEFAULT 0,
    matched_amount REAL NOT NULL DEFAULT 0,
    unmatched_count INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'draft',
    uploaded_by TEXT,
    verified_by TEXT,
    verified_at TEXT,
    notes TEXT,
    checksum TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY,
    ledger_id INTEGER NOT NULL,
    date TEXT NOT NULL,
    description TEXT NOT NULL,
    amount REAL NOT NULL,
    direction TEXT NOT NULL DEFAULT 'credit',
    reference TEXT,
    match_state TEXT NOT NULL DEFAULT 'unmatched',
    payment_id INTEGER,
    confidence INTEGER,
    matched_at TEXT,
    matched_by TEXT,
    notes TEXT,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (ledger_id) REFERENCES ledgers(id) ON DELETE CASCADE,
    FOREIGN KEY (payment_id) REFERENCES payments(id)
);

CREATE TABLE IF NOT EXISTS payments (
    id INTEGER PRIMARY KEY,
    payer_name TEXT NOT NULL,
    receipt_number TEXT NOT NULL,
    channel TEXT NOT NULL DEFAULT 'bank_transfer',
    amount REAL NOT NULL,
    payment_date TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    verified_at TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS audit_log (
    id INTEGER PRIMARY KEY,
    action TEXT NOT NULL,
    ledger_id INTEGER,
    item_id INTEGER,
    actor TEXT,
    detail TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_items_ledger ON items(ledger_id);
CREATE INDEX IF NOT EXISTS idx_items_payment ON items(payment_id);
CREATE INDEX IF NOT EXISTS idx_payments_lookup ON payments(channel, status, payment_date);
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

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, conn) = test_db();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &["ledgers", "items", "payments", "audit_log"] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, conn) = test_db();
        init_db(&conn).unwrap();
    }

    #[test]
    fn test_deleting_ledger_cascades_items() {
        let (_dir, conn) = test_db();
        conn.execute(
            "INSERT INTO ledgers (filename, original_filename) VALUES ('a.csv', 'a.csv')", [],
        ).unwrap();
        let ledger_id = conn.last_insert_rowid();
        conn.execute(
            "INSERT INTO items (ledger_id, date, description, amount) VALUES (?1, '2025-03-10', 'SPP MARET', 150000.0)",
            [ledger_id],
        ).unwrap();
        conn.execute("DELETE FROM ledgers WHERE id = ?1", [ledger_id]).unwrap();
        let count: i64 = conn.query_row("SELECT count(*) FROM items", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 0);
    }
}
