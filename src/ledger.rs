use rusqlite::{Connection, OptionalExtension, Row};
use sha2::{Digest, Sha256};

use crate::audit;
use crate::config::ParserConfig;
use crate::error::{RekonError, Result};
use crate::models::{Direction, Ledger, LedgerStatus, MatchState, TransactionItem};
use crate::normalizer::normalize_rows;
use crate::parser::{parse_statement, FileKind};

pub struct UploadMeta {
    pub bank_name: Option<String>,
    pub statement_date: Option<String>,
    pub uploaded_by: Option<String>,
}

#[derive(Debug)]
pub struct UploadResult {
    pub ledger_id: i64,
    pub imported: usize,
    pub skipped_rows: usize,
    pub duplicate_file: bool,
}

fn compute_checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Ingest one uploaded statement: parse, normalize, and create the ledger
/// with all of its items in a single transaction. Re-uploads of a file
/// already ingested are detected by checksum and create nothing.
pub fn ingest_statement(
    conn: &mut Connection,
    bytes: &[u8],
    original_filename: &str,
    kind: FileKind,
    cfg: &ParserConfig,
    meta: &UploadMeta,
) -> Result<UploadResult> {
    let checksum = compute_checksum(bytes);
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM ledgers WHERE checksum = ?1",
            [&checksum],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(ledger_id) = existing {
        return Ok(UploadResult {
            ledger_id,
            imported: 0,
            skipped_rows: 0,
            duplicate_file: true,
        });
    }

    let stmt = parse_statement(bytes, kind, cfg)?;
    let total_rows = stmt.rows.len();
    let rows = normalize_rows(&stmt, cfg);
    if rows.is_empty() {
        return Err(RekonError::NoTransactions);
    }
    let skipped_rows = total_rows - rows.len();

    let period_start = rows.iter().map(|r| r.date.as_str()).min().map(String::from);
    let period_end = rows.iter().map(|r| r.date.as_str()).max().map(String::from);

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO ledgers (filename, original_filename, bank_name, statement_date, period_start, period_end, status, uploaded_by, checksum) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'draft', ?7, ?8)",
        rusqlite::params![
            original_filename,
            original_filename,
            meta.bank_name,
            meta.statement_date,
            period_start,
            period_end,
            meta.uploaded_by,
            checksum,
        ],
    )?;
    let ledger_id = tx.last_insert_rowid();

    for row in &rows {
        tx.execute(
            "INSERT INTO items (ledger_id, date, description, amount, direction, reference, match_state) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'unmatched')",
            rusqlite::params![
                ledger_id,
                row.date,
                row.description,
                row.amount,
                row.direction.as_str(),
                row.reference,
            ],
        )?;
    }
    recompute_stats(&tx, ledger_id)?;
    tx.commit()?;

    audit::record(
        conn,
        "upload",
        Some(ledger_id),
        None,
        meta.uploaded_by.as_deref(),
        &format!("{original_filename}: {} item(s), {skipped_rows} row(s) skipped", rows.len()),
    );

    Ok(UploadResult {
        ledger_id,
        imported: rows.len(),
        skipped_rows,
        duplicate_file: false,
    })
}

/// Recompute the cached counters from the live item set. This is the only
/// way counters change; nothing increments them ad hoc.
pub fn recompute_stats(conn: &Connection, ledger_id: i64) -> Result<()> {
    let (total, total_amount, matched, matched_amount): (i64, f64, i64, f64) = conn.query_row(
        "SELECT count(*), COALESCE(SUM(amount), 0), \
                COALESCE(SUM(match_state != 'unmatched'), 0), \
                COALESCE(SUM(CASE WHEN match_state != 'unmatched' THEN amount ELSE 0 END), 0) \
         FROM items WHERE ledger_id = ?1",
        [ledger_id],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
    )?;
    let unmatched = total - matched;

    let current: String = conn.query_row(
        "SELECT status FROM ledgers WHERE id = ?1",
        [ledger_id],
        |row| row.get(0),
    )?;
    let status = match LedgerStatus::parse(&current) {
        LedgerStatus::Verified => LedgerStatus::Verified,
        _ if total > 0 && unmatched == 0 => LedgerStatus::Completed,
        _ if matched > 0 => LedgerStatus::Processing,
        _ => LedgerStatus::Draft,
    };

    conn.execute(
        "UPDATE ledgers SET total_transactions = ?1, total_amount = ?2, matched_count = ?3, \
         matched_amount = ?4, unmatched_count = ?5, status = ?6 WHERE id = ?7",
        rusqlite::params![
            total,
            total_amount,
            matched,
            matched_amount,
            unmatched,
            status.as_str(),
            ledger_id,
        ],
    )?;
    Ok(())
}

fn ledger_from_row(row: &Row) -> rusqlite::Result<Ledger> {
    Ok(Ledger {
        id: row.get(0)?,
        filename: row.get(1)?,
        original_filename: row.get(2)?,
        bank_name: row.get(3)?,
        statement_date: row.get(4)?,
        period_start: row.get(5)?,
        period_end: row.get(6)?,
        total_transactions: row.get(7)?,
        total_amount: row.get(8)?,
        matched_count: row.get(9)?,
        matched_amount: row.get(10)?,
        unmatched_count: row.get(11)?,
        status: LedgerStatus::parse(&row.get::<_, String>(12)?),
        uploaded_by: row.get(13)?,
        verified_by: row.get(14)?,
        verified_at: row.get(15)?,
        notes: row.get(16)?,
    })
}

const LEDGER_COLUMNS: &str = "id, filename, original_filename, bank_name, statement_date, \
    period_start, period_end, total_transactions, total_amount, matched_count, matched_amount, \
    unmatched_count, status, uploaded_by, verified_by, verified_at, notes";

pub fn get_ledger(conn: &Connection, ledger_id: i64) -> Result<Ledger> {
    conn.query_row(
        &format!("SELECT {LEDGER_COLUMNS} FROM ledgers WHERE id = ?1"),
        [ledger_id],
        ledger_from_row,
    )
    .optional()?
    .ok_or(RekonError::UnknownLedger(ledger_id))
}

pub fn list_ledgers(conn: &Connection) -> Result<Vec<Ledger>> {
    let mut stmt =
        conn.prepare(&format!("SELECT {LEDGER_COLUMNS} FROM ledgers ORDER BY id DESC"))?;
    let ledgers = stmt
        .query_map([], ledger_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(ledgers)
}

fn item_from_row(row: &Row) -> rusqlite::Result<TransactionItem> {
    Ok(TransactionItem {
        id: row.get(0)?,
        ledger_id: row.get(1)?,
        date: row.get(2)?,
        description: row.get(3)?,
        amount: row.get(4)?,
        direction: Direction::parse(&row.get::<_, String>(5)?),
        reference: row.get(6)?,
        match_state: MatchState::parse(&row.get::<_, String>(7)?),
        payment_id: row.get(8)?,
        confidence: row.get(9)?,
        matched_at: row.get(10)?,
        matched_by: row.get(11)?,
        notes: row.get(12)?,
    })
}

const ITEM_COLUMNS: &str = "id, ledger_id, date, description, amount, direction, reference, \
    match_state, payment_id, confidence, matched_at, matched_by, notes";

pub fn get_item(conn: &Connection, item_id: i64) -> Result<TransactionItem> {
    conn.query_row(
        &format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1"),
        [item_id],
        item_from_row,
    )
    .optional()?
    .ok_or(RekonError::UnknownItem(item_id))
}

pub fn list_items(conn: &Connection, ledger_id: i64) -> Result<Vec<TransactionItem>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ITEM_COLUMNS} FROM items WHERE ledger_id = ?1 ORDER BY date, id"
    ))?;
    let items = stmt
        .query_map([ledger_id], item_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(items)
}

/// Delete a ledger and its items. Only draft ledgers are deletable.
pub fn delete_ledger(conn: &Connection, ledger_id: i64, actor: Option<&str>) -> Result<()> {
    let ledger = get_ledger(conn, ledger_id)?;
    if ledger.status != LedgerStatus::Draft {
        return Err(RekonError::NotDraft(ledger_id));
    }
    conn.execute("DELETE FROM ledgers WHERE id = ?1", [ledger_id])?;
    audit::record(conn, "delete", Some(ledger_id), None, actor, &ledger.original_filename);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn meta() -> UploadMeta {
        UploadMeta {
            bank_name: Some("BCA".to_string()),
            statement_date: None,
            uploaded_by: Some("tata_usaha".to_string()),
        }
    }

    const STATEMENT: &str = "Tanggal,Keterangan,Jumlah\n\
        10/03/2025,TRANSFER SPP ANDI,150000\n\
        bad-date,UNPARSABLE,50000\n\
        11/03/2025,BIAYA ADMIN,-6500\n";

    #[test]
    fn test_ingest_creates_draft_ledger_with_items() {
        let (_dir, mut conn) = test_db();
        let result =
            ingest_statement(&mut conn, STATEMENT.as_bytes(), "maret.csv", FileKind::Csv, &ParserConfig::default(), &meta())
                .unwrap();
        assert!(!result.duplicate_file);
        assert_eq!(result.imported, 2);
        assert_eq!(result.skipped_rows, 1);

        let ledger = get_ledger(&conn, result.ledger_id).unwrap();
        assert_eq!(ledger.status, LedgerStatus::Draft);
        assert_eq!(ledger.total_transactions, 2);
        assert_eq!(ledger.unmatched_count, 2);
        assert_eq!(ledger.matched_count, 0);
        assert_eq!(ledger.period_start.as_deref(), Some("2025-03-10"));
        assert_eq!(ledger.period_end.as_deref(), Some("2025-03-11"));
        assert_eq!(ledger.bank_name.as_deref(), Some("BCA"));
    }

    #[test]
    fn test_ingest_detects_duplicate_upload() {
        let (_dir, mut conn) = test_db();
        let cfg = ParserConfig::default();
        let first =
            ingest_statement(&mut conn, STATEMENT.as_bytes(), "maret.csv", FileKind::Csv, &cfg, &meta()).unwrap();
        let second =
            ingest_statement(&mut conn, STATEMENT.as_bytes(), "maret-again.csv", FileKind::Csv, &cfg, &meta())
                .unwrap();
        assert!(second.duplicate_file);
        assert_eq!(second.ledger_id, first.ledger_id);
        let count: i64 = conn.query_row("SELECT count(*) FROM ledgers", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_ingest_rejects_statement_with_no_usable_rows() {
        let (_dir, mut conn) = test_db();
        let all_bad = "Tanggal,Keterangan,Jumlah\nbad,ROW,also-bad\n";
        let err = ingest_statement(
            &mut conn, all_bad.as_bytes(), "junk.csv", FileKind::Csv, &ParserConfig::default(), &meta(),
        )
        .unwrap_err();
        assert!(matches!(err, RekonError::NoTransactions));
        // No half-created ledger survives the failure
        let count: i64 = conn.query_row("SELECT count(*) FROM ledgers", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_counters_are_consistent_after_ingest() {
        let (_dir, mut conn) = test_db();
        let result =
            ingest_statement(&mut conn, STATEMENT.as_bytes(), "maret.csv", FileKind::Csv, &ParserConfig::default(), &meta())
                .unwrap();
        let ledger = get_ledger(&conn, result.ledger_id).unwrap();
        assert_eq!(ledger.matched_count + ledger.unmatched_count, ledger.total_transactions);
        assert_eq!(ledger.total_amount, 156500.0);
        assert_eq!(ledger.matched_amount, 0.0);
    }

    #[test]
    fn test_delete_draft_ledger_cascades() {
        let (_dir, mut conn) = test_db();
        let result =
            ingest_statement(&mut conn, STATEMENT.as_bytes(), "maret.csv", FileKind::Csv, &ParserConfig::default(), &meta())
                .unwrap();
        delete_ledger(&conn, result.ledger_id, Some("tata_usaha")).unwrap();
        let items: i64 = conn.query_row("SELECT count(*) FROM items", [], |r| r.get(0)).unwrap();
        assert_eq!(items, 0);
        assert!(matches!(
            get_ledger(&conn, result.ledger_id),
            Err(RekonError::UnknownLedger(_))
        ));
    }

    #[test]
    fn test_delete_non_draft_fails() {
        let (_dir, mut conn) = test_db();
        let result =
            ingest_statement(&mut conn, STATEMENT.as_bytes(), "maret.csv", FileKind::Csv, &ParserConfig::default(), &meta())
                .unwrap();
        conn.execute(
            "UPDATE ledgers SET status = 'completed' WHERE id = ?1",
            [result.ledger_id],
        )
        .unwrap();
        assert!(matches!(
            delete_ledger(&conn, result.ledger_id, None),
            Err(RekonError::NotDraft(_))
        ));
    }

    #[test]
    fn test_unknown_ledger_and_item() {
        let (_dir, conn) = test_db();
        assert!(matches!(get_ledger(&conn, 42), Err(RekonError::UnknownLedger(42))));
        assert!(matches!(get_item(&conn, 42), Err(RekonError::UnknownItem(42))));
    }
}
