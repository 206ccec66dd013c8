use rusqlite::Connection;

/// Append one audit trail entry. Fire-and-observe: a failed append is
/// reported on stderr but never blocks the operation that triggered it.
pub fn record(
    conn: &Connection,
    action: &str,
    ledger_id: Option<i64>,
    item_id: Option<i64>,
    actor: Option<&str>,
    detail: &str,
) {
    let result = conn.execute(
        "INSERT INTO audit_log (action, ledger_id, item_id, actor, detail) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![action, ledger_id, item_id, actor, detail],
    );
    if let Err(e) = result {
        eprintln!("warning: audit log write failed for '{action}': {e}");
    }
}

pub fn recent(conn: &Connection, limit: i64) -> rusqlite::Result<Vec<(String, String, String)>> {
    let mut stmt = conn.prepare(
        "SELECT created_at, action, detail FROM audit_log ORDER BY id DESC LIMIT ?1",
    )?;
    let rows = stmt
        .query_map([limit], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
