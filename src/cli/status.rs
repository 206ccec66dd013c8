use rusqlite::Connection;

use crate::audit;
use crate::db::get_connection;
use crate::error::Result;
use crate::settings::{db_path, load_settings};

fn count(conn: &Connection, sql: &str) -> i64 {
    conn.query_row(sql, [], |r| r.get(0)).unwrap_or(0)
}

pub fn run() -> Result<()> {
    let settings = load_settings();
    let conn = get_connection(&db_path())?;

    println!("Database: {}", db_path().display());
    println!("Operator: {}", settings.operator);
    println!(
        "Matching: ±{} day(s), auto-accept at {}",
        settings.matching.tolerance_days, settings.matching.auto_accept_threshold
    );
    println!();
    println!("Ledgers: {}", count(&conn, "SELECT count(*) FROM ledgers"));
    for status in ["draft", "processing", "completed", "verified"] {
        let n = conn
            .query_row(
                "SELECT count(*) FROM ledgers WHERE status = ?1",
                [status],
                |r| r.get::<_, i64>(0),
            )
            .unwrap_or(0);
        if n > 0 {
            println!("  {status}: {n}");
        }
    }
    println!("Items: {}", count(&conn, "SELECT count(*) FROM items"));
    println!(
        "Payments: {} pending, {} verified",
        count(&conn, "SELECT count(*) FROM payments WHERE status = 'pending'"),
        count(&conn, "SELECT count(*) FROM payments WHERE status = 'verified'"),
    );

    let recent = audit::recent(&conn, 5)?;
    if !recent.is_empty() {
        println!("\nRecent activity:");
        for (at, action, detail) in recent {
            println!("  {at}  {action}  {detail}");
        }
    }
    Ok(())
}
