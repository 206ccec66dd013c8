//! Read/write boundary to the external payment ledger. Everything here is
//! the only surface the engine is allowed to touch: candidate lookups, and
//! the mark-verified trigger fired by the verification gate.

use rusqlite::{Connection, OptionalExtension, Row};

use crate::error::{RekonError, Result};
use crate::models::Payment;

pub const BANK_TRANSFER: &str = "bank_transfer";

fn payment_from_row(row: &Row) -> rusqlite::Result<Payment> {
    Ok(Payment {
        id: row.get(0)?,
        payer_name: row.get(1)?,
        receipt_number: row.get(2)?,
        channel: row.get(3)?,
        amount: row.get(4)?,
        payment_date: row.get(5)?,
        status: row.get(6)?,
    })
}

const PAYMENT_COLUMNS: &str =
    "id, payer_name, receipt_number, channel, amount, payment_date, status";

pub fn get_payment(conn: &Connection, payment_id: i64) -> Result<Payment> {
    conn.query_row(
        &format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = ?1"),
        [payment_id],
        payment_from_row,
    )
    .optional()?
    .ok_or(RekonError::UnknownPayment(payment_id))
}

pub fn list_payments(conn: &Connection, status: Option<&str>) -> Result<Vec<Payment>> {
    let mut out = Vec::new();
    match status {
        Some(status) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PAYMENT_COLUMNS} FROM payments WHERE status = ?1 ORDER BY payment_date, id"
            ))?;
            let rows = stmt.query_map([status], payment_from_row)?;
            for row in rows {
                out.push(row?);
            }
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PAYMENT_COLUMNS} FROM payments ORDER BY payment_date, id"
            ))?;
            let rows = stmt.query_map([], payment_from_row)?;
            for row in rows {
                out.push(row?);
            }
        }
    }
    Ok(out)
}

pub fn add_payment(
    conn: &Connection,
    payer_name: &str,
    receipt_number: &str,
    channel: &str,
    amount: f64,
    payment_date: &str,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO payments (payer_name, receipt_number, channel, amount, payment_date, status) \
         VALUES (?1, ?2, ?3, ?4, ?5, 'pending')",
        rusqlite::params![payer_name, receipt_number, channel, amount, payment_date],
    )?;
    Ok(conn.last_insert_rowid())
}

/// The one mutation the engine may apply to a payment. Errors when the
/// payment does not exist so a verify sweep can roll back.
pub fn mark_verified(conn: &Connection, payment_id: i64) -> Result<()> {
    let updated = conn.execute(
        "UPDATE payments SET status = 'verified', verified_at = datetime('now') \
         WHERE id = ?1 AND status = 'pending'",
        [payment_id],
    )?;
    if updated == 0 {
        // Already verified is fine; missing is not.
        let exists: Option<i64> = conn
            .query_row("SELECT id FROM payments WHERE id = ?1", [payment_id], |r| r.get(0))
            .optional()?;
        if exists.is_none() {
            return Err(RekonError::UnknownPayment(payment_id));
        }
    }
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

    #[test]
    fn test_add_and_get_payment() {
        let (_dir, conn) = test_db();
        let id = add_payment(&conn, "Andi Wijaya", "KWT-001", BANK_TRANSFER, 150000.0, "2025-03-10")
            .unwrap();
        let payment = get_payment(&conn, id).unwrap();
        assert_eq!(payment.payer_name, "Andi Wijaya");
        assert_eq!(payment.status, "pending");
    }

    #[test]
    fn test_mark_verified_transitions_once() {
        let (_dir, conn) = test_db();
        let id = add_payment(&conn, "Andi", "KWT-001", BANK_TRANSFER, 150000.0, "2025-03-10").unwrap();
        mark_verified(&conn, id).unwrap();
        let payment = get_payment(&conn, id).unwrap();
        assert_eq!(payment.status, "verified");
        // Second trigger is a no-op, not an error
        mark_verified(&conn, id).unwrap();
    }

    #[test]
    fn test_mark_verified_unknown_payment() {
        let (_dir, conn) = test_db();
        assert!(matches!(mark_verified(&conn, 99), Err(RekonError::UnknownPayment(99))));
    }

    #[test]
    fn test_list_payments_filters_by_status() {
        let (_dir, conn) = test_db();
        let a = add_payment(&conn, "Andi", "KWT-001", BANK_TRANSFER, 150000.0, "2025-03-10").unwrap();
        add_payment(&conn, "Budi", "KWT-002", BANK_TRANSFER, 80000.0, "2025-03-11").unwrap();
        mark_verified(&conn, a).unwrap();
        assert_eq!(list_payments(&conn, Some("pending")).unwrap().len(), 1);
        assert_eq!(list_payments(&conn, None).unwrap().len(), 2);
    }
}
