//! Verification gate: the only path a ledger takes to `verified`, and the
//! only caller of the external payment mark-verified trigger. All-or-nothing
//! by construction — the payment triggers and the ledger flag share one
//! transaction.

use rusqlite::Connection;

use crate::audit;
use crate::error::{RekonError, Result};
use crate::ledger::get_ledger;
use crate::models::LedgerStatus;
use crate::payments;

#[derive(Debug)]
pub struct VerifyResult {
    /// Payments transitioned from pending to verified by this run.
    pub payments_verified: usize,
}

pub fn verify(conn: &mut Connection, ledger_id: i64, verifier: &str) -> Result<VerifyResult> {
    let tx = conn.transaction()?;

    let ledger = get_ledger(&tx, ledger_id)?;
    if ledger.status == LedgerStatus::Verified {
        return Err(RekonError::AlreadyVerified(ledger_id));
    }
    if !ledger.can_be_verified() {
        return Err(RekonError::NotReadyForVerification {
            ledger_id,
            unmatched: ledger.unmatched_count,
        });
    }

    let bound: Vec<i64> = {
        let mut stmt = tx.prepare(
            "SELECT payment_id FROM items \
             WHERE ledger_id = ?1 AND match_state != 'unmatched' AND payment_id IS NOT NULL",
        )?;
        let ids = stmt.query_map([ledger_id], |row| row.get(0))?;
        ids.collect::<std::result::Result<Vec<_>, _>>()?
    };

    let mut payments_verified = 0usize;
    for payment_id in bound {
        let payment = payments::get_payment(&tx, payment_id)?;
        if payment.status == "pending" {
            payments::mark_verified(&tx, payment_id)?;
            payments_verified += 1;
        }
    }

    tx.execute(
        "UPDATE ledgers SET status = 'verified', verified_by = ?1, verified_at = datetime('now') \
         WHERE id = ?2",
        rusqlite::params![verifier, ledger_id],
    )?;
    tx.commit()?;

    audit::record(
        conn,
        "verify",
        Some(ledger_id),
        None,
        Some(verifier),
        &format!("{payments_verified} payment(s) verified"),
    );

    Ok(VerifyResult { payments_verified })
}
