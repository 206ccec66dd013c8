//! The one place that mutates match state. Every operation runs inside a
//! single transaction and ends by recomputing the ledger counters, so a
//! failed bind can never leave counters out of sync with the items.

use rusqlite::{Connection, OptionalExtension};

use crate::audit;
use crate::config::MatchConfig;
use crate::error::{RekonError, Result};
use crate::ledger::{get_item, get_ledger, recompute_stats};
use crate::matcher::{decide, find_candidates, AutoDecision};
use crate::models::{Direction, MatchState, TransactionItem};
use crate::payments::get_payment;

pub struct AutoMatchSummary {
    pub matched: usize,
    pub total: usize,
}

/// Sweep every unmatched credit item in the ledger through the candidate
/// finder and scorer. Already-matched items are always skipped, so running
/// the sweep twice is safe and the second run reports {0, 0}.
pub fn auto_match(
    conn: &mut Connection,
    ledger_id: i64,
    cfg: &MatchConfig,
    actor: Option<&str>,
) -> Result<AutoMatchSummary> {
    get_ledger(conn, ledger_id)?;

    let tx = conn.transaction()?;
    let pending: Vec<TransactionItem> = {
        let mut stmt = tx.prepare(
            "SELECT id, ledger_id, date, description, amount, direction, reference, \
                    match_state, payment_id, confidence, matched_at, matched_by, notes \
             FROM items \
             WHERE ledger_id = ?1 AND match_state = 'unmatched' AND direction = 'credit' \
             ORDER BY date, id",
        )?;
        let items = stmt.query_map([ledger_id], |row| {
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
        })?;
        items.collect::<std::result::Result<Vec<_>, _>>()?
    };

    let total = pending.len();
    let mut matched = 0usize;
    for item in &pending {
        let candidates = find_candidates(&tx, item, cfg)?;
        if let AutoDecision::Accept { payment_id, confidence } = decide(item, &candidates, cfg) {
            tx.execute(
                "UPDATE items SET match_state = 'auto', payment_id = ?1, confidence = ?2, \
                 matched_at = datetime('now'), matched_by = ?3 WHERE id = ?4",
                rusqlite::params![payment_id, confidence, actor, item.id],
            )?;
            matched += 1;
        }
    }
    recompute_stats(&tx, ledger_id)?;
    tx.commit()?;

    audit::record(
        conn,
        "auto_match",
        Some(ledger_id),
        None,
        actor,
        &format!("{matched} of {total} matched"),
    );

    Ok(AutoMatchSummary { matched, total })
}

/// Bind one item to one payment on an operator's say-so. The payment-bound
/// check runs inside the same transaction as the bind, so two operators
/// racing for the same payment cannot both win.
pub fn manual_match(
    conn: &mut Connection,
    item_id: i64,
    payment_id: i64,
    actor: Option<&str>,
) -> Result<()> {
    let tx = conn.transaction()?;

    let item = get_item(&tx, item_id)?;
    if item.match_state.is_matched() {
        return Err(RekonError::AlreadyMatched(item_id));
    }
    get_payment(&tx, payment_id)?;

    let bound_elsewhere: Option<i64> = tx
        .query_row(
            "SELECT id FROM items WHERE payment_id = ?1 AND id != ?2",
            rusqlite::params![payment_id, item_id],
            |row| row.get(0),
        )
        .optional()?;
    if bound_elsewhere.is_some() {
        return Err(RekonError::PaymentAlreadyBound(payment_id));
    }

    tx.execute(
        "UPDATE items SET match_state = 'manual', payment_id = ?1, confidence = NULL, \
         matched_at = datetime('now'), matched_by = ?2 WHERE id = ?3",
        rusqlite::params![payment_id, actor, item_id],
    )?;
    recompute_stats(&tx, item.ledger_id)?;
    tx.commit()?;

    audit::record(
        conn,
        "manual_match",
        Some(item.ledger_id),
        Some(item_id),
        actor,
        &format!("payment {payment_id}"),
    );
    Ok(())
}

pub struct UnmatchOutcome {
    pub ledger_id: i64,
    /// The unbound payment had already been verified. Surfaced as a
    /// data-quality warning; the payment itself is never reversed.
    pub payment_was_verified: bool,
}

pub fn unmatch(conn: &mut Connection, item_id: i64, actor: Option<&str>) -> Result<UnmatchOutcome> {
    let tx = conn.transaction()?;

    let item = get_item(&tx, item_id)?;
    let Some(payment_id) = item.payment_id else {
        return Err(RekonError::NotMatched(item_id));
    };
    let payment_was_verified = get_payment(&tx, payment_id)
        .map(|p| p.status == "verified")
        .unwrap_or(false);

    tx.execute(
        "UPDATE items SET match_state = 'unmatched', payment_id = NULL, confidence = NULL, \
         matched_at = NULL, matched_by = NULL WHERE id = ?1",
        [item_id],
    )?;
    recompute_stats(&tx, item.ledger_id)?;
    tx.commit()?;

    let detail = if payment_was_verified {
        format!("payment {payment_id} unbound (payment already verified)")
    } else {
        format!("payment {payment_id} unbound")
    };
    audit::record(conn, "unmatch", Some(item.ledger_id), Some(item_id), actor, &detail);

    Ok(UnmatchOutcome {
        ledger_id: item.ledger_id,
        payment_was_verified,
    })
}
