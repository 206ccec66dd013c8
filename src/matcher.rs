use rusqlite::Connection;

use crate::config::MatchConfig;
use crate::error::Result;
use crate::models::{Payment, TransactionItem};
use crate::payments::BANK_TRANSFER;

// Scoring weights. These define what the 0-100 score means, so they are
// fixed here; the acceptance threshold and date window are settings.
pub const AMOUNT_WEIGHT: i64 = 50;
pub const SAME_DAY_WEIGHT: i64 = 40;
pub const ONE_DAY_WEIGHT: i64 = 30;
pub const OTHER_DAY_WEIGHT: i64 = 20;
pub const PAYER_NAME_WEIGHT: i64 = 10;
pub const RECEIPT_WEIGHT: i64 = 10;
pub const MAX_SCORE: i64 = 100;

// Confidence recorded when a multi-candidate sweep resolves on the unique
// same-day candidate.
pub const EXACT_DATE_CONFIDENCE: i64 = 95;

fn amounts_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < 0.005
}

fn day_gap(a: &str, b: &str) -> i64 {
    let parse = |s: &str| chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").ok();
    match (parse(a), parse(b)) {
        (Some(a), Some(b)) => (a - b).num_days().abs(),
        _ => i64::MAX,
    }
}

/// Payments structurally eligible to match one unmatched credit item:
/// bank-transfer channel, pending or already-verified status, amount equal,
/// date within the tolerance window, and not bound to any item in any
/// ledger.
pub fn find_candidates(
    conn: &Connection,
    item: &TransactionItem,
    cfg: &MatchConfig,
) -> Result<Vec<Payment>> {
    let item_date = chrono::NaiveDate::parse_from_str(&item.date, "%Y-%m-%d")
        .map_err(|e| crate::error::RekonError::Other(format!("bad item date {}: {e}", item.date)))?;
    let window_start = (item_date - chrono::Duration::days(cfg.tolerance_days))
        .format("%Y-%m-%d")
        .to_string();
    let window_end = (item_date + chrono::Duration::days(cfg.tolerance_days))
        .format("%Y-%m-%d")
        .to_string();

    let mut stmt = conn.prepare(
        "SELECT id, payer_name, receipt_number, channel, amount, payment_date, status \
         FROM payments \
         WHERE channel = ?1 AND status IN ('pending', 'verified') \
           AND payment_date BETWEEN ?2 AND ?3 \
           AND ABS(amount - ?4) < 0.005 \
           AND NOT EXISTS (SELECT 1 FROM items WHERE items.payment_id = payments.id) \
         ORDER BY payment_date, id",
    )?;
    let candidates = stmt
        .query_map(
            rusqlite::params![BANK_TRANSFER, window_start, window_end, item.amount],
            |row| {
                Ok(Payment {
                    id: row.get(0)?,
                    payer_name: row.get(1)?,
                    receipt_number: row.get(2)?,
                    channel: row.get(3)?,
                    amount: row.get(4)?,
                    payment_date: row.get(5)?,
                    status: row.get(6)?,
                })
            },
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(candidates)
}

/// Score one (item, payment) pair in [0, 100]. Also usable outside the
/// candidate filter, e.g. to surface suggestions for manual review.
pub fn score(item: &TransactionItem, payment: &Payment) -> i64 {
    let mut score = 0;

    if amounts_equal(item.amount, payment.amount) {
        score += AMOUNT_WEIGHT;
    }

    score += match day_gap(&item.date, &payment.payment_date) {
        0 => SAME_DAY_WEIGHT,
        1 => ONE_DAY_WEIGHT,
        _ => OTHER_DAY_WEIGHT,
    };

    let haystack = format!(
        "{} {}",
        item.description,
        item.reference.as_deref().unwrap_or("")
    )
    .to_lowercase();
    let payer = payment.payer_name.trim().to_lowercase();
    if !payer.is_empty() && haystack.contains(&payer) {
        score += PAYER_NAME_WEIGHT;
    }
    let receipt = payment.receipt_number.trim().to_lowercase();
    if !receipt.is_empty() && haystack.contains(&receipt) {
        score += RECEIPT_WEIGHT;
    }

    score.min(MAX_SCORE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoDecision {
    Accept { payment_id: i64, confidence: i64 },
    NoCandidates,
    BelowThreshold,
    Ambiguous,
}

/// Auto-match decision for one item. A single candidate is accepted at or
/// above the threshold. Multiple candidates are resolved only when exactly
/// one is same-day; any other ambiguity is left for a human reviewer.
pub fn decide(item: &TransactionItem, candidates: &[Payment], cfg: &MatchConfig) -> AutoDecision {
    match candidates {
        [] => AutoDecision::NoCandidates,
        [only] => {
            let s = score(item, only);
            if s >= cfg.auto_accept_threshold {
                AutoDecision::Accept {
                    payment_id: only.id,
                    confidence: s,
                }
            } else {
                AutoDecision::BelowThreshold
            }
        }
        many => {
            let same_day: Vec<&Payment> = many
                .iter()
                .filter(|p| day_gap(&item.date, &p.payment_date) == 0)
                .collect();
            if let [winner] = same_day.as_slice() {
                AutoDecision::Accept {
                    payment_id: winner.id,
                    confidence: EXACT_DATE_CONFIDENCE,
                }
            } else {
                AutoDecision::Ambiguous
            }
        }
    }
}
