/// Lifecycle of an uploaded statement ledger. `Verified` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerStatus {
    Draft,
    Processing,
    Completed,
    Verified,
}

impl LedgerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Verified => "verified",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "processing" => Self::Processing,
            "completed" => Self::Completed,
            "verified" => Self::Verified,
            _ => Self::Draft,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Credit,
    Debit,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "debit" => Self::Debit,
            _ => Self::Credit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    Unmatched,
    Auto,
    Manual,
}

impl MatchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unmatched => "unmatched",
            Self::Auto => "auto",
            Self::Manual => "manual",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "auto" => Self::Auto,
            "manual" => Self::Manual,
            _ => Self::Unmatched,
        }
    }

    pub fn is_matched(&self) -> bool {
        !matches!(self, Self::Unmatched)
    }
}

/// One uploaded bank statement and its aggregate counters. Counters are a
/// cache over the owned items, recomputed after every mutation.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Ledger {
    pub id: i64,
    pub filename: String,
    pub original_filename: String,
    pub bank_name: Option<String>,
    pub statement_date: Option<String>,
    pub period_start: Option<String>,
    pub period_end: Option<String>,
    pub total_transactions: i64,
    pub total_amount: f64,
    pub matched_count: i64,
    pub matched_amount: f64,
    pub unmatched_count: i64,
    pub status: LedgerStatus,
    pub uploaded_by: Option<String>,
    pub verified_by: Option<String>,
    pub verified_at: Option<String>,
    pub notes: Option<String>,
}

impl Ledger {
    pub fn can_be_verified(&self) -> bool {
        self.status != LedgerStatus::Verified
            && self.total_transactions > 0
            && self.unmatched_count == 0
    }
}

/// One normalized transaction line within a ledger. `match_state` is
/// `Unmatched` iff `payment_id` is `None`.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct TransactionItem {
    pub id: i64,
    pub ledger_id: i64,
    pub date: String,
    pub description: String,
    pub amount: f64,
    pub direction: Direction,
    pub reference: Option<String>,
    pub match_state: MatchState,
    pub payment_id: Option<i64>,
    pub confidence: Option<i64>,
    pub matched_at: Option<String>,
    pub matched_by: Option<String>,
    pub notes: Option<String>,
}

/// Read model of an external payment record. The engine reads these and,
/// during verification only, triggers the mark-verified transition.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Payment {
    pub id: i64,
    pub payer_name: String,
    pub receipt_number: String,
    pub channel: String,
    pub amount: f64,
    pub payment_date: String,
    pub status: String,
}

/// Canonical transaction tuple produced by the normalizer, one per surviving
/// statement row.
#[derive(Debug, Clone)]
pub struct NormalizedRow {
    pub date: String,
    pub description: String,
    pub amount: f64,
    pub direction: Direction,
    pub reference: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for s in [
            LedgerStatus::Draft,
            LedgerStatus::Processing,
            LedgerStatus::Completed,
            LedgerStatus::Verified,
        ] {
            assert_eq!(LedgerStatus::parse(s.as_str()), s);
        }
        assert_eq!(LedgerStatus::parse("garbage"), LedgerStatus::Draft);
    }

    #[test]
    fn test_match_state_is_matched() {
        assert!(!MatchState::Unmatched.is_matched());
        assert!(MatchState::Auto.is_matched());
        assert!(MatchState::Manual.is_matched());
    }

    #[test]
    fn test_can_be_verified() {
        let mut ledger = Ledger {
            id: 1,
            filename: "s.csv".into(),
            original_filename: "s.csv".into(),
            bank_name: None,
            statement_date: None,
            period_start: None,
            period_end: None,
            total_transactions: 2,
            total_amount: 100.0,
            matched_count: 2,
            matched_amount: 100.0,
            unmatched_count: 0,
            status: LedgerStatus::Completed,
            uploaded_by: None,
            verified_by: None,
            verified_at: None,
            notes: None,
        };
        assert!(ledger.can_be_verified());
        ledger.unmatched_count = 1;
        assert!(!ledger.can_be_verified());
        ledger.unmatched_count = 0;
        ledger.status = LedgerStatus::Verified;
        assert!(!ledger.can_be_verified());
    }
}
