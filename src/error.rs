use thiserror::Error;

#[derive(Error, Debug)]
pub enum RekonError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Statement file is empty or has no data rows")]
    EmptyFile,

    #[error("No transactions could be extracted from the statement")]
    NoTransactions,

    #[error("Unknown ledger: {0}")]
    UnknownLedger(i64),

    #[error("Unknown transaction item: {0}")]
    UnknownItem(i64),

    #[error("Unknown payment: {0}")]
    UnknownPayment(i64),

    #[error("Item {0} is already matched; unmatch it first")]
    AlreadyMatched(i64),

    #[error("Payment {0} is already bound to another transaction item")]
    PaymentAlreadyBound(i64),

    #[error("Item {0} is not matched")]
    NotMatched(i64),

    #[error("Ledger {ledger_id} is not ready for verification: {unmatched} unmatched item(s)")]
    NotReadyForVerification { ledger_id: i64, unmatched: i64 },

    #[error("Ledger {0} is already verified")]
    AlreadyVerified(i64),

    #[error("Ledger {0} can only be deleted while in draft status")]
    NotDraft(i64),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, RekonError>;
