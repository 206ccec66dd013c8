pub mod automatch;
pub mod delete;
pub mod demo;
pub mod init;
pub mod ledgers;
pub mod matching;
pub mod payments;
pub mod status;
pub mod upload;
pub mod verify;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "rekon",
    about = "Bank statement reconciliation CLI for school payment administration."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up rekon: choose a data directory and initialize the database.
    Init {
        /// Path for rekon data (default: ~/Documents/rekon)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Upload a bank statement export (CSV/XLSX) and create a draft ledger.
    Upload {
        /// Path to the statement file
        file: String,
        /// Bank name, e.g. BCA
        #[arg(long)]
        bank: Option<String>,
        /// Statement date: YYYY-MM-DD
        #[arg(long = "statement-date")]
        statement_date: Option<String>,
        /// Override the file kind: csv, xlsx, xls
        #[arg(long)]
        kind: Option<String>,
    },
    /// Inspect uploaded ledgers.
    Ledgers {
        #[command(subcommand)]
        command: LedgersCommands,
    },
    /// Auto-match unmatched credit items against pending payments.
    Automatch {
        /// Ledger ID
        ledger_id: i64,
    },
    /// Manually bind a transaction item to a payment.
    Match {
        /// Transaction item ID (shown in `rekon ledgers show`)
        item_id: i64,
        /// Payment ID (shown in `rekon payments list`)
        payment_id: i64,
    },
    /// Remove a match from a transaction item.
    Unmatch {
        /// Transaction item ID
        item_id: i64,
    },
    /// Verify a fully matched ledger and flag its payments verified.
    Verify {
        /// Ledger ID
        ledger_id: i64,
    },
    /// Delete a draft ledger and its items.
    Delete {
        /// Ledger ID
        ledger_id: i64,
    },
    /// Inspect or seed the payment ledger.
    Payments {
        #[command(subcommand)]
        command: PaymentsCommands,
    },
    /// Show current database and summary statistics.
    Status,
    /// Load sample payments and a sample statement to explore rekon.
    Demo,
}

#[derive(Subcommand)]
pub enum LedgersCommands {
    /// List all ledgers.
    List,
    /// Show one ledger with its transaction items.
    Show {
        /// Ledger ID
        ledger_id: i64,
    },
}

#[derive(Subcommand)]
pub enum PaymentsCommands {
    /// List payments.
    List {
        /// Filter by status: pending, verified
        #[arg(long)]
        status: Option<String>,
    },
    /// Record a payment (normally done by the billing system).
    Add {
        /// Payer (student/guardian) name
        payer: String,
        /// Receipt number
        #[arg(long)]
        receipt: String,
        /// Amount in Rupiah
        #[arg(long)]
        amount: f64,
        /// Payment date: YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// Payment channel
        #[arg(long, default_value = "bank_transfer")]
        channel: String,
    },
}
