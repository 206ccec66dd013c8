use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::rupiah;
use crate::ledger::{get_ledger, list_items, list_ledgers};
use crate::models::{Direction, LedgerStatus, MatchState};
use crate::payments::get_payment;
use crate::settings::db_path;

fn status_cell(status: LedgerStatus) -> String {
    let s = status.as_str();
    match status {
        LedgerStatus::Verified => s.green().to_string(),
        LedgerStatus::Completed => s.cyan().to_string(),
        LedgerStatus::Processing => s.yellow().to_string(),
        LedgerStatus::Draft => s.to_string(),
    }
}

pub fn list() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let ledgers = list_ledgers(&conn)?;

    let mut table = Table::new();
    table.set_header(vec![
        "ID", "File", "Bank", "Period", "Items", "Matched", "Unmatched", "Total", "Status",
    ]);
    for ledger in ledgers {
        let period = match (&ledger.period_start, &ledger.period_end) {
            (Some(start), Some(end)) => format!("{start} – {end}"),
            _ => String::new(),
        };
        table.add_row(vec![
            Cell::new(ledger.id),
            Cell::new(&ledger.original_filename),
            Cell::new(ledger.bank_name.as_deref().unwrap_or("")),
            Cell::new(period),
            Cell::new(ledger.total_transactions),
            Cell::new(ledger.matched_count),
            Cell::new(ledger.unmatched_count),
            Cell::new(rupiah(ledger.total_amount)),
            Cell::new(status_cell(ledger.status)),
        ]);
    }
    println!("Ledgers\n{table}");
    Ok(())
}

pub fn show(ledger_id: i64) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let ledger = get_ledger(&conn, ledger_id)?;
    let items = list_items(&conn, ledger_id)?;

    println!(
        "Ledger {} — {} [{}]",
        ledger.id,
        ledger.original_filename,
        status_cell(ledger.status)
    );
    if let Some(bank) = &ledger.bank_name {
        println!("  Bank: {bank}");
    }
    if let (Some(start), Some(end)) = (&ledger.period_start, &ledger.period_end) {
        println!("  Period: {start} – {end}");
    }
    println!(
        "  {} item(s), {} matched ({}), {} unmatched, total {}",
        ledger.total_transactions,
        ledger.matched_count,
        rupiah(ledger.matched_amount),
        ledger.unmatched_count,
        rupiah(ledger.total_amount)
    );
    if let (Some(by), Some(at)) = (&ledger.verified_by, &ledger.verified_at) {
        println!("  Verified by {by} at {at}");
    }

    let mut table = Table::new();
    table.set_header(vec!["Item", "Date", "Description", "Amount", "Dir", "Match", "Payment"]);
    for item in items {
        let amount = match item.direction {
            Direction::Credit => rupiah(item.amount),
            Direction::Debit => format!("-{}", rupiah(item.amount)),
        };
        let match_col = match item.match_state {
            MatchState::Unmatched => "unmatched".to_string(),
            state => {
                let conf = item
                    .confidence
                    .map(|c| format!(" ({c})"))
                    .unwrap_or_default();
                format!("{}{conf}", state.as_str()).green().to_string()
            }
        };
        let payment_col = match item.payment_id {
            Some(payment_id) => match get_payment(&conn, payment_id) {
                Ok(p) => format!("#{payment_id} {} {}", p.receipt_number, p.payer_name),
                Err(_) => format!("#{payment_id}"),
            },
            None => String::new(),
        };
        table.add_row(vec![
            Cell::new(item.id),
            Cell::new(&item.date),
            Cell::new(&item.description),
            Cell::new(amount),
            Cell::new(item.direction.as_str()),
            Cell::new(match_col),
            Cell::new(payment_col),
        ]);
    }
    println!("{table}");
    Ok(())
}
