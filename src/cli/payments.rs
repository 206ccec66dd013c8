use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::rupiah;
use crate::payments::{add_payment, list_payments};
use crate::settings::db_path;

pub fn list(status: Option<&str>) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let payments = list_payments(&conn, status)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Payer", "Receipt", "Channel", "Amount", "Date", "Status"]);
    for p in payments {
        let status = if p.status == "verified" {
            p.status.green().to_string()
        } else {
            p.status.clone()
        };
        table.add_row(vec![
            Cell::new(p.id),
            Cell::new(&p.payer_name),
            Cell::new(&p.receipt_number),
            Cell::new(&p.channel),
            Cell::new(rupiah(p.amount)),
            Cell::new(&p.payment_date),
            Cell::new(status),
        ]);
    }
    println!("Payments\n{table}");
    Ok(())
}

pub fn add(payer: &str, receipt: &str, amount: f64, date: &str, channel: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let id = add_payment(&conn, payer, receipt, channel, amount, date)?;
    println!("Added payment {id}: {payer}, {} on {date}", rupiah(amount));
    Ok(())
}
