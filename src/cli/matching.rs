use colored::Colorize;

use crate::db::get_connection;
use crate::error::Result;
use crate::executor;
use crate::settings::{db_path, load_settings};

pub fn bind(item_id: i64, payment_id: i64) -> Result<()> {
    let settings = load_settings();
    let mut conn = get_connection(&db_path())?;
    executor::manual_match(&mut conn, item_id, payment_id, Some(&settings.operator))?;
    println!("Item {item_id} matched to payment {payment_id}");
    Ok(())
}

pub fn unbind(item_id: i64) -> Result<()> {
    let settings = load_settings();
    let mut conn = get_connection(&db_path())?;
    let outcome = executor::unmatch(&mut conn, item_id, Some(&settings.operator))?;
    println!("Item {item_id} unmatched");
    if outcome.payment_was_verified {
        println!(
            "{} the unbound payment was already verified; its status was not reversed",
            "Warning:".yellow()
        );
    }
    Ok(())
}
