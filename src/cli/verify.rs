use colored::Colorize;

use crate::db::get_connection;
use crate::error::Result;
use crate::settings::{db_path, load_settings};
use crate::verifier;

pub fn run(ledger_id: i64) -> Result<()> {
    let settings = load_settings();
    let mut conn = get_connection(&db_path())?;
    let result = verifier::verify(&mut conn, ledger_id, &settings.operator)?;
    println!(
        "{} ledger {ledger_id} verified; {} payment(s) flagged verified",
        "Done:".green(),
        result.payments_verified
    );
    Ok(())
}
