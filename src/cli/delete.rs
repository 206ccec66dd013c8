use crate::db::get_connection;
use crate::error::Result;
use crate::ledger::delete_ledger;
use crate::settings::{db_path, load_settings};

pub fn run(ledger_id: i64) -> Result<()> {
    let settings = load_settings();
    let conn = get_connection(&db_path())?;
    delete_ledger(&conn, ledger_id, Some(&settings.operator))?;
    println!("Deleted draft ledger {ledger_id}");
    Ok(())
}
