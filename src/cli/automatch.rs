use crate::db::get_connection;
use crate::error::Result;
use crate::executor::auto_match;
use crate::settings::{db_path, load_settings};

pub fn run(ledger_id: i64) -> Result<()> {
    let settings = load_settings();
    let mut conn = get_connection(&db_path())?;

    let summary = auto_match(&mut conn, ledger_id, &settings.matching, Some(&settings.operator))?;
    println!("{} of {} item(s) matched", summary.matched, summary.total);
    if summary.matched < summary.total {
        println!(
            "{} item(s) left for manual review — see `rekon ledgers show {ledger_id}`",
            summary.total - summary.matched
        );
    }
    Ok(())
}
