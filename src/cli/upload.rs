use std::path::Path;

use colored::Colorize;

use crate::db::get_connection;
use crate::error::Result;
use crate::ledger::{ingest_statement, UploadMeta};
use crate::parser::FileKind;
use crate::settings::{db_path, load_settings};

pub fn run(
    file: &str,
    bank: Option<&str>,
    statement_date: Option<&str>,
    kind: Option<&str>,
) -> Result<()> {
    let settings = load_settings();
    let mut conn = get_connection(&db_path())?;

    let path = Path::new(file);
    let bytes = std::fs::read(path)?;
    let original_filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file)
        .to_string();
    let kind = match kind {
        Some(k) => FileKind::from_name(&format!("f.{k}"))?,
        None => FileKind::from_name(&original_filename)?,
    };

    let meta = UploadMeta {
        bank_name: bank.map(String::from),
        statement_date: statement_date.map(String::from),
        uploaded_by: Some(settings.operator.clone()),
    };
    let result = ingest_statement(&mut conn, &bytes, &original_filename, kind, &Default::default(), &meta)?;

    if result.duplicate_file {
        println!(
            "{} this file was already uploaded as ledger {}",
            "Duplicate:".yellow(),
            result.ledger_id
        );
        return Ok(());
    }

    println!(
        "Ledger {} created: {} item(s) imported, {} row(s) skipped",
        result.ledger_id, result.imported, result.skipped_rows
    );
    println!("Next: `rekon automatch {}`", result.ledger_id);
    Ok(())
}
