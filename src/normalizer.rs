use crate::config::ParserConfig;
use crate::models::{Direction, NormalizedRow};
use crate::parser::ParsedStatement;

// Longer names first so "juni"/"juli" never lose to their prefixes.
const MONTHS_ID: &[(&str, &str)] = &[
    ("januari", "Jan"),
    ("februari", "Feb"),
    ("maret", "Mar"),
    ("april", "Apr"),
    ("agustus", "Aug"),
    ("september", "Sep"),
    ("oktober", "Oct"),
    ("november", "Nov"),
    ("desember", "Dec"),
    ("juni", "Jun"),
    ("juli", "Jul"),
    ("mei", "May"),
    ("agu", "Aug"),
    ("okt", "Oct"),
    ("des", "Dec"),
];

pub fn excel_serial_to_date(serial: f64) -> String {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = chrono::NaiveDate::from_ymd_opt(1899, 12, 30).unwrap();
    let date = base + chrono::Duration::days(serial as i64);
    date.format("%Y-%m-%d").to_string()
}

fn try_formats(raw: &str, cfg: &ParserConfig) -> Option<String> {
    use chrono::Datelike;
    for fmt in &cfg.date_formats {
        if let Ok(date) = chrono::NaiveDate::parse_from_str(raw, fmt) {
            // %Y accepts two-digit years; skip so %d/%m/%y can claim them.
            if date.year() < 1000 {
                continue;
            }
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    None
}

/// Parse a date cell into ISO form, trying in order: a spreadsheet serial
/// number, the configured explicit patterns, then a lenient cleanup pass
/// (collapsed whitespace, Indonesian month names, dotted separators) before
/// retrying the patterns. Returns `None` when every strategy fails.
pub fn parse_date(raw: &str, cfg: &ParserConfig) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    // Serial dates from spreadsheets arrive as bare numbers. The plausible
    // window covers 1941..2119, well clear of day-of-month integers.
    if let Ok(serial) = raw.parse::<f64>() {
        if (15000.0..=80000.0).contains(&serial) {
            return Some(excel_serial_to_date(serial));
        }
        return None;
    }

    if let Some(date) = try_formats(raw, cfg) {
        return Some(date);
    }

    // Last resort: normalize free-form input and retry the same patterns.
    let mut cleaned = raw.to_lowercase();
    for (id, en) in MONTHS_ID {
        if cleaned.contains(id) {
            cleaned = cleaned.replace(id, en);
            break;
        }
    }
    let cleaned = cleaned.replace(['.', ','], "/");
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    try_formats(&cleaned, cfg)
}

/// Parse an amount cell, stripping currency markers and both locale styles
/// of separators: `1.234.567,89` and `1,234,567.89`. Parenthesized values
/// are negative. Returns `None` for unparsable cells.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let mut s = raw.trim().replace('"', "");
    let mut negative = false;

    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        negative = true;
        s = inner.to_string();
    }

    if let Some(rest) = s.strip_prefix('-') {
        negative = true;
        s = rest.trim().to_string();
    }

    let lower = s.to_lowercase();
    for marker in ["rp.", "rp", "idr", "$"] {
        if let Some(rest) = lower.strip_prefix(marker) {
            s = s[s.len() - rest.len()..].to_string();
            break;
        }
    }
    let s = s.trim().replace(' ', "");

    let last_dot = s.rfind('.');
    let last_comma = s.rfind(',');
    let normalized = match (last_dot, last_comma) {
        // Both present: whichever comes last is the decimal marker.
        (Some(d), Some(c)) if d > c => s.replace(',', ""),
        (Some(_), Some(_)) => s.replace('.', "").replace(',', "."),
        // Comma only: decimal if it looks like one, thousands otherwise.
        (None, Some(c)) => {
            let frac = s.len() - c - 1;
            if s.matches(',').count() == 1 && (1..=2).contains(&frac) {
                s.replace(',', ".")
            } else {
                s.replace(',', "")
            }
        }
        // Dot only: Indonesian exports use dots for thousands.
        (Some(d), None) => {
            let frac = s.len() - d - 1;
            if s.matches('.').count() == 1 && (1..=2).contains(&frac) {
                s
            } else {
                s.replace('.', "")
            }
        }
        (None, None) => s,
    };

    let value: f64 = normalized.parse().ok()?;
    Some(if negative { -value } else { value })
}

fn cell<'a>(row: &'a [String], idx: usize) -> &'a str {
    row.get(idx).map(|c| c.trim()).unwrap_or("")
}

/// Convert raw statement rows into canonical transaction tuples. Rows with
/// unparsable dates, non-positive amounts, or no content at all are dropped.
pub fn normalize_rows(stmt: &ParsedStatement, cfg: &ParserConfig) -> Vec<NormalizedRow> {
    let map = stmt.columns;
    let mut out = Vec::new();

    for row in &stmt.rows {
        if row.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        let Some(date) = parse_date(cell(row, map.date), cfg) else {
            continue;
        };
        let Some(signed) = parse_amount(cell(row, map.amount)) else {
            continue;
        };
        if signed.abs() < f64::EPSILON {
            continue;
        }
        let direction = if signed >= 0.0 {
            Direction::Credit
        } else {
            Direction::Debit
        };
        let reference = map
            .reference
            .map(|idx| cell(row, idx))
            .filter(|r| !r.is_empty())
            .map(|r| r.to_string());

        out.push(NormalizedRow {
            date,
            description: cell(row, map.description).to_string(),
            amount: signed.abs(),
            direction,
            reference,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_statement, FileKind};

    fn cfg() -> ParserConfig {
        ParserConfig::default()
    }

    #[test]
    fn test_parse_date_patterns() {
        let cfg = cfg();
        assert_eq!(parse_date("10/03/2025", &cfg).as_deref(), Some("2025-03-10"));
        assert_eq!(parse_date("10-03-2025", &cfg).as_deref(), Some("2025-03-10"));
        assert_eq!(parse_date("2025-03-10", &cfg).as_deref(), Some("2025-03-10"));
        assert_eq!(parse_date("10 Mar 2025", &cfg).as_deref(), Some("2025-03-10"));
        assert_eq!(parse_date("10 March 2025", &cfg).as_deref(), Some("2025-03-10"));
        assert_eq!(parse_date("10/03/25", &cfg).as_deref(), Some("2025-03-10"));
    }

    #[test]
    fn test_parse_date_indonesian_months() {
        let cfg = cfg();
        assert_eq!(parse_date("10 Maret 2025", &cfg).as_deref(), Some("2025-03-10"));
        assert_eq!(parse_date("5 Agustus 2024", &cfg).as_deref(), Some("2024-08-05"));
        assert_eq!(parse_date("17 Mei 2025", &cfg).as_deref(), Some("2025-05-17"));
    }

    #[test]
    fn test_parse_date_serial() {
        let cfg = cfg();
        // 2025-01-10 in the 1900 date system
        assert_eq!(parse_date("45667", &cfg).as_deref(), Some("2025-01-10"));
        // Small integers are day numbers, not serial dates
        assert_eq!(parse_date("17", &cfg), None);
    }

    #[test]
    fn test_parse_date_lenient_cleanup() {
        let cfg = cfg();
        assert_eq!(parse_date("10.03.2025", &cfg).as_deref(), Some("2025-03-10"));
        assert_eq!(parse_date("  10   Maret   2025 ", &cfg).as_deref(), Some("2025-03-10"));
    }

    #[test]
    fn test_parse_date_garbage() {
        let cfg = cfg();
        assert_eq!(parse_date("not a date", &cfg), None);
        assert_eq!(parse_date("", &cfg), None);
        assert_eq!(parse_date("32/13/2025", &cfg), None);
    }

    #[test]
    fn test_parse_amount_indonesian_locale() {
        assert_eq!(parse_amount("150.000"), Some(150000.0));
        assert_eq!(parse_amount("1.234.567,89"), Some(1234567.89));
        assert_eq!(parse_amount("Rp 150.000"), Some(150000.0));
        assert_eq!(parse_amount("Rp. 2.500.000"), Some(2500000.0));
    }

    #[test]
    fn test_parse_amount_english_locale() {
        assert_eq!(parse_amount("1,234,567.89"), Some(1234567.89));
        assert_eq!(parse_amount("1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("500.00"), Some(500.0));
    }

    #[test]
    fn test_parse_amount_negatives() {
        assert_eq!(parse_amount("-150.000"), Some(-150000.0));
        assert_eq!(parse_amount("(500.00)"), Some(-500.0));
        assert_eq!(parse_amount("(1.234,50)"), Some(-1234.5));
    }

    #[test]
    fn test_parse_amount_garbage() {
        assert_eq!(parse_amount("not a number"), None);
        assert_eq!(parse_amount(""), None);
    }

    fn parsed(csv: &str) -> ParsedStatement {
        parse_statement(csv.as_bytes(), FileKind::Csv, &cfg()).unwrap()
    }

    #[test]
    fn test_normalize_drops_unparsable_date_rows() {
        // Scenario: three rows, one with an unparsable date, yields two items
        let stmt = parsed(
            "Tanggal,Keterangan,Jumlah\n\
             10/03/2025,TRANSFER SPP,150000\n\
             not-a-date,MYSTERY ROW,99999\n\
             11/03/2025,ADMIN FEE,-6500\n",
        );
        let rows = normalize_rows(&stmt, &cfg());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].direction, Direction::Credit);
        assert_eq!(rows[1].direction, Direction::Debit);
        assert_eq!(rows[1].amount, 6500.0);
    }

    #[test]
    fn test_normalize_drops_zero_amounts_and_blank_rows() {
        let stmt = parsed(
            "Tanggal,Keterangan,Jumlah\n\
             10/03/2025,ZERO,0\n\
             ,,\n\
             11/03/2025,KEPT,25000\n",
        );
        let rows = normalize_rows(&stmt, &cfg());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].description, "KEPT");
    }

    #[test]
    fn test_normalize_captures_reference() {
        let stmt = parsed(
            "Tanggal,Keterangan,No Ref,Jumlah\n\
             10/03/2025,TRANSFER SPP,TRX-881,150000\n\
             11/03/2025,NO REF HERE,,80000\n",
        );
        let rows = normalize_rows(&stmt, &cfg());
        assert_eq!(rows[0].reference.as_deref(), Some("TRX-881"));
        assert_eq!(rows[1].reference, None);
    }

    #[test]
    fn test_normalize_amount_stored_unsigned() {
        let stmt = parsed("Tanggal,Keterangan,Jumlah\n10/03/2025,TARIKAN,-500000\n");
        let rows = normalize_rows(&stmt, &cfg());
        assert_eq!(rows[0].amount, 500000.0);
        assert_eq!(rows[0].direction, Direction::Debit);
    }
}
