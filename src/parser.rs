use crate::config::ParserConfig;
use crate::error::{RekonError, Result};

/// Declared kind of an uploaded statement file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Xlsx,
    Xls,
}

impl FileKind {
    pub fn from_name(name: &str) -> Result<Self> {
        let ext = name.rsplit('.').next().unwrap_or("").to_lowercase();
        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            "xls" => Ok(Self::Xls),
            other => Err(RekonError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Header columns mapped to their detected role. Reference stays unmapped
/// when no header cell matches.
#[derive(Debug, Clone, Copy)]
pub struct ColumnMap {
    pub date: usize,
    pub description: usize,
    pub amount: usize,
    pub reference: Option<usize>,
}

#[derive(Debug)]
pub struct ParsedStatement {
    pub columns: ColumnMap,
    pub rows: Vec<Vec<String>>,
}

/// Decode a statement byte stream into a column map plus raw data rows.
/// The first row is always treated as the header.
pub fn parse_statement(bytes: &[u8], kind: FileKind, cfg: &ParserConfig) -> Result<ParsedStatement> {
    let raw = match kind {
        FileKind::Csv => read_csv(bytes)?,
        #[cfg(feature = "xlsx")]
        FileKind::Xlsx | FileKind::Xls => read_workbook(bytes)?,
        #[cfg(not(feature = "xlsx"))]
        FileKind::Xlsx | FileKind::Xls => {
            return Err(RekonError::UnsupportedFormat(
                "spreadsheet support not compiled in".to_string(),
            ))
        }
    };

    if raw.len() < 2 {
        return Err(RekonError::EmptyFile);
    }

    let columns = detect_columns(&raw[0], cfg);
    Ok(ParsedStatement {
        columns,
        rows: raw.into_iter().skip(1).collect(),
    })
}

fn read_csv(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    let mut rows = Vec::new();
    for result in rdr.records() {
        let Ok(record) = result else { continue };
        rows.push(record.iter().map(|f| f.trim().to_string()).collect());
    }
    Ok(rows)
}

#[cfg(feature = "xlsx")]
fn read_workbook(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    use calamine::{Data, Reader};

    let cursor = std::io::Cursor::new(bytes.to_vec());
    let mut workbook = calamine::open_workbook_auto_from_rs(cursor)
        .map_err(|e| RekonError::Other(format!("Failed to open workbook: {e}")))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(RekonError::EmptyFile)?
        .map_err(|e| RekonError::Other(format!("Failed to read worksheet: {e}")))?;

    let mut rows = Vec::new();
    for row in range.rows() {
        let cells: Vec<String> = row
            .iter()
            .map(|cell| match cell {
                Data::String(s) => s.trim().to_string(),
                Data::Float(f) => {
                    if f.fract() == 0.0 {
                        format!("{}", *f as i64)
                    } else {
                        f.to_string()
                    }
                }
                Data::Int(i) => i.to_string(),
                Data::Bool(b) => b.to_string(),
                Data::DateTime(dt) => dt.as_f64().to_string(),
                _ => String::new(),
            })
            .collect();
        rows.push(cells);
    }
    Ok(rows)
}

fn find_column(header: &[String], keywords: &[String]) -> Option<usize> {
    header.iter().position(|cell| {
        let cell = cell.to_lowercase();
        keywords.iter().any(|kw| cell.contains(kw.as_str()))
    })
}

/// Scan header cells against per-field keyword lists. Deliberately lenient:
/// bank exports vary widely in header naming, so a miss falls back to the
/// positional convention date=0, description=1, amount=2 and a falsely
/// mapped column surfaces later as unparsable rows, not a hard failure.
pub fn detect_columns(header: &[String], cfg: &ParserConfig) -> ColumnMap {
    ColumnMap {
        date: find_column(header, &cfg.date_keywords).unwrap_or(0),
        description: find_column(header, &cfg.description_keywords).unwrap_or(1),
        amount: find_column(header, &cfg.amount_keywords).unwrap_or(2),
        reference: find_column(header, &cfg.reference_keywords),
    }
}
