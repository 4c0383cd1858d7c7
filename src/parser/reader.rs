use std::io::{Cursor, Read};
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use crate::error::AppError;
use crate::parser::deserializers::{excel_serial_to_datetime, CELL_DT_FMT};

/// Header row plus data rows, every cell as text.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Upload formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Spreadsheet,
    Delimited,
}

impl FileKind {
    /// Detects the format from the file name extension.
    pub fn from_name(name: &str) -> Self {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        match ext.as_deref() {
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => FileKind::Spreadsheet,
            _ => FileKind::Delimited,
        }
    }
}

pub fn read_table(name: &str, bytes: Vec<u8>) -> Result<RawTable, AppError> {
    match FileKind::from_name(name) {
        FileKind::Spreadsheet => read_spreadsheet(bytes),
        FileKind::Delimited => read_delimited(bytes.as_slice()),
    }
}

/// Reads the first worksheet of a workbook.
pub fn read_spreadsheet(bytes: Vec<u8>) -> Result<RawTable, AppError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Err(AppError::EmptyFile),
    };

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(first) => first.iter().map(cell_to_string).collect(),
        None => return Err(AppError::EmptyFile),
    };
    let rows = rows
        .map(|r| r.iter().map(cell_to_string).collect::<Vec<_>>())
        .filter(|r| r.iter().any(|c| !c.is_empty()))
        .collect();

    Ok(RawTable { headers, rows })
}

/// Reads delimited text. The delimiter is `;` when the header line contains
/// one, `,` otherwise.
pub fn read_delimited<R: Read>(mut reader: R) -> Result<RawTable, AppError> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    let text = buf.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&buf[..]);
    if text.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(AppError::EmptyFile);
    }
    let delimiter = sniff_delimiter(text);

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .double_quote(true)
        .quoting(true)
        .from_reader(text);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(AppError::EmptyFile);
    }

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if record.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable { headers, rows })
}

fn sniff_delimiter(text: &[u8]) -> u8 {
    let first_line = text.split(|&b| b == b'\n').next().unwrap_or_default();
    if first_line.contains(&b';') {
        b';'
    } else {
        b','
    }
}

/// Converts a calamine cell to text. Real dates become `YYYY-MM-DD HH:MM:SS`
/// so the permissive date parser handles every source the same way.
pub fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if (f.floor() - f).abs() < f64::EPSILON {
                format!("{}", *f as i64)
            } else {
                format!("{}", f)
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => excel_serial_to_datetime(dt.as_f64())
            .map(|d| d.format(CELL_DT_FMT).to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) | Data::Empty => String::new(),
    }
}
