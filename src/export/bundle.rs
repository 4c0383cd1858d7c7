use std::io::{Cursor, Write as _};

use crate::analyzer::backlog::BacklogLedger;
use crate::analyzer::metrics::DashboardMetrics;
use crate::error::AppError;
use crate::export::backlog_report::{generate_backlog_report, XLSX_FILE_NAME};
use crate::export::csv_export::{generate_csv_export, CSV_FILE_NAME};
use crate::parser::types::Ticket;

pub const ZIP_FILE_NAME: &str = "relatorio_chamados.zip";

/// Zips `(file name, content)` pairs, deflated, in the given order.
pub fn build_zip(files: &[(&str, Vec<u8>)]) -> Result<Vec<u8>, AppError> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    for (name, bytes) in files {
        zip.start_file(*name, options)?;
        zip.write_all(bytes)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

/// Filtered records as CSV plus the backlog workbook.
pub fn generate_bundle(
    tickets: &[Ticket],
    ledger: &BacklogLedger,
    metrics: &DashboardMetrics,
) -> Result<Vec<u8>, AppError> {
    let csv = generate_csv_export(tickets)?;
    let xlsx = generate_backlog_report(ledger, metrics)?;
    build_zip(&[(CSV_FILE_NAME, csv), (XLSX_FILE_NAME, xlsx)])
}
