use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::analyzer::backlog::compute_backlog;
use crate::analyzer::filters::FilterSelection;
use crate::analyzer::metrics::compute_metrics;
use crate::config::DashboardConfig;
use crate::error::AppError;
use crate::export::{backlog_report, bundle, csv_export};
use crate::parser::pipeline::LoadOutput;
use crate::state::{AppState, DatasetAccess};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Filtered records, comma-delimited.
    Csv,
    /// Backlog workbook.
    Xlsx,
    /// Both of the above.
    Zip,
}

impl ExportFormat {
    pub fn default_file_name(self) -> &'static str {
        match self {
            ExportFormat::Csv => csv_export::CSV_FILE_NAME,
            ExportFormat::Xlsx => backlog_report::XLSX_FILE_NAME,
            ExportFormat::Zip => bundle::ZIP_FILE_NAME,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    pub path: String,
    pub size_bytes: u64,
    pub duration_ms: u64,
}

/// Export artifact of the filtered dataset.
pub fn generate_export(
    source: &LoadOutput,
    selection: &FilterSelection,
    config: &DashboardConfig,
    format: ExportFormat,
) -> Result<Vec<u8>, AppError> {
    let tickets = selection.apply(&source.tickets);
    match format {
        ExportFormat::Csv => csv_export::generate_csv_export(&tickets),
        ExportFormat::Xlsx => backlog_report::generate_backlog_report(
            &compute_backlog(&tickets),
            &compute_metrics(&tickets, config),
        ),
        ExportFormat::Zip => bundle::generate_bundle(
            &tickets,
            &compute_backlog(&tickets),
            &compute_metrics(&tickets, config),
        ),
    }
}

pub fn export_report(
    state: &AppState,
    session: &str,
    selection: &FilterSelection,
    format: ExportFormat,
    path: String,
) -> Result<ExportResult, String> {
    let start = Instant::now();

    let bytes = state.dataset(session, |out, config| {
        generate_export(out, selection, config, format).map_err(|e| e.to_string())
    })?;

    std::fs::write(&path, &bytes).map_err(|e| e.to_string())?;
    log::info!("Exportação {:?} gravada em {} ({} bytes)", format, path, bytes.len());

    Ok(ExportResult {
        path,
        size_bytes: bytes.len() as u64,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}
