use std::path::Path;

use serde::Serialize;

use crate::analyzer::filters::FilterOptions;
use crate::error::DashboardWarning;
use crate::parser::pipeline::LoadOutput;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub file_name: String,
    pub total_tickets: usize,
    pub total_rows: usize,
    pub warnings: Vec<DashboardWarning>,
    pub detected_columns: Vec<String>,
    pub missing_optional_columns: Vec<String>,
    pub filter_options: FilterOptions,
    pub parse_duration_ms: u64,
    /// Set when the file could not be read; the session then holds an empty dataset.
    pub load_error: Option<String>,
}

impl From<&LoadOutput> for ImportResult {
    fn from(out: &LoadOutput) -> Self {
        ImportResult {
            file_name: out.file_name.clone(),
            total_tickets: out.tickets.len(),
            total_rows: out.total_rows,
            warnings: out.warnings.clone(),
            detected_columns: out.detected_columns.clone(),
            missing_optional_columns: out.missing_optional_columns.clone(),
            filter_options: out.filter_options.clone(),
            parse_duration_ms: out.parse_duration_ms,
            load_error: out.load_error.clone(),
        }
    }
}

/// Loads an upload into the session, reusing the cached parse when the same
/// content was submitted within the cache TTL.
pub fn import_bytes(
    state: &AppState,
    session: &str,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<ImportResult, String> {
    let output = state.sessions.load_or_parse(session, file_name, bytes)?;
    log::info!(
        "Sessão {}: {} ({} chamados, {} sessão(ões) em cache)",
        session,
        file_name,
        output.tickets.len(),
        state.sessions.session_count()?
    );
    Ok(ImportResult::from(output.as_ref()))
}

pub fn import_file(state: &AppState, session: &str, path: &str) -> Result<ImportResult, String> {
    let bytes = std::fs::read(path).map_err(|e| format!("Erro ao ler {}: {}", path, e))?;
    let file_name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path);
    import_bytes(state, session, file_name, bytes)
}
