use std::path::Path;
use std::time::Instant;

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::analyzer::filters::FilterOptions;
use crate::analyzer::temporal::month_key;
use crate::error::{AppError, DashboardWarning};
use crate::parser::columns::*;
use crate::parser::deserializers::{clean_text, parse_datetime, parse_id_number};
use crate::parser::reader::{read_table, RawTable};
use crate::parser::rules::{apply_rules, StatusFields};
use crate::parser::types::{DiaSemana, RawTicket, SlaFlag, Ticket};

/// Output of a load: canonical tickets plus upload metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadOutput {
    pub file_name: String,
    pub tickets: Vec<Ticket>,
    pub detected_columns: Vec<String>,
    pub missing_optional_columns: Vec<String>,
    pub warnings: Vec<DashboardWarning>,
    pub total_rows: usize,
    pub filter_options: FilterOptions,
    pub parse_duration_ms: u64,
    /// Set when the file could not be loaded; `tickets` is then empty.
    pub load_error: Option<String>,
}

impl LoadOutput {
    pub fn empty(file_name: &str, load_error: String) -> Self {
        LoadOutput {
            file_name: file_name.to_string(),
            tickets: Vec::new(),
            detected_columns: Vec::new(),
            missing_optional_columns: Vec::new(),
            warnings: Vec::new(),
            total_rows: 0,
            filter_options: FilterOptions::default(),
            parse_duration_ms: 0,
            load_error: Some(load_error),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.load_error.is_none()
    }

    /// True for uploaded and derived columns.
    pub fn has_column(&self, col: &str) -> bool {
        is_derived(col) || self.detected_columns.iter().any(|c| c == col)
    }
}

/// Canonical tickets plus the data-quality warnings raised while building them.
#[derive(Debug, Clone, Default)]
pub struct NormalizeOutput {
    pub tickets: Vec<Ticket>,
    pub warnings: Vec<DashboardWarning>,
}

pub fn load_file(path: &Path) -> Result<LoadOutput, AppError> {
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    load_bytes(&name, bytes)
}

/// Parses an upload held in memory. `name` only selects the format.
pub fn load_bytes(name: &str, bytes: Vec<u8>) -> Result<LoadOutput, AppError> {
    let start = Instant::now();

    // Phase 1: read the table and validate columns
    let table = read_table(name, bytes)?;
    let col_map = ColumnMap::from_headers(&table.headers);
    let col_validation = validate_columns(&col_map)?;
    if table.rows.is_empty() {
        return Err(AppError::EmptyFile);
    }

    // Phase 2: raw records → canonical tickets
    let raws = table_to_raw(&col_map, &table);
    let NormalizeOutput {
        tickets,
        warnings: quality,
    } = normalize_tickets(&raws);

    let mut warnings: Vec<DashboardWarning> = col_validation
        .missing_optional
        .iter()
        .map(|c| DashboardWarning::field_missing(c))
        .collect();
    warnings.extend(quality);
    for w in &warnings {
        w.log();
    }

    let filter_options = FilterOptions::from_tickets(&tickets);
    log::info!(
        "{}: {} chamados carregados em {} ms",
        name,
        tickets.len(),
        start.elapsed().as_millis()
    );

    Ok(LoadOutput {
        file_name: name.to_string(),
        total_rows: table.rows.len(),
        tickets,
        detected_columns: col_validation.present,
        missing_optional_columns: col_validation.missing_optional,
        warnings,
        filter_options,
        parse_duration_ms: start.elapsed().as_millis() as u64,
        load_error: None,
    })
}

/// Never fails: a load error is logged and turned into an empty dataset
/// carrying the message.
pub fn load_data(name: &str, bytes: Vec<u8>) -> LoadOutput {
    match load_bytes(name, bytes) {
        Ok(out) => out,
        Err(e) => {
            log::error!("Erro ao processar o arquivo {}: {}", name, e);
            LoadOutput::empty(name, format!("Erro ao processar o arquivo: {}", e))
        }
    }
}

fn table_to_raw(col_map: &ColumnMap, table: &RawTable) -> Vec<RawTicket> {
    table
        .rows
        .iter()
        .map(|row| {
            let get = |col: &str| col_map.get(row, col).map(str::to_string);
            RawTicket {
                id: get(COL_ID),
                title: get(COL_TITULO),
                opened_at: get(COL_ABERTURA),
                due_at: get(COL_PREVISAO),
                closed_at: get(COL_TERMINO),
                status: get(COL_SITUACAO),
                stage: get(COL_ETAPA),
                category_major: get(COL_CATEGORIA_1),
                category_minor: get(COL_CATEGORIA_2),
                priority: get(COL_PRIORIDADE),
                team: get(COL_EQUIPE),
                owner: get(COL_RESPONSAVEL),
                sla_breached: get(COL_ATRASO),
            }
        })
        .collect()
}

/// Normalizes every row, preserving order, and collects data-quality warnings.
pub fn normalize_tickets(raws: &[RawTicket]) -> NormalizeOutput {
    let mut invalid_dates = [0usize; 3];
    let mut tickets = Vec::with_capacity(raws.len());

    for raw in raws {
        let dates = [&raw.opened_at, &raw.closed_at, &raw.due_at].map(|d| coerce_date(d));
        for (count, (_, invalid)) in invalid_dates.iter_mut().zip(dates.iter()) {
            if *invalid {
                *count += 1;
            }
        }
        tickets.push(normalize_ticket(raw, dates[0].0, dates[1].0, dates[2].0));
    }

    let mut warnings = Vec::new();
    for (col, count) in [COL_ABERTURA, COL_TERMINO, COL_PREVISAO]
        .iter()
        .zip(invalid_dates)
    {
        if count > 0 {
            warnings.push(DashboardWarning::data_quality(format!(
                "{} valor(es) inválido(s) em '{}' convertido(s) para vazio",
                count, col
            )));
        }
    }

    if tickets.iter().any(|t| t.status.is_none()) {
        warnings.push(DashboardWarning::data_quality(
            "Existem registros com situação indefinida",
        ));
    }

    let negative: Vec<&str> = tickets
        .iter()
        .filter(|t| t.duration_days.is_some_and(|d| d < 0))
        .map(|t| t.id.as_str())
        .collect();
    if !negative.is_empty() {
        warnings.push(DashboardWarning::data_quality(format!(
            "{} chamado(s) com término anterior à abertura: {}",
            negative.len(),
            negative.join(", ")
        )));
    }

    NormalizeOutput { tickets, warnings }
}

/// (parsed value, true when a non-empty cell failed to parse)
fn coerce_date(cell: &Option<String>) -> (Option<NaiveDateTime>, bool) {
    match cell.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => {
            let parsed = parse_datetime(s);
            (parsed, parsed.is_none())
        }
        None => (None, false),
    }
}

fn normalize_ticket(
    raw: &RawTicket,
    opened_at: Option<NaiveDateTime>,
    closed_at: Option<NaiveDateTime>,
    due_at: Option<NaiveDateTime>,
) -> Ticket {
    let id = raw.id.as_deref().unwrap_or("").trim().to_string();

    let rewritten = apply_rules(&StatusFields {
        status: clean_text(raw.status.as_deref()),
        stage: clean_text(raw.stage.as_deref()),
        category_minor: clean_text(raw.category_minor.as_deref()),
    });

    let mut ticket = Ticket {
        id_number: parse_id_number(&id),
        id,
        title: clean_text(raw.title.as_deref()),
        opened_at,
        due_at,
        closed_at,
        status: rewritten.status,
        stage: rewritten.stage,
        category_major: clean_text(raw.category_major.as_deref()),
        category_minor: rewritten.category_minor,
        priority: clean_text(raw.priority.as_deref()),
        team: clean_text(raw.team.as_deref()),
        owner: clean_text(raw.owner.as_deref()),
        sla_breached: raw.sla_breached.as_deref().and_then(SlaFlag::parse),
        duration_days: None,
        opened_month: None,
        opened_weekday: None,
        opened_hour: None,
    };
    derive_fields(&mut ticket);
    ticket
}

/// Recomputes the fields derived from the dates.
pub fn derive_fields(ticket: &mut Ticket) {
    ticket.duration_days = match (ticket.opened_at, ticket.closed_at) {
        (Some(open), Some(close)) => Some((close.date() - open.date()).num_days()),
        _ => None,
    };
    ticket.opened_month = ticket.opened_at.map(|d| month_key(&d));
    ticket.opened_weekday = ticket.opened_at.map(|d| DiaSemana::from_weekday(d.weekday()));
    ticket.opened_hour = ticket.opened_at.map(|d| d.hour());
}

impl Ticket {
    /// The fields the reclassification rules look at.
    pub fn status_fields(&self) -> StatusFields {
        StatusFields {
            status: self.status.clone(),
            stage: self.stage.clone(),
            category_minor: self.category_minor.clone(),
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
