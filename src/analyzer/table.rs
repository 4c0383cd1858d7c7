use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::stats::{mean_opt, median};
use crate::parser::columns::*;
use crate::parser::types::Ticket;

/// Always offered when present in the upload.
pub const ESSENTIAL_COLUMNS: &[&str] = &[COL_ID, COL_TITULO, COL_CATEGORIA_1, COL_SITUACAO];

pub const OPTIONAL_COLUMNS: &[&str] = &[
    COL_CATEGORIA_2,
    COL_ETAPA,
    COL_EQUIPE,
    COL_RESPONSAVEL,
    COL_PRIORIDADE,
    COL_DURACAO,
    COL_ABERTURA,
    COL_PREVISAO,
    COL_TERMINO,
];

const TABLE_DATE_FMT: &str = "%d/%m/%Y";

/// Column selection and ordering chosen by the user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableRequest {
    /// None selects every available column.
    pub columns: Option<Vec<String>>,
    pub sort_by: Option<String>,
    /// Descending unless set.
    pub ascending: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationSummary {
    pub media_dias: Option<f64>,
    pub mediana_dias: Option<f64>,
    pub maximo_dias: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub available_columns: Vec<String>,
    pub columns: Vec<String>,
    pub sort_by: Option<String>,
    pub ascending: bool,
    /// Display strings, one per selected column; empty for nulls.
    pub rows: Vec<Vec<String>>,
    pub resumo: DurationSummary,
}

/// Essential then optional columns, keeping those `has_column` accepts.
pub fn available_columns(has_column: impl Fn(&str) -> bool) -> Vec<String> {
    ESSENTIAL_COLUMNS
        .iter()
        .chain(OPTIONAL_COLUMNS)
        .filter(|c| has_column(c))
        .map(|c| c.to_string())
        .collect()
}

pub fn build_table(
    tickets: &[Ticket],
    available: &[String],
    request: &TableRequest,
) -> TableView {
    let columns: Vec<String> = match &request.columns {
        Some(selected) => available
            .iter()
            .filter(|c| selected.contains(c))
            .cloned()
            .collect(),
        None => available.to_vec(),
    };

    let sort_by = request
        .sort_by
        .clone()
        .filter(|c| columns.contains(c))
        .or_else(|| {
            if columns.iter().any(|c| c == COL_DURACAO) {
                Some(COL_DURACAO.to_string())
            } else {
                columns.first().cloned()
            }
        });

    let mut ordered: Vec<&Ticket> = tickets.iter().collect();
    if let Some(col) = &sort_by {
        // stable sort keeps upload order among equal keys
        ordered.sort_by(|a, b| compare_by(a, b, col, request.ascending));
    }

    let rows = ordered
        .iter()
        .map(|t| {
            columns
                .iter()
                .map(|c| cell_text(t, c).unwrap_or_default())
                .collect()
        })
        .collect();

    let durations: Vec<f64> = tickets
        .iter()
        .filter_map(|t| t.duration_days)
        .map(|d| d as f64)
        .collect();
    let resumo = DurationSummary {
        media_dias: mean_opt(&durations),
        mediana_dias: (!durations.is_empty()).then(|| median(&durations)),
        maximo_dias: tickets.iter().filter_map(|t| t.duration_days).max(),
    };

    TableView {
        available_columns: available.to_vec(),
        columns,
        sort_by,
        ascending: request.ascending,
        rows,
        resumo,
    }
}

/// Typed sort key of one cell.
#[derive(Debug, PartialEq, PartialOrd)]
enum SortKey<'a> {
    Id(u64),
    Number(i64),
    Text(&'a str),
    Date(chrono::NaiveDateTime),
}

fn sort_key<'a>(t: &'a Ticket, col: &str) -> Option<SortKey<'a>> {
    match col {
        // numeric part of the id, so REQ-10 sorts after REQ-9
        COL_ID => t.id_number.map(SortKey::Id),
        COL_DURACAO => t.duration_days.map(SortKey::Number),
        COL_ABERTURA => t.opened_at.map(SortKey::Date),
        COL_PREVISAO => t.due_at.map(SortKey::Date),
        COL_TERMINO => t.closed_at.map(SortKey::Date),
        _ => text_field(t, col).map(SortKey::Text),
    }
}

/// Nulls last whatever the direction.
fn compare_by(a: &Ticket, b: &Ticket, col: &str, ascending: bool) -> Ordering {
    match (sort_key(a, col), sort_key(b, col)) {
        (Some(x), Some(y)) => {
            let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn text_field<'a>(t: &'a Ticket, col: &str) -> Option<&'a str> {
    match col {
        COL_ID => Some(t.id.as_str()),
        COL_TITULO => t.title.as_deref(),
        COL_CATEGORIA_1 => t.category_major.as_deref(),
        COL_CATEGORIA_2 => t.category_minor.as_deref(),
        COL_SITUACAO => t.status.as_deref(),
        COL_ETAPA => t.stage.as_deref(),
        COL_EQUIPE => t.team.as_deref(),
        COL_RESPONSAVEL => t.owner.as_deref(),
        COL_PRIORIDADE => t.priority.as_deref(),
        _ => None,
    }
}

fn cell_text(t: &Ticket, col: &str) -> Option<String> {
    match col {
        COL_DURACAO => t.duration_days.map(|d| d.to_string()),
        COL_ABERTURA => t.opened_at.map(|d| d.format(TABLE_DATE_FMT).to_string()),
        COL_PREVISAO => t.due_at.map(|d| d.format(TABLE_DATE_FMT).to_string()),
        COL_TERMINO => t.closed_at.map(|d| d.format(TABLE_DATE_FMT).to_string()),
        _ => text_field(t, col).map(str::to_string),
    }
}
