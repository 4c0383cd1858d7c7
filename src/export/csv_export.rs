use std::io::Write;

use crate::error::AppError;
use crate::parser::columns::*;
use crate::parser::types::Ticket;

pub const CSV_FILE_NAME: &str = "dados_filtrados.csv";

const CSV_DT_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// Column order of the export: uploaded fields, then derived ones.
pub const EXPORT_COLUMNS: &[&str] = &[
    COL_ID,
    COL_TITULO,
    COL_CATEGORIA_1,
    COL_CATEGORIA_2,
    COL_SITUACAO,
    COL_ETAPA,
    COL_EQUIPE,
    COL_RESPONSAVEL,
    COL_PRIORIDADE,
    COL_ABERTURA,
    COL_PREVISAO,
    COL_TERMINO,
    COL_ATRASO,
    COL_DURACAO,
    COL_MES,
    COL_DIA_SEMANA,
    COL_HORA,
];

/// Writes the filtered canonical records as comma-delimited UTF-8.
pub fn write_tickets_csv<W: Write>(tickets: &[Ticket], writer: W) -> Result<(), AppError> {
    let mut wtr = csv::WriterBuilder::new().delimiter(b',').from_writer(writer);
    wtr.write_record(EXPORT_COLUMNS)?;

    for t in tickets {
        let dt = |d: Option<chrono::NaiveDateTime>| {
            d.map(|d| d.format(CSV_DT_FMT).to_string())
                .unwrap_or_default()
        };
        let text = |s: &Option<String>| s.clone().unwrap_or_default();

        wtr.write_record([
            t.id.clone(),
            text(&t.title),
            text(&t.category_major),
            text(&t.category_minor),
            text(&t.status),
            text(&t.stage),
            text(&t.team),
            text(&t.owner),
            text(&t.priority),
            dt(t.opened_at),
            dt(t.due_at),
            dt(t.closed_at),
            t.sla_breached
                .map(|f| f.label().to_string())
                .unwrap_or_default(),
            t.duration_days.map(|d| d.to_string()).unwrap_or_default(),
            text(&t.opened_month),
            t.opened_weekday
                .map(|d| d.label().to_string())
                .unwrap_or_default(),
            t.opened_hour.map(|h| h.to_string()).unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn generate_csv_export(tickets: &[Ticket]) -> Result<Vec<u8>, AppError> {
    let mut buf = Vec::new();
    write_tickets_csv(tickets, &mut buf)?;
    Ok(buf)
}
