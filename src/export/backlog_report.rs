use rust_xlsxwriter::{Workbook, XlsxError};

use crate::analyzer::backlog::BacklogLedger;
use crate::analyzer::metrics::DashboardMetrics;
use crate::error::AppError;
use crate::export::{
    create_header_format, create_integer_format, create_number_format, create_percent_format,
};

pub const XLSX_FILE_NAME: &str = "backlog.xlsx";

/// Excel backlog report, 2 sheets:
/// - "Backlog": ledger per opening month plus a TOTAL row
/// - "Resumo" : headline metrics and backlog totals
pub fn generate_backlog_report(
    ledger: &BacklogLedger,
    metrics: &DashboardMetrics,
) -> Result<Vec<u8>, AppError> {
    let mut wb = Workbook::new();
    write_backlog(&mut wb, ledger)?;
    write_resumo(&mut wb, ledger, metrics)?;
    Ok(wb.save_to_buffer()?)
}

// ── Sheet 1: Backlog ─────────────────────────────────────────────────────────

fn write_backlog(wb: &mut Workbook, ledger: &BacklogLedger) -> Result<(), XlsxError> {
    let ws = wb.add_worksheet();
    ws.set_name("Backlog")?;

    let hdr = create_header_format();
    let int = create_integer_format();

    let headers = [
        "Mês-Ano",
        "Chamados Abertos",
        "Fechados no Mesmo Mês",
        "Transferidos",
        "Em Aberto",
        "Backlog Acumulado",
    ];
    for (col, h) in headers.iter().enumerate() {
        ws.write_with_format(0, col as u16, *h, &hdr)?;
    }

    for (i, r) in ledger.rows.iter().enumerate() {
        let row = (i + 1) as u32;
        ws.write(row, 0, r.month_label.as_str())?;
        ws.write_with_format(row, 1, r.opened_count as f64, &int)?;
        ws.write_with_format(row, 2, r.closed_same_month_count as f64, &int)?;
        ws.write_with_format(row, 3, r.transferred_count as f64, &int)?;
        ws.write_with_format(row, 4, r.currently_open_count as f64, &int)?;
        ws.write_with_format(row, 5, r.cumulative_backlog as f64, &int)?;
    }

    if !ledger.rows.is_empty() {
        let last_data_row = ledger.rows.len() as u32;
        let total_row = last_data_row + 2;
        let s = &ledger.summary;

        ws.write_with_format(total_row, 0, "TOTAL", &hdr)?;
        ws.write_with_format(total_row, 1, s.total_opened as f64, &int)?;
        ws.write_with_format(total_row, 2, s.total_closed_same_month as f64, &int)?;
        ws.write_with_format(total_row, 3, s.total_transferred as f64, &int)?;
        ws.write_with_format(total_row, 4, s.total_currently_open as f64, &int)?;
        ws.write_with_format(total_row, 5, s.current_backlog as f64, &int)?;

        ws.set_freeze_panes(1, 0)?;
        ws.autofilter(0, 0, last_data_row, (headers.len() - 1) as u16)?;
    }

    ws.set_column_width(0, 18)?;
    for col in 1u16..=5 {
        ws.set_column_width(col, 16)?;
    }

    Ok(())
}

// ── Sheet 2: Resumo ──────────────────────────────────────────────────────────

fn write_resumo(
    wb: &mut Workbook,
    ledger: &BacklogLedger,
    metrics: &DashboardMetrics,
) -> Result<(), XlsxError> {
    let ws = wb.add_worksheet();
    ws.set_name("Resumo")?;

    let hdr = create_header_format();
    let int = create_integer_format();
    let num = create_number_format();
    let pct = create_percent_format();

    ws.write_with_format(0, 0, "Indicador", &hdr)?;
    ws.write_with_format(0, 1, "Valor", &hdr)?;

    let counts: &[(&str, f64)] = &[
        ("Total Chamados", metrics.total_chamados as f64),
        ("Incidentes", metrics.incidentes as f64),
        ("Requisições", metrics.requisicoes as f64),
        ("Reprovados", metrics.reprovados as f64),
        ("Backlog Atual", ledger.summary.current_backlog as f64),
        ("Chamados em Aberto", ledger.summary.total_currently_open as f64),
    ];
    for (i, (label, val)) in counts.iter().enumerate() {
        let row = (i + 1) as u32;
        ws.write(row, 0, *label)?;
        ws.write_with_format(row, 1, *val, &int)?;
    }

    let row = (counts.len() + 1) as u32;
    ws.write(row, 0, "Tempo Médio (dias)")?;
    match metrics.tempo_medio_dias {
        Some(v) => ws.write_with_format(row, 1, v, &num)?,
        None => ws.write(row, 1, "-")?,
    };
    ws.write(row + 1, 0, "Dentro do SLA")?;
    ws.write_with_format(row + 1, 1, metrics.dentro_sla_pct / 100.0, &pct)?;

    ws.set_column_width(0, 24)?;
    ws.set_column_width(1, 16)?;

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};

    use crate::analyzer::backlog::{BacklogRow, BacklogSummary};

    fn make_ledger() -> BacklogLedger {
        BacklogLedger {
            rows: vec![
                BacklogRow {
                    month_key: "2024-01".into(),
                    month_label: "Janeiro-2024".into(),
                    opened_count: 2,
                    closed_same_month_count: 1,
                    transferred_count: 1,
                    currently_open_count: 1,
                    cumulative_backlog: 2,
                },
                BacklogRow {
                    month_key: "2024-02".into(),
                    month_label: "Fevereiro-2024".into(),
                    opened_count: 1,
                    closed_same_month_count: 1,
                    transferred_count: 0,
                    currently_open_count: 0,
                    cumulative_backlog: 1,
                },
            ],
            summary: BacklogSummary {
                total_opened: 3,
                total_closed_same_month: 2,
                total_transferred: 1,
                total_currently_open: 1,
                current_backlog: 1,
            },
        }
    }

    fn metrics() -> DashboardMetrics {
        DashboardMetrics {
            total_chamados: 3,
            tempo_medio_dias: Some(2.5),
            dentro_sla_pct: 50.0,
            incidentes: 1,
            requisicoes: 2,
            reprovados: 1,
        }
    }

    #[test]
    fn test_backlog_report_pk_signature() {
        let bytes = generate_backlog_report(&make_ledger(), &metrics()).unwrap();
        assert!(bytes.len() > 4);
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_backlog_report_sheets_and_cells() {
        let bytes = generate_backlog_report(&make_ledger(), &metrics()).unwrap();
        let mut wb: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
        assert_eq!(wb.sheet_names(), ["Backlog", "Resumo"]);

        let backlog = wb.worksheet_range("Backlog").unwrap();
        assert_eq!(
            backlog.get_value((1, 0)),
            Some(&Data::String("Janeiro-2024".into()))
        );
        assert_eq!(backlog.get_value((2, 5)), Some(&Data::Float(1.0)));
        assert_eq!(backlog.get_value((4, 0)), Some(&Data::String("TOTAL".into())));
        assert_eq!(backlog.get_value((4, 1)), Some(&Data::Float(3.0)));
    }

    #[test]
    fn test_backlog_report_empty_ledger() {
        let bytes =
            generate_backlog_report(&BacklogLedger::default(), &DashboardMetrics::default())
                .unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
