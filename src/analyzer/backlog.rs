use std::collections::BTreeMap;

use serde::Serialize;

use crate::analyzer::temporal::{month_key, month_year_label};
use crate::parser::types::Ticket;

/// One ledger row per opening month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BacklogRow {
    /// Chronological `YYYY-MM` key the ledger is sorted by.
    pub month_key: String,
    /// Display label, e.g. "Abril-2023".
    pub month_label: String,
    pub opened_count: usize,
    pub closed_same_month_count: usize,
    /// Opened this month, not closed this month (includes still-open tickets).
    pub transferred_count: usize,
    pub currently_open_count: usize,
    pub cumulative_backlog: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BacklogSummary {
    pub total_opened: usize,
    pub total_closed_same_month: usize,
    pub total_transferred: usize,
    pub total_currently_open: usize,
    /// `cumulative_backlog` of the last row, 0 for an empty ledger.
    pub current_backlog: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BacklogLedger {
    pub rows: Vec<BacklogRow>,
    pub summary: BacklogSummary,
}

#[derive(Default)]
struct MonthCounts {
    opened: usize,
    closed_same_month: usize,
    transferred: usize,
    currently_open: usize,
}

/// Builds the month-indexed backlog ledger of `tickets`.
///
/// Only months with at least one opening get a row: closures and open
/// tickets are attributed to the month the ticket was opened in. Rows are
/// sorted by `YYYY-MM` before labelling, then
/// `cumulative[i] = Σ_{j≤i}(opened_j − closed_same_month_j) + currently_open_i`.
pub fn compute_backlog(tickets: &[Ticket]) -> BacklogLedger {
    // BTreeMap keeps the YYYY-MM keys in chronological order
    let mut months: BTreeMap<String, MonthCounts> = BTreeMap::new();

    for ticket in tickets {
        let Some(opened) = ticket.opened_at else {
            continue;
        };
        let opened_month = month_key(&opened);
        let closed_month = ticket.closed_at.map(|d| month_key(&d));

        let counts = months.entry(opened_month.clone()).or_default();
        counts.opened += 1;
        if closed_month.as_deref() == Some(opened_month.as_str()) {
            counts.closed_same_month += 1;
        } else {
            counts.transferred += 1;
        }
        if closed_month.is_none() {
            counts.currently_open += 1;
        }
    }

    let mut rows = Vec::with_capacity(months.len());
    let mut running: i64 = 0;

    for (key, counts) in months {
        running += counts.opened as i64 - counts.closed_same_month as i64;
        rows.push(BacklogRow {
            month_label: month_year_label(&key),
            month_key: key,
            opened_count: counts.opened,
            closed_same_month_count: counts.closed_same_month,
            transferred_count: counts.transferred,
            currently_open_count: counts.currently_open,
            // added per row, not carried into the running sum
            cumulative_backlog: running + counts.currently_open as i64,
        });
    }

    let summary = BacklogSummary {
        total_opened: rows.iter().map(|r| r.opened_count).sum(),
        total_closed_same_month: rows.iter().map(|r| r.closed_same_month_count).sum(),
        total_transferred: rows.iter().map(|r| r.transferred_count).sum(),
        total_currently_open: rows.iter().map(|r| r.currently_open_count).sum(),
        current_backlog: rows.last().map(|r| r.cumulative_backlog).unwrap_or(0),
    };

    BacklogLedger { rows, summary }
}
