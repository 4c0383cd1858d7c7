use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::parser::types::Ticket;

/// Distinct values offered by the filter widgets, plus the default date range.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub statuses: Vec<String>,
    pub categories: Vec<String>,
    pub types: Vec<String>,
    pub teams: Vec<String>,
    pub owners: Vec<String>,
    pub priorities: Vec<String>,
    pub stages: Vec<String>,
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
}

impl FilterOptions {
    pub fn from_tickets(tickets: &[Ticket]) -> Self {
        fn distinct<'a>(values: impl Iterator<Item = Option<&'a String>>) -> Vec<String> {
            values
                .flatten()
                .cloned()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        }

        let dates = || tickets.iter().filter_map(|t| t.opened_at).map(|d| d.date());

        FilterOptions {
            statuses: distinct(tickets.iter().map(|t| t.status.as_ref())),
            categories: distinct(tickets.iter().map(|t| t.category_minor.as_ref())),
            types: distinct(tickets.iter().map(|t| t.category_major.as_ref())),
            teams: distinct(tickets.iter().map(|t| t.team.as_ref())),
            owners: distinct(tickets.iter().map(|t| t.owner.as_ref())),
            priorities: distinct(tickets.iter().map(|t| t.priority.as_ref())),
            stages: distinct(tickets.iter().map(|t| t.stage.as_ref())),
            min_date: dates().min(),
            max_date: dates().max(),
        }
    }
}

/// User selections. `None` leaves a field unrestricted; `Some` keeps only the
/// listed values, so an empty list keeps nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSelection {
    pub date_from: Option<NaiveDate>,
    /// Inclusive: tickets opened any time on this day match.
    pub date_to: Option<NaiveDate>,
    pub statuses: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
    pub types: Option<Vec<String>>,
    pub teams: Option<Vec<String>>,
    pub owners: Option<Vec<String>>,
    pub priorities: Option<Vec<String>>,
    pub stages: Option<Vec<String>>,
}

impl FilterSelection {
    pub fn matches(&self, ticket: &Ticket) -> bool {
        if self.date_from.is_some() || self.date_to.is_some() {
            let Some(opened) = ticket.opened_at.map(|o| o.date()) else {
                return false;
            };
            if self.date_from.is_some_and(|d| opened < d) {
                return false;
            }
            if self.date_to.is_some_and(|d| opened > d) {
                return false;
            }
        }

        selected(&self.statuses, &ticket.status)
            && selected(&self.categories, &ticket.category_minor)
            && selected(&self.types, &ticket.category_major)
            && selected(&self.teams, &ticket.team)
            && selected(&self.owners, &ticket.owner)
            && selected(&self.priorities, &ticket.priority)
            && selected(&self.stages, &ticket.stage)
    }

    /// Filtered copy, original order preserved.
    pub fn apply(&self, tickets: &[Ticket]) -> Vec<Ticket> {
        let out: Vec<Ticket> = tickets
            .iter()
            .filter(|t| self.matches(t))
            .cloned()
            .collect();
        log::debug!("Filtro: {} de {} chamados", out.len(), tickets.len());
        out
    }
}

fn selected(selection: &Option<Vec<String>>, value: &Option<String>) -> bool {
    match (selection, value) {
        (None, _) => true,
        (Some(values), Some(v)) => values.iter().any(|s| s == v),
        (Some(_), None) => false,
    }
}
