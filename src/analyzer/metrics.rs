use serde::Serialize;

use super::stats::{mean_opt, percent};
use crate::config::DashboardConfig;
use crate::parser::types::{SlaFlag, Ticket};

/// Headline numbers shown above the charts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_chamados: usize,
    /// Mean `duration_days` over closed tickets, None when nothing is closed.
    pub tempo_medio_dias: Option<f64>,
    /// Share of "Não" among tickets carrying an SLA flag.
    pub dentro_sla_pct: f64,
    pub incidentes: usize,
    pub requisicoes: usize,
    pub reprovados: usize,
}

pub fn compute_metrics(tickets: &[Ticket], config: &DashboardConfig) -> DashboardMetrics {
    let durations: Vec<f64> = tickets
        .iter()
        .filter_map(|t| t.duration_days)
        .map(|d| d as f64)
        .collect();

    let count_major = |label: &str| {
        tickets
            .iter()
            .filter(|t| t.category_major.as_deref() == Some(label))
            .count()
    };

    DashboardMetrics {
        total_chamados: tickets.len(),
        tempo_medio_dias: mean_opt(&durations),
        dentro_sla_pct: sla_percent(tickets),
        incidentes: count_major(&config.categoria_incidente),
        requisicoes: count_major(&config.categoria_requisicao),
        reprovados: tickets
            .iter()
            .filter(|t| t.status.as_deref() == Some(config.status_reprovado.as_str()))
            .count(),
    }
}

/// Percent of flagged tickets within SLA. 0 when no ticket carries a flag.
pub fn sla_percent(tickets: &[Ticket]) -> f64 {
    let flags: Vec<SlaFlag> = tickets.iter().filter_map(|t| t.sla_breached).collect();
    let within = flags.iter().filter(|f| **f == SlaFlag::Nao).count();
    percent(within, flags.len())
}
