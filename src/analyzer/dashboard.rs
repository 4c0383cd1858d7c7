//! Dashboard report: filters the loaded dataset and computes every section.
use std::time::Instant;

use serde::Serialize;

use super::backlog::{compute_backlog, BacklogLedger};
use super::charts::{self, *};
use super::filters::FilterSelection;
use super::metrics::{compute_metrics, DashboardMetrics};
use crate::config::DashboardConfig;
use crate::error::DashboardWarning;
use crate::parser::columns::*;
use crate::parser::pipeline::LoadOutput;
use crate::parser::types::Ticket;

// ─── Data Structures ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub meta: ReportMeta,
    pub metrics: DashboardMetrics,
    pub sections: DashboardSections,
    pub warnings: Vec<DashboardWarning>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMeta {
    pub file_name: String,
    pub total_carregados: usize,
    pub total_filtrados: usize,
    pub calcul_duration_ms: u64,
}

/// A `None` section was skipped; the reason is in the report warnings.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSections {
    pub top_categorias: Option<Vec<CountItem>>,
    pub heatmap_abertura: Option<Heatmap>,
    pub top_tempo_categorias: Option<Vec<MeanDurationItem>>,
    pub evolucao_mensal: Option<Vec<MonthlyPoint>>,
    pub evolucao_categorias: Option<CategoryEvolution>,
    pub prioridade_situacao: Option<Pivot>,
    pub sla_por_categoria: Option<Vec<SlaComparison>>,
    pub hierarquia_equipes: Option<Vec<HierarchyLeaf>>,
    pub distribuicao_tempo: Option<Vec<DurationDistribution>>,
    pub hierarquia_tipos: Option<Vec<TypeHierarchyLeaf>>,
    pub distribuicao_prioridade: Option<Vec<CountItem>>,
    pub tempo_por_tipo_prioridade: Option<Vec<PriorityDurationDistribution>>,
    pub tempo_vs_prioridade: Option<Vec<DurationPoint>>,
    pub histograma_tempo: Option<DurationHistogram>,
    pub analise_tempo: Option<OverallDuration>,
    pub backlog: Option<BacklogLedger>,
}

// ─── Section boundary ────────────────────────────────────────────────────────

/// Runs one section builder. A missing column or a builder error becomes a
/// warning and the section is skipped; other sections are unaffected.
struct SectionRunner<'a> {
    source: &'a LoadOutput,
    warnings: Vec<DashboardWarning>,
}

impl<'a> SectionRunner<'a> {
    fn run<T>(
        &mut self,
        section: &str,
        needs: &[&str],
        build: impl FnOnce() -> charts::SectionResult<T>,
    ) -> Option<T> {
        if let Some(col) = needs.iter().find(|c| !self.source.has_column(c)) {
            let w = DashboardWarning::computation(section, format!("coluna '{}' ausente", col));
            w.log();
            self.warnings.push(w);
            return None;
        }
        match build() {
            Ok(value) => Some(value),
            Err(message) => {
                let w = DashboardWarning::computation(section, message);
                w.log();
                self.warnings.push(w);
                None
            }
        }
    }
}

// ─── Builder ─────────────────────────────────────────────────────────────────

pub fn build_dashboard_report(
    source: &LoadOutput,
    selection: &FilterSelection,
    config: &DashboardConfig,
) -> DashboardReport {
    let start = Instant::now();
    let tickets = selection.apply(&source.tickets);

    let mut warnings = source.warnings.clone();
    if let Some(err) = &source.load_error {
        warnings.push(DashboardWarning::data_quality(err.clone()));
    }

    let metrics = compute_metrics(&tickets, config);

    let sections = if tickets.is_empty() {
        let w = DashboardWarning::data_quality("Nenhum chamado encontrado com os filtros selecionados");
        w.log();
        warnings.push(w);
        DashboardSections::default()
    } else {
        let mut runner = SectionRunner {
            source,
            warnings: Vec::new(),
        };
        let sections = build_sections(&mut runner, &tickets, config);
        warnings.extend(runner.warnings);
        sections
    };

    let calcul_duration_ms = start.elapsed().as_millis() as u64;
    log::info!(
        "Relatório: {} de {} chamados, {} aviso(s), {} ms",
        tickets.len(),
        source.tickets.len(),
        warnings.len(),
        calcul_duration_ms
    );

    DashboardReport {
        meta: ReportMeta {
            file_name: source.file_name.clone(),
            total_carregados: source.tickets.len(),
            total_filtrados: tickets.len(),
            calcul_duration_ms,
        },
        metrics,
        sections,
        warnings,
    }
}

fn build_sections(
    runner: &mut SectionRunner<'_>,
    tickets: &[Ticket],
    config: &DashboardConfig,
) -> DashboardSections {
    let has_sla = runner.source.has_column(COL_ATRASO);
    let (p_low, p_high) = (config.percentil_inferior, config.percentil_superior);

    DashboardSections {
        top_categorias: runner.run("Top 10 Categorias", &[COL_CATEGORIA_2], || {
            top_categories(tickets, config.top_n)
        }),
        heatmap_abertura: runner.run("Mapa de Calor de Abertura", &[COL_ABERTURA], || {
            opening_heatmap(tickets)
        }),
        top_tempo_categorias: runner.run(
            "Tempo Médio por Categoria",
            &[COL_CATEGORIA_2, COL_DURACAO],
            || top_categories_by_duration(tickets, config.top_n),
        ),
        evolucao_mensal: runner.run("Evolução Mensal", &[COL_MES], || {
            monthly_evolution(tickets, has_sla)
        }),
        evolucao_categorias: runner.run("Evolução por Tipo", &[COL_MES, COL_CATEGORIA_1], || {
            category_evolution(tickets)
        }),
        prioridade_situacao: runner.run(
            "Prioridade e Situação",
            &[COL_PRIORIDADE, COL_SITUACAO],
            || priority_status_pivot(tickets),
        ),
        sla_por_categoria: runner.run(
            "Comparativo SLA por Categoria",
            &[COL_CATEGORIA_2, COL_ATRASO],
            || sla_by_category(tickets, config.top_n),
        ),
        hierarquia_equipes: runner.run(
            "Distribuição por Equipe",
            &[COL_EQUIPE, COL_RESPONSAVEL, COL_SITUACAO],
            || team_hierarchy(tickets),
        ),
        distribuicao_tempo: runner.run(
            "Distribuição de Tempo por Tipo",
            &[COL_CATEGORIA_1, COL_DURACAO],
            || duration_distribution(tickets, p_low, p_high),
        ),
        hierarquia_tipos: runner.run(
            "Hierarquia de Chamados",
            &[COL_CATEGORIA_1, COL_CATEGORIA_2, COL_ETAPA],
            || type_hierarchy(tickets),
        ),
        distribuicao_prioridade: runner.run(
            "Distribuição de Chamados por Prioridade",
            &[COL_PRIORIDADE],
            || priority_counts(tickets),
        ),
        tempo_por_tipo_prioridade: runner.run(
            "Distribuição de Tempo por Categoria",
            &[COL_CATEGORIA_1, COL_PRIORIDADE, COL_DURACAO],
            || duration_distribution_by_priority(tickets, p_low, p_high),
        ),
        tempo_vs_prioridade: runner.run(
            "Relação Tempo vs Prioridade",
            &[COL_DURACAO, COL_PRIORIDADE],
            || duration_priority_points(tickets, p_low, p_high),
        ),
        histograma_tempo: runner.run(
            "Distribuição do Tempo de Atendimento",
            &[COL_DURACAO],
            || duration_histogram(tickets, config.classes_histograma),
        ),
        analise_tempo: runner.run("Análise de Tempo de Atendimento", &[COL_DURACAO], || {
            overall_duration(tickets, p_low, p_high)
        }),
        backlog: runner.run("Backlog", &[COL_ABERTURA, COL_TERMINO], || {
            let ledger = compute_backlog(tickets);
            if ledger.rows.is_empty() {
                Err("nenhum chamado com data de abertura válida".into())
            } else {
                Ok(ledger)
            }
        }),
    }
}
