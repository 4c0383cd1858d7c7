//! Chart datasets. Each builder returns `Err` with a user-facing message when
//! the data cannot produce the section; the caller turns that into a warning.
use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use super::stats::{mean_opt, percent, percentile, quartiles, Quartiles};
use super::temporal::month_year_label;
use crate::parser::types::{DiaSemana, SlaFlag, Ticket};

pub type SectionResult<T> = Result<T, String>;

const SEM_DADOS: &str = "sem dados para o filtro atual";
const SEM_ENCERRADOS: &str = "nenhum chamado encerrado no filtro atual";

/// Fill label for a missing level of the type hierarchy and the duration charts.
pub const NAO_INFORMADO: &str = "Não Informado";

// ─── Output types ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountItem {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeanDurationItem {
    pub label: String,
    pub media_dias: f64,
    pub count: usize,
}

/// Openings per weekday (rows, Monday first) and hour (columns, 0–23).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Heatmap {
    pub dias: Vec<String>,
    pub horas: Vec<u32>,
    pub valores: Vec<Vec<usize>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPoint {
    pub month_key: String,
    pub month_label: String,
    pub chamados: usize,
    /// None when the upload has no SLA column.
    pub dentro_sla_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub label: String,
    pub valores: Vec<usize>,
}

/// One zero-filled series per `Categoria 1`, aligned on `months`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryEvolution {
    pub months: Vec<String>,
    pub month_labels: Vec<String>,
    pub series: Vec<Series>,
}

/// Counts by priority (rows) and status (columns), zero-filled.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pivot {
    pub linhas: Vec<String>,
    pub colunas: Vec<String>,
    pub valores: Vec<Vec<usize>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaComparison {
    pub label: String,
    pub nao: usize,
    pub sim: usize,
}

/// Leaf of the team → owner → status hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyLeaf {
    pub equipe: String,
    pub responsavel: String,
    pub situacao: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationDistribution {
    pub label: String,
    #[serde(flatten)]
    pub stats: Quartiles,
}

/// Box plot of one priority inside one `Categoria 1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityDurationDistribution {
    pub categoria: String,
    pub prioridade: String,
    #[serde(flatten)]
    pub stats: Quartiles,
}

/// Leaf of the `Categoria 1` → `Categoria 2` → `Etapa` hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeHierarchyLeaf {
    pub categoria_1: String,
    pub categoria_2: String,
    pub etapa: String,
    pub count: usize,
}

/// One closed ticket of the duration vs priority scatter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationPoint {
    pub atendimento: String,
    pub dias: i64,
    pub prioridade: String,
    pub categoria: String,
}

/// Equal-width duration classes. `limites` has one more entry than each
/// series; the last class includes its upper bound.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationHistogram {
    pub limites: Vec<f64>,
    pub series: Vec<Series>,
}

/// Every trimmed duration plus its summary, for the violin chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallDuration {
    pub valores: Vec<f64>,
    #[serde(flatten)]
    pub stats: Quartiles,
}

// ─── Builders ────────────────────────────────────────────────────────────────

/// Most frequent `Categoria 2` values. Ties are broken alphabetically.
pub fn top_categories(tickets: &[Ticket], top_n: usize) -> SectionResult<Vec<CountItem>> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for cat in tickets.iter().filter_map(|t| t.category_minor.as_deref()) {
        *counts.entry(cat).or_insert(0) += 1;
    }
    if counts.is_empty() {
        return Err(SEM_DADOS.into());
    }

    let mut items: Vec<CountItem> = counts
        .into_iter()
        .map(|(label, count)| CountItem {
            label: label.to_string(),
            count,
        })
        .collect();
    items.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    items.truncate(top_n);
    Ok(items)
}

pub fn opening_heatmap(tickets: &[Ticket]) -> SectionResult<Heatmap> {
    let mut valores = vec![vec![0usize; 24]; 7];
    let mut any = false;
    for t in tickets {
        if let (Some(day), Some(hour)) = (t.opened_weekday, t.opened_hour) {
            valores[day.index()][hour as usize] += 1;
            any = true;
        }
    }
    if !any {
        return Err(SEM_DADOS.into());
    }
    Ok(Heatmap {
        dias: DiaSemana::ALL
            .iter()
            .map(|d| d.short_label().to_string())
            .collect(),
        horas: (0..24).collect(),
        valores,
    })
}

/// `Categoria 2` values with the longest mean duration.
pub fn top_categories_by_duration(
    tickets: &[Ticket],
    top_n: usize,
) -> SectionResult<Vec<MeanDurationItem>> {
    let mut groups: HashMap<&str, Vec<f64>> = HashMap::new();
    for t in tickets {
        if let (Some(cat), Some(d)) = (t.category_minor.as_deref(), t.duration_days) {
            groups.entry(cat).or_default().push(d as f64);
        }
    }

    let mut items: Vec<MeanDurationItem> = groups
        .into_iter()
        .filter_map(|(label, durations)| {
            mean_opt(&durations).map(|media_dias| MeanDurationItem {
                label: label.to_string(),
                media_dias,
                count: durations.len(),
            })
        })
        .collect();
    if items.is_empty() {
        return Err(SEM_ENCERRADOS.into());
    }
    items.sort_by(|a, b| {
        b.media_dias
            .partial_cmp(&a.media_dias)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.label.cmp(&b.label))
    });
    items.truncate(top_n);
    Ok(items)
}

/// Tickets per opening month. The SLA share of a month counts every ticket
/// of the month in the denominator.
pub fn monthly_evolution(tickets: &[Ticket], has_sla: bool) -> SectionResult<Vec<MonthlyPoint>> {
    let mut months: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for t in tickets {
        if let Some(month) = t.opened_month.as_deref() {
            let entry = months.entry(month).or_insert((0, 0));
            entry.0 += 1;
            if t.sla_breached == Some(SlaFlag::Nao) {
                entry.1 += 1;
            }
        }
    }
    if months.is_empty() {
        return Err(SEM_DADOS.into());
    }

    Ok(months
        .into_iter()
        .map(|(key, (total, within))| MonthlyPoint {
            month_key: key.to_string(),
            month_label: month_year_label(key),
            chamados: total,
            dentro_sla_pct: has_sla.then(|| percent(within, total)),
        })
        .collect())
}

pub fn category_evolution(tickets: &[Ticket]) -> SectionResult<CategoryEvolution> {
    let mut counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    let mut months: BTreeSet<&str> = BTreeSet::new();
    let mut labels: BTreeSet<&str> = BTreeSet::new();
    for t in tickets {
        if let (Some(month), Some(cat)) = (t.opened_month.as_deref(), t.category_major.as_deref())
        {
            *counts.entry((cat, month)).or_insert(0) += 1;
            months.insert(month);
            labels.insert(cat);
        }
    }
    if counts.is_empty() {
        return Err(SEM_DADOS.into());
    }

    let series = labels
        .iter()
        .map(|&cat| Series {
            label: cat.to_string(),
            valores: months
                .iter()
                .map(|&m| counts.get(&(cat, m)).copied().unwrap_or(0))
                .collect(),
        })
        .collect();

    Ok(CategoryEvolution {
        month_labels: months.iter().map(|m| month_year_label(m)).collect(),
        months: months.iter().map(|m| m.to_string()).collect(),
        series,
    })
}

/// Rows missing either the priority or the status are left out.
pub fn priority_status_pivot(tickets: &[Ticket]) -> SectionResult<Pivot> {
    let mut counts: HashMap<(&str, &str), usize> = HashMap::new();
    let mut linhas: BTreeSet<&str> = BTreeSet::new();
    let mut colunas: BTreeSet<&str> = BTreeSet::new();
    for t in tickets {
        if let (Some(p), Some(s)) = (t.priority.as_deref(), t.status.as_deref()) {
            *counts.entry((p, s)).or_insert(0) += 1;
            linhas.insert(p);
            colunas.insert(s);
        }
    }
    if counts.is_empty() {
        return Err(SEM_DADOS.into());
    }

    let valores = linhas
        .iter()
        .map(|&p| {
            colunas
                .iter()
                .map(|&s| counts.get(&(p, s)).copied().unwrap_or(0))
                .collect()
        })
        .collect();

    Ok(Pivot {
        linhas: linhas.into_iter().map(str::to_string).collect(),
        colunas: colunas.into_iter().map(str::to_string).collect(),
        valores,
    })
}

/// Within/over SLA counts per `Categoria 2`, largest "Não" first, then "Sim".
pub fn sla_by_category(tickets: &[Ticket], top_n: usize) -> SectionResult<Vec<SlaComparison>> {
    let mut groups: HashMap<&str, (usize, usize)> = HashMap::new();
    for t in tickets {
        if let (Some(cat), Some(flag)) = (t.category_minor.as_deref(), t.sla_breached) {
            let entry = groups.entry(cat).or_insert((0, 0));
            match flag {
                SlaFlag::Nao => entry.0 += 1,
                SlaFlag::Sim => entry.1 += 1,
            }
        }
    }
    if groups.is_empty() {
        return Err(SEM_DADOS.into());
    }

    let mut items: Vec<SlaComparison> = groups
        .into_iter()
        .map(|(label, (nao, sim))| SlaComparison {
            label: label.to_string(),
            nao,
            sim,
        })
        .collect();
    items.sort_by(|a, b| {
        b.nao
            .cmp(&a.nao)
            .then_with(|| b.sim.cmp(&a.sim))
            .then_with(|| a.label.cmp(&b.label))
    });
    items.truncate(top_n);
    Ok(items)
}

pub const EQUIPE_NAO_INFORMADA: &str = "Equipe Não Informada";
pub const SITUACAO_NAO_INFORMADA: &str = "Situação Não Informada";

/// Team → owner → status leaf counts. Missing levels get placeholder labels,
/// an unknown owner being labelled after its team.
pub fn team_hierarchy(tickets: &[Ticket]) -> SectionResult<Vec<HierarchyLeaf>> {
    if tickets.is_empty() {
        return Err(SEM_DADOS.into());
    }

    let mut leaves: BTreeMap<(String, String, String), usize> = BTreeMap::new();
    for t in tickets {
        let equipe = t
            .team
            .clone()
            .unwrap_or_else(|| EQUIPE_NAO_INFORMADA.to_string());
        let responsavel = t
            .owner
            .clone()
            .unwrap_or_else(|| format!("{} - Responsável Não Informado", equipe));
        let situacao = t
            .status
            .clone()
            .unwrap_or_else(|| SITUACAO_NAO_INFORMADA.to_string());
        *leaves.entry((equipe, responsavel, situacao)).or_insert(0) += 1;
    }

    Ok(leaves
        .into_iter()
        .map(|((equipe, responsavel, situacao), count)| HierarchyLeaf {
            equipe,
            responsavel,
            situacao,
            count,
        })
        .collect())
}

/// Bounds of the `[p_low, p_high]` percentiles over every known duration.
fn trim_bounds(tickets: &[Ticket], p_low: f64, p_high: f64) -> SectionResult<(f64, f64)> {
    let all: Vec<f64> = tickets
        .iter()
        .filter_map(|t| t.duration_days)
        .map(|d| d as f64)
        .collect();
    if all.is_empty() {
        return Err(SEM_ENCERRADOS.into());
    }
    Ok((percentile(&all, p_low), percentile(&all, p_high)))
}

/// Durations inside the trim bounds, with their ticket.
fn trimmed<'a>(
    tickets: &'a [Ticket],
    p_low: f64,
    p_high: f64,
) -> SectionResult<impl Iterator<Item = (&'a Ticket, i64)>> {
    let (lo, hi) = trim_bounds(tickets, p_low, p_high)?;
    Ok(tickets.iter().filter_map(move |t| {
        t.duration_days
            .filter(|&d| d as f64 >= lo && d as f64 <= hi)
            .map(|d| (t, d))
    }))
}

/// Duration box plots per `Categoria 1`, outliers outside
/// `[p_low, p_high]` of all durations removed first.
pub fn duration_distribution(
    tickets: &[Ticket],
    p_low: f64,
    p_high: f64,
) -> SectionResult<Vec<DurationDistribution>> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for (t, d) in trimmed(tickets, p_low, p_high)? {
        if let Some(cat) = t.category_major.as_deref() {
            groups.entry(cat).or_default().push(d as f64);
        }
    }

    let out: Vec<DurationDistribution> = groups
        .into_iter()
        .filter_map(|(label, values)| {
            quartiles(&values).map(|stats| DurationDistribution {
                label: label.to_string(),
                stats,
            })
        })
        .collect();
    if out.is_empty() {
        return Err(SEM_DADOS.into());
    }
    Ok(out)
}

/// Same trimming as [`duration_distribution`], one box per priority inside
/// each `Categoria 1`.
pub fn duration_distribution_by_priority(
    tickets: &[Ticket],
    p_low: f64,
    p_high: f64,
) -> SectionResult<Vec<PriorityDurationDistribution>> {
    let mut groups: BTreeMap<(&str, &str), Vec<f64>> = BTreeMap::new();
    for (t, d) in trimmed(tickets, p_low, p_high)? {
        if let (Some(cat), Some(p)) = (t.category_major.as_deref(), t.priority.as_deref()) {
            groups.entry((cat, p)).or_default().push(d as f64);
        }
    }

    let out: Vec<PriorityDurationDistribution> = groups
        .into_iter()
        .filter_map(|((categoria, prioridade), values)| {
            quartiles(&values).map(|stats| PriorityDurationDistribution {
                categoria: categoria.to_string(),
                prioridade: prioridade.to_string(),
                stats,
            })
        })
        .collect();
    if out.is_empty() {
        return Err(SEM_DADOS.into());
    }
    Ok(out)
}

/// Leaf counts of the type hierarchy, missing levels filled with
/// [`NAO_INFORMADO`].
pub fn type_hierarchy(tickets: &[Ticket]) -> SectionResult<Vec<TypeHierarchyLeaf>> {
    if tickets.is_empty() {
        return Err(SEM_DADOS.into());
    }

    let fill = |v: &Option<String>| v.clone().unwrap_or_else(|| NAO_INFORMADO.to_string());
    let mut leaves: BTreeMap<(String, String, String), usize> = BTreeMap::new();
    for t in tickets {
        let key = (fill(&t.category_major), fill(&t.category_minor), fill(&t.stage));
        *leaves.entry(key).or_insert(0) += 1;
    }

    Ok(leaves
        .into_iter()
        .map(|((categoria_1, categoria_2, etapa), count)| TypeHierarchyLeaf {
            categoria_1,
            categoria_2,
            etapa,
            count,
        })
        .collect())
}

/// Tickets per priority, in label order. Rows without a priority are left out.
pub fn priority_counts(tickets: &[Ticket]) -> SectionResult<Vec<CountItem>> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for p in tickets.iter().filter_map(|t| t.priority.as_deref()) {
        *counts.entry(p).or_insert(0) += 1;
    }
    if counts.is_empty() {
        return Err(SEM_DADOS.into());
    }
    Ok(counts
        .into_iter()
        .map(|(label, count)| CountItem {
            label: label.to_string(),
            count,
        })
        .collect())
}

/// Trimmed closed tickets as (duration, priority) points coloured by
/// `Categoria 1`. Rows without a priority are left out.
pub fn duration_priority_points(
    tickets: &[Ticket],
    p_low: f64,
    p_high: f64,
) -> SectionResult<Vec<DurationPoint>> {
    let points: Vec<DurationPoint> = trimmed(tickets, p_low, p_high)?
        .filter_map(|(t, dias)| {
            t.priority.as_ref().map(|p| DurationPoint {
                atendimento: t.id.clone(),
                dias,
                prioridade: p.clone(),
                categoria: t
                    .category_major
                    .clone()
                    .unwrap_or_else(|| NAO_INFORMADO.to_string()),
            })
        })
        .collect();
    if points.is_empty() {
        return Err(SEM_DADOS.into());
    }
    Ok(points)
}

/// Untrimmed histogram of every known duration, one series per `Categoria 1`.
pub fn duration_histogram(tickets: &[Ticket], classes: usize) -> SectionResult<DurationHistogram> {
    let values: Vec<(&str, f64)> = tickets
        .iter()
        .filter_map(|t| {
            t.duration_days
                .map(|d| (t.category_major.as_deref().unwrap_or(NAO_INFORMADO), d as f64))
        })
        .collect();
    if values.is_empty() {
        return Err(SEM_ENCERRADOS.into());
    }

    let min = values.iter().map(|v| v.1).fold(f64::INFINITY, f64::min);
    let max = values.iter().map(|v| v.1).fold(f64::NEG_INFINITY, f64::max);
    // a single distinct value gets one class of width 1
    let (classes, width) = if max > min {
        let classes = classes.max(1);
        (classes, (max - min) / classes as f64)
    } else {
        (1, 1.0)
    };

    let mut counts: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (cat, d) in values {
        let idx = (((d - min) / width) as usize).min(classes - 1);
        counts.entry(cat).or_insert_with(|| vec![0; classes])[idx] += 1;
    }

    Ok(DurationHistogram {
        limites: (0..=classes).map(|i| min + width * i as f64).collect(),
        series: counts
            .into_iter()
            .map(|(label, valores)| Series {
                label: label.to_string(),
                valores,
            })
            .collect(),
    })
}

/// All trimmed durations, sorted, with their summary.
pub fn overall_duration(tickets: &[Ticket], p_low: f64, p_high: f64) -> SectionResult<OverallDuration> {
    let mut valores: Vec<f64> = trimmed(tickets, p_low, p_high)?
        .map(|(_, d)| d as f64)
        .collect();
    valores.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let stats = quartiles(&valores).ok_or_else(|| SEM_DADOS.to_string())?;
    Ok(OverallDuration { valores, stats })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::pipeline::normalize_tickets;
    use crate::parser::types::RawTicket;

    struct Row<'a> {
        open: &'a str,
        close: Option<&'a str>,
        major: Option<&'a str>,
        minor: Option<&'a str>,
        status: Option<&'a str>,
        priority: Option<&'a str>,
        team: Option<&'a str>,
        owner: Option<&'a str>,
        sla: Option<&'a str>,
    }

    const BASE: Row<'static> = Row {
        open: "2024-01-01 08:00",
        close: None,
        major: None,
        minor: None,
        status: Some("Encerrado"),
        priority: None,
        team: None,
        owner: None,
        sla: None,
    };

    fn tickets(rows: &[Row]) -> Vec<Ticket> {
        let raws: Vec<RawTicket> = rows
            .iter()
            .map(|r| RawTicket {
                id: Some("REQ-1".into()),
                opened_at: Some(r.open.into()),
                closed_at: r.close.map(str::to_string),
                status: r.status.map(str::to_string),
                stage: Some("Fim".into()),
                category_major: r.major.map(str::to_string),
                category_minor: r.minor.map(str::to_string),
                priority: r.priority.map(str::to_string),
                team: r.team.map(str::to_string),
                owner: r.owner.map(str::to_string),
                sla_breached: r.sla.map(str::to_string),
                ..Default::default()
            })
            .collect();
        normalize_tickets(&raws).tickets
    }

    // ── Rankings ─────────────────────────────────────────────────────────────

    #[test]
    fn test_top_categories_order_and_truncation() {
        let t = tickets(&[
            Row { minor: Some("B"), ..BASE },
            Row { minor: Some("A"), ..BASE },
            Row { minor: Some("C"), ..BASE },
            Row { minor: Some("C"), ..BASE },
            Row { minor: None, ..BASE },
        ]);
        let top = top_categories(&t, 2).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0], CountItem { label: "C".into(), count: 2 });
        assert_eq!(top[1].label, "A");
    }

    #[test]
    fn test_top_categories_empty_is_error() {
        assert!(top_categories(&[], 10).is_err());
    }

    #[test]
    fn test_top_categories_by_duration() {
        let t = tickets(&[
            Row { minor: Some("Lenta"), close: Some("2024-01-11 08:00"), ..BASE },
            Row { minor: Some("Lenta"), close: Some("2024-01-05 08:00"), ..BASE },
            Row { minor: Some("Rapida"), close: Some("2024-01-02 08:00"), ..BASE },
            Row { minor: Some("Aberta"), ..BASE },
        ]);
        let top = top_categories_by_duration(&t, 10).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].label, "Lenta");
        assert_eq!(top[0].media_dias, 7.0);
        assert_eq!(top[0].count, 2);
        assert_eq!(top[1].media_dias, 1.0);
    }

    // ── Temporal ─────────────────────────────────────────────────────────────

    #[test]
    fn test_heatmap_monday_first() {
        // 2024-01-01 is a Monday, 2024-01-07 a Sunday
        let t = tickets(&[
            Row { open: "2024-01-01 08:15", ..BASE },
            Row { open: "2024-01-01 08:45", ..BASE },
            Row { open: "2024-01-07 23:00", ..BASE },
        ]);
        let h = opening_heatmap(&t).unwrap();
        assert_eq!(h.dias[0], "Segunda");
        assert_eq!(h.dias[6], "Domingo");
        assert_eq!(h.horas.len(), 24);
        assert_eq!(h.valores[0][8], 2);
        assert_eq!(h.valores[6][23], 1);
        assert_eq!(h.valores.iter().flatten().sum::<usize>(), 3);
    }

    #[test]
    fn test_monthly_evolution_keyed_by_year_and_month() {
        let t = tickets(&[
            Row { open: "2024-01-10 08:00", sla: Some("Não"), ..BASE },
            Row { open: "2023-01-10 08:00", sla: Some("Sim"), ..BASE },
            Row { open: "2024-01-20 08:00", sla: Some("Sim"), ..BASE },
        ]);
        let pts = monthly_evolution(&t, true).unwrap();
        assert_eq!(pts.len(), 2);
        assert_eq!(pts[0].month_label, "Janeiro-2023");
        assert_eq!(pts[0].dentro_sla_pct, Some(0.0));
        assert_eq!(pts[1].chamados, 2);
        assert_eq!(pts[1].dentro_sla_pct, Some(50.0));

        let no_sla = monthly_evolution(&t, false).unwrap();
        assert!(no_sla.iter().all(|p| p.dentro_sla_pct.is_none()));
    }

    #[test]
    fn test_category_evolution_zero_filled() {
        let t = tickets(&[
            Row { open: "2024-01-10 08:00", major: Some("INC"), ..BASE },
            Row { open: "2024-02-10 08:00", major: Some("REQ"), ..BASE },
            Row { open: "2024-02-11 08:00", major: Some("REQ"), ..BASE },
        ]);
        let ev = category_evolution(&t).unwrap();
        assert_eq!(ev.months, ["2024-01", "2024-02"]);
        assert_eq!(ev.month_labels, ["Janeiro-2024", "Fevereiro-2024"]);
        assert_eq!(ev.series[0], Series { label: "INC".into(), valores: vec![1, 0] });
        assert_eq!(ev.series[1], Series { label: "REQ".into(), valores: vec![0, 2] });
    }

    // ── Breakdowns ───────────────────────────────────────────────────────────

    #[test]
    fn test_priority_status_pivot() {
        let t = tickets(&[
            Row { priority: Some("Alta"), status: Some("Encerrado"), ..BASE },
            Row { priority: Some("Alta"), status: Some("Pendente"), ..BASE },
            Row { priority: Some("Baixa"), status: Some("Encerrado"), ..BASE },
            Row { priority: None, status: Some("Encerrado"), ..BASE },
        ]);
        let p = priority_status_pivot(&t).unwrap();
        assert_eq!(p.linhas, ["Alta", "Baixa"]);
        assert_eq!(p.colunas, ["Encerrado", "Pendente"]);
        assert_eq!(p.valores, vec![vec![1, 1], vec![1, 0]]);
    }

    #[test]
    fn test_sla_by_category_ordering() {
        let t = tickets(&[
            Row { minor: Some("A"), sla: Some("Não"), ..BASE },
            Row { minor: Some("B"), sla: Some("Não"), ..BASE },
            Row { minor: Some("B"), sla: Some("Sim"), ..BASE },
            Row { minor: Some("C"), sla: Some("Sim"), ..BASE },
            Row { minor: Some("C"), sla: Some("Sim"), ..BASE },
        ]);
        let items = sla_by_category(&t, 10).unwrap();
        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, ["B", "A", "C"]);
        assert_eq!(items[0], SlaComparison { label: "B".into(), nao: 1, sim: 1 });
    }

    #[test]
    fn test_team_hierarchy_fill_labels() {
        let t = tickets(&[
            Row { team: Some("ERP"), owner: Some("Ana"), ..BASE },
            Row { team: Some("ERP"), owner: None, ..BASE },
            Row { team: None, owner: None, status: None, ..BASE },
        ]);
        let leaves = team_hierarchy(&t).unwrap();
        assert!(leaves.contains(&HierarchyLeaf {
            equipe: "ERP".into(),
            responsavel: "ERP - Responsável Não Informado".into(),
            situacao: "Encerrado".into(),
            count: 1,
        }));
        assert!(leaves.contains(&HierarchyLeaf {
            equipe: "Equipe Não Informada".into(),
            responsavel: "Equipe Não Informada - Responsável Não Informado".into(),
            situacao: "Situação Não Informada".into(),
            count: 1,
        }));
        assert_eq!(leaves.iter().map(|l| l.count).sum::<usize>(), 3);
    }

    #[test]
    fn test_duration_distribution_trims_outliers() {
        let mut rows: Vec<Row> = (1..=9)
            .map(|d| Row {
                open: "2024-01-01 08:00",
                close: Some(["2024-01-02", "2024-01-03", "2024-01-04", "2024-01-05",
                    "2024-01-06", "2024-01-07", "2024-01-08", "2024-01-09", "2024-01-10"][d - 1]),
                major: Some("INC"),
                ..BASE
            })
            .collect();
        // far outlier: 365 days
        rows.push(Row { close: Some("2024-12-31"), major: Some("INC"), ..BASE });

        let dist = duration_distribution(&tickets(&rows), 0.0, 90.0).unwrap();
        assert_eq!(dist.len(), 1);
        assert_eq!(dist[0].label, "INC");
        assert_eq!(dist[0].stats.count, 9);
        assert_eq!(dist[0].stats.min, 1.0);
        assert_eq!(dist[0].stats.max, 9.0);
        assert_eq!(dist[0].stats.median, 5.0);
    }

    /// Closing date `d` days after `BASE.open`.
    fn after(d: usize) -> Option<&'static str> {
        const DAYS: [&str; 11] = [
            "2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04", "2024-01-05", "2024-01-06",
            "2024-01-07", "2024-01-08", "2024-01-09", "2024-01-10", "2024-01-11",
        ];
        Some(DAYS[d])
    }

    #[test]
    fn test_duration_distribution_by_priority() {
        let t = tickets(&[
            Row { major: Some("INC"), priority: Some("Alta"), close: after(1), ..BASE },
            Row { major: Some("INC"), priority: Some("Alta"), close: after(3), ..BASE },
            Row { major: Some("INC"), priority: Some("Baixa"), close: after(2), ..BASE },
            Row { major: Some("REQ"), priority: Some("Alta"), close: after(5), ..BASE },
            Row { major: Some("REQ"), priority: None, close: after(4), ..BASE },
            Row { major: Some("REQ"), priority: Some("Baixa"), ..BASE },
        ]);
        let boxes = duration_distribution_by_priority(&t, 0.0, 100.0).unwrap();
        let keys: Vec<(&str, &str, usize)> = boxes
            .iter()
            .map(|b| (b.categoria.as_str(), b.prioridade.as_str(), b.stats.count))
            .collect();
        assert_eq!(keys, [("INC", "Alta", 2), ("INC", "Baixa", 1), ("REQ", "Alta", 1)]);
        assert_eq!(boxes[0].stats.median, 2.0);
    }

    // ── Priority and hierarchy ───────────────────────────────────────────────

    #[test]
    fn test_type_hierarchy_fill_labels() {
        let t = tickets(&[
            Row { major: Some("INC"), minor: Some("ERP"), ..BASE },
            Row { major: Some("INC"), minor: Some("ERP"), ..BASE },
            Row { major: None, minor: None, ..BASE },
        ]);
        let leaves = type_hierarchy(&t).unwrap();
        assert_eq!(
            leaves,
            vec![
                TypeHierarchyLeaf {
                    categoria_1: "INC".into(),
                    categoria_2: "ERP".into(),
                    etapa: "Fim".into(),
                    count: 2,
                },
                TypeHierarchyLeaf {
                    categoria_1: "Não Informado".into(),
                    categoria_2: "Não Informado".into(),
                    etapa: "Fim".into(),
                    count: 1,
                },
            ]
        );
        assert!(type_hierarchy(&[]).is_err());
    }

    #[test]
    fn test_priority_counts_in_label_order() {
        let t = tickets(&[
            Row { priority: Some("Média"), ..BASE },
            Row { priority: Some("Alta"), ..BASE },
            Row { priority: Some("Média"), ..BASE },
            Row { priority: None, ..BASE },
        ]);
        let counts = priority_counts(&t).unwrap();
        assert_eq!(
            counts,
            vec![
                CountItem { label: "Alta".into(), count: 1 },
                CountItem { label: "Média".into(), count: 2 },
            ]
        );
        assert!(priority_counts(&tickets(&[BASE])).is_err());
    }

    #[test]
    fn test_duration_priority_points_trimmed() {
        let mut rows: Vec<Row> = (1..=9)
            .map(|d| Row { priority: Some("Alta"), major: Some("INC"), close: after(d), ..BASE })
            .collect();
        rows.push(Row { priority: Some("Baixa"), close: Some("2024-12-31"), ..BASE });
        rows.push(Row { priority: None, close: after(5), ..BASE });
        rows.push(Row { priority: Some("Baixa"), close: after(4), ..BASE });

        let points = duration_priority_points(&tickets(&rows), 0.0, 95.0).unwrap();
        assert_eq!(points.len(), 10);
        assert!(points.iter().all(|p| p.dias <= 9));
        let last = points.last().unwrap();
        assert_eq!((last.dias, last.prioridade.as_str()), (4, "Baixa"));
        assert_eq!(last.categoria, "Não Informado");
    }

    // ── Duration shape ───────────────────────────────────────────────────────

    #[test]
    fn test_duration_histogram_classes() {
        let t = tickets(&[
            Row { major: Some("INC"), close: after(1), ..BASE },
            Row { major: Some("INC"), close: after(2), ..BASE },
            Row { major: Some("REQ"), close: after(10), ..BASE },
            Row { major: Some("REQ"), ..BASE },
        ]);
        let h = duration_histogram(&t, 3).unwrap();
        assert_eq!(h.limites, vec![1.0, 4.0, 7.0, 10.0]);
        assert_eq!(h.series[0], Series { label: "INC".into(), valores: vec![2, 0, 0] });
        assert_eq!(h.series[1], Series { label: "REQ".into(), valores: vec![0, 0, 1] });
    }

    #[test]
    fn test_duration_histogram_single_value() {
        let t = tickets(&[Row { close: after(4), ..BASE }, Row { close: after(4), ..BASE }]);
        let h = duration_histogram(&t, 30).unwrap();
        assert_eq!(h.limites, vec![4.0, 5.0]);
        assert_eq!(h.series, vec![Series { label: "Não Informado".into(), valores: vec![2] }]);
        assert!(duration_histogram(&tickets(&[BASE]), 30).is_err());
    }

    #[test]
    fn test_overall_duration_trimmed_and_sorted() {
        let mut rows: Vec<Row> = (1..=9).rev().map(|d| Row { close: after(d), ..BASE }).collect();
        rows.push(Row { close: Some("2024-12-31"), ..BASE });

        let v = overall_duration(&tickets(&rows), 0.0, 90.0).unwrap();
        assert_eq!(v.valores, (1..=9).map(f64::from).collect::<Vec<_>>());
        assert_eq!(v.stats.count, 9);
        assert_eq!(v.stats.median, 5.0);
    }

    #[test]
    fn test_duration_distribution_without_closed_tickets() {
        let t = tickets(&[Row { major: Some("INC"), ..BASE }]);
        assert!(duration_distribution(&t, 1.0, 99.0).is_err());
    }
}
