use chrono::{NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

/// One row of the upload, every field as the raw cell text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTicket {
    pub id: Option<String>,
    pub title: Option<String>,
    pub opened_at: Option<String>,
    pub due_at: Option<String>,
    pub closed_at: Option<String>,
    pub status: Option<String>,
    pub stage: Option<String>,
    pub category_major: Option<String>,
    pub category_minor: Option<String>,
    pub priority: Option<String>,
    pub team: Option<String>,
    pub owner: Option<String>,
    pub sla_breached: Option<String>,
}

/// Canonical ticket, one-to-one with the uploaded row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    /// Digits of `id`, used for numeric ordering ("REQ-123" → 123).
    pub id_number: Option<u64>,
    pub title: Option<String>,
    pub opened_at: Option<NaiveDateTime>,
    pub due_at: Option<NaiveDateTime>,
    pub closed_at: Option<NaiveDateTime>,
    pub status: Option<String>,
    pub stage: Option<String>,
    pub category_major: Option<String>,
    pub category_minor: Option<String>,
    pub priority: Option<String>,
    pub team: Option<String>,
    pub owner: Option<String>,
    pub sla_breached: Option<SlaFlag>,
    /// `closed_at.date - opened_at.date`; None while the ticket is open.
    pub duration_days: Option<i64>,
    /// `YYYY-MM` of `opened_at`.
    pub opened_month: Option<String>,
    pub opened_weekday: Option<DiaSemana>,
    pub opened_hour: Option<u32>,
}

/// "Atraso no serviço" flag. `Nao` means the ticket met its SLA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SlaFlag {
    #[serde(rename = "Sim")]
    Sim,
    #[serde(rename = "Não")]
    Nao,
}

impl SlaFlag {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sim" => Some(SlaFlag::Sim),
            "não" | "nao" => Some(SlaFlag::Nao),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SlaFlag::Sim => "Sim",
            SlaFlag::Nao => "Não",
        }
    }
}

/// Opening weekday, ordered Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DiaSemana {
    #[serde(rename = "Segunda-feira")]
    Segunda,
    #[serde(rename = "Terça-feira")]
    Terca,
    #[serde(rename = "Quarta-feira")]
    Quarta,
    #[serde(rename = "Quinta-feira")]
    Quinta,
    #[serde(rename = "Sexta-feira")]
    Sexta,
    #[serde(rename = "Sábado")]
    Sabado,
    #[serde(rename = "Domingo")]
    Domingo,
}

impl DiaSemana {
    pub const ALL: [DiaSemana; 7] = [
        DiaSemana::Segunda,
        DiaSemana::Terca,
        DiaSemana::Quarta,
        DiaSemana::Quinta,
        DiaSemana::Sexta,
        DiaSemana::Sabado,
        DiaSemana::Domingo,
    ];

    pub fn from_weekday(w: Weekday) -> Self {
        Self::ALL[w.num_days_from_monday() as usize]
    }

    /// 0 for Monday … 6 for Sunday.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            DiaSemana::Segunda => "Segunda-feira",
            DiaSemana::Terca => "Terça-feira",
            DiaSemana::Quarta => "Quarta-feira",
            DiaSemana::Quinta => "Quinta-feira",
            DiaSemana::Sexta => "Sexta-feira",
            DiaSemana::Sabado => "Sábado",
            DiaSemana::Domingo => "Domingo",
        }
    }

    /// Heatmap axis label ("Segunda", "Terça", …).
    pub fn short_label(self) -> &'static str {
        self.label().trim_end_matches("-feira")
    }
}
