//! Status / stage / category reclassification.
//!
//! Every predicate is evaluated against the row as it was uploaded; the
//! rewrites are applied in order to a copy. A rule never sees what an earlier
//! rule wrote, so rules do not chain.

pub const STATUS_CANCELADO: &str = "Cancelado";
pub const STATUS_REPROVADO: &str = "Reprovado";
pub const STATUS_ENCERRADO: &str = "Encerrado";
pub const STATUS_EM_ATENDIMENTO: &str = "Em Atendimento";
pub const STATUS_AGUARDANDO_ATENDIMENTO: &str = "Aguardando Atendimento";
pub const STATUS_AGUARDANDO_ENCERRAMENTO: &str = "Aguardando confirmação de encerramento";
pub const STATUS_SUSPENSO: &str = "Suspenso";
pub const STATUS_PAUSADO: &str = "Aguardando Aprovação/Pausado";

pub const ETAPAS_REPROVADO: &[&str] = &["Reprovado", "Atendimento Reprovado"];

pub const CATEGORIA_SAP: &str = "SAP";
pub const CATEGORIA_INCIDENTE: &str = "Incidente";

/// The fields the rules read and write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusFields {
    pub status: Option<String>,
    pub stage: Option<String>,
    pub category_minor: Option<String>,
}

impl StatusFields {
    fn status_is(&self, value: &str) -> bool {
        self.status.as_deref() == Some(value)
    }

    fn stage_is_reprovado(&self) -> bool {
        self.stage
            .as_deref()
            .is_some_and(|s| ETAPAS_REPROVADO.contains(&s))
    }
}

/// One `(predicate, rewrite)` pair.
pub struct Rule {
    pub name: &'static str,
    pub matches: fn(&StatusFields) -> bool,
    pub rewrite: fn(&mut StatusFields),
}

pub const RULES: &[Rule] = &[
    Rule {
        name: "cancelado_reprovado",
        matches: |f| f.status_is(STATUS_CANCELADO) && f.stage_is_reprovado(),
        rewrite: |f| {
            f.status = Some(STATUS_REPROVADO.into());
            f.stage = Some(STATUS_REPROVADO.into());
        },
    },
    Rule {
        name: "cancelado",
        matches: |f| f.status_is(STATUS_CANCELADO) && !f.stage_is_reprovado(),
        rewrite: |f| {
            f.status = Some(STATUS_CANCELADO.into());
            f.stage = Some(STATUS_CANCELADO.into());
        },
    },
    Rule {
        name: "aguardando_encerramento",
        matches: |f| f.status_is(STATUS_AGUARDANDO_ENCERRAMENTO),
        rewrite: |f| f.status = Some(STATUS_ENCERRADO.into()),
    },
    Rule {
        name: "em_atendimento",
        matches: |f| {
            f.status_is(STATUS_EM_ATENDIMENTO) || f.status_is(STATUS_AGUARDANDO_ATENDIMENTO)
        },
        rewrite: |f| f.status = Some(STATUS_EM_ATENDIMENTO.into()),
    },
    Rule {
        name: "sap_incidente",
        matches: |f| f.category_minor.as_deref() == Some(CATEGORIA_SAP),
        rewrite: |f| f.category_minor = Some(CATEGORIA_INCIDENTE.into()),
    },
    Rule {
        name: "suspenso",
        matches: |f| f.status_is(STATUS_SUSPENSO),
        rewrite: |f| f.status = Some(STATUS_PAUSADO.into()),
    },
];

/// Applies [`RULES`] to one row.
pub fn apply_rules(original: &StatusFields) -> StatusFields {
    apply_rule_set(RULES, original)
}

pub fn apply_rule_set(rules: &[Rule], original: &StatusFields) -> StatusFields {
    let mut out = original.clone();
    for rule in rules {
        if (rule.matches)(original) {
            (rule.rewrite)(&mut out);
        }
    }
    out
}
