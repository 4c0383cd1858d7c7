use std::collections::HashMap;

use crate::error::AppError;

pub const COL_ID: &str = "Atendimento";
pub const COL_TITULO: &str = "Título do atendimento";
pub const COL_ABERTURA: &str = "Data da abertura";
pub const COL_PREVISAO: &str = "Data da previsão de término";
pub const COL_TERMINO: &str = "Data de término do atendimento";
pub const COL_SITUACAO: &str = "Situação";
pub const COL_ETAPA: &str = "Etapa";
pub const COL_CATEGORIA_1: &str = "Categoria 1";
pub const COL_CATEGORIA_2: &str = "Categoria 2";
pub const COL_PRIORIDADE: &str = "Prioridade";
pub const COL_EQUIPE: &str = "Equipe";
pub const COL_RESPONSAVEL: &str = "Responsável";
pub const COL_ATRASO: &str = "Atraso no serviço";

// Derived columns, present in every canonical dataset.
pub const COL_DURACAO: &str = "Tempo de Atendimento (dias)";
pub const COL_MES: &str = "Mês";
pub const COL_DIA_SEMANA: &str = "Dia da Semana";
pub const COL_HORA: &str = "Hora";

/// Required columns: the normalization rules and the backlog read them
/// directly, so the load fails if one is absent.
const REQUIRED: &[&str] = &[
    COL_ID,
    COL_ABERTURA,
    COL_TERMINO,
    COL_SITUACAO,
    COL_ETAPA,
    COL_CATEGORIA_2,
];

/// Optional columns: absent = null values, reported as warnings and the
/// sections depending on them are skipped.
const OPTIONAL: &[&str] = &[
    COL_TITULO,
    COL_PREVISAO,
    COL_CATEGORIA_1,
    COL_PRIORIDADE,
    COL_EQUIPE,
    COL_RESPONSAVEL,
    COL_ATRASO,
];

/// Maps column names to their index in a row.
pub struct ColumnMap {
    indices: HashMap<String, usize>,
    headers: Vec<String>,
}

impl ColumnMap {
    /// Build a ColumnMap from the header row.
    /// Header cells are trimmed of surrounding whitespace and of a leading BOM.
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Self {
        let mut indices = HashMap::new();
        let mut header_list = Vec::new();
        for (i, field) in headers.iter().enumerate() {
            let name = field.as_ref().trim_start_matches('\u{FEFF}').trim().to_string();
            // first occurrence wins on duplicated headers
            indices.entry(name.clone()).or_insert(i);
            header_list.push(name);
        }
        ColumnMap {
            indices,
            headers: header_list,
        }
    }

    /// Get the value of a named column from a row.
    pub fn get<'a>(&self, row: &'a [String], col: &str) -> Option<&'a str> {
        self.indices
            .get(col)
            .and_then(|&i| row.get(i))
            .map(String::as_str)
    }

    pub fn has(&self, col: &str) -> bool {
        self.indices.contains_key(col)
    }

    /// All header names in order.
    pub fn all_headers(&self) -> &[String] {
        &self.headers
    }
}

/// Result of column validation.
#[derive(Debug, Clone)]
pub struct ColumnValidation {
    /// All column names present in the upload.
    pub present: Vec<String>,
    /// Optional columns that are absent from the upload.
    pub missing_optional: Vec<String>,
}

/// Columns computed by the normalizer rather than read from the upload.
pub fn is_derived(col: &str) -> bool {
    matches!(col, COL_DURACAO | COL_MES | COL_DIA_SEMANA | COL_HORA)
}

/// Validate that all required columns are present.
/// Returns `AppError::MissingColumns` if any required column is absent.
pub fn validate_columns(col_map: &ColumnMap) -> Result<ColumnValidation, AppError> {
    let missing_required: Vec<String> = REQUIRED
        .iter()
        .filter(|&&c| !col_map.has(c))
        .map(|c| c.to_string())
        .collect();

    if !missing_required.is_empty() {
        return Err(AppError::MissingColumns(missing_required));
    }

    let missing_optional = OPTIONAL
        .iter()
        .filter(|&&c| !col_map.has(c))
        .map(|c| c.to_string())
        .collect();

    Ok(ColumnValidation {
        present: col_map.all_headers().to_vec(),
        missing_optional,
    })
}
