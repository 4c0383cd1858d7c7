use serde::Serialize;
use thiserror::Error;

/// Fatal errors. Anything raised while reading the uploaded file is a load
/// error: the session gets an empty dataset and the message is surfaced.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de entrada/saída: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Erro ao ler a planilha: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Erro ao gerar o Excel: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Erro ao gerar o ZIP: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Erro de serialização: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Colunas obrigatórias ausentes: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Arquivo vazio ou sem dados")]
    EmptyFile,
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Non-fatal conditions collected while building a report. None of them stops
/// the dashboard; each one only affects the section it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum DashboardWarning {
    /// An optional column is absent from the upload.
    #[serde(rename_all = "camelCase")]
    FieldMissing { field: String },

    /// A section failed to compute and was skipped.
    #[serde(rename_all = "camelCase")]
    Computation { section: String, message: String },

    /// Informational signal about the uploaded data.
    #[serde(rename_all = "camelCase")]
    DataQuality { message: String },
}

impl DashboardWarning {
    pub fn field_missing(field: &str) -> Self {
        DashboardWarning::FieldMissing {
            field: field.to_string(),
        }
    }

    pub fn computation(section: &str, message: impl Into<String>) -> Self {
        DashboardWarning::Computation {
            section: section.to_string(),
            message: message.into(),
        }
    }

    pub fn data_quality(message: impl Into<String>) -> Self {
        DashboardWarning::DataQuality {
            message: message.into(),
        }
    }

    /// Emits the warning through the `log` facade.
    pub fn log(&self) {
        match self {
            DashboardWarning::FieldMissing { field } => {
                log::warn!("Coluna ausente: {}", field)
            }
            DashboardWarning::Computation { section, message } => {
                log::warn!("Não foi possível calcular '{}': {}", section, message)
            }
            DashboardWarning::DataQuality { message } => log::warn!("{}", message),
        }
    }
}

impl std::fmt::Display for DashboardWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DashboardWarning::FieldMissing { field } => write!(f, "Coluna ausente: {}", field),
            DashboardWarning::Computation { section, message } => {
                write!(f, "Não foi possível exibir '{}': {}", section, message)
            }
            DashboardWarning::DataQuality { message } => f.write_str(message),
        }
    }
}
