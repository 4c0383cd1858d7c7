use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Dashboard settings. Every field has a default so a partial JSON file is
/// enough; unknown keys are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardConfig {
    /// How long a parsed upload stays reusable for the same session.
    pub cache_ttl_secs: u64,
    /// Size of the "top N" rankings (categories, SLA comparison).
    pub top_n: usize,
    /// `Categoria 1` value counted as an incident.
    pub categoria_incidente: String,
    /// `Categoria 1` value counted as a request.
    pub categoria_requisicao: String,
    /// Status counted as rejected.
    pub status_reprovado: String,
    /// Lower percentile kept when trimming duration outliers.
    pub percentil_inferior: f64,
    /// Upper percentile kept when trimming duration outliers.
    pub percentil_superior: f64,
    /// Number of equal-width classes of the duration histogram.
    pub classes_histograma: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            cache_ttl_secs: 3600,
            top_n: 10,
            categoria_incidente: "INC-Sistemas Corporativos".into(),
            categoria_requisicao: "REQ-Sistemas Corporativos".into(),
            status_reprovado: "Reprovado".into(),
            percentil_inferior: 1.0,
            percentil_superior: 99.0,
            classes_histograma: 30,
        }
    }
}

impl DashboardConfig {
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let mut config: DashboardConfig = serde_json::from_str(json)?;
        config.sanitize();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Loads `path` when given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        match path {
            Some(p) => {
                let config = Self::from_file(p)?;
                log::info!("Configuração carregada de {}", p.display());
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    fn sanitize(&mut self) {
        let defaults = DashboardConfig::default();
        if self.top_n == 0 {
            self.top_n = defaults.top_n;
        }
        if self.classes_histograma == 0 {
            self.classes_histograma = defaults.classes_histograma;
        }
        if !(0.0..=100.0).contains(&self.percentil_inferior)
            || !(0.0..=100.0).contains(&self.percentil_superior)
            || self.percentil_inferior > self.percentil_superior
        {
            log::warn!(
                "Percentis inválidos ({}, {}), usando {} e {}",
                self.percentil_inferior,
                self.percentil_superior,
                defaults.percentil_inferior,
                defaults.percentil_superior
            );
            self.percentil_inferior = defaults.percentil_inferior;
            self.percentil_superior = defaults.percentil_superior;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = DashboardConfig::default();
        assert_eq!(c.cache_ttl_secs, 3600);
        assert_eq!(c.top_n, 10);
        assert_eq!(c.categoria_incidente, "INC-Sistemas Corporativos");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let c = DashboardConfig::from_json(r#"{"topN": 5, "chaveDesconhecida": 1}"#).unwrap();
        assert_eq!(c.top_n, 5);
        assert_eq!(c.classes_histograma, 30);
        assert_eq!(c.cache_ttl_secs, 3600);
        assert_eq!(c.status_reprovado, "Reprovado");
    }

    #[test]
    fn test_invalid_percentiles_reset() {
        let c = DashboardConfig::from_json(
            r#"{"percentilInferior": 90, "percentilSuperior": 10, "topN": 0}"#,
        )
        .unwrap();
        assert_eq!(c.percentil_inferior, 1.0);
        assert_eq!(c.percentil_superior, 99.0);
        assert_eq!(c.top_n, 10);
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(matches!(
            DashboardConfig::from_json("{not json"),
            Err(AppError::Serde(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"cacheTtlSecs": 60}"#).unwrap();
        let c = DashboardConfig::load(Some(&path)).unwrap();
        assert_eq!(c.cache_ttl_secs, 60);
        assert!(DashboardConfig::load(None).is_ok());
    }
}
