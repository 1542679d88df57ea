use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{CatalogError, Result};
use crate::pipeline::processing::aggregate::AggregateConfig;
use crate::pipeline::processing::normalize::CatalogConfig;
use crate::pipeline::processing::quality_gate::ValidationConfig;

/// Configuration for a pipeline run, read from TOML.
///
/// Every section is optional and falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub aggregate: AggregateConfig,
    pub validation: ValidationConfig,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| CatalogError::Config(format!("Failed to read config file '{}': {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.check()?;
        Ok(config)
    }

    /// Add the legacy acronym and temporal tables, keeping entries already configured
    pub fn with_legacy_tables(mut self) -> Self {
        let legacy = CatalogConfig::legacy_tables();
        for (name, acronym) in legacy.acronyms {
            self.catalog.acronyms.entry(name).or_insert(acronym);
        }
        for (name, years) in legacy.temporal_overrides {
            self.catalog.temporal_overrides.entry(name).or_insert(years);
        }
        self
    }

    fn check(&self) -> Result<()> {
        if self.aggregate.compact_key_len == 0 {
            return Err(CatalogError::Config("aggregate.compact_key_len must be positive".to_string()));
        }
        if self.catalog.acronym_fallback_len == 0 {
            return Err(CatalogError::Config("catalog.acronym_fallback_len must be positive".to_string()));
        }
        if self.catalog.min_year > self.catalog.max_year {
            return Err(CatalogError::Config(format!(
                "catalog.min_year ({}) exceeds catalog.max_year ({})",
                self.catalog.min_year, self.catalog.max_year
            )));
        }
        if self.validation.min_accuracy > self.validation.max_accuracy {
            return Err(CatalogError::Config(format!(
                "validation.min_accuracy ({}) exceeds validation.max_accuracy ({})",
                self.validation.min_accuracy, self.validation.max_accuracy
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::normalize::OverridePolicy;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.catalog.acronym_fallback_len, 8);
        assert_eq!(config.aggregate.compact_key_len, 10);
        assert_eq!(config.validation.max_accuracy, 100.0);
    }

    #[test]
    fn test_sections_override_defaults() {
        let config = Config::from_toml_str(
            r#"
            [catalog]
            override_policy = "record_wins"
            acronym_fallback_len = 5

            [catalog.acronyms]
            "Dynamic World (GDW)" = "DW"

            [catalog.temporal_overrides]
            "WorldCereal" = [2021, 2022]

            [aggregate]
            outlier_iqr_factor = 3.0

            [validation]
            max_accuracy = 99.0
            "#,
        )
        .unwrap();

        assert_eq!(config.catalog.override_policy, OverridePolicy::RecordWins);
        assert_eq!(config.catalog.acronym_fallback_len, 5);
        assert_eq!(config.catalog.acronyms["Dynamic World (GDW)"], "DW");
        assert_eq!(config.catalog.temporal_overrides["WorldCereal"], vec![2021, 2022]);
        assert_eq!(config.aggregate.outlier_iqr_factor, 3.0);
        assert_eq!(config.aggregate.compact_key_len, 10);
        assert_eq!(config.validation.max_accuracy, 99.0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(matches!(
            Config::from_toml_str("[aggregate]\ncompact_key_len = 0"),
            Err(CatalogError::Config(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[catalog]\nacronym_fallback_len = 0"),
            Err(CatalogError::Config(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[catalog]\nmin_year = 2050\nmax_year = 2000"),
            Err(CatalogError::Config(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[catalog]\noverride_policy = \"newest\""),
            Err(CatalogError::Toml(_))
        ));
    }

    #[test]
    fn test_legacy_tables_keep_configured_entries() {
        let config = Config::from_toml_str("[catalog.acronyms]\n\"Dynamic World (GDW)\" = \"DW\"")
            .unwrap()
            .with_legacy_tables();
        assert_eq!(config.catalog.acronyms["Dynamic World (GDW)"], "DW");
        assert_eq!(config.catalog.acronyms["MODIS Land Cover"], "MODIS");
        assert_eq!(config.catalog.temporal_overrides["WorldCereal"], vec![2021]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[validation]\nmin_resolution = 1.0").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.validation.min_resolution, 1.0);

        assert!(matches!(
            Config::load("/nonexistent/lulc_catalog.toml"),
            Err(CatalogError::Config(_))
        ));
    }
}
