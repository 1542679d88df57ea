use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::domain::RawInitiativeMap;
use crate::fingerprint::input_fingerprint;
use crate::observability::metrics;
use crate::pipeline::processing::aggregate::{build_auxiliary, AuxiliaryData};
use crate::pipeline::processing::normalize::{CatalogBuild, DefaultNormalizer};
use crate::pipeline::processing::quality_gate::{DefaultValidator, ValidationReport};

/// Result of a complete pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    /// SHA-256 of the raw input, usable as a cache key
    pub input_fingerprint: String,
    pub build: CatalogBuild,
    pub auxiliary: AuxiliaryData,
    pub validation: ValidationReport,
}

/// Runs build, aggregate and validate over one raw initiative map.
///
/// Holds no mutable state; every call builds a fresh table.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: Config,
    normalizer: DefaultNormalizer,
    validator: DefaultValidator,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self {
            normalizer: DefaultNormalizer::with_config(config.catalog.clone()),
            validator: DefaultValidator::with_config(config.validation.clone(), config.catalog.clone()),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the canonical table and enriched metadata
    pub fn build(&self, raw: &RawInitiativeMap) -> CatalogBuild {
        self.normalizer.build_table(raw)
    }

    pub fn auxiliary(&self, build: &CatalogBuild) -> AuxiliaryData {
        build_auxiliary(&build.records, &self.config.aggregate)
    }

    pub fn validate(&self, build: &CatalogBuild) -> ValidationReport {
        self.validator.validate(&build.records, &build.metadata)
    }

    #[instrument(skip_all, fields(initiatives = raw.len()))]
    pub fn run(&self, raw: &RawInitiativeMap) -> PipelineResult {
        let started = std::time::Instant::now();
        let input_fingerprint = input_fingerprint(raw);

        let build = self.build(raw);
        if build.records.len() != raw.len() {
            warn!("Built {} records from {} raw entries", build.records.len(), raw.len());
        }
        let auxiliary = self.auxiliary(&build);
        let validation = self.validate(&build);

        let elapsed = started.elapsed().as_secs_f64();
        metrics::pipeline::run_duration(elapsed);
        info!(
            "Pipeline finished in {:.3}s: {} records, {} defaulted fields, validation {}",
            elapsed,
            build.records.len(),
            build.warnings.len(),
            if validation.summary.validation_passed { "passed" } else { "failed" }
        );

        PipelineResult {
            input_fingerprint,
            build,
            auxiliary,
            validation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_run_produces_every_output() {
        let raw = json!({
            "Alpha": {"acronym": "A", "overall_accuracy": 91, "spatial_resolution": 10, "available_years": [2019, 2021]},
            "Beta": {"acronym": "B", "overall_accuracy": {"status": "not_available"}, "spatial_resolution": "30m"}
        });
        let result = Pipeline::default().run(raw.as_object().unwrap());

        assert_eq!(result.build.records.len(), 2);
        assert_eq!(result.build.metadata.len(), 2);
        assert_eq!(result.auxiliary.comparison_matrix.len(), 2);
        assert_eq!(result.auxiliary.temporal_analysis.excluded, vec!["Beta".to_string()]);
        assert!(result.validation.summary.validation_passed);
        assert_eq!(result.input_fingerprint.len(), 64);
    }

    #[test]
    fn test_overflowing_accuracy_text_stays_finite_downstream() {
        let raw = json!({
            "Huge": {"overall_accuracy": "9".repeat(400), "spatial_resolution": 30},
            "Plain": {"overall_accuracy": 70, "spatial_resolution": 10}
        });
        let result = Pipeline::default().run(raw.as_object().unwrap());

        let huge = &result.build.records[0];
        assert!(huge.accuracy_defaulted);
        assert_eq!(huge.accuracy, 0.0);
        assert!(result
            .auxiliary
            .comparison_matrix
            .iter()
            .all(|row| (0.0..=1.0).contains(&row.accuracy_normalized)));
        assert!(result.validation.dataframe_valid);
    }

    #[test]
    fn test_run_on_empty_input_is_neutral() {
        let result = Pipeline::default().run(&RawInitiativeMap::new());
        assert!(result.build.records.is_empty());
        assert!(result.auxiliary.comparison_matrix.is_empty());
        assert!(!result.validation.dataframe_valid);
        assert!(!result.validation.metadata_valid);
    }

    #[test]
    fn test_legacy_tables_apply_through_config() {
        let pipeline = Pipeline::new(Config::default().with_legacy_tables());
        let raw = json!({"WorldCereal": {"available_years": [2020, 2021]}});
        let result = pipeline.run(raw.as_object().unwrap());

        let record = &result.build.records[0];
        assert_eq!(record.acronym, "WorldCereal");
        assert_eq!(record.available_years, vec![2021]);
        assert!(!result.validation.metadata_valid);
        assert!(result
            .validation
            .issues
            .contains(&"Temporal data mismatch for WorldCereal".to_string()));
    }
}
