//! Metrics for the catalog pipeline.
//!
//! Recording goes through the `metrics` facade; without an installed recorder every
//! call is a no-op, so library users pick their own exporter.

use std::fmt;

/// Enum representing all metric names used by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Source loading
    SourceLoadsSuccess,
    SourceLoadsError,
    SourceBytesRead,

    // Normalize metrics
    NormalizeRecordsBuilt,
    NormalizeFieldsDefaulted,
    NormalizeBatchesProcessed,
    NormalizeBatchSize,

    // Aggregate metrics
    AggregateProductsBuilt,
    AggregateExcludedInitiatives,

    // Quality Gate metrics
    QualityGateIssuesDetected,
    QualityGateValidationsPassed,
    QualityGateValidationsFailed,

    // Pipeline
    PipelineRunDuration,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::SourceLoadsSuccess => "lulc_source_loads_success_total",
            MetricName::SourceLoadsError => "lulc_source_loads_error_total",
            MetricName::SourceBytesRead => "lulc_source_bytes_read",

            MetricName::NormalizeRecordsBuilt => "lulc_normalize_records_built_total",
            MetricName::NormalizeFieldsDefaulted => "lulc_normalize_fields_defaulted_total",
            MetricName::NormalizeBatchesProcessed => "lulc_normalize_batches_processed_total",
            MetricName::NormalizeBatchSize => "lulc_normalize_batch_size",

            MetricName::AggregateProductsBuilt => "lulc_aggregate_products_built_total",
            MetricName::AggregateExcludedInitiatives => "lulc_aggregate_excluded_initiatives_total",

            MetricName::QualityGateIssuesDetected => "lulc_quality_gate_issues_detected_total",
            MetricName::QualityGateValidationsPassed => "lulc_quality_gate_validations_passed_total",
            MetricName::QualityGateValidationsFailed => "lulc_quality_gate_validations_failed_total",

            MetricName::PipelineRunDuration => "lulc_pipeline_run_duration_seconds",
        }
    }

    /// Get all metric names as an iterator
    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            SourceLoadsSuccess,
            SourceLoadsError,
            SourceBytesRead,
            NormalizeRecordsBuilt,
            NormalizeFieldsDefaulted,
            NormalizeBatchesProcessed,
            NormalizeBatchSize,
            AggregateProductsBuilt,
            AggregateExcludedInitiatives,
            QualityGateIssuesDetected,
            QualityGateValidationsPassed,
            QualityGateValidationsFailed,
            PipelineRunDuration,
        ]
        .into_iter()
    }

    /// Returns (phase, description, unit)
    pub fn metadata(&self) -> (&'static str, &'static str, Option<&'static str>) {
        match self {
            MetricName::SourceLoadsSuccess => ("source", "Metadata files loaded", None),
            MetricName::SourceLoadsError => ("source", "Metadata files that failed to load", None),
            MetricName::SourceBytesRead => ("source", "Size of loaded metadata files", Some("bytes")),

            MetricName::NormalizeRecordsBuilt => ("normalize", "Canonical records built by schema version", None),
            MetricName::NormalizeFieldsDefaulted => ("normalize", "Fields that fell back to a default", None),
            MetricName::NormalizeBatchesProcessed => ("normalize", "Raw maps normalized", None),
            MetricName::NormalizeBatchSize => ("normalize", "Initiatives per raw map", None),

            MetricName::AggregateProductsBuilt => ("aggregate", "Derived products built by kind", None),
            MetricName::AggregateExcludedInitiatives => {
                ("aggregate", "Initiatives left out of temporal products", None)
            }

            MetricName::QualityGateIssuesDetected => ("quality_gate", "Validation issues detected", None),
            MetricName::QualityGateValidationsPassed => ("quality_gate", "Validations that passed", None),
            MetricName::QualityGateValidationsFailed => ("quality_gate", "Validations that failed", None),

            MetricName::PipelineRunDuration => ("pipeline", "End-to-end pipeline duration", Some("s")),
        }
    }
}

// ============================================================================
// Source Loading Metrics
// ============================================================================

pub mod source {
    use super::MetricName;

    pub fn load_success(bytes: usize) {
        ::metrics::counter!(MetricName::SourceLoadsSuccess.as_str()).increment(1);
        ::metrics::histogram!(MetricName::SourceBytesRead.as_str()).record(bytes as f64);
    }

    pub fn load_error(error_type: &str) {
        ::metrics::counter!(MetricName::SourceLoadsError.as_str(), "error_type" => error_type.to_string())
            .increment(1);
    }
}

// ============================================================================
// Normalize Metrics
// ============================================================================

pub mod normalize {
    use super::MetricName;

    /// Record that a canonical record was built from a raw record of the given schema
    pub fn record_built(schema_version: &str) {
        ::metrics::counter!(
            MetricName::NormalizeRecordsBuilt.as_str(),
            "schema_version" => schema_version.to_string()
        )
        .increment(1);
    }

    /// Record that a field fell back to its default value
    pub fn field_defaulted(field: &str, reason: &str) {
        ::metrics::counter!(
            MetricName::NormalizeFieldsDefaulted.as_str(),
            "field" => field.to_string(),
            "reason" => reason.to_string()
        )
        .increment(1);
    }

    pub fn batch_processed(batch_size: usize, defaulted_fields: usize) {
        ::metrics::histogram!(MetricName::NormalizeBatchSize.as_str()).record(batch_size as f64);
        ::metrics::counter!(
            MetricName::NormalizeBatchesProcessed.as_str(),
            "with_defaults" => (defaulted_fields > 0).to_string()
        )
        .increment(1);
    }
}

// ============================================================================
// Aggregate Metrics
// ============================================================================

pub mod aggregate {
    use super::MetricName;

    pub fn product_built(product: &str) {
        ::metrics::counter!(MetricName::AggregateProductsBuilt.as_str(), "product" => product.to_string())
            .increment(1);
    }

    pub fn initiatives_excluded(count: usize) {
        ::metrics::counter!(MetricName::AggregateExcludedInitiatives.as_str()).increment(count as u64);
    }
}

// ============================================================================
// Quality Gate Metrics
// ============================================================================

pub mod quality_gate {
    use super::MetricName;

    pub fn issue_detected(issue_type: &str, severity: &str) {
        ::metrics::counter!(
            MetricName::QualityGateIssuesDetected.as_str(),
            "issue_type" => issue_type.to_string(),
            "severity" => severity.to_string()
        )
        .increment(1);
    }

    pub fn validation_completed(passed: bool) {
        let metric_name = if passed {
            MetricName::QualityGateValidationsPassed
        } else {
            MetricName::QualityGateValidationsFailed
        };
        ::metrics::counter!(metric_name.as_str()).increment(1);
    }
}

// ============================================================================
// Pipeline Metrics
// ============================================================================

pub mod pipeline {
    use super::MetricName;

    pub fn run_duration(secs: f64) {
        ::metrics::histogram!(MetricName::PipelineRunDuration.as_str()).record(secs);
    }
}
