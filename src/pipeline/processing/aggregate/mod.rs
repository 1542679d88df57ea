//! Auxiliary Aggregator: read-only projections of the canonical table for charting.
//!
//! Every function here is total. An empty table yields empty matrices and zeroed
//! statistics.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::constants::DEFAULT_COMPACT_KEY_LEN;
use crate::observability::metrics;
use crate::pipeline::processing::normalize::{CanonicalInitiativeRecord, TemporalSource};
use crate::pipeline::processing::temporal::{self, TemporalAnalysis};

pub mod bitmap;
pub mod comparison;
pub mod insights;
pub mod stats;

pub use bitmap::{bitmap_temporal, BitmapEntry, BitmapTemporal};
pub use comparison::{compact_key, compact_matrix, comparison_matrix, CompactMatrix, CompactMetrics, ComparisonRow};
pub use insights::{generate_insights, Insights, TrendDirection};
pub use stats::{describe, Distribution};

/// Tuning for the aggregator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    /// Characters kept from the acronym in compact outputs
    pub compact_key_len: usize,
    pub outlier_iqr_factor: f64,
    /// Average accuracy below which a recommendation is emitted
    pub low_accuracy_threshold: f64,
    /// Resolutions at or below this count as high resolution
    pub high_resolution_max_m: f64,
    /// Minimum share of high-resolution initiatives before a recommendation is emitted
    pub min_high_resolution_share: f64,
    /// Correlation magnitude separating a stable trend from a moving one
    pub trend_threshold: f64,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            compact_key_len: DEFAULT_COMPACT_KEY_LEN,
            outlier_iqr_factor: 1.5,
            low_accuracy_threshold: 80.0,
            high_resolution_max_m: 10.0,
            min_high_resolution_share: 0.3,
            trend_threshold: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpanSummary {
    pub avg_span: f64,
    pub max_span: i32,
    pub min_span: i32,
}

/// Distribution of the main metrics over the whole table
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub accuracy_distribution: Distribution,
    pub resolution_distribution: Distribution,
    /// Distinct provider types
    pub provider_diversity: usize,
    /// Distinct method categories
    pub methodology_diversity: usize,
    /// Over initiatives with real years only
    pub temporal_coverage: SpanSummary,
}

pub fn performance_metrics(records: &[CanonicalInitiativeRecord]) -> PerformanceMetrics {
    if records.is_empty() {
        return PerformanceMetrics::default();
    }

    let accuracy: Vec<f64> = records.iter().map(|r| r.accuracy).collect();
    let resolution: Vec<f64> = records.iter().map(|r| r.resolution).collect();
    let spans: Vec<i32> = records
        .iter()
        .filter(|r| !r.temporal_defaulted)
        .map(|r| r.temporal_span)
        .collect();

    let temporal_coverage = if spans.is_empty() {
        SpanSummary::default()
    } else {
        SpanSummary {
            avg_span: spans.iter().sum::<i32>() as f64 / spans.len() as f64,
            max_span: spans.iter().copied().max().unwrap_or(0),
            min_span: spans.iter().copied().min().unwrap_or(0),
        }
    };

    PerformanceMetrics {
        accuracy_distribution: describe(&accuracy),
        resolution_distribution: describe(&resolution),
        provider_diversity: records.iter().map(|r| r.provider_type).collect::<HashSet<_>>().len(),
        methodology_diversity: records.iter().map(|r| r.method_category).collect::<HashSet<_>>().len(),
        temporal_coverage,
    }
}

/// Radar chart axes, each on a 0-1 scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadarMetrics {
    pub accuracy: f64,
    /// Inverted and capped at 1000 m
    pub resolution: f64,
    /// Capped at 50 classes
    pub classes: f64,
    /// Capped at a 30 year span
    pub temporal: f64,
    pub overall: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarProfile {
    pub acronym: String,
    pub metrics: RadarMetrics,
}

pub fn radar_profiles(records: &[CanonicalInitiativeRecord], key_len: usize) -> Vec<RadarProfile> {
    records
        .iter()
        .map(|r| {
            let accuracy = r.accuracy / 100.0;
            let resolution = 1.0 - (r.resolution / 1000.0).min(1.0);
            let classes = (f64::from(r.classes) / 50.0).min(1.0);
            let temporal = if r.temporal_defaulted {
                0.0
            } else {
                (f64::from(r.temporal_span) / 30.0).min(1.0)
            };
            RadarProfile {
                acronym: compact_key(&r.acronym, key_len),
                metrics: RadarMetrics {
                    accuracy: round3(accuracy),
                    resolution: round3(resolution),
                    classes: round3(classes),
                    temporal: round3(temporal),
                    overall: round3((accuracy + resolution + classes + temporal) / 4.0),
                },
            }
        })
        .collect()
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataSummary {
    pub total_initiatives: usize,
    pub initiatives_with_temporal_data: usize,
    pub temporal_overrides_applied: usize,
    pub records_with_defaulted_fields: usize,
    /// Column names of the canonical table
    pub available_metrics: Vec<String>,
}

fn data_summary(records: &[CanonicalInitiativeRecord]) -> DataSummary {
    DataSummary {
        total_initiatives: records.len(),
        initiatives_with_temporal_data: records.iter().filter(|r| !r.temporal_defaulted).count(),
        temporal_overrides_applied: records
            .iter()
            .filter(|r| r.temporal_source == TemporalSource::Override)
            .count(),
        records_with_defaulted_fields: records
            .iter()
            .filter(|r| {
                r.accuracy_defaulted || r.resolution_defaulted || r.reference_system_defaulted || r.temporal_defaulted
            })
            .count(),
        available_metrics: column_names(records),
    }
}

fn column_names(records: &[CanonicalInitiativeRecord]) -> Vec<String> {
    let Some(first) = records.first() else {
        return Vec::new();
    };
    match serde_json::to_value(first) {
        Ok(serde_json::Value::Object(row)) => row.keys().cloned().collect(),
        _ => Vec::new(),
    }
}

/// Every derived product of the canonical table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuxiliaryData {
    pub comparison_matrix: Vec<ComparisonRow>,
    pub comparison_matrix_compact: CompactMatrix,
    pub temporal_analysis: TemporalAnalysis,
    pub temporal_bitmap: BitmapTemporal,
    pub insights: Insights,
    pub performance_metrics: PerformanceMetrics,
    pub radar_profiles: Vec<RadarProfile>,
    pub data_summary: DataSummary,
    pub generation_timestamp: DateTime<Utc>,
}

pub fn build_auxiliary(records: &[CanonicalInitiativeRecord], config: &AggregateConfig) -> AuxiliaryData {
    let (series, excluded) = temporal::series_from_records(records);
    if !excluded.is_empty() {
        metrics::aggregate::initiatives_excluded(excluded.len());
        info!("{} initiatives without parsable years left out of temporal products", excluded.len());
    }

    let data = AuxiliaryData {
        comparison_matrix: comparison_matrix(records),
        comparison_matrix_compact: compact_matrix(records, config.compact_key_len),
        temporal_bitmap: bitmap_temporal(&series, config.compact_key_len),
        temporal_analysis: temporal::analyze_series(&series, excluded),
        insights: generate_insights(records, config),
        performance_metrics: performance_metrics(records),
        radar_profiles: radar_profiles(records, config.compact_key_len),
        data_summary: data_summary(records),
        generation_timestamp: Utc::now(),
    };

    for product in [
        "comparison_matrix",
        "comparison_matrix_compact",
        "temporal_analysis",
        "temporal_bitmap",
        "insights",
        "performance_metrics",
        "radar_profiles",
    ] {
        metrics::aggregate::product_built(product);
    }
    info!("Generated auxiliary data for {} initiatives", data.data_summary.total_initiatives);

    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::normalize::{DefaultNormalizer, Normalizer};
    use serde_json::json;

    fn records() -> Vec<CanonicalInitiativeRecord> {
        let normalizer = DefaultNormalizer::new();
        vec![
            normalizer
                .normalize(
                    "Alpha Map",
                    &json!({
                        "acronym": "ALPHA",
                        "provider": "ESA",
                        "classification_method": "Random Forest",
                        "overall_accuracy": 85,
                        "spatial_resolution": 10,
                        "number_of_classes": 25,
                        "available_years": [2000, 2001, 2005]
                    }),
                )
                .record,
            normalizer
                .normalize(
                    "Beta Map",
                    &json!({
                        "acronym": "BETA",
                        "provider": "IBGE",
                        "classification_method": "Visual interpretation",
                        "overall_accuracy": 75,
                        "spatial_resolution": 250,
                        "number_of_classes": 100
                    }),
                )
                .record,
        ]
    }

    #[test]
    fn test_radar_profile_caps() {
        let profiles = radar_profiles(&records(), 10);
        assert_eq!(profiles[0].acronym, "ALPHA");
        assert_eq!(profiles[0].metrics.accuracy, 0.85);
        assert_eq!(profiles[0].metrics.resolution, 0.99);
        assert_eq!(profiles[0].metrics.classes, 0.5);
        assert_eq!(profiles[0].metrics.temporal, 0.2);
        assert_eq!(profiles[1].metrics.classes, 1.0);
        // no real years
        assert_eq!(profiles[1].metrics.temporal, 0.0);
    }

    #[test]
    fn test_performance_metrics() {
        let metrics = performance_metrics(&records());
        assert_eq!(metrics.accuracy_distribution.count, 2);
        assert_eq!(metrics.accuracy_distribution.mean, 80.0);
        assert_eq!(metrics.provider_diversity, 2);
        assert_eq!(metrics.methodology_diversity, 2);
        assert_eq!(metrics.temporal_coverage.max_span, 6);
        assert_eq!(metrics.temporal_coverage.min_span, 6);
        assert_eq!(performance_metrics(&[]), PerformanceMetrics::default());
    }

    #[test]
    fn test_auxiliary_bundle_excludes_undated_initiatives() {
        let data = build_auxiliary(&records(), &AggregateConfig::default());

        assert_eq!(data.comparison_matrix.len(), 2);
        assert_eq!(data.temporal_analysis.excluded, vec!["Beta Map".to_string()]);
        assert_eq!(data.temporal_bitmap.temporal_data.len(), 1);
        assert_eq!(data.temporal_bitmap.time_range, Some([2000, 2005]));
        assert_eq!(data.data_summary.total_initiatives, 2);
        assert_eq!(data.data_summary.initiatives_with_temporal_data, 1);
        assert_eq!(data.data_summary.records_with_defaulted_fields, 2);
        assert!(data.data_summary.available_metrics.contains(&"Accuracy (%)".to_string()));
    }

    #[test]
    fn test_auxiliary_bundle_on_empty_table() {
        let data = build_auxiliary(&[], &AggregateConfig::default());
        assert!(data.comparison_matrix.is_empty());
        assert!(data.radar_profiles.is_empty());
        assert_eq!(data.temporal_bitmap.time_range, None);
        assert_eq!(data.temporal_analysis.total_period, None);
        assert!(data.insights.recommendations.is_empty());
        assert_eq!(data.data_summary, DataSummary::default());
    }
}
