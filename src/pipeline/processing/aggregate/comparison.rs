use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::stats::mean;
use crate::pipeline::processing::categorize::{categorize_accuracy, categorize_resolution};
use crate::pipeline::processing::normalize::CanonicalInitiativeRecord;

/// One row of the normalized comparison matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    #[serde(rename = "Acronym")]
    pub acronym: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Accuracy (%)")]
    pub accuracy: f64,
    #[serde(rename = "Resolution (m)")]
    pub resolution: f64,
    #[serde(rename = "Classes")]
    pub classes: u32,
    #[serde(rename = "Accuracy (%)_normalized")]
    pub accuracy_normalized: f64,
    /// Inverted: the finest resolution scores 1.0
    #[serde(rename = "Resolution (m)_normalized")]
    pub resolution_normalized: f64,
    #[serde(rename = "Classes_normalized")]
    pub classes_normalized: f64,
    #[serde(rename = "Overall_Score")]
    pub overall_score: f64,
}

/// Min-max normalize a column to [0, 1].
///
/// A constant column has every row at the maximum, so every row gets 1.0
/// (0.0 when inverted).
pub fn min_max_normalize(values: &[f64], invert: bool) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    values
        .iter()
        .map(|v| {
            let norm = if range > 0.0 { (v - min) / range } else { 1.0 };
            if invert {
                1.0 - norm
            } else {
                norm
            }
        })
        .collect()
}

/// Normalize accuracy, resolution and classes across the whole table and average them
pub fn comparison_matrix(records: &[CanonicalInitiativeRecord]) -> Vec<ComparisonRow> {
    if records.is_empty() {
        return Vec::new();
    }

    let accuracy: Vec<f64> = records.iter().map(|r| r.accuracy).collect();
    let resolution: Vec<f64> = records.iter().map(|r| r.resolution).collect();
    let classes: Vec<f64> = records.iter().map(|r| f64::from(r.classes)).collect();

    let accuracy_norm = min_max_normalize(&accuracy, false);
    let resolution_norm = min_max_normalize(&resolution, true);
    let classes_norm = min_max_normalize(&classes, false);

    records
        .iter()
        .enumerate()
        .map(|(i, record)| ComparisonRow {
            acronym: record.acronym.clone(),
            name: record.name.clone(),
            accuracy: record.accuracy,
            resolution: record.resolution,
            classes: record.classes,
            accuracy_normalized: accuracy_norm[i],
            resolution_normalized: resolution_norm[i],
            classes_normalized: classes_norm[i],
            overall_score: (accuracy_norm[i] + resolution_norm[i] + classes_norm[i]) / 3.0,
        })
        .collect()
}

/// Truncate an acronym to at most `len` characters.
///
/// Lossy and not unique: two initiatives can share a key.
pub fn compact_key(acronym: &str, len: usize) -> String {
    acronym.chars().take(len).collect()
}

/// Low-footprint per-initiative metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactMetrics {
    pub acc: f64,
    pub res: f64,
    pub cls: u32,
    pub acc_cat: String,
    pub res_cat: String,
    /// The record's overall score
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompactStats {
    pub total: usize,
    /// Over positive accuracies only
    pub acc_range: [f64; 2],
    /// Over positive resolutions only
    pub res_range: [f64; 2],
    pub acc_avg: f64,
    pub res_avg: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompactMatrix {
    /// Keyed by truncated acronym; on collision the later row wins
    pub metrics: BTreeMap<String, CompactMetrics>,
    pub stats: CompactStats,
}

pub fn compact_matrix(records: &[CanonicalInitiativeRecord], key_len: usize) -> CompactMatrix {
    let mut metrics = BTreeMap::new();
    for record in records {
        metrics.insert(
            compact_key(&record.acronym, key_len),
            CompactMetrics {
                acc: record.accuracy,
                res: record.resolution,
                cls: record.classes,
                acc_cat: categorize_accuracy(record.accuracy).compact().to_string(),
                res_cat: categorize_resolution(record.resolution).compact().to_string(),
                score: record.overall_score,
            },
        );
    }

    let accuracies: Vec<f64> = metrics.values().map(|m| m.acc).filter(|&a| a > 0.0).collect();
    let resolutions: Vec<f64> = metrics.values().map(|m| m.res).filter(|&r| r > 0.0).collect();

    let stats = CompactStats {
        total: metrics.len(),
        acc_range: value_range(&accuracies),
        res_range: value_range(&resolutions),
        acc_avg: mean(&accuracies).unwrap_or(0.0),
        res_avg: mean(&resolutions).unwrap_or(0.0),
    };

    CompactMatrix { metrics, stats }
}

fn value_range(values: &[f64]) -> [f64; 2] {
    if values.is_empty() {
        return [0.0, 0.0];
    }
    [
        values.iter().copied().fold(f64::INFINITY, f64::min),
        values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::normalize::{DefaultNormalizer, Normalizer};
    use serde_json::json;

    fn record(name: &str, acronym: &str, accuracy: f64, resolution: f64, classes: u32) -> CanonicalInitiativeRecord {
        DefaultNormalizer::new()
            .normalize(
                name,
                &json!({
                    "acronym": acronym,
                    "overall_accuracy": accuracy,
                    "spatial_resolution": resolution,
                    "number_of_classes": classes
                }),
            )
            .record
    }

    #[test]
    fn test_normalized_columns_within_unit_range() {
        let rows = comparison_matrix(&[
            record("A", "A", 80.0, 10.0, 5),
            record("B", "B", 95.0, 30.0, 20),
            record("C", "C", 70.0, 250.0, 12),
        ]);

        for row in &rows {
            for v in [row.accuracy_normalized, row.resolution_normalized, row.classes_normalized] {
                assert!((0.0..=1.0).contains(&v));
            }
        }
        assert_eq!(rows[1].accuracy_normalized, 1.0);
        assert_eq!(rows[2].accuracy_normalized, 0.0);
        // coarsest resolution is worst
        assert_eq!(rows[2].resolution_normalized, 0.0);
        assert_eq!(rows[0].resolution_normalized, 1.0);
        assert_eq!(rows[1].classes_normalized, 1.0);
    }

    #[test]
    fn test_overall_score_is_mean_of_normalized() {
        let rows = comparison_matrix(&[record("A", "A", 80.0, 10.0, 5), record("B", "B", 90.0, 30.0, 10)]);
        assert!((rows[0].overall_score - (0.0 + 1.0 + 0.0) / 3.0).abs() < 1e-12);
        assert!((rows[1].overall_score - (1.0 + 0.0 + 1.0) / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_column() {
        let rows = comparison_matrix(&[record("A", "A", 80.0, 30.0, 5), record("B", "B", 80.0, 30.0, 5)]);
        assert!(rows.iter().all(|r| r.accuracy_normalized == 1.0));
        assert!(rows.iter().all(|r| r.resolution_normalized == 0.0));
    }

    #[test]
    fn test_empty_table() {
        assert!(comparison_matrix(&[]).is_empty());
        assert_eq!(compact_matrix(&[], 10), CompactMatrix::default());
    }

    #[test]
    fn test_compact_keys_truncate_and_collide() {
        let matrix = compact_matrix(
            &[
                record("First", "LONGACRONYM-1", 85.0, 10.0, 5),
                record("Second", "LONGACRONYM-2", 0.0, 30.0, 7),
            ],
            10,
        );
        assert_eq!(matrix.metrics.len(), 1);
        let kept = &matrix.metrics["LONGACRONY"];
        assert_eq!(kept.cls, 7);
        assert_eq!(kept.res_cat, "h");
        assert_eq!(kept.acc_cat, "low");
        assert_eq!(matrix.stats.total, 1);
        // zero accuracy is left out of the accuracy stats
        assert_eq!(matrix.stats.acc_range, [0.0, 0.0]);
        assert_eq!(matrix.stats.res_range, [30.0, 30.0]);
    }
}
