//! Advisory insights: top performers, correlations, outliers and recommendations.
//!
//! Recommendations are plain threshold rules and carry no guarantee.

use serde::{Deserialize, Serialize};

use super::comparison::compact_key;
use super::stats::{mean, pearson, quantile};
use super::AggregateConfig;
use crate::pipeline::processing::normalize::CanonicalInitiativeRecord;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TopPerformers {
    pub highest_accuracy: Option<String>,
    /// Smallest resolution in meters
    pub best_resolution: Option<String>,
    pub best_overall: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Stable,
    Declining,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub correlation: f64,
    pub trend: TrendDirection,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Trends {
    /// Start year against accuracy, over initiatives with real years
    pub accuracy_over_time: Option<Trend>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Correlations {
    pub accuracy_vs_resolution: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Outliers {
    pub high_accuracy: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Insights {
    pub top_performers: TopPerformers,
    pub trends: Trends,
    pub correlations: Correlations,
    pub outliers: Outliers,
    pub recommendations: Vec<String>,
}

pub fn generate_insights(records: &[CanonicalInitiativeRecord], config: &AggregateConfig) -> Insights {
    Insights {
        top_performers: top_performers(records, config.compact_key_len),
        trends: trends(records, config.trend_threshold),
        correlations: correlations(records),
        outliers: outliers(records, config),
        recommendations: recommendations(records, config),
    }
}

/// Leading initiative per metric; ties go to the first row
pub fn top_performers(records: &[CanonicalInitiativeRecord], key_len: usize) -> TopPerformers {
    let key = |r: &CanonicalInitiativeRecord| compact_key(&r.acronym, key_len);
    TopPerformers {
        highest_accuracy: first_best(records, |r| r.accuracy).map(key),
        best_resolution: first_best(records, |r| -r.resolution).map(key),
        best_overall: first_best(records, |r| r.overall_score).map(key),
    }
}

fn first_best<F>(records: &[CanonicalInitiativeRecord], score: F) -> Option<&CanonicalInitiativeRecord>
where
    F: Fn(&CanonicalInitiativeRecord) -> f64,
{
    records.iter().fold(None, |best, record| match best {
        Some(current) if score(record) <= score(current) => Some(current),
        _ => Some(record),
    })
}

pub fn trends(records: &[CanonicalInitiativeRecord], threshold: f64) -> Trends {
    let dated: Vec<&CanonicalInitiativeRecord> = records.iter().filter(|r| !r.temporal_defaulted).collect();
    if dated.is_empty() {
        return Trends::default();
    }

    let start_years: Vec<f64> = dated.iter().map(|r| f64::from(r.start_year)).collect();
    let accuracy: Vec<f64> = dated.iter().map(|r| r.accuracy).collect();
    let correlation = pearson(&start_years, &accuracy);

    let trend = if correlation > threshold {
        TrendDirection::Improving
    } else if correlation.abs() <= threshold {
        TrendDirection::Stable
    } else {
        TrendDirection::Declining
    };

    Trends {
        accuracy_over_time: Some(Trend { correlation, trend }),
    }
}

pub fn correlations(records: &[CanonicalInitiativeRecord]) -> Correlations {
    let accuracy: Vec<f64> = records.iter().map(|r| r.accuracy).collect();
    let resolution: Vec<f64> = records.iter().map(|r| r.resolution).collect();
    Correlations {
        accuracy_vs_resolution: pearson(&accuracy, &resolution),
    }
}

/// Initiatives whose accuracy exceeds `Q75 + factor * IQR`
pub fn outliers(records: &[CanonicalInitiativeRecord], config: &AggregateConfig) -> Outliers {
    let accuracy: Vec<f64> = records.iter().map(|r| r.accuracy).collect();
    let (Some(q25), Some(q75)) = (quantile(&accuracy, 0.25), quantile(&accuracy, 0.75)) else {
        return Outliers::default();
    };
    let upper_fence = q75 + config.outlier_iqr_factor * (q75 - q25);

    Outliers {
        high_accuracy: records
            .iter()
            .filter(|r| r.accuracy > upper_fence)
            .map(|r| compact_key(&r.acronym, config.compact_key_len))
            .collect(),
    }
}

pub fn recommendations(records: &[CanonicalInitiativeRecord], config: &AggregateConfig) -> Vec<String> {
    let mut recommendations = Vec::new();
    if records.is_empty() {
        return recommendations;
    }

    let accuracy: Vec<f64> = records.iter().map(|r| r.accuracy).collect();
    if mean(&accuracy).is_some_and(|avg| avg < config.low_accuracy_threshold) {
        recommendations.push("Consider focusing on high-accuracy initiatives for better results".to_string());
    }

    let high_resolution = records
        .iter()
        .filter(|r| r.resolution <= config.high_resolution_max_m)
        .count();
    if (high_resolution as f64) < records.len() as f64 * config.min_high_resolution_share {
        recommendations.push("More high-resolution initiatives needed for detailed analysis".to_string());
    }

    recommendations
}
