use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::constants::{COL_ACCURACY, COL_RESOLUTION, REQUIRED_COLUMNS};
use crate::domain::{years_field, YearsValue};
use crate::observability::metrics;
use crate::pipeline::processing::normalize::{CanonicalInitiativeRecord, CatalogConfig, EnrichedMetadataMap};
use crate::pipeline::processing::parser::canonical_years_in;

/// Individual issue found while validating a build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityIssue {
    /// The type of quality issue
    pub issue_type: QualityIssueType,
    /// Severity level of the issue
    pub severity: QualitySeverity,
    /// Whether the issue concerns the table or the metadata map
    pub scope: IssueScope,
    /// Human-readable description of the issue
    pub description: String,
    /// Column or initiative that triggered this issue
    pub field: Option<String>,
}

/// Types of quality issues that can be detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityIssueType {
    /// Nothing to validate
    EmptyInput,
    /// Required column absent from every row
    MissingColumn,
    /// Null or absent values in a required column
    MissingData,
    /// Non-numeric value in a numeric column
    InvalidFormat,
    /// Data outside expected ranges
    OutOfRange,
    /// Legacy override disagrees with the record's own years
    TemporalInconsistency,
}

impl QualityIssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityIssueType::EmptyInput => "empty_input",
            QualityIssueType::MissingColumn => "missing_column",
            QualityIssueType::MissingData => "missing_data",
            QualityIssueType::InvalidFormat => "invalid_format",
            QualityIssueType::OutOfRange => "out_of_range",
            QualityIssueType::TemporalInconsistency => "temporal_inconsistency",
        }
    }
}

/// Severity levels for quality issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualitySeverity {
    /// Notable issue worth flagging; does not invalidate the build
    Warning,
    /// Invalidates the affected part of the build
    Error,
    /// Nothing usable at all
    Critical,
}

impl QualitySeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualitySeverity::Warning => "warning",
            QualitySeverity::Error => "error",
            QualitySeverity::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueScope {
    Table,
    Metadata,
}

/// Configuration for range checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Inclusive lower bound for accuracy
    pub min_accuracy: f64,
    /// Inclusive upper bound for accuracy
    pub max_accuracy: f64,
    /// Resolutions must be strictly greater than this
    pub min_resolution: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_accuracy: 0.0,
            max_accuracy: 100.0,
            min_resolution: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub total_issues: usize,
    pub dataframe_rows: usize,
    pub metadata_entries: usize,
    pub validation_passed: bool,
}

/// Outcome of validating a canonical table and its metadata map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub dataframe_valid: bool,
    pub metadata_valid: bool,
    /// One human-readable line per issue
    pub issues: Vec<String>,
    pub details: Vec<QualityIssue>,
    pub summary: ValidationSummary,
}

impl ValidationReport {
    fn from_issues(details: Vec<QualityIssue>, dataframe_rows: usize, metadata_entries: usize) -> Self {
        let invalidates = |scope: IssueScope| {
            details
                .iter()
                .any(|i| i.scope == scope && i.severity >= QualitySeverity::Error)
        };
        let dataframe_valid = !invalidates(IssueScope::Table);
        let metadata_valid = !invalidates(IssueScope::Metadata);

        Self {
            dataframe_valid,
            metadata_valid,
            issues: details.iter().map(|i| i.description.clone()).collect(),
            summary: ValidationSummary {
                total_issues: details.len(),
                dataframe_rows,
                metadata_entries,
                validation_passed: dataframe_valid && metadata_valid,
            },
            details,
        }
    }
}

/// Trait for validating a built table. Implementations never fail; every
/// violation is collected into the report.
pub trait Validator {
    /// Validate rows keyed by column name together with the enriched metadata map
    fn validate_rows(&self, rows: &[Map<String, Value>], metadata: &EnrichedMetadataMap) -> ValidationReport;
}

/// Validator with configurable ranges and the override table to cross-check
#[derive(Debug, Clone, Default)]
pub struct DefaultValidator {
    pub config: ValidationConfig,
    pub catalog: CatalogConfig,
}

impl DefaultValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ValidationConfig, catalog: CatalogConfig) -> Self {
        Self { config, catalog }
    }

    /// Validate typed canonical records
    pub fn validate(&self, records: &[CanonicalInitiativeRecord], metadata: &EnrichedMetadataMap) -> ValidationReport {
        let rows: Vec<Map<String, Value>> = records
            .iter()
            .filter_map(|r| match serde_json::to_value(r) {
                Ok(Value::Object(row)) => Some(row),
                _ => None,
            })
            .collect();
        self.report(&rows, Some(records), metadata)
    }

    /// Range checks read the typed records when given; serialized rows lose non-finite values.
    fn report(
        &self,
        rows: &[Map<String, Value>],
        records: Option<&[CanonicalInitiativeRecord]>,
        metadata: &EnrichedMetadataMap,
    ) -> ValidationReport {
        let mut details = self.table_issues(rows, records);
        details.extend(self.metadata_issues(metadata));

        for issue in &details {
            metrics::quality_gate::issue_detected(issue.issue_type.as_str(), issue.severity.as_str());
        }

        let report = ValidationReport::from_issues(details, rows.len(), metadata.len());
        metrics::quality_gate::validation_completed(report.summary.validation_passed);

        if report.summary.validation_passed {
            info!("Validation passed with {} issues", report.summary.total_issues);
        } else {
            warn!(
                "Validation failed: {} issues (table valid: {}, metadata valid: {})",
                report.summary.total_issues, report.dataframe_valid, report.metadata_valid
            );
        }
        report
    }

    fn table_issues(
        &self,
        rows: &[Map<String, Value>],
        records: Option<&[CanonicalInitiativeRecord]>,
    ) -> Vec<QualityIssue> {
        let mut issues = Vec::new();

        if rows.is_empty() {
            issues.push(table_issue(
                QualityIssueType::EmptyInput,
                QualitySeverity::Critical,
                "Canonical table is empty".to_string(),
                None,
            ));
            return issues;
        }

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|col| !rows.iter().any(|row| row.contains_key(*col)))
            .collect();
        if !missing.is_empty() {
            issues.push(table_issue(
                QualityIssueType::MissingColumn,
                QualitySeverity::Error,
                format!("Missing columns: {:?}", missing),
                None,
            ));
        }

        for col in REQUIRED_COLUMNS.iter().filter(|col| !missing.contains(*col)) {
            let nulls = rows
                .iter()
                .filter(|row| row.get(*col).map_or(true, Value::is_null))
                .count();
            if nulls > 0 {
                issues.push(table_issue(
                    QualityIssueType::MissingData,
                    QualitySeverity::Warning,
                    format!("Null values in {}: {}", col, nulls),
                    Some(col.to_string()),
                ));
            }
        }

        let accuracy = numeric_column(rows, COL_ACCURACY);
        let resolution = numeric_column(rows, COL_RESOLUTION);
        for (col, column) in [(COL_ACCURACY, &accuracy), (COL_RESOLUTION, &resolution)] {
            if column.non_numeric > 0 {
                issues.push(table_issue(
                    QualityIssueType::InvalidFormat,
                    QualitySeverity::Error,
                    format!("Non-numeric values in {}: {} rows", col, column.non_numeric),
                    Some(col.to_string()),
                ));
            }
        }

        let (accuracy_values, resolution_values): (Vec<f64>, Vec<f64>) = match records {
            Some(records) => (
                records.iter().map(|r| r.accuracy).collect(),
                records.iter().map(|r| r.resolution).collect(),
            ),
            None => (accuracy.values, resolution.values),
        };

        let invalid_accuracy = accuracy_values
            .iter()
            .filter(|&&a| !a.is_finite() || a < self.config.min_accuracy || a > self.config.max_accuracy)
            .count();
        if invalid_accuracy > 0 {
            issues.push(table_issue(
                QualityIssueType::OutOfRange,
                QualitySeverity::Error,
                format!("Invalid accuracy values: {} rows", invalid_accuracy),
                Some(COL_ACCURACY.to_string()),
            ));
        }

        let invalid_resolution = resolution_values
            .iter()
            .filter(|&&r| !r.is_finite() || r <= self.config.min_resolution)
            .count();
        if invalid_resolution > 0 {
            issues.push(table_issue(
                QualityIssueType::OutOfRange,
                QualitySeverity::Error,
                format!("Invalid resolution values: {} rows", invalid_resolution),
                Some(COL_RESOLUTION.to_string()),
            ));
        }

        issues
    }

    fn metadata_issues(&self, metadata: &EnrichedMetadataMap) -> Vec<QualityIssue> {
        if metadata.is_empty() {
            return vec![QualityIssue {
                issue_type: QualityIssueType::EmptyInput,
                severity: QualitySeverity::Critical,
                scope: IssueScope::Metadata,
                description: "Metadata is empty".to_string(),
                field: None,
            }];
        }

        metadata
            .iter()
            .filter_map(|(name, data)| {
                let override_years = self.catalog.override_for(name)?;
                let declared = declared_years(data, &self.catalog.year_window());
                if declared.is_empty() {
                    return None;
                }
                let mut expected = override_years.to_vec();
                expected.sort_unstable();
                expected.dedup();
                (declared != expected).then(|| QualityIssue {
                    issue_type: QualityIssueType::TemporalInconsistency,
                    severity: QualitySeverity::Error,
                    scope: IssueScope::Metadata,
                    description: format!("Temporal data mismatch for {}", name),
                    field: Some(name.clone()),
                })
            })
            .collect()
    }
}

impl Validator for DefaultValidator {
    fn validate_rows(&self, rows: &[Map<String, Value>], metadata: &EnrichedMetadataMap) -> ValidationReport {
        self.report(rows, None, metadata)
    }
}

/// Validate a build with the given ranges and override table
pub fn validate(
    records: &[CanonicalInitiativeRecord],
    metadata: &EnrichedMetadataMap,
    catalog: &CatalogConfig,
    config: &ValidationConfig,
) -> ValidationReport {
    DefaultValidator::with_config(config.clone(), catalog.clone()).validate(records, metadata)
}

fn table_issue(
    issue_type: QualityIssueType,
    severity: QualitySeverity,
    description: String,
    field: Option<String>,
) -> QualityIssue {
    QualityIssue {
        issue_type,
        severity,
        scope: IssueScope::Table,
        description,
        field,
    }
}

struct NumericColumn {
    values: Vec<f64>,
    non_numeric: usize,
}

fn numeric_column(rows: &[Map<String, Value>], col: &str) -> NumericColumn {
    let mut column = NumericColumn {
        values: Vec::new(),
        non_numeric: 0,
    };
    for value in rows.iter().filter_map(|row| row.get(col)) {
        match value {
            Value::Null => {}
            Value::Number(n) => column.values.extend(n.as_f64()),
            _ => column.non_numeric += 1,
        }
    }
    column
}

/// The years a metadata entry itself declares, before any override
fn declared_years(data: &Value, window: &RangeInclusive<i32>) -> Vec<i32> {
    let Some(obj) = data.as_object() else {
        return Vec::new();
    };
    obj.get("declared_available_years")
        .or_else(|| years_field(obj))
        .map(|v| canonical_years_in(&YearsValue::from(v), window))
        .unwrap_or_default()
}
