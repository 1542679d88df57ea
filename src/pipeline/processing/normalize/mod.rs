use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::domain::{years_field, RawInitiative, RawInitiativeMap, SchemaVersion, YearsValue};
use crate::observability::metrics;
use crate::pipeline::processing::categorize::{
    categorize_accuracy, categorize_coverage, categorize_methodology, categorize_provider,
    categorize_resolution, standardize_methodology, AccuracyTier, CoverageScope, MethodCategory,
    MethodologyFamily, ProviderType, ResolutionTier,
};
use crate::pipeline::processing::parser::{
    canonical_accuracy, canonical_reference_system, canonical_resolution, canonical_temporal_in,
    canonical_years_in, DefaultReason, DefaultedWarning, FieldKind, FieldResult, TemporalInterval,
};

/// One row of the canonical analytic table.
///
/// Serialized field names are the stable column names plotting layers key on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalInitiativeRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Acronym")]
    pub acronym: String,
    #[serde(rename = "Type")]
    pub coverage_type: CoverageScope,
    /// Coverage text as authored
    #[serde(rename = "Scope")]
    pub scope: String,
    #[serde(rename = "Provider")]
    pub provider: String,
    #[serde(rename = "Provider Type")]
    pub provider_type: ProviderType,
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Resolution (m)")]
    pub resolution: f64,
    #[serde(rename = "Resolution Category")]
    pub resolution_category: ResolutionTier,
    #[serde(rename = "Reference System")]
    pub reference_system: String,
    #[serde(rename = "Accuracy (%)")]
    pub accuracy: f64,
    #[serde(rename = "Accuracy Category")]
    pub accuracy_category: AccuracyTier,
    #[serde(rename = "Classes")]
    pub classes: u32,
    /// Free-text methodology description
    #[serde(rename = "Algorithm")]
    pub algorithm: String,
    #[serde(rename = "Methodology")]
    pub methodology: MethodologyFamily,
    #[serde(rename = "Classification Method")]
    pub classification_method: String,
    #[serde(rename = "Method Category")]
    pub method_category: MethodCategory,
    #[serde(rename = "Temporal Frequency")]
    pub temporal_frequency: String,
    #[serde(rename = "Update Frequency")]
    pub update_frequency: String,
    #[serde(rename = "Start Year")]
    pub start_year: i32,
    #[serde(rename = "End Year")]
    pub end_year: i32,
    #[serde(rename = "Temporal Span")]
    pub temporal_span: i32,
    #[serde(rename = "Total Years")]
    pub total_years: usize,
    #[serde(rename = "Available Years")]
    pub available_years: Vec<i32>,
    #[serde(rename = "Temporal Gaps")]
    pub temporal_gaps: Vec<i32>,
    #[serde(rename = "Resolution Score")]
    pub resolution_score: f64,
    #[serde(rename = "Overall Score")]
    pub overall_score: f64,
    #[serde(rename = "Schema Version")]
    pub schema_version: SchemaVersion,
    #[serde(rename = "Temporal Source")]
    pub temporal_source: TemporalSource,
    #[serde(rename = "Accuracy Defaulted")]
    pub accuracy_defaulted: bool,
    #[serde(rename = "Resolution Defaulted")]
    pub resolution_defaulted: bool,
    #[serde(rename = "Reference System Defaulted")]
    pub reference_system_defaulted: bool,
    /// The temporal fields are the degenerate placeholder, not real coverage
    #[serde(rename = "Temporal Defaulted")]
    pub temporal_defaulted: bool,
}

impl CanonicalInitiativeRecord {
    pub fn interval(&self) -> TemporalInterval {
        TemporalInterval {
            start_year: self.start_year,
            end_year: self.end_year,
            temporal_span: self.temporal_span,
            total_years: self.total_years,
            available_years: self.available_years.clone(),
            temporal_gaps: self.temporal_gaps.clone(),
        }
    }
}

/// `1000 / (1 + resolution / 10)`: finer resolution scores higher
pub fn resolution_score(resolution_m: f64) -> f64 {
    1000.0 / (1.0 + resolution_m / 10.0)
}

pub fn overall_score(accuracy: f64, resolution_m: f64) -> f64 {
    (accuracy + resolution_score(resolution_m)) / 2.0
}

/// Where an initiative's years came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalSource {
    /// The configured legacy override table
    Override,
    /// The record's own `available_years`
    Record,
    /// Neither had a valid year
    Default,
}

/// Precedence between the legacy override table and a record's own years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverridePolicy {
    /// An override entry always replaces the record's years
    #[default]
    OverrideWins,
    /// The record's years are used whenever they parse; the override fills in otherwise
    RecordWins,
}

/// Lookup tables injected into the record builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Initiative name to acronym, used when a record has no `acronym`
    pub acronyms: BTreeMap<String, String>,
    /// Initiative name to available years, kept for legacy compatibility
    pub temporal_overrides: BTreeMap<String, Vec<i32>>,
    /// Characters of the name used as acronym when neither source has one
    pub acronym_fallback_len: usize,
    pub override_policy: OverridePolicy,
    /// Earliest year accepted from any source
    pub min_year: i32,
    /// Latest year accepted from any source
    pub max_year: i32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            acronyms: BTreeMap::new(),
            temporal_overrides: BTreeMap::new(),
            acronym_fallback_len: crate::constants::DEFAULT_ACRONYM_FALLBACK_LEN,
            override_policy: OverridePolicy::default(),
            min_year: crate::constants::MIN_PLAUSIBLE_YEAR,
            max_year: crate::constants::MAX_PLAUSIBLE_YEAR,
        }
    }
}

impl CatalogConfig {
    /// The acronym and temporal tables the legacy dashboard shipped with
    pub fn legacy_tables() -> Self {
        let acronyms = [
            ("Copernicus Global Land Cover Service (CGLS)", "CGLS"),
            ("Dynamic World (GDW)", "GDW"),
            ("ESRI-10m Annual LULC", "ESRI"),
            ("FROM-GLC", "FROM-GLC"),
            ("Global LULC change 2000 and 2020", "GLULC"),
            ("Global Pasture Watch (GPW)", "GPW"),
            ("South America Soybean Maps", "SASM"),
            ("WorldCover 10m 2021", "WorldCover"),
            ("WorldCereal", "WorldCereal"),
            ("Land Cover CCI", "CCI"),
            ("MODIS Land Cover", "MODIS"),
            ("GLC_FCS30", "GLC_FCS30"),
            ("MapBiomas Brasil", "MapBiomas"),
            ("PRODES Amazônia", "PRODES-AMZ"),
            ("DETER Amazônia", "DETER"),
            ("PRODES Cerrado", "PRODES-CER"),
            ("TerraClass Amazônia", "TerraClass"),
            ("IBGE Monitoramento", "IBGE"),
            ("IBGE Monitoring", "IBGE"),
            ("Agricultural Mapping", "AgriMap"),
        ]
        .into_iter()
        .map(|(name, acronym)| (name.to_string(), acronym.to_string()))
        .collect();

        let every_other = |start: i32, end: i32| (start..end).step_by(2).collect::<Vec<_>>();
        let temporal_overrides = [
            ("Copernicus Global Land Cover Service (CGLS)", (2015..=2019).collect()),
            ("Dynamic World (GDW)", (2017..2025).collect()),
            ("ESRI-10m Annual LULC", (2017..2025).collect()),
            ("FROM-GLC", vec![2010, 2015, 2017]),
            ("Global LULC change 2000 and 2020", vec![2000, 2005, 2010, 2015, 2020]),
            ("Global Pasture Watch (GPW)", every_other(2000, 2023)),
            ("South America Soybean Maps", (2001..2024).collect()),
            ("WorldCover 10m 2021", vec![2020, 2021]),
            ("WorldCereal", vec![2021]),
            ("Land Cover CCI", (1992..2021).collect()),
            ("MODIS Land Cover", (2001..2024).collect()),
            ("GLC_FCS30", vec![2020]),
            ("MapBiomas Brasil", (1985..2024).collect()),
            ("PRODES Amazônia", (2000..2024).collect()),
            ("DETER Amazônia", (2012..2024).collect()),
            ("PRODES Cerrado", vec![2018, 2020, 2022]),
            ("TerraClass Amazônia", every_other(2008, 2021)),
            ("IBGE Monitoramento", every_other(2000, 2021)),
            ("IBGE Monitoring", every_other(2000, 2021)),
            ("Agricultural Mapping", (2018..2024).collect()),
        ]
        .into_iter()
        .map(|(name, years)| (name.to_string(), years))
        .collect();

        Self {
            acronyms,
            temporal_overrides,
            ..Self::default()
        }
    }

    /// Resolve the display acronym for an initiative
    pub fn acronym_for(&self, name: &str, declared: Option<&str>) -> String {
        if let Some(acronym) = declared {
            return acronym.to_string();
        }
        if let Some(acronym) = self.acronyms.get(name) {
            return acronym.clone();
        }
        name.chars().take(self.acronym_fallback_len).collect()
    }

    pub fn year_window(&self) -> RangeInclusive<i32> {
        self.min_year..=self.max_year
    }

    pub fn override_for(&self, name: &str) -> Option<&[i32]> {
        self.temporal_overrides
            .get(name)
            .map(Vec::as_slice)
            .filter(|years| !years.is_empty())
    }
}

/// Enriched metadata: the raw map with canonical temporal fields merged in per initiative
pub type EnrichedMetadataMap = Map<String, Value>;

/// A field that fell back to its default while building one initiative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldWarning {
    pub initiative: String,
    pub field: FieldKind,
    pub reason: DefaultReason,
    pub message: String,
}

/// Output of normalizing one raw record
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedInitiative {
    pub record: CanonicalInitiativeRecord,
    pub enriched: Map<String, Value>,
    pub warnings: Vec<FieldWarning>,
}

/// Output of normalizing a whole raw map
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CatalogBuild {
    pub records: Vec<CanonicalInitiativeRecord>,
    pub metadata: EnrichedMetadataMap,
    pub warnings: Vec<FieldWarning>,
}

/// Trait for turning one raw initiative record into its canonical form.
/// Implementations never fail: unreadable fields fall back to documented defaults.
pub trait Normalizer {
    fn normalize(&self, name: &str, raw: &Value) -> NormalizedInitiative;
}

/// Record builder driven by a [`CatalogConfig`]
#[derive(Debug, Clone, Default)]
pub struct DefaultNormalizer {
    pub config: CatalogConfig,
}

impl DefaultNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CatalogConfig) -> Self {
        Self { config }
    }

    /// Normalize every initiative of a raw map, in input order.
    /// The output always has one record per input entry.
    pub fn build_table(&self, raw: &RawInitiativeMap) -> CatalogBuild {
        let mut build = CatalogBuild::default();

        for (name, value) in raw {
            let normalized = self.normalize(name, value);
            build.metadata.insert(name.clone(), Value::Object(normalized.enriched));
            build.records.push(normalized.record);
            build.warnings.extend(normalized.warnings);
        }

        metrics::normalize::batch_processed(build.records.len(), build.warnings.len());
        info!(
            "Built canonical table: {} initiatives, {} defaulted fields",
            build.records.len(),
            build.warnings.len()
        );
        build
    }

    /// Pick the years for an initiative according to the override policy
    fn select_years(&self, name: &str, own: &YearsValue) -> (FieldResult<TemporalInterval>, TemporalSource) {
        let window = self.config.year_window();
        let own_result = canonical_temporal_in(own, &window);
        let override_years = self.config.override_for(name);

        match (self.config.override_policy, override_years) {
            (OverridePolicy::OverrideWins, Some(years)) => {
                (canonical_temporal_in(&YearsValue::from(years), &window), TemporalSource::Override)
            }
            (OverridePolicy::RecordWins, Some(years)) if own_result.is_err() => {
                (canonical_temporal_in(&YearsValue::from(years), &window), TemporalSource::Override)
            }
            _ if own_result.is_ok() => (own_result, TemporalSource::Record),
            _ => (own_result, TemporalSource::Default),
        }
    }
}

impl Normalizer for DefaultNormalizer {
    fn normalize(&self, name: &str, raw: &Value) -> NormalizedInitiative {
        let initiative = RawInitiative::from_json(raw);
        let mut warnings = Vec::new();

        let accuracy = track(name, canonical_accuracy(&initiative.accuracy), &mut warnings);
        let resolution = track(name, canonical_resolution(&initiative.spatial_resolution), &mut warnings);
        let reference_system = track(name, canonical_reference_system(&initiative.reference_system), &mut warnings);
        let (years_result, temporal_source) = self.select_years(name, &initiative.available_years);
        let temporal = track(name, years_result, &mut warnings);

        let acronym = self.config.acronym_for(name, initiative.acronym.as_deref());
        let coverage = initiative.coverage.clone().unwrap_or_else(|| "Regional".to_string());
        let provider = initiative.provider.clone().unwrap_or_default();
        let classification_method = initiative.classification_method.clone().unwrap_or_default();

        let record = CanonicalInitiativeRecord {
            name: name.to_string(),
            acronym: acronym.clone(),
            coverage_type: categorize_coverage(&coverage),
            scope: coverage,
            provider_type: categorize_provider(&provider),
            provider,
            source: initiative.source.clone().unwrap_or_default(),
            resolution: resolution.value,
            resolution_category: categorize_resolution(resolution.value),
            reference_system: reference_system.value,
            accuracy: accuracy.value,
            accuracy_category: categorize_accuracy(accuracy.value),
            classes: resolve_classes(&initiative),
            algorithm: initiative.methodology.clone().unwrap_or_default(),
            methodology: standardize_methodology(&classification_method),
            method_category: categorize_methodology(&classification_method),
            classification_method,
            temporal_frequency: initiative.temporal_frequency.clone().unwrap_or_default(),
            update_frequency: initiative.update_frequency.clone().unwrap_or_default(),
            start_year: temporal.value.start_year,
            end_year: temporal.value.end_year,
            temporal_span: temporal.value.temporal_span,
            total_years: temporal.value.total_years,
            available_years: temporal.value.available_years.clone(),
            temporal_gaps: temporal.value.temporal_gaps.clone(),
            resolution_score: resolution_score(resolution.value),
            overall_score: overall_score(accuracy.value, resolution.value),
            schema_version: initiative.schema_version,
            temporal_source,
            accuracy_defaulted: accuracy.defaulted,
            resolution_defaulted: resolution.defaulted,
            reference_system_defaulted: reference_system.defaulted,
            temporal_defaulted: temporal.defaulted,
        };

        let mut enriched = raw.as_object().cloned().unwrap_or_default();
        if temporal_source == TemporalSource::Override {
            let own_years = raw.as_object().and_then(years_field).map(YearsValue::from);
            let declared = own_years
                .map(|years| canonical_years_in(&years, &self.config.year_window()))
                .unwrap_or_default();
            enriched.insert("declared_available_years".to_string(), Value::from(declared));
        }
        enriched.insert("acronym".to_string(), Value::from(acronym));
        enriched.insert("available_years".to_string(), Value::from(temporal.value.available_years));
        enriched.insert("start_year".to_string(), Value::from(temporal.value.start_year));
        enriched.insert("end_year".to_string(), Value::from(temporal.value.end_year));
        enriched.insert("temporal_span".to_string(), Value::from(temporal.value.temporal_span));
        enriched.insert("temporal_gaps".to_string(), Value::from(temporal.value.temporal_gaps));
        enriched.insert("temporal_defaulted".to_string(), Value::from(temporal.defaulted));

        metrics::normalize::record_built(initiative.schema_version.as_str());
        debug!(
            "Normalized '{}' ({} schema, {} defaulted fields)",
            name,
            initiative.schema_version.as_str(),
            warnings.len()
        );

        NormalizedInitiative {
            record,
            enriched,
            warnings,
        }
    }
}

/// Build the canonical table with a one-off normalizer
pub fn build_table(raw: &RawInitiativeMap, config: &CatalogConfig) -> CatalogBuild {
    DefaultNormalizer::with_config(config.clone()).build_table(raw)
}

struct Tracked<T> {
    value: T,
    defaulted: bool,
}

/// Unwrap a field result, recording a warning when it fell back to its default
fn track<T: std::fmt::Debug>(
    initiative: &str,
    result: FieldResult<T>,
    warnings: &mut Vec<FieldWarning>,
) -> Tracked<T> {
    match result {
        Ok(value) => Tracked { value, defaulted: false },
        Err(warning) => {
            let DefaultedWarning { field, reason, .. } = warning;
            debug!("'{}': {}", initiative, warning);
            metrics::normalize::field_defaulted(field.as_str(), reason.as_str());
            warnings.push(FieldWarning {
                initiative: initiative.to_string(),
                field,
                reason,
                message: warning.to_string(),
            });
            Tracked {
                value: warning.fallback,
                defaulted: true,
            }
        }
    }
}

/// `number_of_classes`, or the largest product class count when it is absent or 1
fn resolve_classes(initiative: &RawInitiative) -> u32 {
    let declared = initiative.number_of_classes.unwrap_or(1);
    let resolved = if declared == 1 {
        initiative
            .detailed_products
            .as_ref()
            .and_then(|products| products.iter().copied().max())
            .unwrap_or(declared)
    } else {
        declared
    };
    resolved.max(1)
}
