//! Categorizers: map canonical scalars and free text onto fixed buckets.
//!
//! Text matching is case-insensitive substring search against keyword lists, checked
//! in declaration order. Every categorizer has a default bucket.

use std::fmt;

use serde::{Deserialize, Serialize};

const SPACE_AGENCY_TERMS: &[&str] = &["space", "esa", "copernicus", "nasa", "inpe"];
const UNIVERSITY_TERMS: &[&str] = &["university", "umd", "maryland"];
const TECH_COMPANY_TERMS: &[&str] = &["google", "microsoft", "esri"];
const GOVERNMENT_TERMS: &[&str] = &["government", "institute", "ibge", "conab", "embrapa"];
const NGO_TERMS: &[&str] = &["ngo", "organization"];

const DEEP_LEARNING_TERMS: &[&str] = &["deep learning", "neural network", "cnn", "u-net"];
const MACHINE_LEARNING_TERMS: &[&str] = &["machine learning", "random forest", "gradient boost", "catboost"];
const VISUAL_TERMS: &[&str] = &["visual interpretation", "visual"];
const STATISTICAL_TERMS: &[&str] = &["statistical", "regression", "decision tree"];

const FAMILY_DEEP_LEARNING_TERMS: &[&str] = &["deep learning", "neural network", "u-net", "cnn", "convolutional"];
const FAMILY_MACHINE_LEARNING_TERMS: &[&str] =
    &["random forest", "gradient boost", "decision tree", "machine learning", "catboost"];
/// Terms that turn visual interpretation into a hybrid workflow
const HYBRID_WITH_VISUAL_TERMS: &[&str] = &[
    "machine learning",
    "spectral",
    "classification",
    "random forest",
    "deep learning",
    "bhattacharya",
];

fn contains_any(haystack: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| haystack.contains(term))
}

macro_rules! display_via_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

/// Kind of organization publishing an initiative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderType {
    #[serde(rename = "Space Agency")]
    SpaceAgency,
    University,
    #[serde(rename = "Tech Company")]
    TechCompany,
    Government,
    #[serde(rename = "NGO")]
    Ngo,
    Other,
}

impl ProviderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::SpaceAgency => "Space Agency",
            ProviderType::University => "University",
            ProviderType::TechCompany => "Tech Company",
            ProviderType::Government => "Government",
            ProviderType::Ngo => "NGO",
            ProviderType::Other => "Other",
        }
    }
}

pub fn categorize_provider(provider: &str) -> ProviderType {
    let provider = provider.to_lowercase();
    if contains_any(&provider, SPACE_AGENCY_TERMS) {
        ProviderType::SpaceAgency
    } else if contains_any(&provider, UNIVERSITY_TERMS) {
        ProviderType::University
    } else if contains_any(&provider, TECH_COMPANY_TERMS) {
        ProviderType::TechCompany
    } else if contains_any(&provider, GOVERNMENT_TERMS) {
        ProviderType::Government
    } else if contains_any(&provider, NGO_TERMS) {
        ProviderType::Ngo
    } else {
        ProviderType::Other
    }
}

/// Fine-grained classification technique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MethodCategory {
    #[serde(rename = "Deep Learning")]
    DeepLearning,
    #[serde(rename = "Machine Learning")]
    MachineLearning,
    #[serde(rename = "Visual Interpretation")]
    VisualInterpretation,
    #[serde(rename = "Statistical Methods")]
    StatisticalMethods,
    Combined,
}

impl MethodCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodCategory::DeepLearning => "Deep Learning",
            MethodCategory::MachineLearning => "Machine Learning",
            MethodCategory::VisualInterpretation => "Visual Interpretation",
            MethodCategory::StatisticalMethods => "Statistical Methods",
            MethodCategory::Combined => "Combined",
        }
    }
}

pub fn categorize_methodology(method: &str) -> MethodCategory {
    let method = method.to_lowercase();
    if contains_any(&method, DEEP_LEARNING_TERMS) {
        MethodCategory::DeepLearning
    } else if contains_any(&method, MACHINE_LEARNING_TERMS) {
        MethodCategory::MachineLearning
    } else if contains_any(&method, VISUAL_TERMS) {
        MethodCategory::VisualInterpretation
    } else if contains_any(&method, STATISTICAL_TERMS) {
        MethodCategory::StatisticalMethods
    } else {
        MethodCategory::Combined
    }
}

/// Broad methodology family used for charting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MethodologyFamily {
    #[serde(rename = "Deep Learning")]
    DeepLearning,
    #[serde(rename = "Machine Learning")]
    MachineLearning,
    Hybrid,
    #[serde(rename = "Visual Interpretation")]
    VisualInterpretation,
    /// No classification method given at all
    Unknown,
}

impl MethodologyFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodologyFamily::DeepLearning => "Deep Learning",
            MethodologyFamily::MachineLearning => "Machine Learning",
            MethodologyFamily::Hybrid => "Hybrid",
            MethodologyFamily::VisualInterpretation => "Visual Interpretation",
            MethodologyFamily::Unknown => "Unknown",
        }
    }
}

/// Standardize a classification method into a charting family.
///
/// Visual interpretation mixed with automated techniques is `Hybrid` and is checked
/// before the automated families. Unmatched text falls back to `Machine Learning`.
pub fn standardize_methodology(classification_method: &str) -> MethodologyFamily {
    let method = classification_method.trim().to_lowercase();
    if method.is_empty() {
        return MethodologyFamily::Unknown;
    }

    let visual = method.contains("visual interpretation");
    if visual && contains_any(&method, HYBRID_WITH_VISUAL_TERMS) {
        MethodologyFamily::Hybrid
    } else if contains_any(&method, FAMILY_DEEP_LEARNING_TERMS) {
        MethodologyFamily::DeepLearning
    } else if contains_any(&method, FAMILY_MACHINE_LEARNING_TERMS) {
        MethodologyFamily::MachineLearning
    } else if visual {
        MethodologyFamily::VisualInterpretation
    } else if method.contains("combined") || method.contains(',') {
        MethodologyFamily::Hybrid
    } else {
        MethodologyFamily::MachineLearning
    }
}

/// Geographic breadth of an initiative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoverageScope {
    Global,
    Continental,
    National,
    Regional,
}

impl CoverageScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoverageScope::Global => "Global",
            CoverageScope::Continental => "Continental",
            CoverageScope::National => "National",
            CoverageScope::Regional => "Regional",
        }
    }
}

/// Look up a coverage label; the Portuguese "Nacional" maps to `National`.
pub fn categorize_coverage(coverage: &str) -> CoverageScope {
    match coverage.trim().to_lowercase().as_str() {
        "global" => CoverageScope::Global,
        "continental" => CoverageScope::Continental,
        "national" | "nacional" => CoverageScope::National,
        _ => CoverageScope::Regional,
    }
}

/// Resolution tier; finer pixels rank higher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolutionTier {
    #[serde(rename = "Very High")]
    VeryHigh,
    High,
    Medium,
    Low,
}

impl ResolutionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionTier::VeryHigh => "Very High",
            ResolutionTier::High => "High",
            ResolutionTier::Medium => "Medium",
            ResolutionTier::Low => "Low",
        }
    }

    /// Short code used by the compact comparison matrix
    pub fn compact(&self) -> &'static str {
        match self {
            ResolutionTier::VeryHigh => "vh",
            ResolutionTier::High => "h",
            ResolutionTier::Medium => "m",
            ResolutionTier::Low => "l",
        }
    }
}

pub fn categorize_resolution(resolution_m: f64) -> ResolutionTier {
    if resolution_m <= 10.0 {
        ResolutionTier::VeryHigh
    } else if resolution_m <= 30.0 {
        ResolutionTier::High
    } else if resolution_m <= 100.0 {
        ResolutionTier::Medium
    } else {
        ResolutionTier::Low
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccuracyTier {
    Excellent,
    Good,
    Fair,
    Low,
}

impl AccuracyTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccuracyTier::Excellent => "Excellent",
            AccuracyTier::Good => "Good",
            AccuracyTier::Fair => "Fair",
            AccuracyTier::Low => "Low",
        }
    }

    pub fn compact(&self) -> &'static str {
        match self {
            AccuracyTier::Excellent => "exc",
            AccuracyTier::Good => "good",
            AccuracyTier::Fair => "fair",
            AccuracyTier::Low => "low",
        }
    }
}

pub fn categorize_accuracy(accuracy: f64) -> AccuracyTier {
    if accuracy >= 90.0 {
        AccuracyTier::Excellent
    } else if accuracy >= 80.0 {
        AccuracyTier::Good
    } else if accuracy >= 70.0 {
        AccuracyTier::Fair
    } else {
        AccuracyTier::Low
    }
}

display_via_as_str!(
    ProviderType,
    MethodCategory,
    MethodologyFamily,
    CoverageScope,
    ResolutionTier,
    AccuracyTier
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_buckets() {
        assert_eq!(categorize_provider("Copernicus / VITO"), ProviderType::SpaceAgency);
        assert_eq!(categorize_provider("INPE"), ProviderType::SpaceAgency);
        assert_eq!(categorize_provider("University of Maryland"), ProviderType::University);
        assert_eq!(categorize_provider("Google & World Resources"), ProviderType::TechCompany);
        assert_eq!(categorize_provider("IBGE"), ProviderType::Government);
        assert_eq!(categorize_provider("NGO network"), ProviderType::Ngo);
        assert_eq!(categorize_provider("MapBiomas"), ProviderType::Other);
        assert_eq!(categorize_provider(""), ProviderType::Other);
    }

    #[test]
    fn test_method_categories() {
        assert_eq!(categorize_methodology("U-Net segmentation"), MethodCategory::DeepLearning);
        assert_eq!(categorize_methodology("Random Forest"), MethodCategory::MachineLearning);
        assert_eq!(categorize_methodology("Visual interpretation"), MethodCategory::VisualInterpretation);
        assert_eq!(categorize_methodology("Decision tree"), MethodCategory::StatisticalMethods);
        assert_eq!(categorize_methodology("Mosaic of products"), MethodCategory::Combined);
    }

    #[test]
    fn test_standardize_methodology_precedence() {
        assert_eq!(
            standardize_methodology("Visual interpretation and spectral classification"),
            MethodologyFamily::Hybrid
        );
        assert_eq!(
            standardize_methodology("Visual interpretation, Random Forest"),
            MethodologyFamily::Hybrid
        );
        assert_eq!(standardize_methodology("Visual interpretation"), MethodologyFamily::VisualInterpretation);
        assert_eq!(standardize_methodology("Convolutional network"), MethodologyFamily::DeepLearning);
        assert_eq!(standardize_methodology("CatBoost"), MethodologyFamily::MachineLearning);
        assert_eq!(standardize_methodology("Combined"), MethodologyFamily::Hybrid);
        assert_eq!(standardize_methodology("thresholds, rules"), MethodologyFamily::Hybrid);
        assert_eq!(standardize_methodology("Object-based rules"), MethodologyFamily::MachineLearning);
        assert_eq!(standardize_methodology("   "), MethodologyFamily::Unknown);
    }

    #[test]
    fn test_coverage_lookup() {
        assert_eq!(categorize_coverage("Global"), CoverageScope::Global);
        assert_eq!(categorize_coverage("Nacional"), CoverageScope::National);
        assert_eq!(categorize_coverage("national"), CoverageScope::National);
        assert_eq!(categorize_coverage("Continental"), CoverageScope::Continental);
        assert_eq!(categorize_coverage("Amazon biome"), CoverageScope::Regional);
    }

    #[test]
    fn test_resolution_tiers_at_edges() {
        assert_eq!(categorize_resolution(10.0), ResolutionTier::VeryHigh);
        assert_eq!(categorize_resolution(10.5), ResolutionTier::High);
        assert_eq!(categorize_resolution(30.0), ResolutionTier::High);
        assert_eq!(categorize_resolution(100.0), ResolutionTier::Medium);
        assert_eq!(categorize_resolution(250.0), ResolutionTier::Low);
    }

    #[test]
    fn test_accuracy_tiers_at_edges() {
        assert_eq!(categorize_accuracy(90.0), AccuracyTier::Excellent);
        assert_eq!(categorize_accuracy(89.9), AccuracyTier::Good);
        assert_eq!(categorize_accuracy(80.0), AccuracyTier::Good);
        assert_eq!(categorize_accuracy(70.0), AccuracyTier::Fair);
        assert_eq!(categorize_accuracy(69.99), AccuracyTier::Low);
        assert_eq!(AccuracyTier::Excellent.to_string(), "Excellent");
    }
}
