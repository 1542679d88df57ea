/// Column names of the canonical analytic table.
/// These are stable string keys consumed by plotting and reporting layers.
pub const COL_NAME: &str = "Name";
pub const COL_ACRONYM: &str = "Acronym";
pub const COL_TYPE: &str = "Type";
pub const COL_SCOPE: &str = "Scope";
pub const COL_PROVIDER: &str = "Provider";
pub const COL_PROVIDER_TYPE: &str = "Provider Type";
pub const COL_SOURCE: &str = "Source";
pub const COL_RESOLUTION: &str = "Resolution (m)";
pub const COL_RESOLUTION_CATEGORY: &str = "Resolution Category";
pub const COL_REFERENCE_SYSTEM: &str = "Reference System";
pub const COL_ACCURACY: &str = "Accuracy (%)";
pub const COL_ACCURACY_CATEGORY: &str = "Accuracy Category";
pub const COL_CLASSES: &str = "Classes";
pub const COL_ALGORITHM: &str = "Algorithm";
pub const COL_METHODOLOGY: &str = "Methodology";
pub const COL_CLASSIFICATION_METHOD: &str = "Classification Method";
pub const COL_METHOD_CATEGORY: &str = "Method Category";
pub const COL_TEMPORAL_FREQUENCY: &str = "Temporal Frequency";
pub const COL_UPDATE_FREQUENCY: &str = "Update Frequency";
pub const COL_START_YEAR: &str = "Start Year";
pub const COL_END_YEAR: &str = "End Year";
pub const COL_TEMPORAL_SPAN: &str = "Temporal Span";
pub const COL_TOTAL_YEARS: &str = "Total Years";
pub const COL_AVAILABLE_YEARS: &str = "Available Years";
pub const COL_TEMPORAL_GAPS: &str = "Temporal Gaps";
pub const COL_RESOLUTION_SCORE: &str = "Resolution Score";
pub const COL_OVERALL_SCORE: &str = "Overall Score";

/// Columns every table handed to the validator must carry.
pub const REQUIRED_COLUMNS: [&str; 5] = [COL_NAME, COL_ACRONYM, COL_TYPE, COL_RESOLUTION, COL_ACCURACY];

// Fallbacks used when a field cannot be canonicalized
pub const DEFAULT_ACCURACY: f64 = 0.0;
pub const DEFAULT_RESOLUTION_M: f64 = 30.0;
pub const DEFAULT_REFERENCE_SYSTEM: &str = "EPSG:4326";

// Degenerate temporal interval returned when no valid year is present.
// It is a placeholder, never real coverage.
pub const DEFAULT_START_YEAR: i32 = 2000;
pub const DEFAULT_END_YEAR: i32 = 2024;

// Year tokens outside this window are treated as typos and skipped
pub const MIN_PLAUSIBLE_YEAR: i32 = 1900;
pub const MAX_PLAUSIBLE_YEAR: i32 = 2100;

/// Legacy accuracy strings that mean "no value".
pub const ACCURACY_PLACEHOLDERS: [&str; 4] = ["Not informed", "Incomplete", "N/A", "Not available"];

/// Acronyms are derived from the first characters of the name when none is known.
pub const DEFAULT_ACRONYM_FALLBACK_LEN: usize = 8;

/// Keys in the compact matrix and the bitmap temporal matrix are truncated acronyms.
/// Truncation is lossy and may collide; the last row written wins.
pub const DEFAULT_COMPACT_KEY_LEN: usize = 10;
