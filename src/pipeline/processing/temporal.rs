//! Temporal coverage analysis across initiatives.
//!
//! Only initiatives with at least one parsable year take part in cross-initiative
//! statistics. Records that fell back to the degenerate interval are listed in
//! [`TemporalAnalysis::excluded`] instead of contributing synthetic years.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::pipeline::processing::normalize::CanonicalInitiativeRecord;
use crate::pipeline::processing::parser::TemporalInterval;

/// Largest number of consecutive missing years between two available years.
///
/// Zero for fewer than two distinct years.
pub fn largest_gap<I>(years: I) -> i32
where
    I: IntoIterator<Item = i32>,
{
    gap_runs(years).iter().map(|run| run.gap_size).max().unwrap_or(0)
}

/// A stretch of missing years between two available years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapRun {
    /// Last available year before the gap
    pub start_year: i32,
    /// First available year after the gap
    pub end_year: i32,
    pub gap_size: i32,
}

pub fn gap_runs<I>(years: I) -> Vec<GapRun>
where
    I: IntoIterator<Item = i32>,
{
    let years: Vec<i32> = years.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
    years
        .windows(2)
        .filter_map(|pair| {
            let gap_size = pair[1] - pair[0] - 1;
            (gap_size > 0).then_some(GapRun {
                start_year: pair[0],
                end_year: pair[1],
                gap_size,
            })
        })
        .collect()
}

/// Share of an initiative's own span that has data, in percent
pub fn coverage_percentage(interval: &TemporalInterval) -> f64 {
    interval.coverage_percentage()
}

/// The distinct years one initiative has data for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalSeries {
    pub name: String,
    pub acronym: String,
    /// Sorted, distinct, never empty
    pub years: Vec<i32>,
}

impl TemporalSeries {
    /// `None` when there is no year at all
    pub fn new(name: impl Into<String>, acronym: impl Into<String>, years: &[i32]) -> Option<Self> {
        let years: Vec<i32> = years.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        if years.is_empty() {
            return None;
        }
        Some(Self {
            name: name.into(),
            acronym: acronym.into(),
            years,
        })
    }

    pub fn interval(&self) -> TemporalInterval {
        TemporalInterval::from_years(self.years.iter().copied()).unwrap_or_else(TemporalInterval::degenerate)
    }

    pub fn contains(&self, year: i32) -> bool {
        self.years.binary_search(&year).is_ok()
    }
}

/// Split canonical records into usable series and the names of records without real years.
pub fn series_from_records(records: &[CanonicalInitiativeRecord]) -> (Vec<TemporalSeries>, Vec<String>) {
    let mut series = Vec::new();
    let mut excluded = Vec::new();

    for record in records {
        let usable = if record.temporal_defaulted {
            None
        } else {
            TemporalSeries::new(&record.name, &record.acronym, &record.available_years)
        };
        match usable {
            Some(s) => series.push(s),
            None => excluded.push(record.name.clone()),
        }
    }

    (series, excluded)
}

/// Year-by-year availability of every initiative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageMatrix {
    /// Union of all available years, sorted
    pub years: Vec<i32>,
    pub rows: Vec<CoverageRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageRow {
    pub name: String,
    pub acronym: String,
    /// One flag per entry of [`CoverageMatrix::years`]
    pub availability: Vec<bool>,
}

impl CoverageRow {
    /// Availability as 0/1 bits
    pub fn bits(&self) -> Vec<u8> {
        self.availability.iter().map(|&a| u8::from(a)).collect()
    }
}

impl CoverageMatrix {
    /// Number of initiatives with data in each year of the continuous global range.
    /// Years no initiative covers count as zero.
    pub fn concurrent_counts(&self) -> Vec<(i32, usize)> {
        let (Some(&first), Some(&last)) = (self.years.first(), self.years.last()) else {
            return Vec::new();
        };

        (first..=last)
            .map(|year| {
                let count = match self.years.binary_search(&year) {
                    Ok(col) => self.rows.iter().filter(|row| row.availability[col]).count(),
                    Err(_) => 0,
                };
                (year, count)
            })
            .collect()
    }

    pub fn overlap_stats(&self) -> OverlapStats {
        OverlapStats::from_counts(self.concurrent_counts().into_iter().map(|(_, count)| count))
    }
}

pub fn coverage_matrix(series: &[TemporalSeries]) -> CoverageMatrix {
    let years: Vec<i32> = series
        .iter()
        .flat_map(|s| s.years.iter().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let rows = series
        .iter()
        .map(|s| CoverageRow {
            name: s.name.clone(),
            acronym: s.acronym.clone(),
            availability: years.iter().map(|&year| s.contains(year)).collect(),
        })
        .collect();

    CoverageMatrix { years, rows }
}

/// How many initiatives run concurrently across the global year range
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OverlapStats {
    pub max_concurrent: usize,
    pub avg_concurrent: f64,
    pub coverage_years_with_any_data: usize,
}

impl OverlapStats {
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let counts: Vec<usize> = counts.into_iter().collect();
        if counts.is_empty() {
            return Self::default();
        }
        Self {
            max_concurrent: counts.iter().copied().max().unwrap_or(0),
            avg_concurrent: counts.iter().sum::<usize>() as f64 / counts.len() as f64,
            coverage_years_with_any_data: counts.iter().filter(|&&c| c > 0).count(),
        }
    }
}

/// Global period covered by at least one initiative's span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: i32,
    pub end: i32,
    pub span: i32,
}

/// Per-initiative view used by timeline and gap charts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitiativeTimeline {
    pub name: String,
    pub acronym: String,
    pub years: Vec<i32>,
    pub start_year: i32,
    pub end_year: i32,
    pub total_years: usize,
    pub coverage_span: i32,
    pub gaps: Vec<i32>,
    pub largest_gap: i32,
    pub gap_runs: Vec<GapRun>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitiativeCoverage {
    pub name: String,
    pub acronym: String,
    /// Years with data over the initiative's own span, in percent
    pub coverage_percentage: f64,
    /// Years with data over the global period, in percent
    pub period_share: f64,
    pub total_years: usize,
    pub span_years: i32,
}

/// Summary of missing years across initiatives with at least two years
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GapStatistics {
    pub average_gap: f64,
    pub max_gap: i32,
    pub max_gap_initiative: Option<String>,
    pub initiatives_with_gaps: usize,
    pub total_missing_years: usize,
}

pub fn gap_statistics(series: &[TemporalSeries]) -> GapStatistics {
    let measured: Vec<(&TemporalSeries, usize, i32)> = series
        .iter()
        .filter(|s| s.years.len() > 1)
        .map(|s| {
            let interval = s.interval();
            (s, interval.temporal_gaps.len(), largest_gap(s.years.iter().copied()))
        })
        .collect();

    if measured.is_empty() {
        return GapStatistics::default();
    }

    let total_missing_years: usize = measured.iter().map(|(_, missing, _)| missing).sum();
    let max_gap = measured.iter().map(|(_, _, largest)| *largest).max().unwrap_or(0);
    let max_gap_initiative = measured
        .iter()
        .find(|(_, _, largest)| *largest == max_gap)
        .map(|(s, _, _)| s.acronym.clone());

    GapStatistics {
        average_gap: total_missing_years as f64 / measured.len() as f64,
        max_gap,
        max_gap_initiative,
        initiatives_with_gaps: measured.iter().filter(|(_, missing, _)| *missing > 0).count(),
        total_missing_years,
    }
}

/// Full temporal analysis over the canonical table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalAnalysis {
    pub initiatives: Vec<InitiativeTimeline>,
    pub timeline_matrix: CoverageMatrix,
    pub total_period: Option<Period>,
    pub coverage_stats: Vec<InitiativeCoverage>,
    pub gaps: GapStatistics,
    pub overlap: OverlapStats,
    /// Initiatives left out because they have no parsable year
    pub excluded: Vec<String>,
}

pub fn analyze(records: &[CanonicalInitiativeRecord]) -> TemporalAnalysis {
    let (series, excluded) = series_from_records(records);
    analyze_series(&series, excluded)
}

pub fn analyze_series(series: &[TemporalSeries], excluded: Vec<String>) -> TemporalAnalysis {
    let initiatives: Vec<InitiativeTimeline> = series
        .iter()
        .map(|s| {
            let interval = s.interval();
            let runs = gap_runs(s.years.iter().copied());
            InitiativeTimeline {
                name: s.name.clone(),
                acronym: s.acronym.clone(),
                years: s.years.clone(),
                start_year: interval.start_year,
                end_year: interval.end_year,
                total_years: interval.total_years,
                coverage_span: interval.temporal_span,
                gaps: interval.temporal_gaps,
                largest_gap: runs.iter().map(|r| r.gap_size).max().unwrap_or(0),
                gap_runs: runs,
            }
        })
        .collect();

    let timeline_matrix = coverage_matrix(series);
    let total_period = match (timeline_matrix.years.first(), timeline_matrix.years.last()) {
        (Some(&start), Some(&end)) => Some(Period {
            start,
            end,
            span: end - start + 1,
        }),
        _ => None,
    };

    let coverage_stats = initiatives
        .iter()
        .map(|t| {
            let period_share = match total_period {
                Some(p) if p.span > 0 => t.total_years as f64 / p.span as f64 * 100.0,
                _ => 0.0,
            };
            InitiativeCoverage {
                name: t.name.clone(),
                acronym: t.acronym.clone(),
                coverage_percentage: t.total_years as f64 / t.coverage_span as f64 * 100.0,
                period_share,
                total_years: t.total_years,
                span_years: t.coverage_span,
            }
        })
        .collect();

    TemporalAnalysis {
        overlap: timeline_matrix.overlap_stats(),
        gaps: gap_statistics(series),
        initiatives,
        timeline_matrix,
        total_period,
        coverage_stats,
        excluded,
    }
}
