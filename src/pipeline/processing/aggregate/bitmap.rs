use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::comparison::compact_key;
use crate::pipeline::processing::temporal::{OverlapStats, TemporalSeries};

/// Year-by-year availability of one initiative as a '0'/'1' string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitmapEntry {
    /// One character per year of the global range
    pub bitmap: String,
    pub start: i32,
    pub end: i32,
    pub count: usize,
    /// `count / (end - start + 1)`
    pub efficiency: f64,
    /// Number of missing years inside the initiative's own span
    pub gaps: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BitmapTemporal {
    /// Keyed by truncated acronym; on collision the later initiative wins
    pub temporal_data: BTreeMap<String, BitmapEntry>,
    /// `[min_year, max_year]` over every initiative
    pub time_range: Option<[i32; 2]>,
    pub overlap_stats: OverlapStats,
}

pub fn bitmap_temporal(series: &[TemporalSeries], key_len: usize) -> BitmapTemporal {
    let min_year = series.iter().filter_map(|s| s.years.first()).min().copied();
    let max_year = series.iter().filter_map(|s| s.years.last()).max().copied();
    let (Some(min_year), Some(max_year)) = (min_year, max_year) else {
        return BitmapTemporal::default();
    };

    let mut temporal_data = BTreeMap::new();
    for s in series {
        let interval = s.interval();
        let bitmap: String = (min_year..=max_year)
            .map(|year| if s.contains(year) { '1' } else { '0' })
            .collect();

        temporal_data.insert(
            compact_key(&s.acronym, key_len),
            BitmapEntry {
                bitmap,
                start: interval.start_year,
                end: interval.end_year,
                count: interval.total_years,
                efficiency: interval.total_years as f64 / interval.temporal_span as f64,
                gaps: interval.temporal_gaps.len(),
            },
        );
    }

    let overlap_stats = OverlapStats::from_counts((0..=(max_year - min_year) as usize).map(|offset| {
        temporal_data
            .values()
            .filter(|entry| entry.bitmap.as_bytes().get(offset) == Some(&b'1'))
            .count()
    }));

    BitmapTemporal {
        temporal_data,
        time_range: Some([min_year, max_year]),
        overlap_stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(acronym: &str, years: &[i32]) -> TemporalSeries {
        TemporalSeries::new(acronym, acronym, years).unwrap()
    }

    #[test]
    fn test_bitmaps_over_global_range() {
        let result = bitmap_temporal(&[series("A", &[2000, 2002]), series("B", &[2001, 2002, 2003])], 10);

        assert_eq!(result.time_range, Some([2000, 2003]));
        let a = &result.temporal_data["A"];
        assert_eq!(a.bitmap, "1010");
        assert_eq!(a.count, 2);
        assert_eq!(a.gaps, 1);
        assert!((a.efficiency - 2.0 / 3.0).abs() < 1e-12);

        let b = &result.temporal_data["B"];
        assert_eq!(b.bitmap, "0111");
        assert_eq!(b.efficiency, 1.0);
    }

    #[test]
    fn test_overlap_stats_from_bitmaps() {
        let result = bitmap_temporal(&[series("A", &[2000, 2002]), series("B", &[2002]), series("C", &[2005])], 10);
        let stats = result.overlap_stats;
        assert_eq!(stats.max_concurrent, 2);
        assert_eq!(stats.coverage_years_with_any_data, 3);
        // 4 set bits over 2000..=2005
        assert!((stats.avg_concurrent - 4.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(bitmap_temporal(&[], 10), BitmapTemporal::default());
    }
}
