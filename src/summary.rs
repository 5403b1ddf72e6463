use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::derive::Derived;

/// What each pipeline stage kept and dropped in one run.
#[derive(Debug, Default, Serialize)]
pub struct PipelineSummary {
    pub timestamp: DateTime<Utc>,
    pub survey: String,

    // row accounting
    pub rows_read: usize,
    pub dropped_unresolved: usize,
    pub dropped_out_of_range: usize,
    pub kept: usize,

    // geocoding
    pub with_region: usize,
    pub region_misses: usize,

    // outputs
    pub histogram_path: Option<String>,
    pub map_path: Option<String>,
}

impl PipelineSummary {
    pub fn from_derived(survey: &str, rows_read: usize, derived: &Derived) -> Self {
        let with_region = derived
            .records
            .iter()
            .filter(|r| r.region_code.is_some())
            .count();

        PipelineSummary {
            timestamp: Utc::now(),
            survey: survey.to_string(),
            rows_read,
            dropped_unresolved: derived.dropped_unresolved,
            dropped_out_of_range: derived.dropped_out_of_range,
            kept: derived.records.len(),
            with_region,
            region_misses: derived.records.len() - with_region,
            ..Default::default()
        }
    }

    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    pub fn kept_pct(&self) -> f64 {
        Self::pct(self.kept, self.rows_read)
    }

    pub fn region_pct(&self) -> f64 {
        Self::pct(self.with_region, self.kept)
    }

    /// Set chart output locations
    pub fn with_outputs(mut self, histogram: &str, map: &str) -> Self {
        self.histogram_path = Some(histogram.to_string());
        self.map_path = Some(map.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::ResponseRecord;

    fn record(region_code: Option<&str>) -> ResponseRecord {
        ResponseRecord {
            zip: None,
            country: None,
            birth_year: 1990,
            peak_hate_age: 6,
            hate_year: 1996,
            region_code: region_code.map(str::to_string),
            count: 1,
        }
    }

    #[test]
    fn test_pct_with_zero_total() {
        assert_eq!(PipelineSummary::pct(10, 0), 0.0);
    }

    #[test]
    fn test_pct_normal_values() {
        assert_eq!(PipelineSummary::pct(50, 100), 50.0);
        assert_eq!(PipelineSummary::pct(1, 4), 25.0);
    }

    #[test]
    fn test_from_derived_counts_add_up() {
        let derived = Derived {
            records: vec![record(Some("25025")), record(None), record(Some("36061"))],
            dropped_unresolved: 4,
            dropped_out_of_range: 1,
        };

        let summary = PipelineSummary::from_derived("survey.csv", 8, &derived);

        assert_eq!(summary.kept, 3);
        assert_eq!(summary.with_region, 2);
        assert_eq!(summary.region_misses, 1);
        assert_eq!(
            summary.rows_read,
            summary.dropped_unresolved + summary.dropped_out_of_range + summary.kept
        );
        assert_eq!(summary.kept_pct(), 37.5);
    }

    #[test]
    fn test_with_outputs() {
        let summary = PipelineSummary::default().with_outputs("a.svg", "b.svg");
        assert_eq!(summary.histogram_path.as_deref(), Some("a.svg"));
        assert_eq!(summary.map_path.as_deref(), Some("b.svg"));
        assert_eq!(summary.region_pct(), 0.0);
    }
}
