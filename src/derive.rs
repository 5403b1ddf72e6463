//! Turning cleaned answers into the final record set.

use tracing::{debug, info};

use crate::cleaner::CleanResponse;
use crate::region::RegionLookup;

/// Exclusive bounds on plausible hate years. Anything outside is treated as
/// data-entry noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HateYearWindow {
    pub after: i32,
    pub before: i32,
}

impl Default for HateYearWindow {
    fn default() -> Self {
        Self {
            after: 1992,
            before: 2020,
        }
    }
}

impl HateYearWindow {
    pub fn contains(&self, year: i32) -> bool {
        self.after < year && year < self.before
    }
}

/// A fully resolved survey answer. Immutable once derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseRecord {
    pub zip: Option<String>,
    pub country: Option<String>,
    pub birth_year: i32,
    pub peak_hate_age: i32,
    pub hate_year: i32,
    pub region_code: Option<String>,
    pub count: u32,
}

#[derive(Debug, Default)]
pub struct Derived {
    pub records: Vec<ResponseRecord>,
    pub dropped_unresolved: usize,
    pub dropped_out_of_range: usize,
}

/// Drops rows without a birth year or peak age, computes the hate year,
/// keeps only years inside `window` and resolves region codes.
pub fn derive_records(
    rows: Vec<CleanResponse>,
    regions: &RegionLookup,
    window: HateYearWindow,
) -> Derived {
    let mut derived = Derived::default();

    for row in rows {
        let (Some(birth_year), Some(peak_hate_age)) = (row.birth_year, row.peak_hate_age) else {
            derived.dropped_unresolved += 1;
            continue;
        };

        let hate_year = match birth_year.checked_add(peak_hate_age) {
            Some(year) if window.contains(year) => year,
            other => {
                debug!(birth_year, peak_hate_age, hate_year = ?other, "Hate year out of range");
                derived.dropped_out_of_range += 1;
                continue;
            }
        };

        let region_code = regions.lookup(row.zip.as_deref()).map(str::to_string);

        derived.records.push(ResponseRecord {
            zip: row.zip,
            country: row.country,
            birth_year,
            peak_hate_age,
            hate_year,
            region_code,
            count: 1,
        });
    }

    info!(
        kept = derived.records.len(),
        dropped_unresolved = derived.dropped_unresolved,
        dropped_out_of_range = derived.dropped_out_of_range,
        "Records derived"
    );
    derived
}

/// Records that can be placed on the map.
pub fn map_eligible(records: &[ResponseRecord]) -> Vec<&ResponseRecord> {
    records.iter().filter(|r| r.region_code.is_some()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(zip: Option<&str>, birth_year: Option<i32>, peak_hate_age: Option<i32>) -> CleanResponse {
        CleanResponse {
            zip: zip.map(str::to_string),
            country: None,
            birth_year,
            peak_hate_age,
        }
    }

    fn regions() -> RegionLookup {
        [("02134".to_string(), "25025".to_string())].into_iter().collect()
    }

    #[test]
    fn test_window_bounds_are_exclusive() {
        let window = HateYearWindow::default();
        assert!(!window.contains(1992));
        assert!(window.contains(1993));
        assert!(window.contains(2019));
        assert!(!window.contains(2020));
    }

    #[test]
    fn test_unresolved_rows_are_dropped() {
        let rows = vec![
            row(None, None, Some(8)),
            row(None, Some(1990), None),
            row(None, Some(1990), Some(5)),
        ];

        let derived = derive_records(rows, &regions(), HateYearWindow::default());
        assert_eq!(derived.dropped_unresolved, 2);
        assert_eq!(derived.records.len(), 1);
    }

    #[test]
    fn test_hate_year_range_filter() {
        let rows = vec![row(None, Some(1975), Some(10)), row(None, Some(1990), Some(5))];

        let derived = derive_records(rows, &regions(), HateYearWindow::default());
        assert_eq!(derived.dropped_out_of_range, 1);
        assert_eq!(derived.records.len(), 1);
        assert_eq!(derived.records[0].hate_year, 1995);
        assert_eq!(derived.records[0].count, 1);
    }

    #[test]
    fn test_overflowing_hate_year_is_out_of_range() {
        let rows = vec![row(None, Some(i32::MAX), Some(5))];

        let derived = derive_records(rows, &regions(), HateYearWindow::default());
        assert_eq!(derived.dropped_out_of_range, 1);
        assert!(derived.records.is_empty());
    }

    #[test]
    fn test_oversized_age_answer_drops_record() {
        let raw = crate::survey::RawResponse {
            peak_hate: "99999999999999999999 or 6".to_string(),
            birth_year: "1990".to_string(),
            ..Default::default()
        };
        let rows = crate::cleaner::clean_responses(&[raw]);

        let derived = derive_records(rows, &regions(), HateYearWindow::default());
        assert!(derived.records.is_empty());
        assert_eq!(derived.dropped_unresolved, 1);
    }

    #[test]
    fn test_region_miss_keeps_record_for_histogram_only() {
        let rows = vec![
            row(Some("2134"), Some(1990), Some(6)),
            row(Some("99999"), Some(1988), Some(8)),
            row(None, Some(1989), Some(7)),
        ];

        let derived = derive_records(rows, &regions(), HateYearWindow::default());
        assert_eq!(derived.records.len(), 3);
        assert_eq!(derived.records[0].region_code.as_deref(), Some("25025"));
        assert_eq!(derived.records[1].region_code, None);

        let on_map = map_eligible(&derived.records);
        assert_eq!(on_map.len(), 1);
        assert_eq!(on_map[0].zip.as_deref(), Some("2134"));
    }

    #[test]
    fn test_custom_window() {
        let rows = vec![row(None, Some(1980), Some(10))];
        let window = HateYearWindow {
            after: 1985,
            before: 1995,
        };

        let derived = derive_records(rows, &regions(), window);
        assert_eq!(derived.records[0].hate_year, 1990);
    }
}
