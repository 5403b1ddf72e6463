use anyhow::{Context, Result};
use std::collections::HashMap;
use tracing::info;

/// Maps 5-digit zip codes to county FIPS codes.
///
/// Loaded from a flat JSON object:
/// ```json
/// {
///   "01001": "25013",
///   "10001": "36061"
/// }
/// ```
#[derive(Debug, Default)]
pub struct RegionLookup {
    entries: HashMap<String, String>,
}

impl RegionLookup {
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let entries: HashMap<String, String> =
            serde_json::from_slice(bytes).context("zip-to-region mapping is not a JSON string map")?;
        info!(zips = entries.len(), "Zip-to-region mapping loaded");
        Ok(Self { entries })
    }

    /// Returns the region code for `zip`, zero-padding it to 5 characters first.
    ///
    /// A zip that is absent or not in the mapping yields `None`.
    pub fn lookup(&self, zip: Option<&str>) -> Option<&str> {
        let zip = normalize_zip(zip?);
        self.entries.get(&zip).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for RegionLookup {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Left-pads `zip` with zeros to 5 characters. Longer values are returned as-is.
pub fn normalize_zip(zip: &str) -> String {
    format!("{zip:0>5}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup() -> RegionLookup {
        [("00501", "36103"), ("02134", "25025"), ("10001", "36061")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_normalize_zip() {
        assert_eq!(normalize_zip("501"), "00501");
        assert_eq!(normalize_zip("2134"), "02134");
        assert_eq!(normalize_zip("10001"), "10001");
        assert_eq!(normalize_zip("123456789"), "123456789");
    }

    #[test]
    fn test_lookup_pads_before_matching() {
        let regions = lookup();
        assert_eq!(regions.lookup(Some("501")), Some("36103"));
        assert_eq!(regions.lookup(Some("2134")), Some("25025"));
        assert_eq!(regions.lookup(Some("10001")), Some("36061"));
    }

    #[test]
    fn test_lookup_absent_and_miss() {
        let regions = lookup();
        assert_eq!(regions.lookup(None), None);
        assert_eq!(regions.lookup(Some("99999")), None);
    }

    #[test]
    fn test_from_json() {
        let regions = RegionLookup::from_json(br#"{"01001": "25013", "10001": "36061"}"#).unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions.lookup(Some("1001")), Some("25013"));
    }

    #[test]
    fn test_from_json_rejects_non_map() {
        assert!(RegionLookup::from_json(b"[1, 2, 3]").is_err());
    }
}
