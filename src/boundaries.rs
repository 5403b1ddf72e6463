//! County boundary shapes from a GeoJSON feature collection.
//!
//! Only what the map needs is kept: each feature's id (the FIPS code) and the
//! outer ring of every polygon, as `(lon, lat)` pairs.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

pub type Ring = Vec<(f64, f64)>;

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    id: Option<serde_json::Value>,
    geometry: Option<Geometry>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Vec<f64>>>>,
    },
    #[serde(other)]
    Unsupported,
}

/// Outer rings per region code.
#[derive(Debug, Default)]
pub struct Boundaries {
    regions: BTreeMap<String, Vec<Ring>>,
}

impl Boundaries {
    pub fn from_geojson(bytes: &[u8]) -> Result<Self> {
        let collection: FeatureCollection =
            serde_json::from_slice(bytes).context("boundary document is not a GeoJSON feature collection")?;

        let mut regions: BTreeMap<String, Vec<Ring>> = BTreeMap::new();
        let mut skipped = 0usize;

        for feature in collection.features {
            let Some(id) = feature.id.as_ref().and_then(feature_id) else {
                skipped += 1;
                continue;
            };

            let rings: Vec<Ring> = match feature.geometry {
                Some(Geometry::Polygon { coordinates }) => outer_ring(coordinates).into_iter().collect(),
                Some(Geometry::MultiPolygon { coordinates }) => {
                    coordinates.into_iter().filter_map(outer_ring).collect()
                }
                Some(Geometry::Unsupported) | None => {
                    debug!(id = %id, "Skipping feature without polygon geometry");
                    skipped += 1;
                    continue;
                }
            };

            regions.entry(id).or_default().extend(rings);
        }

        info!(regions = regions.len(), skipped, "Boundaries loaded");
        Ok(Self { regions })
    }

    pub fn get(&self, code: &str) -> Option<&[Ring]> {
        self.regions.get(code).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Ring])> {
        self.regions.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

fn feature_id(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First ring of a polygon, dropping positions with fewer than two ordinates.
fn outer_ring(polygon: Vec<Vec<Vec<f64>>>) -> Option<Ring> {
    let ring: Ring = polygon
        .into_iter()
        .next()?
        .into_iter()
        .filter_map(|pos| match pos.as_slice() {
            [lon, lat, ..] => Some((*lon, *lat)),
            _ => None,
        })
        .collect();

    (ring.len() >= 3).then_some(ring)
}
