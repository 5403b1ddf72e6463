use plotters::coord::Shift;
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::ops::Range;
use std::path::Path;
use tracing::debug;

use super::{RenderError, Result};
use crate::boundaries::{Boundaries, Ring};
use crate::derive::ResponseRecord;

/// Fixed color scale range for peak hate age.
pub const COLOR_RANGE: (f64, f64) = (0.0, 12.0);
pub const FILL_OPACITY: f64 = 0.5;

const BASEMAP: RGBColor = RGBColor(200, 200, 200);

/// Visible window of an equirectangular map, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub center_lon: f64,
    pub center_lat: f64,
    pub lon_span: f64,
    pub lat_span: f64,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center_lon: -95.7129,
            center_lat: 37.0902,
            lon_span: 64.0,
            lat_span: 32.0,
        }
    }
}

impl MapView {
    pub fn lon_range(&self) -> Range<f64> {
        (self.center_lon - self.lon_span / 2.0)..(self.center_lon + self.lon_span / 2.0)
    }

    pub fn lat_range(&self) -> Range<f64> {
        (self.center_lat - self.lat_span / 2.0)..(self.center_lat + self.lat_span / 2.0)
    }

    /// True when the ring's bounding box overlaps the view.
    pub fn intersects(&self, ring: &[(f64, f64)]) -> bool {
        let (lon, lat) = (self.lon_range(), self.lat_range());
        let (mut min_lon, mut max_lon) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_lat, mut max_lat) = (f64::INFINITY, f64::NEG_INFINITY);

        for &(x, y) in ring {
            min_lon = min_lon.min(x);
            max_lon = max_lon.max(x);
            min_lat = min_lat.min(y);
            max_lat = max_lat.max(y);
        }

        min_lon <= lon.end && max_lon >= lon.start && min_lat <= lat.end && max_lat >= lat.start
    }
}

/// Mean peak hate age per region, over records with a resolved region code.
pub fn region_values(records: &[ResponseRecord]) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<&str, (i64, u32)> = BTreeMap::new();

    for r in records {
        if let Some(code) = r.region_code.as_deref() {
            let entry = sums.entry(code).or_default();
            entry.0 += r.peak_hate_age as i64;
            entry.1 += 1;
        }
    }

    sums.into_iter()
        .map(|(code, (sum, n))| (code.to_string(), sum as f64 / n as f64))
        .collect()
}

/// Viridis color for `value`, clamped to [`COLOR_RANGE`].
pub fn scale_color(value: f64) -> RGBColor {
    let (lo, hi) = COLOR_RANGE;
    let v = value.clamp(lo, hi);
    ViridisRGB.get_color_normalized(v as f32, lo as f32, hi as f32)
}

/// Draws a county map shaded by mean peak hate age to an SVG file.
///
/// All boundaries are outlined as a basemap; only regions with data are filled.
pub fn render_choropleth(
    records: &[ResponseRecord],
    boundaries: &Boundaries,
    view: &MapView,
    path: &Path,
) -> Result<()> {
    let values = region_values(records);

    let root = SVGBackend::new(path, (1200, 800)).into_drawing_area();
    draw_choropleth(&root, boundaries, &values, *view)
}

pub(crate) fn draw_choropleth<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    boundaries: &Boundaries,
    values: &BTreeMap<String, f64>,
    view: MapView,
) -> Result<()> {
    area.fill(&WHITE)
        .map_err(|e| RenderError::DrawingArea(e.to_string()))?;

    let (width, _) = area.dim_in_pixel();
    let (map_area, bar_area) = area.split_horizontally((width as i32 - 120).max(0));

    let mut chart = ChartBuilder::on(&map_area)
        .caption("Peak Barney hate age by county", ("sans-serif", 28))
        .margin(10)
        .build_cartesian_2d(view.lon_range(), view.lat_range())
        .map_err(|e| RenderError::ChartConfig(e.to_string()))?;

    chart
        .draw_series(
            boundaries
                .iter()
                .flat_map(|(_, rings)| rings.iter())
                .filter(|ring| view.intersects(ring))
                .map(|ring| PathElement::new(closed(ring), BASEMAP.stroke_width(1))),
        )
        .map_err(|e| RenderError::Drawing(e.to_string()))?;

    let missing = values
        .keys()
        .filter(|code| boundaries.get(code).is_none())
        .count();
    if missing > 0 {
        debug!(missing, "Regions with data but no boundary");
    }

    chart
        .draw_series(
            values
                .iter()
                .filter_map(|(code, &value)| boundaries.get(code).map(|rings| (rings, value)))
                .flat_map(|(rings, value)| {
                    let style = scale_color(value).mix(FILL_OPACITY).filled();
                    rings
                        .iter()
                        .filter(move |ring| view.intersects(ring))
                        .map(move |ring| Polygon::new(ring.clone(), style))
                }),
        )
        .map_err(|e| RenderError::Drawing(e.to_string()))?;

    draw_color_bar(&bar_area)?;

    area.present()
        .map_err(|e| RenderError::Drawing(e.to_string()))?;

    Ok(())
}

fn draw_color_bar<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>) -> Result<()> {
    let (lo, hi) = COLOR_RANGE;

    let mut bar = ChartBuilder::on(area)
        .margin(20)
        .margin_top(80)
        .y_label_area_size(40)
        .build_cartesian_2d(0.0..1.0, lo..hi)
        .map_err(|e| RenderError::ChartConfig(e.to_string()))?;

    bar.configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .disable_x_axis()
        .y_desc("peak_hate")
        .y_label_formatter(&|v: &f64| format!("{:.0}", v))
        .draw()
        .map_err(|e| RenderError::Drawing(e.to_string()))?;

    let steps = 120;
    let step = (hi - lo) / steps as f64;
    bar.draw_series((0..steps).map(|i| {
        let bottom = lo + i as f64 * step;
        Rectangle::new(
            [(0.0, bottom), (1.0, bottom + step)],
            scale_color(bottom + step / 2.0).filled(),
        )
    }))
    .map_err(|e| RenderError::Drawing(e.to_string()))?;

    Ok(())
}

fn closed(ring: &Ring) -> Ring {
    let mut points = ring.clone();
    if let (Some(&first), Some(&last)) = (ring.first(), ring.last()) {
        if first != last {
            points.push(first);
        }
    }
    points
}
