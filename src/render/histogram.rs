use plotters::coord::Shift;
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;

use super::{RenderError, Result};
use crate::derive::{HateYearWindow, ResponseRecord};

const X_LABEL: &str = "What year did your Barney hate peak?";
const Y_LABEL: &str = "folks who hated Barney that year";
const LEGEND_LABEL: &str = "Birth Year";

/// Summed record weights for one hate year, split by birth year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearBin {
    pub hate_year: i32,
    pub by_birth_year: BTreeMap<i32, u32>,
}

impl YearBin {
    pub fn total(&self) -> u32 {
        self.by_birth_year.values().sum()
    }
}

/// Buckets records by hate year, ascending, using each record's `count` as its weight.
pub fn histogram_bins(records: &[ResponseRecord]) -> Vec<YearBin> {
    let mut bins: BTreeMap<i32, BTreeMap<i32, u32>> = BTreeMap::new();

    for r in records {
        *bins
            .entry(r.hate_year)
            .or_default()
            .entry(r.birth_year)
            .or_default() += r.count;
    }

    bins.into_iter()
        .map(|(hate_year, by_birth_year)| YearBin {
            hate_year,
            by_birth_year,
        })
        .collect()
}

/// Draws a stacked histogram of hate years, one color per birth year, to an SVG file.
///
/// With no records the axes still span `window`.
pub fn render_histogram(
    records: &[ResponseRecord],
    window: HateYearWindow,
    path: &Path,
) -> Result<()> {
    let bins = histogram_bins(records);

    let root = SVGBackend::new(path, (1200, 800)).into_drawing_area();
    draw_histogram(&root, &bins, window)
}

pub(crate) fn draw_histogram<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    bins: &[YearBin],
    window: HateYearWindow,
) -> Result<()> {
    let (first, last) = match (bins.first(), bins.last()) {
        (Some(first), Some(last)) => (first.hate_year, last.hate_year),
        _ => (window.after + 1, window.before - 1),
    };
    let y_max = bins.iter().map(YearBin::total).max().unwrap_or(1).max(1);

    area.fill(&WHITE)
        .map_err(|e| RenderError::DrawingArea(e.to_string()))?;

    let mut chart = ChartBuilder::on(area)
        .caption("Peak Barney hate by year", ("sans-serif", 32))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(
            (first as f64 - 1.0)..(last as f64 + 1.0),
            0.0..(y_max as f64 * 1.1),
        )
        .map_err(|e| RenderError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(((last - first) as usize + 3).min(30))
        .x_desc(X_LABEL)
        .y_desc(Y_LABEL)
        .x_label_formatter(&|x: &f64| format!("{:.0}", x))
        .y_label_formatter(&|y: &f64| format!("{:.0}", y))
        .draw()
        .map_err(|e| RenderError::Drawing(e.to_string()))?;

    // Stack segments bottom-up in birth-year order within each bar.
    let mut segments: BTreeMap<i32, Vec<(f64, f64, f64)>> = BTreeMap::new();
    for bin in bins {
        let x = bin.hate_year as f64;
        let mut bottom = 0.0;
        for (&birth_year, &count) in &bin.by_birth_year {
            let top = bottom + count as f64;
            segments.entry(birth_year).or_default().push((x, bottom, top));
            bottom = top;
        }
    }

    for (idx, (birth_year, bars)) in segments.into_iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();

        chart
            .draw_series(bars.into_iter().map(move |(x, y0, y1)| {
                Rectangle::new([(x - 0.4, y0), (x + 0.4, y1)], color.filled())
            }))
            .map_err(|e| RenderError::Drawing(e.to_string()))?
            .label(format!("{LEGEND_LABEL} {birth_year}"))
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));
    }

    if !bins.is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(|e| RenderError::Drawing(e.to_string()))?;
    }

    area.present()
        .map_err(|e| RenderError::Drawing(e.to_string()))?;

    Ok(())
}
