//! Chart output.
//!
//! Both charts are drawn with [`plotters`] onto the SVG backend, which needs
//! no system fonts and opens in any browser.

mod choropleth;
mod histogram;

pub use choropleth::{MapView, region_values, render_choropleth};
pub use histogram::{YearBin, histogram_bins, render_histogram};

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::boundaries::Boundaries;
use crate::derive::{HateYearWindow, ResponseRecord};

pub const HISTOGRAM_FILE: &str = "hate_year_histogram.svg";
pub const MAP_FILE: &str = "peak_hate_choropleth.svg";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Failed to prepare output: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = core::result::Result<T, RenderError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPaths {
    pub histogram: PathBuf,
    pub map: PathBuf,
}

/// Writes both charts into `output_dir`, creating it if needed.
///
/// An empty record set still produces both files.
pub fn render_charts(
    records: &[ResponseRecord],
    boundaries: &Boundaries,
    window: HateYearWindow,
    output_dir: &Path,
) -> Result<ChartPaths> {
    std::fs::create_dir_all(output_dir)?;

    let histogram = output_dir.join(HISTOGRAM_FILE);
    render_histogram(records, window, &histogram)?;
    info!(path = %histogram.display(), "Histogram written");

    let map = output_dir.join(MAP_FILE);
    render_choropleth(records, boundaries, &MapView::default(), &map)?;
    info!(path = %map.display(), "Choropleth written");

    Ok(ChartPaths { histogram, map })
}

/// Shows the charts in the system viewer. Failures are logged, not returned.
pub fn open_charts(paths: &ChartPaths) {
    for path in [&paths.histogram, &paths.map] {
        if let Err(e) = open::that(path) {
            warn!(path = %path.display(), error = %e, "Could not open chart viewer");
        }
    }
}
