//! The read → clean → derive → plot sequence.

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use crate::cleaner::clean_responses;
use crate::derive::{HateYearWindow, ResponseRecord, derive_records};
use crate::loader::{Sources, load_datasets};
use crate::render::{ChartPaths, render_charts};
use crate::summary::PipelineSummary;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub sources: Sources,
    pub output_dir: PathBuf,
    pub window: HateYearWindow,
}

pub struct PipelineOutput {
    pub records: Vec<ResponseRecord>,
    pub charts: ChartPaths,
    pub summary: PipelineSummary,
}

/// Runs every stage in order, each consuming the previous stage's full output.
#[tracing::instrument(skip_all, fields(output_dir = %config.output_dir.display()))]
pub async fn run(config: &PipelineConfig) -> Result<PipelineOutput> {
    let datasets = load_datasets(&config.sources).await?;
    let rows_read = datasets.responses.len();

    let cleaned = clean_responses(&datasets.responses);
    let derived = derive_records(cleaned, &datasets.regions, config.window);

    let charts = render_charts(
        &derived.records,
        &datasets.boundaries,
        config.window,
        &config.output_dir,
    )?;

    let summary = PipelineSummary::from_derived(&config.sources.survey, rows_read, &derived)
        .with_outputs(
            &charts.histogram.display().to_string(),
            &charts.map.display().to_string(),
        );

    info!(
        kept = summary.kept,
        kept_pct = summary.kept_pct(),
        region_pct = summary.region_pct(),
        "Pipeline complete"
    );

    Ok(PipelineOutput {
        records: derived.records,
        charts,
        summary,
    })
}
