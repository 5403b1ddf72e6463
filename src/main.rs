//! CLI entry point for the Barney survey analysis.
//!
//! Loads the survey export and the zip/county reference data, cleans the
//! answers, and draws the hate-year histogram and the county choropleth.

use anyhow::Result;
use barney_survey::derive::HateYearWindow;
use barney_survey::loader::{DEFAULT_COUNTY_BOUNDARIES_URL, DEFAULT_ZIP_TO_FIPS_URL, Sources};
use barney_survey::output::{append_record, print_json, print_pretty};
use barney_survey::pipeline::{self, PipelineConfig};
use barney_survey::render::open_charts;
use barney_survey::survey::DEFAULT_HEADER_ROW;
use clap::Parser;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "barney_survey")]
#[command(about = "Clean the Barney survey responses and chart them", long_about = None)]
struct Cli {
    /// Survey CSV export, as a URL or a local path
    #[arg(long, env = "SURVEY_URL", value_name = "FILE_OR_URL")]
    survey: String,

    /// Zip-to-FIPS JSON mapping
    #[arg(long, env = "ZIP_TO_FIPS_URL", default_value = DEFAULT_ZIP_TO_FIPS_URL)]
    zip_map: String,

    /// County boundary GeoJSON keyed by FIPS code
    #[arg(long, env = "COUNTY_BOUNDARIES_URL", default_value = DEFAULT_COUNTY_BOUNDARIES_URL)]
    boundaries: String,

    /// Zero-based row holding the question headers
    #[arg(long, env = "SURVEY_HEADER_ROW", default_value_t = DEFAULT_HEADER_ROW)]
    header_row: usize,

    /// Directory the charts are written to
    #[arg(short, long, env = "OUTPUT_DIR", default_value = "charts")]
    output_dir: PathBuf,

    /// Write the charts without opening a viewer
    #[arg(long, env = "NO_OPEN", default_value_t = false)]
    no_open: bool,

    /// CSV file to append the run summary to
    #[arg(long, env = "SUMMARY_CSV")]
    summary_csv: Option<String>,

    /// Bearer token sent with the survey request only
    #[arg(long, env = "SURVEY_BEARER_TOKEN", hide_env_values = true)]
    survey_token: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/barney_survey.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("barney_survey.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let config = PipelineConfig {
        sources: Sources {
            survey: cli.survey,
            zip_map: cli.zip_map,
            boundaries: cli.boundaries,
            header_row: cli.header_row,
            survey_token: cli.survey_token.filter(|t| !t.trim().is_empty()),
        },
        output_dir: cli.output_dir,
        window: HateYearWindow::default(),
    };

    let output = match pipeline::run(&config).await {
        Ok(output) => output,
        Err(e) => {
            error!("Pipeline failed: {e:#}");
            return Err(e);
        }
    };

    print_pretty(&output.summary);
    print_json(&output.summary)?;

    if let Some(path) = &cli.summary_csv {
        append_record(path, &output.summary)?;
        info!(path = %path, "Run summary appended");
    }

    if cli.no_open {
        info!("Skipping chart viewer");
    } else {
        open_charts(&output.charts);
    }

    Ok(())
}
