//! Fetches the survey and both reference datasets, one after another.

use anyhow::{Context, Result};
use tracing::info;

use crate::boundaries::Boundaries;
use crate::fetch::auth::ApiKey;
use crate::fetch::{BasicClient, HttpClient, load_location};
use crate::region::RegionLookup;
use crate::survey::{RawResponse, parse_survey};

pub const DEFAULT_ZIP_TO_FIPS_URL: &str =
    "https://raw.githubusercontent.com/bgruber/zip2fips/master/zip2fips.json";
pub const DEFAULT_COUNTY_BOUNDARIES_URL: &str =
    "https://raw.githubusercontent.com/plotly/datasets/master/geojson-counties-fips.json";

/// Where each dataset lives. Any location may be a URL or a local path.
#[derive(Debug, Clone)]
pub struct Sources {
    pub survey: String,
    pub zip_map: String,
    pub boundaries: String,
    pub header_row: usize,
    pub survey_token: Option<String>,
}

pub struct Datasets {
    pub responses: Vec<RawResponse>,
    pub regions: RegionLookup,
    pub boundaries: Boundaries,
}

/// Loads all three datasets. Any failure aborts the whole load.
///
/// The bearer token, when present, is only sent with the survey request.
#[tracing::instrument(skip_all, fields(survey = %sources.survey))]
pub async fn load_datasets(sources: &Sources) -> Result<Datasets> {
    let client = BasicClient::new();
    let survey_client: Box<dyn HttpClient> = match &sources.survey_token {
        Some(token) => Box::new(
            ApiKey::bearer(BasicClient::new(), token).context("invalid SURVEY_BEARER_TOKEN")?,
        ),
        None => Box::new(BasicClient::new()),
    };

    let survey_bytes = load_location(survey_client.as_ref(), &sources.survey).await?;
    let responses = parse_survey(&survey_bytes, sources.header_row)
        .with_context(|| format!("failed to parse survey from {}", sources.survey))?;

    let zip_bytes = load_location(&client, &sources.zip_map).await?;
    let regions = RegionLookup::from_json(&zip_bytes)
        .with_context(|| format!("failed to parse {}", sources.zip_map))?;

    let boundary_bytes = load_location(&client, &sources.boundaries).await?;
    let boundaries = Boundaries::from_geojson(&boundary_bytes)
        .with_context(|| format!("failed to parse {}", sources.boundaries))?;

    info!(
        responses = responses.len(),
        zips = regions.len(),
        regions = boundaries.len(),
        "Datasets loaded"
    );

    Ok(Datasets {
        responses,
        regions,
        boundaries,
    })
}
