//! Loading raw bytes from a URL or a local path.
//!
//! Remote datasets go through the [`HttpClient`] trait so a request can be
//! wrapped (see [`auth::ApiKey`]) before it is sent. Anything that does not
//! look like a URL is read from disk, which lets fixtures and offline copies
//! stand in for the remote datasets.

pub mod auth;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Request, Response};
use tracing::debug;

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

/// Plain `reqwest` client with transport defaults.
#[derive(Default)]
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    pub fn new() -> Self {
        Self(reqwest::Client::new())
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        self.0.execute(req).await
    }
}

/// Issues a GET for `url` and returns the body. Non-2xx statuses are errors.
pub async fn fetch_bytes<C: HttpClient + ?Sized>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    let bytes = resp.bytes().await?.to_vec();
    debug!(url, bytes = bytes.len(), "Fetched remote dataset");
    Ok(bytes)
}

/// Returns `true` when `location` should be fetched over HTTP rather than read from disk.
pub fn is_remote(location: &str) -> bool {
    location.starts_with("http")
}

/// Loads a dataset from a local file path or fetches it over HTTP.
#[tracing::instrument(skip(client))]
pub async fn load_location<C: HttpClient + ?Sized>(client: &C, location: &str) -> Result<Vec<u8>> {
    if is_remote(location) {
        fetch_bytes(client, location)
            .await
            .with_context(|| format!("failed to fetch {location}"))
    } else {
        let bytes =
            std::fs::read(location).with_context(|| format!("failed to read {location}"))?;
        debug!(bytes = bytes.len(), "Read local dataset");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.com/data.json"));
        assert!(is_remote("http://localhost:8080/survey.csv"));
        assert!(!is_remote("tests/fixtures/survey.csv"));
        assert!(!is_remote("/tmp/zip2fips.json"));
    }

    #[tokio::test]
    async fn test_load_location_reads_local_file() {
        let path = format!("{}/barney_survey_fetch_local.txt", env::temp_dir().display());
        fs::write(&path, b"hello").unwrap();

        let bytes = load_location(&BasicClient::new(), &path).await.unwrap();
        assert_eq!(bytes, b"hello");

        fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_load_location_missing_file_names_path() {
        let path = format!("{}/barney_survey_does_not_exist.csv", env::temp_dir().display());
        let _ = fs::remove_file(&path);

        let err = load_location(&BasicClient::new(), &path).await.unwrap_err();
        assert!(err.to_string().contains("barney_survey_does_not_exist.csv"));
    }
}
