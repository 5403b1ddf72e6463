use super::HttpClient;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};

/// An [`HttpClient`] wrapper that injects a credential as an HTTP header.
///
/// The header name and value are validated when the wrapper is built, so a
/// malformed token is reported before any request goes out.
pub struct ApiKey<C> {
    inner: C,
    header_name: HeaderName,
    value: HeaderValue,
}

impl<C> ApiKey<C> {
    pub fn new(inner: C, header_name: &str, value: &str) -> Result<Self> {
        let header_name = HeaderName::from_bytes(header_name.as_bytes())
            .with_context(|| format!("invalid header name '{header_name}'"))?;
        let mut value = HeaderValue::from_str(value).context("invalid header value")?;
        value.set_sensitive(true);
        Ok(Self {
            inner,
            header_name,
            value,
        })
    }

    /// Uses `Authorization: Bearer <token>`, which is what spreadsheet
    /// exports behind a pre-issued access token expect.
    pub fn bearer(inner: C, token: &str) -> Result<Self> {
        Self::new(inner, AUTHORIZATION.as_str(), &format!("Bearer {}", token.trim()))
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for ApiKey<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut()
            .insert(self.header_name.clone(), self.value.clone());
        self.inner.execute(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::BasicClient;

    #[test]
    fn test_bearer_builds_authorization_header() {
        let client = ApiKey::bearer(BasicClient::new(), " abc123 ").unwrap();
        assert_eq!(client.header_name, AUTHORIZATION);
        assert_eq!(client.value.to_str().unwrap(), "Bearer abc123");
        assert!(client.value.is_sensitive());
    }

    #[test]
    fn test_rejects_token_with_newline() {
        assert!(ApiKey::bearer(BasicClient::new(), "abc\ndef").is_err());
    }

    #[test]
    fn test_rejects_invalid_header_name() {
        assert!(ApiKey::new(BasicClient::new(), "bad header", "x").is_err());
    }
}
