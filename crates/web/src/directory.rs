//! HTTP client for the remote user directory.
//!
//! One read operation: `GET` the configured collection URL and decode a
//! JSON array of users. Writes never leave this process.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use url::Url;

use user_directory_core::directory::FETCH_FAILED_MESSAGE;
use user_directory_core::{DirectoryError, User, UserDirectory};

use crate::config::DirectoryConfig;

/// Remote directory reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpUserDirectory {
    client: reqwest::Client,
    source_url: Url,
}

impl HttpUserDirectory {
    /// Create a client for the configured source.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &DirectoryConfig) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.fetch_timeout)
            .build()?;

        Ok(Self {
            client,
            source_url: config.source_url.clone(),
        })
    }

    /// URL this client reads from.
    #[must_use]
    pub const fn source_url(&self) -> &Url {
        &self.source_url
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    #[tracing::instrument(skip(self), fields(url = %self.source_url))]
    async fn fetch_all(&self) -> Result<Vec<User>, DirectoryError> {
        let response = self
            .client
            .get(self.source_url.clone())
            .send()
            .await
            .map_err(|e| DirectoryError::FetchFailed(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "directory returned non-success status");
            return Err(DirectoryError::FetchFailed(FETCH_FAILED_MESSAGE.to_string()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DirectoryError::FetchFailed(format!("Failed to read response: {e}")))?;

        serde_json::from_slice::<Vec<User>>(&body)
            .map_err(|e| DirectoryError::FetchFailed(format!("Malformed user list: {e}")))
    }
}
