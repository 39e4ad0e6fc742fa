//! Current observations client
//!
//! Each reporting station publishes one XML document at a fixed path;
//! an unknown station is a plain 404.

use reqwest::Client;

use super::UpstreamError;

/// Client for per-station current observation documents.
#[derive(Debug, Clone)]
pub struct ObservationsClient {
    http: Client,
    base_url: String,
}

impl ObservationsClient {
    /// Creates a client rooted at `base_url` (no trailing slash needed).
    pub fn new(http: Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    /// Fetches the raw observation XML for `station`.
    pub async fn fetch(&self, station: &str) -> Result<String, UpstreamError> {
        let url = format!("{}/{}.xml", self.base_url.trim_end_matches('/'), station);
        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(UpstreamError::NotFound);
        }
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}
