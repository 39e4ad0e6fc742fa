//! CAP alerts feed client
//!
//! Fetches the Atom alert feed for a single NWS zone. The feed endpoint
//! answers bad zone ids with a sentinel body instead of an error status.

use reqwest::Client;

use super::UpstreamError;

/// Body the feed returns for an unknown or malformed zone id.
const INVALID_ZONE_SENTINEL: &str = "? invalid arg x";

/// Client for the zone alerts feed.
#[derive(Debug, Clone)]
pub struct AlertsClient {
    http: Client,
    url: String,
}

impl AlertsClient {
    /// Creates a client for the feed at `url`.
    pub fn new(http: Client, url: String) -> Self {
        Self { http, url }
    }

    /// Fetches the raw alert feed XML for `zone_id`.
    ///
    /// Returns [`UpstreamError::NotFound`] for the sentinel body or a 404.
    pub async fn fetch(&self, zone_id: &str) -> Result<String, UpstreamError> {
        let response = self
            .http
            .get(&self.url)
            .query(&[("x", zone_id)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if body.trim() == INVALID_ZONE_SENTINEL {
            return Err(UpstreamError::NotFound);
        }
        if status.as_u16() == 404 {
            return Err(UpstreamError::NotFound);
        }
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        Ok(body)
    }
}
