//! MapClick glance forecast client

use reqwest::Client;

use super::UpstreamError;
use crate::config::GlanceConfig;

/// Client for the MapClick point-forecast service.
#[derive(Debug, Clone)]
pub struct GlanceClient {
    http: Client,
    url: String,
}

impl GlanceClient {
    /// Creates a client for the MapClick endpoint at `url`.
    pub fn new(http: Client, url: String) -> Self {
        Self { http, url }
    }

    /// Fetches the raw glance forecast XML for a coordinate pair.
    pub async fn fetch(
        &self,
        latitude: &str,
        longitude: &str,
        config: &GlanceConfig,
    ) -> Result<String, UpstreamError> {
        let unit = config.unit.to_string();
        let response = self
            .http
            .get(&self.url)
            .query(&[
                ("lat", latitude),
                ("lon", longitude),
                ("unit", unit.as_str()),
                ("lg", config.language.as_str()),
                ("FcstType", "xml"),
            ])
            .send()
            .await?;

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
