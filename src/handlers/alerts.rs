//! The alerts endpoint
//!
//! Serves the CAP alert feed for one NWS zone. The feed's `updated` stamp
//! drives the cache TTL.

use super::Gateway;
use crate::error::ApiError;
use crate::xml::XmlObject;

const TIMESTAMP_PATH: &[&str] = &["feed", "updated"];

impl Gateway {
    /// Handles `GET /weather/alerts/{zone_id}`.
    pub async fn alerts(&self, zone_id: &str) -> Result<XmlObject, ApiError> {
        if zone_id.trim().is_empty() {
            return Err(ApiError::InvalidInput {
                message: "No zone ID provided. See: https://alerts.weather.gov/".to_string(),
                identifier: zone_id.to_string(),
            });
        }

        let key = format!("weather-alerts-{}", zone_id);
        if let Some(outcome) = self.cached(&key) {
            return outcome;
        }

        if !self.config.alerts.allow.permits(zone_id) {
            return Err(ApiError::Forbidden {
                message: "Zone ID not allowed. See: https://alerts.weather.gov/".to_string(),
                identifier: zone_id.to_string(),
            });
        }

        let upstream_id = self.sanitize_zone_id(zone_id);
        let fetched = self.alerts.fetch(&upstream_id).await;

        self.complete(
            &key,
            zone_id,
            "Zone ID invalid. See: https://alerts.weather.gov/",
            fetched,
            TIMESTAMP_PATH,
        )
    }
}
