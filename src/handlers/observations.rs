//! The current-observations endpoint
//!
//! Serves the latest observation document for one reporting station. The
//! RFC 2822 observation time drives the cache TTL.

use super::Gateway;
use crate::error::ApiError;
use crate::xml::XmlObject;

const TIMESTAMP_PATH: &[&str] = &["current_observation", "observation_time_rfc822"];

const STATION_DIRECTORY: &str = "https://w1.weather.gov/xml/current_obs/seek.php";

impl Gateway {
    /// Handles `GET /weather/current-observations/{reporting_station}`.
    pub async fn current_observations(&self, station: &str) -> Result<XmlObject, ApiError> {
        if station.trim().is_empty() {
            return Err(ApiError::InvalidInput {
                message: format!("No reporting station provided. See: {}", STATION_DIRECTORY),
                identifier: station.to_string(),
            });
        }

        let key = format!("weather-current-observations-{}", station);
        if let Some(outcome) = self.cached(&key) {
            return outcome;
        }

        if !self.config.observations.allow.permits(station) {
            return Err(ApiError::Forbidden {
                message: format!("Reporting station not allowed. See: {}", STATION_DIRECTORY),
                identifier: station.to_string(),
            });
        }

        let upstream_id = self.sanitize_station_id(station);
        let fetched = self.observations.fetch(&upstream_id).await;

        self.complete(
            &key,
            station,
            &format!("Reporting station not found. See: {}", STATION_DIRECTORY),
            fetched,
            TIMESTAMP_PATH,
        )
    }
}
