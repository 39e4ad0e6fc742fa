//! The forecast-glance endpoint
//!
//! The lightweight MapClick rendition of the forecast for a zip code. The
//! `creationTime` stamp drives the cache TTL.

use super::Gateway;
use crate::error::ApiError;
use crate::xml::XmlObject;

const TIMESTAMP_PATH: &[&str] = &["Forecast", "creationTime"];

impl Gateway {
    /// Handles `GET /weather/forecast-glance/{zip_code}`.
    pub async fn forecast_glance(&self, zip_code: &str) -> Result<XmlObject, ApiError> {
        if !self.resolver.is_zip_code(zip_code) {
            return Err(ApiError::InvalidInput {
                message: "Zip code provided does not validate.".to_string(),
                identifier: zip_code.to_string(),
            });
        }

        let key = format!("weather-forecast-glance-{}", zip_code);
        if let Some(outcome) = self.cached(&key) {
            return outcome;
        }

        if !self.config.glance.allow.permits(zip_code) {
            return Err(ApiError::Forbidden {
                message: "Zip code not allowed.".to_string(),
                identifier: zip_code.to_string(),
            });
        }

        let upstream_zip = self.sanitize_glance_zip_code(zip_code);
        let pair = self.resolver.resolve(&upstream_zip).await?;

        let fetched = self
            .glance
            .fetch(&pair.latitude, &pair.longitude, &self.config.glance)
            .await;

        self.complete(
            &key,
            zip_code,
            "Glance forecast not available for this location.",
            fetched,
            TIMESTAMP_PATH,
        )
    }
}
