//! The forecast endpoint
//!
//! Resolves the requested zip code to coordinates, then asks the NDFD SOAP
//! service for a DWML time-series forecast. The product creation date
//! drives the cache TTL.

use super::Gateway;
use crate::error::ApiError;
use crate::xml::XmlObject;

const TIMESTAMP_PATH: &[&str] = &["dwml", "head", "product", "creation-date"];

impl Gateway {
    /// Handles `GET /weather/forecast/{zip_code}`.
    pub async fn forecast(&self, zip_code: &str) -> Result<XmlObject, ApiError> {
        if !self.resolver.is_zip_code(zip_code) {
            return Err(ApiError::InvalidInput {
                message: "Zip code provided does not validate.".to_string(),
                identifier: zip_code.to_string(),
            });
        }

        let key = format!("weather-forecast-{}", zip_code);
        if let Some(outcome) = self.cached(&key) {
            return outcome;
        }

        if !self.config.forecast.allow.permits(zip_code) {
            return Err(ApiError::Forbidden {
                message: "Zip code not allowed.".to_string(),
                identifier: zip_code.to_string(),
            });
        }

        let upstream_zip = self.sanitize_forecast_zip_code(zip_code);
        let pair = self.resolver.resolve(&upstream_zip).await?;

        let fetched = self
            .ndfd
            .ndfd_gen(&pair.latitude, &pair.longitude, &self.config.forecast)
            .await;

        self.complete(
            &key,
            zip_code,
            "Forecast not available for this location.",
            fetched,
            TIMESTAMP_PATH,
        )
    }
}
