//! Zip-code-to-coordinate resolution
//!
//! Validates a postal code against a configurable pattern, then resolves it
//! to a latitude/longitude pair through the NDFD `LatLonListZipCode`
//! operation. Successful resolutions are cached without expiry; failures
//! are never cached, so a flaky upstream can recover on the next request.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::cache::Cache;
use crate::error::ApiError;
use crate::upstream::NdfdClient;
use crate::xml;

/// A resolved latitude/longitude pair, kept as the string-encoded values
/// the upstream produced (latitude in [-90, 90], longitude in [-180, 180]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinatePair {
    /// Latitude, e.g. `"35.9924"`.
    pub latitude: String,
    /// Longitude, e.g. `"-78.9043"`.
    pub longitude: String,
}

/// Resolves zip codes to coordinates with its own cache.
#[derive(Debug, Clone)]
pub struct CoordinateResolver {
    ndfd: NdfdClient,
    cache: Cache,
    pattern: Regex,
}

impl CoordinateResolver {
    /// Creates a resolver. `pattern` gates which inputs ever reach the
    /// upstream (default configuration: exactly five decimal digits).
    pub fn new(ndfd: NdfdClient, cache: Cache, pattern: Regex) -> Self {
        Self { ndfd, cache, pattern }
    }

    /// Whether `raw` is an acceptable zip code.
    pub fn is_zip_code(&self, raw: &str) -> bool {
        self.pattern.is_match(raw)
    }

    /// Resolves `zip_code` to a coordinate pair.
    ///
    /// Fails closed on pattern mismatch without issuing any upstream call.
    /// All failure modes surface as [`ApiError::ResolutionFailed`] with the
    /// zip code echoed back.
    pub async fn resolve(&self, zip_code: &str) -> Result<CoordinatePair, ApiError> {
        if !self.is_zip_code(zip_code) {
            return Err(ApiError::ResolutionFailed {
                identifier: zip_code.to_string(),
            });
        }

        let key = format!("weather-zip-code-lat-lon-{}", zip_code);
        if let Some(pair) = self.cache.read::<CoordinatePair>(&key) {
            return Ok(pair);
        }

        let body = match self.ndfd.lat_lon_list_zip_code(zip_code).await {
            Ok(body) => body,
            Err(error) => {
                tracing::warn!(zip_code, %error, "coordinate lookup failed");
                return Err(ApiError::ResolutionFailed {
                    identifier: zip_code.to_string(),
                });
            }
        };

        let parsed = xml::parse(&body);
        for diagnostic in &parsed.diagnostics {
            tracing::warn!(
                zip_code,
                position = diagnostic.position,
                "coordinate response parse problem: {}",
                diagnostic.message
            );
        }

        let pair = parsed
            .root
            .text_at(&["dwml", "latLonList"])
            .and_then(split_lat_lon)
            .ok_or_else(|| ApiError::ResolutionFailed {
                identifier: zip_code.to_string(),
            })?;

        // Coordinates for a zip code do not go stale; no TTL.
        self.cache.write(&key, &pair, None);

        Ok(pair)
    }
}

/// Splits a comma-separated `latitude,longitude` string. Anything other
/// than exactly two non-empty components yields no pair.
fn split_lat_lon(raw: &str) -> Option<CoordinatePair> {
    let mut parts = raw.split(',');
    let latitude = parts.next()?.trim();
    let longitude = parts.next()?.trim();
    if parts.next().is_some() || latitude.is_empty() || longitude.is_empty() {
        return None;
    }
    Some(CoordinatePair {
        latitude: latitude.to_string(),
        longitude: longitude.to_string(),
    })
}
