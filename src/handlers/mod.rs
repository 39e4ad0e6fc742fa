//! Endpoint handlers
//!
//! The four endpoints share one shape: validate the path identifier, check
//! the cache, apply the allow-list, resolve coordinates when zip-based,
//! call the upstream, map known not-found shapes, parse, compute the TTL
//! from the payload's own timestamp, store, and return. [`Gateway`] holds
//! the shared collaborators; each endpoint lives in its own submodule.

mod alerts;
mod forecast;
mod glance;
mod observations;

use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::cache::{self, Cache};
use crate::config::{ConfigError, GatewayConfig};
use crate::coords::CoordinateResolver;
use crate::error::ApiError;
use crate::upstream::{
    self, AlertsClient, GlanceClient, NdfdClient, ObservationsClient, UpstreamError,
};
use crate::xml::{self, XmlObject};

/// Normalizes an identifier just before it is sent upstream.
pub type IdSanitizer = fn(&str) -> String;

/// What a cache entry holds for an endpoint: a parsed document, or a
/// not-found outcome that replays on later hits. Transport failures are
/// never stored.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) enum CachedResponse {
    Document(XmlObject),
    NotFound { message: String, identifier: String },
}

/// The gateway: configuration, cache, and upstream clients for all four
/// endpoints.
pub struct Gateway {
    pub(crate) config: GatewayConfig,
    pub(crate) cache: Cache,
    pub(crate) alerts: AlertsClient,
    pub(crate) observations: ObservationsClient,
    pub(crate) ndfd: NdfdClient,
    pub(crate) glance: GlanceClient,
    pub(crate) resolver: CoordinateResolver,
    sanitize_zone: Option<IdSanitizer>,
    sanitize_station: Option<IdSanitizer>,
    sanitize_forecast_zip: Option<IdSanitizer>,
    sanitize_glance_zip: Option<IdSanitizer>,
}

impl Gateway {
    /// Builds a gateway from configuration and an injected cache.
    pub fn new(config: GatewayConfig, cache: Cache) -> Result<Self, ConfigError> {
        let http = upstream::http_client(config.upstream.timeout_secs)?;

        let alerts = AlertsClient::new(http.clone(), config.upstream.alerts_url.clone());
        let observations =
            ObservationsClient::new(http.clone(), config.upstream.observations_url.clone());
        let ndfd = NdfdClient::new(http.clone(), config.upstream.ndfd_url.clone());
        let glance = GlanceClient::new(http, config.upstream.glance_url.clone());

        let pattern = Regex::new(&config.zip_pattern)?;
        let resolver = CoordinateResolver::new(ndfd.clone(), cache.clone(), pattern);

        Ok(Self {
            config,
            cache,
            alerts,
            observations,
            ndfd,
            glance,
            resolver,
            sanitize_zone: None,
            sanitize_station: None,
            sanitize_forecast_zip: None,
            sanitize_glance_zip: None,
        })
    }

    /// Installs a zone-id sanitizer for the alerts endpoint.
    pub fn with_zone_sanitizer(mut self, sanitizer: IdSanitizer) -> Self {
        self.sanitize_zone = Some(sanitizer);
        self
    }

    /// Installs a station sanitizer for the observations endpoint.
    pub fn with_station_sanitizer(mut self, sanitizer: IdSanitizer) -> Self {
        self.sanitize_station = Some(sanitizer);
        self
    }

    /// Installs a zip sanitizer for the forecast endpoint.
    pub fn with_forecast_zip_sanitizer(mut self, sanitizer: IdSanitizer) -> Self {
        self.sanitize_forecast_zip = Some(sanitizer);
        self
    }

    /// Installs a zip sanitizer for the forecast-glance endpoint.
    pub fn with_glance_zip_sanitizer(mut self, sanitizer: IdSanitizer) -> Self {
        self.sanitize_glance_zip = Some(sanitizer);
        self
    }

    pub(crate) fn sanitize_zone_id(&self, identifier: &str) -> String {
        apply(self.sanitize_zone, identifier)
    }

    pub(crate) fn sanitize_station_id(&self, identifier: &str) -> String {
        apply(self.sanitize_station, identifier)
    }

    pub(crate) fn sanitize_forecast_zip_code(&self, identifier: &str) -> String {
        apply(self.sanitize_forecast_zip, identifier)
    }

    pub(crate) fn sanitize_glance_zip_code(&self, identifier: &str) -> String {
        apply(self.sanitize_glance_zip, identifier)
    }

    /// Replays a cached outcome for `key`, if any.
    pub(crate) fn cached(&self, key: &str) -> Option<Result<XmlObject, ApiError>> {
        match self.cache.read::<CachedResponse>(key)? {
            CachedResponse::Document(document) => Some(Ok(document)),
            CachedResponse::NotFound { message, identifier } => {
                Some(Err(ApiError::NotFound { message, identifier }))
            }
        }
    }

    /// Turns a fetched upstream body into the endpoint result: maps
    /// not-found shapes (cached with the default TTL), surfaces transport
    /// failures uncached, and otherwise parses, computes the TTL from
    /// `timestamp_path`, stores, and returns the document.
    pub(crate) fn complete(
        &self,
        key: &str,
        identifier: &str,
        not_found_message: &str,
        fetched: Result<String, UpstreamError>,
        timestamp_path: &[&str],
    ) -> Result<XmlObject, ApiError> {
        let body = match fetched {
            Ok(body) => body,
            Err(UpstreamError::NotFound) => {
                let stored = CachedResponse::NotFound {
                    message: not_found_message.to_string(),
                    identifier: identifier.to_string(),
                };
                self.cache.write(key, &stored, Some(cache::DEFAULT_TTL));
                return Err(ApiError::NotFound {
                    message: not_found_message.to_string(),
                    identifier: identifier.to_string(),
                });
            }
            Err(error) => {
                tracing::warn!(key, identifier, %error, "upstream request failed");
                return Err(ApiError::Transport {
                    message: error.to_string(),
                    identifier: identifier.to_string(),
                });
            }
        };

        let parsed = xml::parse(&body);
        for diagnostic in &parsed.diagnostics {
            tracing::warn!(
                key,
                position = diagnostic.position,
                "response parse problem: {}",
                diagnostic.message
            );
        }

        let ttl = cache::ttl_for(&parsed.root, timestamp_path, Utc::now());
        let stored = CachedResponse::Document(parsed.root);
        self.cache.write(key, &stored, Some(ttl));

        match stored {
            CachedResponse::Document(document) => Ok(document),
            CachedResponse::NotFound { message, identifier } => {
                Err(ApiError::NotFound { message, identifier })
            }
        }
    }
}

fn apply(sanitizer: Option<IdSanitizer>, identifier: &str) -> String {
    match sanitizer {
        Some(sanitize) => sanitize(identifier),
        None => identifier.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_response_round_trips_documents() {
        let parsed = xml::parse("<feed><updated>t</updated></feed>");
        let stored = CachedResponse::Document(parsed.root.clone());
        let json = serde_json::to_string(&stored).expect("serialize");
        match serde_json::from_str::<CachedResponse>(&json).expect("deserialize") {
            CachedResponse::Document(document) => assert_eq!(document, parsed.root),
            CachedResponse::NotFound { .. } => panic!("expected a document"),
        }
    }

    #[test]
    fn test_cached_response_round_trips_not_found() {
        let stored = CachedResponse::NotFound {
            message: "Zone ID invalid.".to_string(),
            identifier: "XXX000".to_string(),
        };
        let json = serde_json::to_string(&stored).expect("serialize");
        match serde_json::from_str::<CachedResponse>(&json).expect("deserialize") {
            CachedResponse::NotFound { message, identifier } => {
                assert_eq!(message, "Zone ID invalid.");
                assert_eq!(identifier, "XXX000");
            }
            CachedResponse::Document(_) => panic!("expected a not-found marker"),
        }
    }
}
