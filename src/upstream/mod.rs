//! Upstream weather.gov service clients
//!
//! Thin clients for the four legacy services the gateway fronts: the CAP
//! alerts feed, per-station current observations, the MapClick glance
//! forecast (all plain HTTP + XML), and the NDFD SOAP service used for
//! both the detailed forecast and zip-code-to-coordinate resolution.
//! Clients fetch raw document text; parsing belongs to the handlers.

mod alerts;
mod glance;
mod ndfd;
mod observations;

pub use alerts::AlertsClient;
pub use glance::GlanceClient;
pub use ndfd::NdfdClient;
pub use observations::ObservationsClient;

use thiserror::Error;

/// Identifies the gateway to the upstream services, which reject
/// anonymous clients.
pub const USER_AGENT: &str = concat!("govwx/", env!("CARGO_PKG_VERSION"));

/// Failures talking to an upstream service.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The request could not be sent or the response body not read.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The upstream answered with an unexpected status code.
    #[error("upstream returned status {0}")]
    Status(u16),

    /// The upstream reports the requested resource as absent.
    #[error("resource not found upstream")]
    NotFound,

    /// The SOAP service answered with a fault or an empty result.
    #[error("SOAP fault: {0}")]
    Fault(String),
}

/// Builds the shared HTTP client with the configured timeout.
pub fn http_client(timeout_secs: u64) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT)
        .build()
}
