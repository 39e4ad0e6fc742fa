//! govwx library
//!
//! A caching HTTP gateway in front of the legacy weather.gov XML and SOAP
//! services: alerts, current observations, forecast, and forecast glance.

pub mod cache;
pub mod cli;
pub mod config;
pub mod coords;
pub mod error;
pub mod handlers;
pub mod server;
pub mod upstream;
pub mod xml;
