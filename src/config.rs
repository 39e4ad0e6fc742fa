//! Gateway configuration
//!
//! Every tunable of the four endpoints is an explicit, named field on a
//! per-endpoint config struct: allow-lists, forecast product/unit/time
//! window/parameter set, glance unit and language, the zip-code pattern,
//! upstream base URLs, and the request timeout. Configuration is loaded
//! from built-in defaults, then an optional TOML file.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for [`GatewayConfig`].
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configured zip pattern is not a valid regular expression.
    #[error("invalid zip_pattern: {0}")]
    ZipPattern(#[from] regex::Error),

    /// The upstream HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Which identifiers an endpoint will serve.
///
/// Deserializes from `true`/`false`, a single string, or a string array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AllowList {
    /// `true` serves any identifier; `false` serves none.
    Unrestricted(bool),
    /// Exactly one permitted identifier.
    One(String),
    /// A set of permitted identifiers.
    Set(Vec<String>),
}

impl Default for AllowList {
    fn default() -> Self {
        AllowList::Unrestricted(true)
    }
}

impl AllowList {
    /// Whether `identifier` may be requested.
    pub fn permits(&self, identifier: &str) -> bool {
        match self {
            AllowList::Unrestricted(open) => *open,
            AllowList::One(allowed) => allowed == identifier,
            AllowList::Set(allowed) => allowed.iter().any(|entry| entry == identifier),
        }
    }
}

/// Configuration for the alerts and current-observations endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Identifiers this endpoint will serve.
    pub allow: AllowList,
}

/// Configuration for the forecast endpoint (NDFD `NDFDgen`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Zip codes this endpoint will serve.
    pub allow: AllowList,
    /// NDFD product: "time-series" or "glance".
    pub product: String,
    /// Requested unit system: "e" (English) or "m" (metric).
    pub unit: String,
    /// Start of the requested window; empty means earliest available.
    pub start_time: String,
    /// End of the requested window; empty means latest available.
    pub end_time: String,
    /// Weather parameters to request.
    pub parameters: Vec<String>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            allow: AllowList::default(),
            product: "time-series".to_string(),
            unit: "e".to_string(),
            start_time: String::new(),
            end_time: String::new(),
            parameters: DEFAULT_WEATHER_PARAMETERS
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

/// Configuration for the forecast-glance endpoint (MapClick).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GlanceConfig {
    /// Zip codes this endpoint will serve.
    pub allow: AllowList,
    /// Unit selector: 0 for English, 1 for metric.
    pub unit: u8,
    /// Requested language.
    pub language: String,
}

impl Default for GlanceConfig {
    fn default() -> Self {
        Self {
            allow: AllowList::default(),
            unit: 0,
            language: "english".to_string(),
        }
    }
}

/// Upstream service locations and transport settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Alerts CAP feed endpoint.
    pub alerts_url: String,
    /// Base URL for per-station current observation documents.
    pub observations_url: String,
    /// NDFD SOAP endpoint (coordinate lookup and forecast).
    pub ndfd_url: String,
    /// MapClick endpoint for the glance forecast.
    pub glance_url: String,
    /// Timeout applied to every upstream call, in seconds.
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            alerts_url: "https://alerts.weather.gov/cap/wwaatmget.php".to_string(),
            observations_url: "https://w1.weather.gov/xml/current_obs".to_string(),
            ndfd_url: "https://graphical.weather.gov/xml/SOAP_server/ndfdXMLserver.php"
                .to_string(),
            glance_url: "https://forecast.weather.gov/MapClick.php".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Top-level gateway configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Alerts endpoint settings.
    pub alerts: EndpointConfig,
    /// Current-observations endpoint settings.
    pub observations: EndpointConfig,
    /// Forecast endpoint settings.
    pub forecast: ForecastConfig,
    /// Forecast-glance endpoint settings.
    pub glance: GlanceConfig,
    /// Pattern a zip code must match before any lookup happens.
    pub zip_pattern: String,
    /// Upstream locations and timeouts.
    pub upstream: UpstreamConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            alerts: EndpointConfig::default(),
            observations: EndpointConfig::default(),
            forecast: ForecastConfig::default(),
            glance: GlanceConfig::default(),
            zip_pattern: r"^\d{5}$".to_string(),
            upstream: UpstreamConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Loads configuration: defaults, overlaid by `path` when given.
    ///
    /// The zip pattern is compiled here so a bad config fails at startup
    /// rather than on the first forecast request.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path)?;
                toml::from_str(&contents)?
            }
            None => Self::default(),
        };
        regex::Regex::new(&config.zip_pattern)?;
        Ok(config)
    }
}

/// The full NDFD weather-parameter set requested by default.
pub const DEFAULT_WEATHER_PARAMETERS: &[&str] = &[
    "maxt", "mint", "temp", "dew", "appt", "pop12", "qpf", "snow", "sky", "rh", "wspd", "wdir",
    "wx", "icons", "waveh", "incw34", "incw50", "incw64", "cumw34", "cumw50", "cumw64", "wgust",
    "critfireo", "dryfireo", "conhazo", "ptornado", "phail", "ptstmwinds", "pxtornado", "pxhail",
    "pxtstmwinds", "ptotsvrtstm", "pxtotsvrtstm", "tmpabv14d", "tmpblw14d", "tmpabv30d",
    "tmpblw30d", "tmpabv90d", "tmpblw90d", "prcpabv14d", "prcpblw14d", "prcpabv30d", "prcpblw30d",
    "prcpabv90d", "prcpblw90d", "precipa_r", "sky_r", "td_r", "temp_r", "wdir_r", "wspd_r", "wwa",
    "iceaccum", "maxrh", "minrh",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list_defaults_open() {
        assert!(AllowList::default().permits("anything"));
    }

    #[test]
    fn test_allow_list_false_denies_everything() {
        assert!(!AllowList::Unrestricted(false).permits("anything"));
    }

    #[test]
    fn test_allow_list_single_value() {
        let allow = AllowList::One("12345".to_string());
        assert!(allow.permits("12345"));
        assert!(!allow.permits("54321"));
    }

    #[test]
    fn test_allow_list_set() {
        let allow = AllowList::Set(vec!["TXZ211".to_string(), "TXZ212".to_string()]);
        assert!(allow.permits("TXZ212"));
        assert!(!allow.permits("CAZ001"));
    }

    #[test]
    fn test_allow_list_deserializes_all_three_shapes() {
        #[derive(Deserialize)]
        struct Wrapper {
            allow: AllowList,
        }

        let boolean: Wrapper = toml::from_str("allow = true").expect("bool form");
        assert_eq!(boolean.allow, AllowList::Unrestricted(true));

        let single: Wrapper = toml::from_str(r#"allow = "12345""#).expect("string form");
        assert_eq!(single.allow, AllowList::One("12345".to_string()));

        let set: Wrapper = toml::from_str(r#"allow = ["12345", "54321"]"#).expect("array form");
        assert_eq!(
            set.allow,
            AllowList::Set(vec!["12345".to_string(), "54321".to_string()])
        );
    }

    #[test]
    fn test_defaults_match_the_upstream_contract() {
        let config = GatewayConfig::default();
        assert_eq!(config.forecast.product, "time-series");
        assert_eq!(config.forecast.unit, "e");
        assert!(config.forecast.start_time.is_empty());
        assert_eq!(config.glance.unit, 0);
        assert_eq!(config.glance.language, "english");
        assert_eq!(config.zip_pattern, r"^\d{5}$");
        assert!(config.forecast.parameters.iter().any(|p| p == "maxt"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults_elsewhere() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [alerts]
            allow = ["TXZ211"]

            [upstream]
            timeout_secs = 3
            "#,
        )
        .expect("partial config");

        assert!(config.alerts.allow.permits("TXZ211"));
        assert!(!config.alerts.allow.permits("TXZ999"));
        assert_eq!(config.upstream.timeout_secs, 3);
        assert_eq!(config.forecast.product, "time-series");
    }

    #[test]
    fn test_load_rejects_bad_zip_pattern() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, r#"zip_pattern = "([""#).expect("write config");

        let result = GatewayConfig::load(Some(&path));
        assert!(matches!(result, Err(ConfigError::ZipPattern(_))));
    }
}
