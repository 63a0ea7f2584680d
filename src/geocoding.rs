//! Nominatim place search
//!
//! Resolves a free-form place name to candidate coordinates through the
//! [Nominatim](https://nominatim.openstreetmap.org) API (OpenStreetMap).
//! Each query is a single request; callers decide how often to search.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT_LANGUAGE;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};
use tzf_rs::DefaultFinder;

use crate::location::{LocationRecord, StoreError};

/// Separator of the `lat|lon|name` dropdown encoding.
const DROPDOWN_SEPARATOR: char = '|';

static TZ_FINDER: LazyLock<DefaultFinder> = LazyLock::new(DefaultFinder::new);

/// IANA zone containing the given coordinates.
pub fn timezone_at(latitude: f64, longitude: f64) -> Option<String> {
    let name = TZ_FINDER.get_tz_name(longitude, latitude);
    debug!(latitude, longitude, tz = name, "Looked up time zone");
    (!name.is_empty()).then(|| name.to_string())
}

/// Configuration for the Nominatim geocoding service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NominatimConfig {
    /// Base URL for the Nominatim API
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_geocoding_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of candidates per search
    #[serde(default = "default_geocoding_limit")]
    pub limit: u32,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

const fn default_geocoding_timeout_secs() -> u64 {
    10
}

const fn default_geocoding_limit() -> u32 {
    6
}

fn default_user_agent() -> String {
    concat!("hebdate/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url:     default_geocoding_base_url(),
            timeout_secs: default_geocoding_timeout_secs(),
            limit:        default_geocoding_limit(),
            user_agent:   default_user_agent(),
        }
    }
}

impl NominatimConfig {
    /// Create a configuration pointing at a local mock server
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs: 5,
            ..Default::default()
        }
    }
}

/// Errors that can occur during geocoding
#[derive(Debug, Error)]
pub enum GeocodingError {
    /// Connection to geocoding service failed
    #[error("Geocoding connection failed: {0}")]
    ConnectionFailed(String),

    /// The service answered with a non-success status
    #[error("Geocoding request failed: {0}")]
    RequestFailed(String),

    /// Failed to parse geocoding response
    #[error("Geocoding parse error: {0}")]
    ParseError(String),

    /// Request timeout
    #[error("Geocoding request timed out")]
    Timeout,
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeCandidate {
    pub display_name: String,
    pub latitude:     f64,
    pub longitude:    f64,
}

impl GeocodeCandidate {
    /// Builds a location record in the given IANA zone.
    ///
    /// # Errors
    /// Returns the validation errors of [`LocationRecord::new`].
    pub fn to_location(&self, tz: &str) -> Result<LocationRecord, StoreError> {
        LocationRecord::new(
            self.display_name.clone(),
            self.latitude,
            self.longitude,
            tz,
            None,
        )
    }

    /// IANA zone at the candidate's coordinates.
    pub fn timezone(&self) -> Option<String> {
        timezone_at(self.latitude, self.longitude)
    }

    /// `lat|lon|name`, as used by selection lists.
    pub fn dropdown_value(&self) -> String {
        format!(
            "{}{DROPDOWN_SEPARATOR}{}{DROPDOWN_SEPARATOR}{}",
            self.latitude, self.longitude, self.display_name
        )
    }

    /// Parses a `lat|lon|name` value. The name may itself contain `|`.
    pub fn from_dropdown_value(value: &str) -> Option<Self> {
        let mut parts = value.splitn(3, DROPDOWN_SEPARATOR);
        let latitude = parts.next()?.trim().parse().ok()?;
        let longitude = parts.next()?.trim().parse().ok()?;
        let display_name = parts.next()?.to_string();
        Some(Self {
            display_name,
            latitude,
            longitude,
        })
    }
}

/// Trait for geocoding clients
#[async_trait]
pub trait GeocodingClient: Send + Sync {
    /// Search for places matching a free-form query
    async fn search(&self, query: &str) -> Result<Vec<GeocodeCandidate>, GeocodingError>;
}

/// Nominatim-based geocoding client
#[derive(Debug)]
pub struct NominatimGeocodingClient {
    client: Client,
    config: NominatimConfig,
}

impl NominatimGeocodingClient {
    /// Create a new Nominatim geocoding client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: &NominatimConfig) -> Result<Self, GeocodingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| GeocodingError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub const fn config(&self) -> &NominatimConfig {
        &self.config
    }
}

#[async_trait]
impl GeocodingClient for NominatimGeocodingClient {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<GeocodeCandidate>, GeocodingError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/search", self.config.base_url);
        let params = [
            ("format", "json".to_string()),
            ("limit", self.config.limit.to_string()),
            ("addressdetails", "0".to_string()),
            ("q", query.to_string()),
        ];

        debug!(%query, "Searching places");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT_LANGUAGE, "en")
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeocodingError::Timeout
                } else {
                    GeocodingError::ConnectionFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(GeocodingError::RequestFailed(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let results: Vec<NominatimResult> = response
            .json()
            .await
            .map_err(|e| GeocodingError::ParseError(e.to_string()))?;

        let candidates: Vec<GeocodeCandidate> = results
            .into_iter()
            .filter_map(NominatimResult::into_candidate)
            .collect();
        debug!(%query, count = candidates.len(), "Found places");

        Ok(candidates)
    }
}

/// Raw Nominatim API response
#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat:          String,
    lon:          String,
    display_name: Option<String>,
}

impl NominatimResult {
    fn into_candidate(self) -> Option<GeocodeCandidate> {
        let (Ok(latitude), Ok(longitude)) = (self.lat.parse::<f64>(), self.lon.parse::<f64>())
        else {
            debug!(lat = %self.lat, lon = %self.lon, "Skipping place with bad coordinates");
            return None;
        };
        Some(GeocodeCandidate {
            display_name: self.display_name.unwrap_or_default(),
            latitude,
            longitude,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nominatim_config_default() {
        let config = NominatimConfig::default();
        assert_eq!(config.base_url, "https://nominatim.openstreetmap.org");
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.limit, 6);
        assert!(config.user_agent.starts_with("hebdate/"));
    }

    #[test]
    fn test_nominatim_config_for_testing() {
        let config = NominatimConfig::for_testing("http://127.0.0.1:9999/");
        assert_eq!(config.base_url, "http://127.0.0.1:9999");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.limit, 6);
    }

    #[test]
    fn test_nominatim_config_partial_deserialization() {
        let config: NominatimConfig = serde_json::from_str(r#"{"limit": 3}"#).unwrap();
        assert_eq!(config.limit, 3);
        assert_eq!(config.base_url, default_geocoding_base_url());
    }

    #[test]
    fn test_geocoding_error_display() {
        let err = GeocodingError::RequestFailed("HTTP 503".to_string());
        assert!(err.to_string().contains("503"));

        let err = GeocodingError::Timeout;
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_nominatim_result_parsing() {
        let json = r#"[
            {"lat": "40.0821", "lon": "-74.2097", "display_name": "Lakewood, NJ"},
            {"lat": "north", "lon": "-74.0", "display_name": "Broken"},
            {"lat": "31.77", "lon": "35.21"}
        ]"#;
        let results: Vec<NominatimResult> = serde_json::from_str(json).unwrap();
        let candidates: Vec<_> = results
            .into_iter()
            .filter_map(NominatimResult::into_candidate)
            .collect();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].display_name, "Lakewood, NJ");
        assert!((candidates[0].latitude - 40.0821).abs() < f64::EPSILON);
        assert_eq!(candidates[1].display_name, "");
    }

    #[test]
    fn test_dropdown_value() {
        let candidate = GeocodeCandidate {
            display_name: "Jerusalem | Israel".to_string(),
            latitude:     31.7683,
            longitude:    35.2137,
        };
        let value = candidate.dropdown_value();
        assert_eq!(value, "31.7683|35.2137|Jerusalem | Israel");
        assert_eq!(GeocodeCandidate::from_dropdown_value(&value), Some(candidate));

        assert_eq!(GeocodeCandidate::from_dropdown_value("1|2"), None);
        assert_eq!(GeocodeCandidate::from_dropdown_value("x|2|Name"), None);
    }

    #[test]
    fn test_candidate_to_location() {
        let candidate = GeocodeCandidate {
            display_name: "Jerusalem".to_string(),
            latitude:     31.7683,
            longitude:    35.2137,
        };
        let record = candidate.to_location("Asia/Jerusalem").unwrap();
        assert_eq!(record.location_name, "Jerusalem");
        assert_eq!(record.tz, "Asia/Jerusalem");
        assert_eq!(record.elev, None);

        assert!(candidate.to_location("Not/AZone").is_err());
    }

    #[test]
    fn test_timezone_at() {
        struct TestCase {
            latitude:  f64,
            longitude: f64,
            expected:  &'static str,
        }

        let cases = [
            TestCase { latitude: 31.7683, longitude: 35.2137, expected: "Asia/Jerusalem" },
            TestCase { latitude: 40.0821, longitude: -74.2097, expected: "America/New_York" },
            TestCase { latitude: 51.5074, longitude: -0.1278, expected: "Europe/London" },
            TestCase { latitude: -33.8688, longitude: 151.2093, expected: "Australia/Sydney" },
        ];

        for case in &cases {
            assert_eq!(
                timezone_at(case.latitude, case.longitude).as_deref(),
                Some(case.expected),
                "({}, {})",
                case.latitude,
                case.longitude
            );
        }
    }

    #[test]
    fn test_candidate_timezone() {
        let candidate = GeocodeCandidate {
            display_name: "Jerusalem".to_string(),
            latitude:     31.7683,
            longitude:    35.2137,
        };
        assert_eq!(candidate.timezone().as_deref(), Some("Asia/Jerusalem"));
    }

    #[tokio::test]
    async fn test_empty_query_skips_request() {
        // Nothing listens here; an attempted request would fail
        let config = NominatimConfig::for_testing("http://127.0.0.1:9");
        let client = NominatimGeocodingClient::new(&config).unwrap();
        assert!(client.search("   ").await.unwrap().is_empty());
    }
}
