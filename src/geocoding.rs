//! Address geocoding against the HERE geocode endpoint
//!
//! [`Geocoder::lookup`] returns a typed result that keeps network failures,
//! empty result sets and malformed payloads apart. [`Geocoder::geocode_address`]
//! is the legacy contract: it never fails and reports every problem as empty
//! string coordinates.

use crate::config::Config;
use crate::error::{MatcherError, Result};
use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize, Serializer};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GeocodeError {
    #[error("address is empty")]
    InvalidAddress,

    #[error("http error: {0}")]
    Http(String),

    #[error("geocoder returned status {0}")]
    Status(u16),

    #[error("no results for address")]
    NoResults,

    #[error("malformed geocoder response: {0}")]
    Malformed(String),
}

/// Top match for an address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub label: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub query_score: Option<f64>,
}

/// One coordinate in the legacy shape: a number, or `""` when unresolved
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coordinate {
    Value(f64),
    Unresolved,
}

impl Serialize for Coordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Coordinate::Value(v) => serializer.serialize_f64(*v),
            Coordinate::Unresolved => serializer.serialize_str(""),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LegacyCoordinates {
    pub lat: Coordinate,
    pub lon: Coordinate,
}

impl LegacyCoordinates {
    pub fn unresolved() -> Self {
        Self {
            lat: Coordinate::Unresolved,
            lon: Coordinate::Unresolved,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(
            (self.lat, self.lon),
            (Coordinate::Value(_), Coordinate::Value(_))
        )
    }
}

impl From<std::result::Result<GeocodeResult, GeocodeError>> for LegacyCoordinates {
    fn from(result: std::result::Result<GeocodeResult, GeocodeError>) -> Self {
        match result {
            Ok(found) => Self {
                lat: Coordinate::Value(found.lat),
                lon: Coordinate::Value(found.lon),
            },
            Err(_) => Self::unresolved(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    items: Vec<GeocodeItem>,
}

#[derive(Debug, Deserialize)]
struct GeocodeItem {
    #[serde(default)]
    address: ItemAddress,
    position: ItemPosition,
    scoring: Option<ItemScoring>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemAddress {
    label: Option<String>,
    city: Option<String>,
    postal_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ItemPosition {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemScoring {
    query_score: Option<f64>,
}

/// Parse a geocode response body and take the first item
pub fn parse_response(body: &str) -> std::result::Result<GeocodeResult, GeocodeError> {
    let response: GeocodeResponse =
        serde_json::from_str(body).map_err(|e| GeocodeError::Malformed(e.to_string()))?;

    let item = response
        .items
        .into_iter()
        .next()
        .ok_or(GeocodeError::NoResults)?;

    let (lat, lon) = (item.position.lat, item.position.lng);
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(GeocodeError::Malformed(format!(
            "coordinates out of range: {}, {}",
            lat, lon
        )));
    }

    Ok(GeocodeResult {
        label: item.address.label,
        city: item.address.city,
        postal_code: item.address.postal_code,
        lat,
        lon,
        query_score: item.scoring.and_then(|s| s.query_score),
    })
}

pub struct Geocoder {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl Geocoder {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MatcherError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.geocoder_api_key();
        if api_key.is_none() {
            warn!("No geocoder API key configured; lookups will likely be rejected");
        }
        Self::new(
            config.geocoding.endpoint.clone(),
            api_key,
            Duration::from_secs(config.geocoding.timeout_secs),
        )
    }

    /// Single GET, no retries. Failures are logged at `warn`.
    pub async fn lookup(&self, address: &str) -> std::result::Result<GeocodeResult, GeocodeError> {
        let result = self.request(address).await;
        if let Err(e) = &result {
            warn!("Geocoding '{}' failed: {}", address, e);
        }
        result
    }

    async fn request(&self, address: &str) -> std::result::Result<GeocodeResult, GeocodeError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(GeocodeError::InvalidAddress);
        }

        let mut params = vec![("q", address)];
        if let Some(key) = &self.api_key {
            params.push(("apiKey", key.as_str()));
        }

        debug!("Geocoding '{}' via {}", address, self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await
            .map_err(|e| GeocodeError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GeocodeError::Http(e.to_string()))?;

        parse_response(&body)
    }

    /// Legacy contract: `{"lat": "", "lon": ""}` on any failure
    pub async fn geocode_address(&self, address: &str) -> LegacyCoordinates {
        LegacyCoordinates::from(self.lookup(address).await)
    }
}
