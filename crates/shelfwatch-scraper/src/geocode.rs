//! Geocoding collaborator client.
//!
//! Retailer addresses are persisted with NULL coordinates; a separate
//! backfill pass resolves them through a Nominatim-style search endpoint.
//! The service is rate-limited externally (one request per second), so the
//! backfill loop — not this client — spaces its calls. An address the
//! service cannot resolve stays un-geocoded indefinitely; that is a normal
//! outcome, not an error.

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;

use crate::error::ScraperError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One search result from the geocoding endpoint. Nominatim returns
/// coordinates as decimal strings.
#[derive(Debug, Deserialize)]
struct GeocodePlace {
    lat: String,
    lon: String,
}

pub struct Geocoder {
    client: reqwest::Client,
    endpoint: String,
}

impl Geocoder {
    /// Creates a geocoder against the given search endpoint
    /// (e.g. `https://nominatim.openstreetmap.org/search`).
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn new(
        endpoint: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ScraperError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Resolves an address to coordinates, or `None` when the service has
    /// no match.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Http`] — network failure or timeout.
    /// - [`ScraperError::UnexpectedStatus`] — non-2xx response.
    /// - [`ScraperError::GeocodeParse`] — response body is not the expected
    ///   JSON array.
    pub async fn geocode(&self, address: &str) -> Result<Option<Coordinates>, ScraperError> {
        let url = format!(
            "{}?format=json&q={}",
            self.endpoint,
            utf8_percent_encode(address, NON_ALPHANUMERIC)
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        let places: Vec<GeocodePlace> =
            serde_json::from_str(&body).map_err(|e| ScraperError::GeocodeParse {
                address: address.to_string(),
                source: e,
            })?;

        let Some(place) = places.first() else {
            return Ok(None);
        };

        match (place.lat.parse::<f64>(), place.lon.parse::<f64>()) {
            (Ok(latitude), Ok(longitude)) => Ok(Some(Coordinates {
                latitude,
                longitude,
            })),
            _ => {
                tracing::warn!(
                    address,
                    lat = %place.lat,
                    lon = %place.lon,
                    "geocoder returned non-numeric coordinates; leaving address un-geocoded"
                );
                Ok(None)
            }
        }
    }
}
