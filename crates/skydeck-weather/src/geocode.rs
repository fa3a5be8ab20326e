//! Reverse geocoding: convert coordinates to a city and country.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/reverse";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("skydeck/", env!("CARGO_PKG_VERSION"));

/// A human-readable place for a coordinate pair
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceName {
    pub city: String,
    pub country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    county: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

/// Reverse geocode coordinates against a Nominatim-compatible `endpoint`
/// such as [`NOMINATIM_URL`]. Returns `None` on failure or timeout; the
/// caller keeps the coordinates.
pub async fn reverse_geocode_at(endpoint: &str, lat: f64, lon: f64) -> Option<PlaceName> {
    let client = match Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to create geocoding client: {}", e);
            return None;
        }
    };

    let url = format!(
        "{}?lat={}&lon={}&format=json&addressdetails=1&layer=address&zoom=10",
        endpoint, lat, lon
    );

    let response = match client.get(&url).send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!("Reverse geocode request failed: {}", e);
            return None;
        }
    };

    if !response.status().is_success() {
        tracing::debug!("Reverse geocode returned status {}", response.status());
        return None;
    }

    let body: NominatimResponse = match response.json().await {
        Ok(b) => b,
        Err(e) => {
            tracing::debug!("Reverse geocode parse error: {}", e);
            return None;
        }
    };

    let addr = body.address?;
    let country = addr.country.clone().filter(|c| !c.is_empty());

    // Prefer city > town > village > municipality for the primary place name
    let city = addr
        .city
        .or(addr.town)
        .or(addr.village)
        .or(addr.municipality)
        .or(addr.county)
        .or(addr.state)
        .or(addr.country)
        .filter(|c| !c.is_empty())?;

    tracing::info!("Reverse geocoded to: {}", city);
    Some(PlaceName { city, country })
}
