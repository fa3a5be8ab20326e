//! Device position lookup.
//!
//! A position is requested once per cold start, with a hard timeout and no
//! caching of previous answers.

use crate::types::LocationError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// A resolved device position, optionally with the place name the source
/// already knows.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub city: Option<String>,
    pub country: Option<String>,
}

#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn locate(&self) -> Result<Position, LocationError>;
}

/// Approximate position from the public IP address
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    client: Client,
    url: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    city: Option<String>,
    country_name: Option<String>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

impl IpGeolocator {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, LocationError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    async fn lookup(&self) -> Result<Position, LocationError> {
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(LocationError::PermissionDenied);
        }
        if !status.is_success() {
            return Err(LocationError::Unavailable(format!("lookup returned {}", status)));
        }

        let body: IpLookupResponse = response.json().await.map_err(map_request_error)?;
        if body.error {
            return Err(LocationError::Unavailable(
                body.reason.unwrap_or_else(|| "lookup failed".to_string()),
            ));
        }

        match (body.latitude, body.longitude) {
            (Some(latitude), Some(longitude)) => Ok(Position {
                latitude,
                longitude,
                city: body.city.filter(|c| !c.is_empty()),
                country: body.country_name.filter(|c| !c.is_empty()),
            }),
            _ => Err(LocationError::Unavailable(
                "response has no coordinates".to_string(),
            )),
        }
    }
}

fn map_request_error(e: reqwest::Error) -> LocationError {
    if e.is_timeout() {
        LocationError::Timeout
    } else {
        LocationError::Unavailable(e.to_string())
    }
}

#[async_trait]
impl Geolocator for IpGeolocator {
    async fn locate(&self) -> Result<Position, LocationError> {
        tracing::debug!("Requesting device position from {}", self.url);
        let result = match tokio::time::timeout(self.timeout, self.lookup()).await {
            Ok(result) => result,
            Err(_) => Err(LocationError::Timeout),
        };

        match &result {
            Ok(pos) => tracing::info!("Located device at {}, {}", pos.latitude, pos.longitude),
            Err(e) => tracing::warn!("Geolocation failed (code {}): {}", e.code(), e),
        }
        result
    }
}

/// Always answers with the same outcome
#[derive(Debug, Clone)]
pub struct FixedGeolocator {
    outcome: Result<Position, LocationError>,
}

impl FixedGeolocator {
    pub fn at(position: Position) -> Self {
        Self {
            outcome: Ok(position),
        }
    }

    pub fn failing(error: LocationError) -> Self {
        Self { outcome: Err(error) }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn locate(&self) -> Result<Position, LocationError> {
        self.outcome.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn locator_for(server: &MockServer, timeout: Duration) -> IpGeolocator {
        IpGeolocator::new(format!("{}/json/", server.uri()), timeout).unwrap()
    }

    #[tokio::test]
    async fn test_locate_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("cache-control", "no-cache"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "latitude": 52.52,
                "longitude": 13.405,
                "city": "Berlin",
                "country_name": "Germany"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let pos = locator_for(&server, Duration::from_secs(5)).locate().await.unwrap();
        assert_eq!(pos.latitude, 52.52);
        assert_eq!(pos.city.as_deref(), Some("Berlin"));
        assert_eq!(pos.country.as_deref(), Some("Germany"));
    }

    #[tokio::test]
    async fn test_each_locate_asks_the_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("cache-control", "no-cache"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "latitude": 43.6028,
                "longitude": 39.7342
            })))
            .expect(2)
            .mount(&server)
            .await;

        let locator = locator_for(&server, Duration::from_secs(5));
        locator.locate().await.unwrap();
        let again = locator.locate().await.unwrap();
        assert_eq!(again.city, None);
    }

    #[tokio::test]
    async fn test_locate_forbidden_is_permission_denied() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = locator_for(&server, Duration::from_secs(5)).locate().await.unwrap_err();
        assert_eq!(err, LocationError::PermissionDenied);
    }

    #[tokio::test]
    async fn test_locate_error_body_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": true,
                "reason": "RateLimited"
            })))
            .mount(&server)
            .await;

        let err = locator_for(&server, Duration::from_secs(5)).locate().await.unwrap_err();
        assert_eq!(err, LocationError::Unavailable("RateLimited".to_string()));
        assert_eq!(err.code(), 2);
    }

    #[tokio::test]
    async fn test_locate_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "latitude": 1.0, "longitude": 2.0 }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let err = locator_for(&server, Duration::from_millis(50)).locate().await.unwrap_err();
        assert_eq!(err, LocationError::Timeout);
    }

    #[tokio::test]
    async fn test_fixed_geolocator() {
        let failing = FixedGeolocator::failing(LocationError::PermissionDenied);
        assert!(failing.locate().await.is_err());
    }
}
