use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::cities::City;

/// Id of the single geolocated entry
pub const CURRENT_LOCATION_ID: &str = "current";

/// Number of forecast days kept per location (today + 2)
pub const MIN_FORECAST_DAYS: usize = 3;

/// Key the dashboard state is persisted under
pub const STORAGE_KEY: &str = "weather_app_state_v1";

/// One tracked place: the device position or a manually added city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    #[serde(default)]
    pub is_current: bool,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub city_name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    pub display_name: String,
}

impl Location {
    /// The geolocated entry. Falls back to a generic title when no place
    /// name is known.
    pub fn current(lat: f64, lon: f64, city_name: Option<String>, country: Option<String>) -> Self {
        let display_name = match (&city_name, &country) {
            (Some(city), Some(country)) => format!("My location: {}, {}", city, country),
            (Some(city), None) => format!("My location: {}", city),
            _ => "My location".to_string(),
        };

        Self {
            id: CURRENT_LOCATION_ID.to_string(),
            is_current: true,
            lat,
            lon,
            city_name,
            country,
            display_name,
        }
    }

    /// A manually added city from the catalog
    pub fn from_city(city: &City) -> Self {
        Self {
            id: city_id(city.name, city.country),
            is_current: false,
            lat: city.lat,
            lon: city.lon,
            city_name: Some(city.name.to_string()),
            country: Some(city.country.to_string()),
            display_name: format!("{}, {}", city.name, city.country),
        }
    }
}

/// Stable id for a manually added city, e.g. `city:new-york:usa`
pub fn city_id(name: &str, country: &str) -> String {
    fn slug(s: &str) -> String {
        s.trim().to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
    }
    format!("city:{}:{}", slug(name), slug(country))
}

/// Current conditions as reported by the forecast API
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub temperature: f64,
    pub wind_speed: f64,
    /// Local observation time as sent by the API (`YYYY-MM-DDTHH:MM`)
    pub time: String,
}

/// Daily forecast entry
#[derive(Debug, Clone, PartialEq)]
pub struct DayForecast {
    pub date: NaiveDate,
    pub t_max: Option<f64>,
    pub t_min: Option<f64>,
    pub precipitation: Option<f64>,
}

/// Normalized forecast for one location. Recomputed on every refresh.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeatherSnapshot {
    pub current: Option<CurrentConditions>,
    /// At most [`MIN_FORECAST_DAYS`] entries, in API order
    pub days: Vec<DayForecast>,
}

/// Everything that is persisted between runs
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default)]
    pub locations: Vec<Location>,
}

impl AppState {
    /// Repair the list invariants after loading: the `current` id always
    /// marks the geolocated entry, no other id may claim to be current, and
    /// ids are unique. Returns how many entries were dropped.
    pub fn sanitize(&mut self) -> usize {
        let before = self.locations.len();
        let mut seen = HashSet::new();

        self.locations.retain_mut(|loc| {
            if loc.id == CURRENT_LOCATION_ID {
                loc.is_current = true;
            } else if loc.is_current {
                return false;
            }
            seen.insert(loc.id.clone())
        });

        before - self.locations.len()
    }
}

/// Geolocation failures, keyed to the standard position error codes
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location unavailable: {0}")]
    Unavailable(String),
    #[error("Location request timed out")]
    Timeout,
}

impl LocationError {
    /// 1 = permission denied, 2 = position unavailable, 3 = timeout
    pub fn code(&self) -> u8 {
        match self {
            Self::PermissionDenied => 1,
            Self::Unavailable(_) => 2,
            Self::Timeout => 3,
        }
    }
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: {status}")]
    Http { status: u16 },
    #[error("Parse error: {0}")]
    Parse(String),
}
