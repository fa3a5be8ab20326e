//! Pure transforms from locations and snapshots to card view models.

use chrono::NaiveDate;
use skydeck_core::TemperatureUnit;
use skydeck_weather::{DayForecast, Location, WeatherSnapshot};

pub const LOADING_TEXT: &str = "Loading…";
const MISSING_VALUE: &str = "–";

#[derive(Debug, Clone, PartialEq)]
pub enum CardStatus {
    Loading,
    Ready,
    Failed(String),
}

impl CardStatus {
    /// Status line shown under the card title; empty once data is shown
    pub fn text(&self) -> &str {
        match self {
            CardStatus::Loading => LOADING_TEXT,
            CardStatus::Ready => "",
            CardStatus::Failed(message) => message,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastItemView {
    pub label: String,
    pub date: NaiveDate,
    pub high: String,
    pub low: String,
    pub precipitation: String,
}

/// One rendered card, linked to its location by `location_id`
#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub location_id: String,
    pub title: String,
    pub is_current: bool,
    pub status: CardStatus,
    pub current: Option<String>,
    pub items: Vec<ForecastItemView>,
}

impl CardView {
    /// Fresh card with the placeholder status
    pub fn placeholder(location: &Location) -> Self {
        Self {
            location_id: location.id.clone(),
            title: location.display_name.clone(),
            is_current: location.is_current,
            status: CardStatus::Loading,
            current: None,
            items: Vec::new(),
        }
    }
}

/// "Today", "Tomorrow", then a short weekday + day.month label
pub fn day_label(index: usize, date: NaiveDate) -> String {
    match index {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a %d.%m").to_string(),
    }
}

fn format_optional(value: Option<f64>, fmt: impl Fn(f64) -> String) -> String {
    value.map(fmt).unwrap_or_else(|| MISSING_VALUE.to_string())
}

pub fn forecast_item(index: usize, day: &DayForecast, unit: TemperatureUnit) -> ForecastItemView {
    ForecastItemView {
        label: day_label(index, day.date),
        date: day.date,
        high: format_optional(day.t_max, |t| unit.format(t)),
        low: format_optional(day.t_min, |t| unit.format(t)),
        precipitation: format_optional(day.precipitation, |p| format!("{:.1} mm", p)),
    }
}

/// Summary line for current conditions, e.g. "Now 12.3°C, wind 4.5 km/h"
pub fn current_line(snapshot: &WeatherSnapshot, unit: TemperatureUnit) -> Option<String> {
    snapshot.current.as_ref().map(|c| {
        format!(
            "Now {}, wind {:.1} km/h",
            unit.format(c.temperature),
            c.wind_speed
        )
    })
}

pub fn forecast_items(snapshot: &WeatherSnapshot, unit: TemperatureUnit) -> Vec<ForecastItemView> {
    snapshot
        .days
        .iter()
        .enumerate()
        .map(|(i, day)| forecast_item(i, day, unit))
        .collect()
}
