//! Open-Meteo forecast client.

use crate::types::{
    CurrentConditions, DayForecast, WeatherError, WeatherSnapshot, MIN_FORECAST_DAYS,
};
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,precipitation_sum";

/// Raw forecast response. Every section is optional; missing arrays are
/// treated as empty.
#[derive(Debug, Default, Deserialize)]
pub struct ApiForecast {
    #[serde(default)]
    pub current_weather: Option<ApiCurrentWeather>,
    #[serde(default)]
    pub daily: Option<ApiDaily>,
}

/// Current conditions block. Incomplete blocks are dropped, not rejected.
#[derive(Debug, Default, Deserialize)]
pub struct ApiCurrentWeather {
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub windspeed: Option<f64>,
    #[serde(default)]
    pub time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiDaily {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_sum: Vec<Option<f64>>,
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: String,
}

impl WeatherProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetch and normalize the forecast for one position.
    ///
    /// Any non-2xx status is an error; the body is never interpreted as an
    /// empty forecast.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch(&self, lat: f64, lon: f64) -> Result<WeatherSnapshot, WeatherError> {
        let url = format!("{}/v1/forecast", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("current_weather", "true".to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Forecast request for {},{} returned {}", lat, lon, status);
            return Err(WeatherError::Http {
                status: status.as_u16(),
            });
        }

        let body: ApiForecast = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        let snapshot = normalize(body)?;
        tracing::debug!("Fetched {} forecast days for {},{}", snapshot.days.len(), lat, lon);
        Ok(snapshot)
    }
}

/// Convert the raw response into a [`WeatherSnapshot`], keeping at most
/// [`MIN_FORECAST_DAYS`] days. A day is emitted only while a date exists;
/// shorter value arrays yield `None` for the missing fields.
pub fn normalize(api: ApiForecast) -> Result<WeatherSnapshot, WeatherError> {
    let current = api.current_weather.and_then(|c| match (c.temperature, c.windspeed, c.time) {
        (Some(temperature), Some(wind_speed), Some(time)) => Some(CurrentConditions {
            temperature,
            wind_speed,
            time,
        }),
        _ => None,
    });

    let daily = api.daily.unwrap_or_default();
    let value_at = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();

    let days = daily
        .time
        .iter()
        .take(MIN_FORECAST_DAYS)
        .enumerate()
        .map(|(i, date)| -> Result<DayForecast, WeatherError> {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|e| WeatherError::Parse(format!("bad date {:?}: {}", date, e)))?;
            Ok(DayForecast {
                date,
                t_max: value_at(&daily.temperature_2m_max, i),
                t_min: value_at(&daily.temperature_2m_min, i),
                precipitation: value_at(&daily.precipitation_sum, i),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(WeatherSnapshot { current, days })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_body(days: usize) -> serde_json::Value {
        let dates: Vec<String> = (1..=days).map(|d| format!("2026-10-{:02}", d)).collect();
        let highs: Vec<f64> = (0..days).map(|d| 10.0 + d as f64).collect();
        let lows: Vec<f64> = (0..days).map(|d| d as f64).collect();
        let precip: Vec<f64> = vec![0.5; days];
        json!({
            "current_weather": { "temperature": 12.3, "windspeed": 4.5, "time": "2026-10-01T12:00" },
            "daily": {
                "time": dates,
                "temperature_2m_max": highs,
                "temperature_2m_min": lows,
                "precipitation_sum": precip
            }
        })
    }

    #[test]
    fn test_normalize_truncates_to_window() {
        let api: ApiForecast = serde_json::from_value(sample_body(7)).unwrap();
        let snapshot = normalize(api).unwrap();

        assert_eq!(snapshot.days.len(), MIN_FORECAST_DAYS);
        assert_eq!(snapshot.days[0].date, NaiveDate::from_ymd_opt(2026, 10, 1).unwrap());
        assert_eq!(snapshot.days[2].t_max, Some(12.0));
        let current = snapshot.current.unwrap();
        assert_eq!(current.wind_speed, 4.5);
        assert_eq!(current.time, "2026-10-01T12:00");
    }

    #[test]
    fn test_normalize_short_and_missing_arrays() {
        let api: ApiForecast = serde_json::from_value(json!({
            "daily": {
                "time": ["2026-10-01", "2026-10-02"],
                "temperature_2m_max": [20.0],
                "temperature_2m_min": [null, 3.0]
            }
        }))
        .unwrap();
        let snapshot = normalize(api).unwrap();

        assert!(snapshot.current.is_none());
        assert_eq!(snapshot.days.len(), 2);
        assert_eq!(snapshot.days[0].t_max, Some(20.0));
        assert_eq!(snapshot.days[1].t_max, None);
        assert_eq!(snapshot.days[0].t_min, None);
        assert_eq!(snapshot.days[1].t_min, Some(3.0));
        assert_eq!(snapshot.days[1].precipitation, None);
    }

    #[test]
    fn test_incomplete_current_block_keeps_days() {
        let mut body = sample_body(3);
        body["current_weather"] = json!({ "temperature": null, "windspeed": 4.5 });
        let api: ApiForecast = serde_json::from_value(body).unwrap();
        let snapshot = normalize(api).unwrap();

        assert!(snapshot.current.is_none());
        assert_eq!(snapshot.days.len(), 3);
        assert_eq!(snapshot.days[0].t_max, Some(10.0));
    }

    #[test]
    fn test_normalize_empty_response() {
        let snapshot = normalize(ApiForecast::default()).unwrap();
        assert_eq!(snapshot, WeatherSnapshot::default());
    }

    #[test]
    fn test_normalize_rejects_bad_date() {
        let api: ApiForecast =
            serde_json::from_value(json!({ "daily": { "time": ["yesterday"] } })).unwrap();
        assert!(matches!(normalize(api), Err(WeatherError::Parse(_))));
    }

    #[tokio::test]
    async fn test_fetch_sends_expected_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "55.7558"))
            .and(query_param("longitude", "37.6176"))
            .and(query_param("daily", DAILY_FIELDS))
            .and(query_param("current_weather", "true"))
            .and(query_param("timezone", "auto"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body(5)))
            .expect(1)
            .mount(&server)
            .await;

        let provider = WeatherProvider::new(server.uri(), Duration::from_secs(5)).unwrap();
        let snapshot = provider.fetch(55.7558, 37.6176).await.unwrap();
        assert_eq!(snapshot.days.len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_non_success_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(500).set_body_json(sample_body(3)))
            .mount(&server)
            .await;

        let provider = WeatherProvider::new(server.uri(), Duration::from_secs(5)).unwrap();
        let err = provider.fetch(1.0, 2.0).await.unwrap_err();
        assert!(matches!(err, WeatherError::Http { status: 500 }));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_fetch_malformed_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let provider = WeatherProvider::new(format!("{}/", server.uri()), Duration::from_secs(5))
            .unwrap();
        assert!(matches!(
            provider.fetch(1.0, 2.0).await,
            Err(WeatherError::Parse(_))
        ));
    }
}
