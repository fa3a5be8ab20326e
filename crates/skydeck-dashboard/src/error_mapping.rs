//! Maps weather-crate errors to skydeck_core::AppError for consistent
//! user-facing messages.

use skydeck_core::{AppError, LocationError as CoreLocationError, NetworkError, ReqwestErrorExt};
use skydeck_weather::{LocationError, WeatherError};

pub fn weather_error(e: WeatherError) -> AppError {
    match e {
        WeatherError::Network(err) => AppError::Network(err.into_network_error()),
        WeatherError::Http { status } => AppError::Network(NetworkError::ServerError {
            status,
            message: format!("HTTP error: {}", status),
        }),
        WeatherError::Parse(msg) => AppError::Network(NetworkError::InvalidResponse(msg)),
    }
}

pub fn location_error(e: &LocationError) -> AppError {
    let mapped = match e {
        LocationError::PermissionDenied => CoreLocationError::PermissionDenied,
        LocationError::Unavailable(reason) => CoreLocationError::Unavailable(reason.clone()),
        LocationError::Timeout => CoreLocationError::Timeout,
    };
    AppError::Location(mapped)
}

/// Text shown on a card whose refresh failed, e.g.
/// "The server is experiencing issues. Please try again later. (HTTP error: 503)"
pub fn card_error_text(e: WeatherError) -> String {
    let detail = e.to_string();
    let app_err = weather_error(e);
    format!("{} ({})", app_err.user_message(), detail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_maps_to_server_error() {
        let err = weather_error(WeatherError::Http { status: 502 });
        assert!(matches!(
            err,
            AppError::Network(NetworkError::ServerError { status: 502, .. })
        ));
    }

    #[test]
    fn test_card_error_text_keeps_status() {
        let text = card_error_text(WeatherError::Http { status: 404 });
        assert!(text.starts_with("The request failed."));
        assert!(text.contains("404"));
    }

    #[test]
    fn test_location_errors_keep_kind() {
        assert!(matches!(
            location_error(&LocationError::Timeout),
            AppError::Location(CoreLocationError::Timeout)
        ));
        assert!(location_error(&LocationError::PermissionDenied)
            .user_message()
            .contains("denied"));
    }
}
