//! Keeps the location store, persisted state and dashboard cards in step.
//!
//! Every user action goes through the same path: mutate the store (which
//! persists), then bring the affected cards up to date.

use std::time::Duration;

use tokio::task::JoinSet;

use skydeck_core::{AppError, Config, WeatherError as CoreWeatherError};
use skydeck_weather::geocode::{reverse_geocode_at, NOMINATIM_URL};
use skydeck_weather::{
    cities, FileStorage, Geolocator, IpGeolocator, Location, LocationStore, Position,
    RemoveOutcome, WeatherError, WeatherProvider, WeatherSnapshot,
};

use crate::dashboard::Dashboard;
use crate::error_mapping;

/// How `start` brought the dashboard up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Saved locations were restored and refreshed
    Restored,
    /// The device position seeded the list
    Located,
    /// Nothing saved and the position lookup failed
    LocationFailed,
}

/// Result of a refresh-all pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshSummary {
    pub total: usize,
    pub succeeded: usize,
}

pub struct Controller {
    store: LocationStore,
    provider: WeatherProvider,
    geolocator: Box<dyn Geolocator>,
    dashboard: Dashboard,
    geocode_endpoint: Option<String>,
}

impl Controller {
    pub fn new(
        store: LocationStore,
        provider: WeatherProvider,
        geolocator: Box<dyn Geolocator>,
        dashboard: Dashboard,
    ) -> Self {
        Self {
            store,
            provider,
            geolocator,
            dashboard,
            geocode_endpoint: None,
        }
    }

    /// Look up a place name for positions that arrive without one
    pub fn with_reverse_geocoding(mut self, endpoint: impl Into<String>) -> Self {
        self.geocode_endpoint = Some(endpoint.into());
        self
    }

    /// Wire up the production services described by `config`
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let provider = WeatherProvider::new(
            config.weather.api_url.clone(),
            Duration::from_secs(config.weather.request_timeout_secs),
        )
        .map_err(error_mapping::weather_error)?;

        let geolocator = IpGeolocator::new(
            config.location.geolocation_url.clone(),
            Duration::from_secs(config.location.geolocation_timeout_secs),
        )
        .map_err(|e| error_mapping::location_error(&e))?;

        let store = LocationStore::open(Box::new(FileStorage::new(
            config.storage.data_dir.clone(),
        )));

        let controller = Self::new(
            store,
            provider,
            Box::new(geolocator),
            Dashboard::new(config.weather.temperature_unit),
        );

        Ok(if config.location.reverse_geocode {
            controller.with_reverse_geocoding(NOMINATIM_URL)
        } else {
            controller
        })
    }

    /// Cold start: refresh the restored list, or seed it from the device
    /// position when nothing usable was saved.
    pub async fn start(&mut self) -> StartOutcome {
        self.dashboard.reconcile(self.store.locations());

        if !self.store.needs_bootstrap() {
            self.refresh_all().await;
            return StartOutcome::Restored;
        }

        if self.bootstrap().await {
            StartOutcome::Located
        } else {
            StartOutcome::LocationFailed
        }
    }

    /// Ask for the device position once. No retry on failure.
    async fn bootstrap(&mut self) -> bool {
        self.dashboard.set_status("Determining your location…");

        let position = match self.geolocator.locate().await {
            Ok(position) => position,
            Err(e) => {
                self.dashboard.show_geo_error(&e);
                return false;
            }
        };

        let location = Location::current(
            position.latitude,
            position.longitude,
            position.city.clone(),
            position.country.clone(),
        );
        let id = location.id.clone();

        self.store.add(location.clone());
        self.dashboard.render_card(&location);
        self.dashboard.clear_status();

        if location.city_name.is_none() {
            self.name_current_location(&position).await;
        }
        self.refresh_location(&id).await;
        true
    }

    /// Swap the bare "My location" title for a looked-up place name
    async fn name_current_location(&mut self, position: &Position) {
        let Some(endpoint) = &self.geocode_endpoint else {
            return;
        };
        let Some(place) =
            reverse_geocode_at(endpoint, position.latitude, position.longitude).await
        else {
            return;
        };

        let named = Location::current(
            position.latitude,
            position.longitude,
            Some(place.city),
            place.country.or_else(|| position.country.clone()),
        );
        if self.store.update(named) {
            self.dashboard.reconcile(self.store.locations());
        }
    }

    /// Track a catalog city and load its forecast. Returns `None` when the
    /// city was already on the dashboard.
    pub async fn add_city(&mut self, query: &str) -> Result<Option<Location>, AppError> {
        let city = cities::find(query)
            .ok_or_else(|| AppError::Weather(CoreWeatherError::CityNotFound(query.to_string())))?;
        let location = Location::from_city(city);

        if !self.store.add(location.clone()) {
            self.dashboard
                .set_status(format!("{} is already on the dashboard", location.display_name));
            return Ok(None);
        }

        self.dashboard.render_card(&location);
        self.refresh_location(&location.id).await;
        self.dashboard.set_status(format!("Added {}", location.display_name));
        Ok(Some(location))
    }

    /// Drop a location from the store and its card from the dashboard
    pub fn remove_location(&mut self, id: &str) -> RemoveOutcome {
        let outcome = self.store.remove(id);
        match outcome {
            RemoveOutcome::Removed => {
                self.dashboard.remove_card(id);
                self.dashboard.set_status(format!("Removed {}", id));
            }
            RemoveOutcome::Protected => {
                self.dashboard
                    .set_status("Your current location cannot be removed");
            }
            RemoveOutcome::NotFound => {
                self.dashboard.set_status(format!("No location with id {}", id));
            }
        }
        outcome
    }

    /// Fetch one location's forecast into its card. Returns whether the
    /// card now shows fresh data.
    pub async fn refresh_location(&mut self, id: &str) -> bool {
        let Some(location) = self.store.get(id).cloned() else {
            tracing::warn!("Refresh requested for unknown location {}", id);
            return false;
        };

        self.dashboard.render_card(&location);
        self.dashboard.mark_loading(id);
        let result = self.provider.fetch(location.lat, location.lon).await;
        self.apply(id, result)
    }

    /// Fetch every tracked location concurrently; cards update as results
    /// arrive, in no particular order.
    pub async fn refresh_all(&mut self) -> RefreshSummary {
        self.dashboard.reconcile(self.store.locations());

        let mut summary = RefreshSummary {
            total: self.store.locations().len(),
            succeeded: 0,
        };
        if summary.total == 0 {
            self.dashboard.set_status("No locations to refresh");
            return summary;
        }

        let mut tasks = JoinSet::new();
        for location in self.store.locations() {
            self.dashboard.mark_loading(&location.id);
            let provider = self.provider.clone();
            let (id, lat, lon) = (location.id.clone(), location.lat, location.lon);
            tasks.spawn(async move {
                let result = provider.fetch(lat, lon).await;
                (id, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((id, result)) => {
                    if self.apply(&id, result) {
                        summary.succeeded += 1;
                    }
                }
                Err(e) => tracing::error!("Forecast task failed: {}", e),
            }
        }

        tracing::info!(
            "Refreshed {} of {} locations",
            summary.succeeded,
            summary.total
        );
        self.dashboard.set_status(format!(
            "Updated {} of {} locations",
            summary.succeeded, summary.total
        ));
        summary
    }

    fn apply(&mut self, id: &str, result: Result<WeatherSnapshot, WeatherError>) -> bool {
        match result {
            Ok(snapshot) => self.dashboard.update_success(id, &snapshot),
            Err(e) => {
                tracing::warn!("Forecast for {} failed: {}", id, e);
                self.dashboard.update_error(id, error_mapping::card_error_text(e));
                false
            }
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn store(&self) -> &LocationStore {
        &self.store
    }
}
