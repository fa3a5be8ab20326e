//! Weather service for Skydeck
//!
//! Provides forecasts via the Open-Meteo API, device geolocation, the
//! built-in city catalog, and the persisted list of tracked locations.

pub mod cities;
pub mod geocode;
pub mod location;
pub mod provider;
pub mod storage;
pub mod store;
pub mod types;

pub use cities::City;
pub use geocode::{reverse_geocode_at, PlaceName, NOMINATIM_URL};
pub use location::{FixedGeolocator, Geolocator, IpGeolocator, Position};
pub use provider::WeatherProvider;
pub use storage::{load_state, save_state, FileStorage, MemoryStorage, StateStorage, StorageError};
pub use store::{LocationStore, RemoveOutcome};
pub use types::*;
