//! The tracked-location list and its persisted mirror.

use crate::storage::{load_state, save_state, StateStorage};
use crate::types::{AppState, Location, CURRENT_LOCATION_ID};

/// What `remove` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFound,
    /// The geolocated entry cannot be removed
    Protected,
}

/// Owns the in-memory [`AppState`]. Every successful mutation writes the
/// full state back to storage before returning.
pub struct LocationStore {
    state: AppState,
    storage: Box<dyn StateStorage>,
    rehydrated: bool,
}

impl LocationStore {
    /// Load the persisted list. A blob that is missing, malformed, or holds
    /// no locations leaves the store empty and flagged for bootstrap.
    pub fn open(storage: Box<dyn StateStorage>) -> Self {
        let (state, rehydrated) = match load_state(storage.as_ref()) {
            Some(mut state) if !state.locations.is_empty() => {
                let dropped = state.sanitize();
                if dropped > 0 {
                    tracing::warn!("Dropped {} invalid saved locations", dropped);
                }
                tracing::info!("Restored {} saved locations", state.locations.len());
                (state, true)
            }
            _ => (AppState::default(), false),
        };

        Self {
            state,
            storage,
            rehydrated,
        }
    }

    /// True when nothing usable was restored and the device position should
    /// seed the list.
    pub fn needs_bootstrap(&self) -> bool {
        !self.rehydrated && self.state.locations.is_empty()
    }

    /// Append `location` unless its id is already tracked. Returns whether
    /// the list changed.
    pub fn add(&mut self, location: Location) -> bool {
        if self.contains(&location.id) {
            tracing::debug!("Location {} already tracked", location.id);
            return false;
        }
        if location.is_current != (location.id == CURRENT_LOCATION_ID) {
            tracing::warn!("Ignoring location {} with inconsistent current flag", location.id);
            return false;
        }

        tracing::info!("Tracking {} ({})", location.display_name, location.id);
        self.state.locations.push(location);
        self.persist();
        true
    }

    /// Replace the fields of an already tracked location, keeping its place
    /// in the list.
    pub fn update(&mut self, location: Location) -> bool {
        match self.state.locations.iter_mut().find(|l| l.id == location.id) {
            Some(existing) if *existing != location => {
                *existing = location;
                self.persist();
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> RemoveOutcome {
        match self.get(id) {
            None => RemoveOutcome::NotFound,
            Some(loc) if loc.is_current => RemoveOutcome::Protected,
            Some(_) => {
                self.state.locations.retain(|l| l.id != id);
                self.persist();
                tracing::info!("Removed location {}", id);
                RemoveOutcome::Removed
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Location> {
        self.state.locations.iter().find(|l| l.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn current(&self) -> Option<&Location> {
        self.state.locations.iter().find(|l| l.is_current)
    }

    pub fn locations(&self) -> &[Location] {
        &self.state.locations
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    fn persist(&self) {
        // Errors are logged inside save_state
        save_state(self.storage.as_ref(), &self.state);
    }
}
