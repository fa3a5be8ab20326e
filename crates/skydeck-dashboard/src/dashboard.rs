//! View model for the whole dashboard: one card per tracked location, the
//! global status bar, and the geolocation modal.

use skydeck_core::TemperatureUnit;
use skydeck_weather::{Location, LocationError, WeatherSnapshot};

use crate::error_mapping;
use crate::view::{self, CardStatus, CardView};

/// Fixed element identifiers used by renderers
pub const MODAL_ID: &str = "geoModal";
pub const REFRESH_BUTTON_ID: &str = "refreshBtn";
pub const GLOBAL_STATUS_ID: &str = "globalStatus";

/// The geolocation failure dialog
#[derive(Debug, Clone, PartialEq)]
pub struct ModalView {
    pub title: String,
    pub message: String,
    /// Standard position error code (1 denied, 2 unavailable, 3 timeout)
    pub code: u8,
}

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    unit: TemperatureUnit,
    cards: Vec<CardView>,
    global_status: Option<String>,
    modal: Option<ModalView>,
}

impl Dashboard {
    pub fn new(unit: TemperatureUnit) -> Self {
        Self {
            unit,
            ..Self::default()
        }
    }

    /// Create the card for `location` in its placeholder state. Returns
    /// false if a card for this id already exists.
    pub fn render_card(&mut self, location: &Location) -> bool {
        if self.card(&location.id).is_some() {
            return false;
        }
        self.cards.push(CardView::placeholder(location));
        true
    }

    /// Put an existing card back into its placeholder state
    pub fn mark_loading(&mut self, id: &str) -> bool {
        match self.card_mut(id) {
            Some(card) => {
                card.status = CardStatus::Loading;
                true
            }
            None => false,
        }
    }

    /// Fill a card from a fresh snapshot. Results for cards that no longer
    /// exist are dropped.
    pub fn update_success(&mut self, id: &str, snapshot: &WeatherSnapshot) -> bool {
        let unit = self.unit;
        match self.card_mut(id) {
            Some(card) => {
                card.current = view::current_line(snapshot, unit);
                card.items = view::forecast_items(snapshot, unit);
                card.status = CardStatus::Ready;
                true
            }
            None => {
                tracing::debug!("Dropping forecast for removed card {}", id);
                false
            }
        }
    }

    /// Clear a card's forecast and show `message` instead
    pub fn update_error(&mut self, id: &str, message: impl Into<String>) -> bool {
        match self.card_mut(id) {
            Some(card) => {
                card.current = None;
                card.items.clear();
                card.status = CardStatus::Failed(message.into());
                true
            }
            None => false,
        }
    }

    pub fn remove_card(&mut self, id: &str) -> bool {
        let before = self.cards.len();
        self.cards.retain(|c| c.location_id != id);
        self.cards.len() != before
    }

    /// Make the cards mirror `locations`: drop orphaned cards, create
    /// missing ones, refresh titles, and follow the list order. Existing
    /// card content is kept.
    pub fn reconcile(&mut self, locations: &[Location]) {
        let mut previous = std::mem::take(&mut self.cards);

        self.cards = locations
            .iter()
            .map(|loc| match previous.iter().position(|c| c.location_id == loc.id) {
                Some(pos) => {
                    let mut card = previous.swap_remove(pos);
                    card.title = loc.display_name.clone();
                    card.is_current = loc.is_current;
                    card
                }
                None => CardView::placeholder(loc),
            })
            .collect();

        if !previous.is_empty() {
            tracing::debug!("Dropped {} orphaned cards", previous.len());
        }
    }

    /// Open the modal for a failed geolocation request and explain it in
    /// the status bar
    pub fn show_geo_error(&mut self, error: &LocationError) {
        let message = error_mapping::location_error(error).user_message().to_string();
        self.modal = Some(ModalView {
            title: "Location unavailable".to_string(),
            message: message.clone(),
            code: error.code(),
        });
        self.global_status = Some(message);
    }

    pub fn dismiss_modal(&mut self) {
        self.modal = None;
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.global_status = Some(status.into());
    }

    pub fn clear_status(&mut self) {
        self.global_status = None;
    }

    pub fn card(&self, id: &str) -> Option<&CardView> {
        self.cards.iter().find(|c| c.location_id == id)
    }

    fn card_mut(&mut self, id: &str) -> Option<&mut CardView> {
        self.cards.iter_mut().find(|c| c.location_id == id)
    }

    pub fn cards(&self) -> &[CardView] {
        &self.cards
    }

    pub fn global_status(&self) -> Option<&str> {
        self.global_status.as_deref()
    }

    pub fn modal(&self) -> Option<&ModalView> {
        self.modal.as_ref()
    }
}
