//! Dashboard for Skydeck: a pure view model of the location cards, the
//! controller keeping it in sync with the store, and a text renderer.

pub mod controller;
pub mod dashboard;
pub mod error_mapping;
pub mod render;
pub mod view;

pub use controller::{Controller, RefreshSummary, StartOutcome};
pub use dashboard::{Dashboard, ModalView};
pub use render::{Renderer, TextRenderer};
pub use view::{CardStatus, CardView, ForecastItemView};
