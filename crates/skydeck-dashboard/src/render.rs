//! Thin adapters that draw a [`Dashboard`] somewhere.

use std::io::{self, Write};

use crate::dashboard::{Dashboard, GLOBAL_STATUS_ID, MODAL_ID, REFRESH_BUTTON_ID};
use crate::view::{CardStatus, CardView};

pub trait Renderer {
    fn render(&mut self, dashboard: &Dashboard) -> io::Result<()>;
    fn render_card(&mut self, card: &CardView) -> io::Result<()>;
}

/// Plain-text renderer for terminals and logs
pub struct TextRenderer<W: Write> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render(&mut self, dashboard: &Dashboard) -> io::Result<()> {
        if let Some(modal) = dashboard.modal() {
            writeln!(self.out, "[{}] {}", MODAL_ID, modal.title)?;
            writeln!(self.out, "  {}", modal.message)?;
            writeln!(self.out)?;
        }

        if dashboard.cards().is_empty() {
            writeln!(self.out, "No locations yet. Add one with `skydeck add <city>`.")?;
        }
        for card in dashboard.cards() {
            self.render_card(card)?;
        }

        if let Some(status) = dashboard.global_status() {
            writeln!(self.out, "[{}] {}", GLOBAL_STATUS_ID, status)?;
        }
        writeln!(self.out, "[{}] skydeck refresh", REFRESH_BUTTON_ID)?;
        self.out.flush()
    }

    fn render_card(&mut self, card: &CardView) -> io::Result<()> {
        let marker = if card.is_current { " *" } else { "" };
        writeln!(self.out, "{}{}  ({})", card.title, marker, card.location_id)?;

        match &card.status {
            CardStatus::Ready => {
                if let Some(current) = &card.current {
                    writeln!(self.out, "  {}", current)?;
                }
                for item in &card.items {
                    writeln!(
                        self.out,
                        "  {:<10} {:>8} / {:<8} {}",
                        item.label, item.high, item.low, item.precipitation
                    )?;
                }
            }
            status => writeln!(self.out, "  {}", status.text())?,
        }
        writeln!(self.out)
    }
}
