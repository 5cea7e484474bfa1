//! Plain-text rendering of page view events.

use std::io::{self, Write};

use recipe_core::{cards::DELETE_LABEL, CardId, RecipeCard, ViewEvent};
use shared::domain::{Recipe, RecipeOrigin};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, warn};

/// Writes view events as text. Card numbers are positions in the list of
/// cards printed so far; removing a card renumbers the ones after it.
pub struct TextRenderer<W: Write> {
    out: W,
    numbered: Vec<(CardId, String)>,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            numbered: Vec::new(),
        }
    }

    /// Card currently shown as `#number`.
    pub fn card_at(&self, number: usize) -> Option<CardId> {
        let index = number.checked_sub(1)?;
        self.numbered.get(index).map(|(card_id, _)| *card_id)
    }

    /// Applies every event queued so far.
    pub fn drain(&mut self, events: &mut broadcast::Receiver<ViewEvent>) -> io::Result<()> {
        loop {
            match events.try_recv() {
                Ok(event) => self.apply(&event)?,
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "renderer fell behind; some view events were dropped");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        self.out.flush()
    }

    pub fn apply(&mut self, event: &ViewEvent) -> io::Result<()> {
        match event {
            ViewEvent::ResultsCleared => {
                self.numbered.clear();
                Ok(())
            }
            ViewEvent::CardRendered(card) => {
                self.numbered.push((card.card_id, card.title.clone()));
                write_card(&mut self.out, self.numbered.len(), card)
            }
            ViewEvent::CardRemoved(card_id) => self.remove_numbered(*card_id),
            ViewEvent::NotificationShown(notification) => writeln!(
                self.out,
                "[{}] {}",
                notification.kind.as_str(),
                notification.message
            ),
            ViewEvent::MenuToggled { open } => {
                writeln!(self.out, "menu {}", if *open { "opened" } else { "closed" })
            }
            ViewEvent::FormReset => {
                debug!("add form reset");
                Ok(())
            }
            ViewEvent::NotificationFading(_) | ViewEvent::NotificationDismissed(_) => Ok(()),
        }
    }

    /// Prints `cards` and makes their order the current numbering.
    pub fn print_cards(&mut self, cards: &[RecipeCard]) -> io::Result<()> {
        self.numbered = cards
            .iter()
            .map(|card| (card.card_id, card.title.clone()))
            .collect();
        if cards.is_empty() {
            writeln!(self.out, "no cards rendered")?;
        }
        for (index, card) in cards.iter().enumerate() {
            write_card(&mut self.out, index + 1, card)?;
        }
        self.out.flush()
    }

    pub fn print_recipes(&mut self, recipes: &[Recipe]) -> io::Result<()> {
        if recipes.is_empty() {
            writeln!(self.out, "no local recipes")?;
        }
        for (index, recipe) in recipes.iter().enumerate() {
            let card = RecipeCard::render(recipe, RecipeOrigin::Local);
            write_card(&mut self.out, index + 1, &card)?;
        }
        self.out.flush()
    }

    pub fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")?;
        self.out.flush()
    }

    fn remove_numbered(&mut self, card_id: CardId) -> io::Result<()> {
        let Some(index) = self.numbered.iter().position(|(id, _)| *id == card_id) else {
            debug!(?card_id, "removed card was never printed");
            return Ok(());
        };
        let (_, title) = self.numbered.remove(index);
        writeln!(self.out, "(#{} {title} removed)", index + 1)?;
        for (offset, (_, title)) in self.numbered.iter().enumerate().skip(index) {
            writeln!(self.out, "  now #{} {title}", offset + 1)?;
        }
        Ok(())
    }
}

fn write_card(out: &mut impl Write, number: usize, card: &RecipeCard) -> io::Result<()> {
    let origin = match card.origin {
        RecipeOrigin::Local => "local",
        RecipeOrigin::Remote => "catalog",
    };
    writeln!(out, "#{number} {} [{origin}, id {}]", card.title, card.recipe_id)?;
    if !card.image.is_empty() {
        writeln!(out, "   image: {}", card.image)?;
    }
    writeln!(out, "   Ingredients")?;
    for ingredient in &card.ingredients {
        writeln!(out, "     - {ingredient}")?;
    }
    writeln!(out, "   Instructions")?;
    for (step, instruction) in card.instructions.iter().enumerate() {
        writeln!(out, "     {}. {instruction}", step + 1)?;
    }
    writeln!(out, "   [{DELETE_LABEL}]")
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
