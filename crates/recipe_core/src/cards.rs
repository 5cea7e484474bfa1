//! Card view model for one recipe and the results container holding cards.

use shared::domain::{Recipe, RecipeId, RecipeOrigin};
use uuid::Uuid;

pub const DELETE_LABEL: &str = "DELETE RECIPE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CardId(pub Uuid);

/// Everything a rendering layer needs to draw a recipe. The delete control is
/// bound to `card_id`, which resolves back to `recipe_id` and `origin`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeCard {
    pub card_id: CardId,
    pub recipe_id: RecipeId,
    pub origin: RecipeOrigin,
    pub title: String,
    pub image: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
}

impl RecipeCard {
    pub fn render(recipe: &Recipe, origin: RecipeOrigin) -> Self {
        Self {
            card_id: CardId(Uuid::new_v4()),
            recipe_id: recipe.id,
            origin,
            title: recipe.name.clone(),
            image: recipe.image.clone(),
            ingredients: recipe.ingredients.clone(),
            instructions: recipe.instructions.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResultsView {
    cards: Vec<RecipeCard>,
}

impl ResultsView {
    pub fn cards(&self) -> &[RecipeCard] {
        &self.cards
    }

    pub fn append(&mut self, card: RecipeCard) {
        self.cards.push(card);
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }

    pub fn get(&self, card_id: CardId) -> Option<&RecipeCard> {
        self.cards.iter().find(|c| c.card_id == card_id)
    }

    pub fn find_recipe(&self, recipe_id: RecipeId, origin: RecipeOrigin) -> Option<&RecipeCard> {
        self.cards
            .iter()
            .find(|c| c.recipe_id == recipe_id && c.origin == origin)
    }

    pub fn remove(&mut self, card_id: CardId) -> Option<RecipeCard> {
        let position = self.cards.iter().position(|c| c.card_id == card_id)?;
        Some(self.cards.remove(position))
    }
}
