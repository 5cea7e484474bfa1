use shared::domain::NewRecipe;

/// Raw values of the add-recipe form. Ingredients and instructions are
/// multi-line text, one entry per line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeForm {
    pub name: String,
    pub image: String,
    pub ingredients: String,
    pub instructions: String,
}

impl RecipeForm {
    pub fn to_new_recipe(&self) -> NewRecipe {
        NewRecipe::from_form_text(
            &self.name,
            &self.image,
            &self.ingredients,
            &self.instructions,
        )
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
