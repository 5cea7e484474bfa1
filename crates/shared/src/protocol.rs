use serde::{Deserialize, Serialize};

use crate::domain::{Recipe, RecipeId};

/// Response of `GET /recipes/search?q=...`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub recipes: Vec<Recipe>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

/// Response of `POST /recipes/add`. The id may be absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedRecipe {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecipeId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
}

impl CreatedRecipe {
    pub fn assigned_id(&self) -> Option<RecipeId> {
        self.id.filter(RecipeId::is_assigned)
    }

    pub fn into_recipe(self, fallback: impl FnOnce() -> RecipeId) -> Recipe {
        let id = self.assigned_id().unwrap_or_else(fallback);
        Recipe {
            id,
            name: self.name,
            image: self.image,
            ingredients: self.ingredients,
            instructions: self.instructions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_id_counts_as_missing() {
        let created: CreatedRecipe =
            serde_json::from_str(r#"{"id":0,"name":"Toast"}"#).expect("created");
        let recipe = created.into_recipe(|| RecipeId(42));
        assert_eq!(recipe.id, RecipeId(42));
    }

    #[test]
    fn assigned_id_is_kept() {
        let created: CreatedRecipe =
            serde_json::from_str(r#"{"id":51,"name":"Toast","ingredients":["bread"]}"#)
                .expect("created");
        let recipe = created.into_recipe(|| RecipeId(42));
        assert_eq!(recipe.id, RecipeId(51));
        assert_eq!(recipe.ingredients, vec!["bread"]);
    }
}
