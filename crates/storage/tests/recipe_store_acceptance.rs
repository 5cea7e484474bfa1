use std::sync::Arc;

use shared::domain::{Recipe, RecipeId};
use storage::{KeyValueStore, RecipeStore, Storage, DEFAULT_RECIPES_KEY};

fn recipe(id: i64, name: &str) -> Recipe {
    Recipe {
        id: RecipeId(id),
        name: name.to_string(),
        image: String::new(),
        ingredients: vec!["flour".into(), "water".into()],
        instructions: vec!["mix".into(), "bake".into()],
    }
}

#[tokio::test]
async fn recipes_survive_reopening_the_database() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("recipes.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    {
        let storage = Arc::new(Storage::new(&database_url).await.expect("db"));
        let mut store = RecipeStore::load(storage.clone(), DEFAULT_RECIPES_KEY)
            .await
            .expect("store");
        store.add(recipe(1, "Bread")).await.expect("add bread");
        store.add(recipe(2, "Focaccia")).await.expect("add focaccia");
        store.remove(RecipeId(1)).await.expect("remove bread");
    }

    let storage = Arc::new(Storage::new(&database_url).await.expect("reopen"));
    let store = RecipeStore::load(storage.clone(), DEFAULT_RECIPES_KEY)
        .await
        .expect("reload");
    assert_eq!(store.recipes(), &[recipe(2, "Focaccia")]);

    let raw = storage
        .get_item(DEFAULT_RECIPES_KEY)
        .await
        .expect("raw")
        .expect("present");
    assert!(raw.starts_with('['));
}

#[tokio::test]
async fn separate_keys_hold_separate_lists() {
    let storage = Arc::new(Storage::new("sqlite::memory:").await.expect("db"));
    let mut mine = RecipeStore::load(storage.clone(), "myRecipes")
        .await
        .expect("mine");
    mine.add(recipe(5, "Mine")).await.expect("add");

    let other = RecipeStore::load(storage, "otherRecipes")
        .await
        .expect("other");
    assert!(other.recipes().is_empty());
    assert_eq!(mine.recipes(), &[recipe(5, "Mine")]);
}
