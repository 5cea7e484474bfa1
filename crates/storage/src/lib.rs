use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    collections::HashMap,
    fs,
    path::Path,
    str::FromStr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};
use tracing::{info, warn};

use shared::domain::{Recipe, RecipeId};

/// Key the recipe list is persisted under.
pub const DEFAULT_RECIPES_KEY: &str = "myRecipes";

/// Suffix of the key an unreadable recipe list is copied to before the store
/// starts over empty.
pub const CORRUPT_SUFFIX: &str = ".corrupt";

/// String key/value slots, the persistence model of a browser origin's local storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>>;
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        if let Some(parent) = sqlite_file(database_url)
            .and_then(Path::parent)
            .filter(|dir| !dir.as_os_str().is_empty())
        {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create directory '{}' for the database", parent.display())
            })?;
        }

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        let storage = Self { pool };
        storage.ensure_local_storage_table().await?;
        Ok(storage)
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    async fn ensure_local_storage_table(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS local_storage (
                key        TEXT PRIMARY KEY NOT NULL,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to ensure local_storage table exists")?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for Storage {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM local_storage WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to read local storage key '{key}'"))?;
        Ok(row.map(|r| r.get::<String, _>(0)))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO local_storage (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to write local storage key '{key}'"))?;
        Ok(())
    }
}

/// Process-local key/value slots. Writes can be made to fail for exercising
/// rollback paths.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    items: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(key: &str, value: &str) -> Self {
        let store = Self::default();
        store.lock_items().insert(key.to_string(), value.to_string());
        store
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock_items().get(key).cloned()
    }

    fn lock_items(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_writable(&self, key: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("local storage write rejected for key '{key}'");
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock_items().get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.check_writable(key)?;
        self.lock_items().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Locally created recipes, newest first, persisted as one JSON array under a
/// single key.
pub struct RecipeStore {
    backend: Arc<dyn KeyValueStore>,
    key: String,
    recipes: Vec<Recipe>,
}

impl RecipeStore {
    /// Reads the persisted list. A missing or `null` blob yields an empty
    /// store. An unreadable blob is copied to `<key>.corrupt` first, so later
    /// writes under `key` cannot lose it; if that copy fails, loading fails.
    pub async fn load(backend: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let recipes = match backend.get_item(&key).await? {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Option<Vec<Recipe>>>(&raw) {
                Ok(parsed) => parsed.unwrap_or_default(),
                Err(err) => {
                    let backup_key = format!("{key}{CORRUPT_SUFFIX}");
                    backend.set_item(&backup_key, &raw).await.with_context(|| {
                        format!("failed to set aside unreadable recipe list under '{backup_key}'")
                    })?;
                    warn!(
                        key = %key,
                        backup_key = %backup_key,
                        "persisted recipe list is malformed, starting empty: {err}"
                    );
                    Vec::new()
                }
            },
        };
        info!(key = %key, count = recipes.len(), "loaded local recipe store");
        Ok(Self {
            backend,
            key,
            recipes,
        })
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn get(&self, id: RecipeId) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: RecipeId) -> bool {
        self.get(id).is_some()
    }

    /// Case-insensitive substring match on the name, in store order.
    pub fn matching(&self, query: &str) -> Vec<Recipe> {
        let query = query.to_lowercase();
        self.recipes
            .iter()
            .filter(|r| r.name_matches(&query))
            .cloned()
            .collect()
    }

    /// Timestamp-derived id that no stored recipe uses yet.
    pub fn next_local_id(&self) -> RecipeId {
        let mut id = RecipeId::from_timestamp();
        while self.contains(id) {
            id = RecipeId(id.0 + 1);
        }
        id
    }

    /// Prepends and persists. The in-memory list is restored if the write fails.
    pub async fn add(&mut self, recipe: Recipe) -> Result<()> {
        self.recipes.insert(0, recipe);
        if let Err(err) = self.persist().await {
            self.recipes.remove(0);
            return Err(err);
        }
        Ok(())
    }

    /// Removes every record with `id` and persists. Returns the first removed
    /// record, or `None` without writing when nothing matched.
    pub async fn remove(&mut self, id: RecipeId) -> Result<Option<Recipe>> {
        let Some(position) = self.recipes.iter().position(|r| r.id == id) else {
            return Ok(None);
        };
        let previous = self.recipes.clone();
        self.recipes.retain(|r| r.id != id);
        if let Err(err) = self.persist().await {
            self.recipes = previous;
            return Err(err);
        }
        Ok(Some(previous[position].clone()))
    }

    pub async fn persist(&self) -> Result<()> {
        let blob =
            serde_json::to_string(&self.recipes).context("failed to serialize recipe list")?;
        self.backend.set_item(&self.key, &blob).await
    }
}

/// Turns a bare file path or `sqlite:path` into a `sqlite://` URL. In-memory
/// and other `scheme://` URLs pass through unchanged.
pub fn sqlite_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.contains("://") || raw.starts_with("sqlite::memory:") {
        return raw.to_string();
    }
    let path = raw.strip_prefix("sqlite:").unwrap_or(raw);
    format!("sqlite://{}", path.replace('\\', "/"))
}

/// File behind a SQLite URL, without query parameters. `None` for in-memory
/// databases and non-SQLite URLs.
fn sqlite_file(database_url: &str) -> Option<&Path> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    if rest.starts_with(":memory:") {
        return None;
    }
    rest.split('?')
        .next()
        .filter(|path| !path.is_empty())
        .map(Path::new)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
