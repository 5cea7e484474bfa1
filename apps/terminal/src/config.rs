use std::{fs, time::Duration};

use recipe_core::{catalog::DEFAULT_CATALOG_URL, NotificationPolicy};
use storage::{sqlite_url, DEFAULT_RECIPES_KEY};

pub const SETTINGS_FILE: &str = "recipes.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub catalog_url: String,
    pub database_url: String,
    pub storage_key: String,
    pub request_timeout_secs: Option<u64>,
    pub supersede_notifications: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.into(),
            database_url: "sqlite://./data/recipes.db".into(),
            storage_key: DEFAULT_RECIPES_KEY.into(),
            request_timeout_secs: None,
            supersede_notifications: false,
        }
    }
}

impl Settings {
    /// `database_url` in `sqlite://` form. A blank value means the default.
    pub fn resolved_database_url(&self) -> String {
        if self.database_url.trim().is_empty() {
            return Self::default().database_url;
        }
        sqlite_url(&self.database_url)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn notification_policy(&self) -> NotificationPolicy {
        if self.supersede_notifications {
            NotificationPolicy::Supersede
        } else {
            NotificationPolicy::Stack
        }
    }
}

/// Defaults, then `recipes.toml` in the working directory, then environment.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        apply_file_overrides(&mut settings, &raw);
    }
    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());

    settings
}

pub(crate) fn apply_file_overrides(settings: &mut Settings, raw: &str) {
    let file_cfg = match toml::from_str::<toml::Table>(raw) {
        Ok(table) => table,
        Err(err) => {
            tracing::warn!("ignoring unreadable {SETTINGS_FILE}: {err}");
            return;
        }
    };

    if let Some(v) = file_cfg.get("catalog_url").and_then(|v| v.as_str()) {
        settings.catalog_url = v.to_string();
    }
    if let Some(v) = file_cfg.get("database_url").and_then(|v| v.as_str()) {
        settings.database_url = v.to_string();
    }
    if let Some(v) = file_cfg.get("storage_key").and_then(|v| v.as_str()) {
        settings.storage_key = v.to_string();
    }
    if let Some(v) = file_cfg
        .get("request_timeout_secs")
        .and_then(|v| v.as_integer())
    {
        settings.request_timeout_secs = u64::try_from(v).ok();
    }
    if let Some(v) = file_cfg
        .get("supersede_notifications")
        .and_then(|v| v.as_bool())
    {
        settings.supersede_notifications = v;
    }
}

pub(crate) fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("RECIPES_CATALOG_URL") {
        settings.catalog_url = v;
    }
    if let Some(v) = var("APP__CATALOG_URL") {
        settings.catalog_url = v;
    }

    if let Some(v) = var("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = var("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = var("APP__STORAGE_KEY") {
        settings.storage_key = v;
    }

    if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = Some(parsed);
        }
    }

    if let Some(v) = var("APP__SUPERSEDE_NOTIFICATIONS") {
        settings.supersede_notifications = matches!(v.as_str(), "1" | "true" | "yes");
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
