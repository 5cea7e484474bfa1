//! Headless recipe page: controllers for search, create and delete that talk
//! to the remote catalog and the local store, and publish [`ViewEvent`]s for
//! whatever layer draws the page.

use std::sync::Arc;

use shared::{
    domain::{NewRecipe, Recipe, RecipeId, RecipeOrigin},
    error::ErrorCode,
};
use storage::RecipeStore;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

pub mod cards;
pub mod catalog;
pub mod confirm;
pub mod form;
pub mod notifications;

pub use cards::{CardId, RecipeCard, ResultsView};
pub use catalog::{CatalogClient, CatalogError, HttpCatalogClient};
pub use confirm::{ConfirmRequest, Confirmer, FixedConfirmer, ModalConfirmer};
pub use form::RecipeForm;
pub use notifications::{
    Notification, NotificationCenter, NotificationId, NotificationKind, NotificationPhase,
    NotificationPolicy,
};

pub const CONFIRM_DELETE_MESSAGE: &str = "Are you sure?";
const MSG_NO_RESULTS: &str = "No recipes found";
const MSG_SEARCH_FAILED: &str = "Error fetching recipes";
const MSG_CREATE_FAILED: &str = "Could not add recipe";
const MSG_DELETED: &str = "Recipe deleted";
const MSG_DELETE_FAILED: &str = "Failed to delete recipe";

/// Changes a rendering layer applies to its view, in order.
#[derive(Debug, Clone)]
pub enum ViewEvent {
    ResultsCleared,
    CardRendered(RecipeCard),
    CardRemoved(CardId),
    NotificationShown(Notification),
    NotificationFading(NotificationId),
    NotificationDismissed(NotificationId),
    MenuToggled { open: bool },
    FormReset,
}

/// Which page elements exist. Search input and menu are required; without a
/// results container nothing is rendered, without a form nothing can be added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    pub search_input: bool,
    pub menu: bool,
    pub results_container: bool,
    pub add_form: bool,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            search_input: true,
            menu: true,
            results_container: true,
            add_form: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PageConfig {
    pub layout: PageLayout,
    pub notification_policy: NotificationPolicy,
}

#[derive(Debug, Error)]
pub enum PageError {
    #[error("required page element is missing: {0}")]
    MissingElement(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Rendered { local: usize, remote: usize },
    NoResults,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(Recipe),
    Unavailable,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Declined,
    DeletedLocally(RecipeId),
    DeletedRemotely(RecipeId),
    Failed,
    UnknownCard,
}

struct PageState {
    results: Option<ResultsView>,
    form: Option<RecipeForm>,
    menu_open: bool,
}

pub struct RecipePage {
    catalog: Arc<dyn CatalogClient>,
    confirmer: Arc<dyn Confirmer>,
    store: Mutex<RecipeStore>,
    inner: Mutex<PageState>,
    notifications: NotificationCenter,
    events: broadcast::Sender<ViewEvent>,
}

impl RecipePage {
    pub fn new(
        store: RecipeStore,
        catalog: Arc<dyn CatalogClient>,
        confirmer: Arc<dyn Confirmer>,
    ) -> Result<Self, PageError> {
        Self::new_with_dependencies(PageConfig::default(), store, catalog, confirmer)
    }

    pub fn new_with_dependencies(
        config: PageConfig,
        store: RecipeStore,
        catalog: Arc<dyn CatalogClient>,
        confirmer: Arc<dyn Confirmer>,
    ) -> Result<Self, PageError> {
        let layout = config.layout;
        if !layout.search_input {
            return Err(PageError::MissingElement("search input"));
        }
        if !layout.menu {
            return Err(PageError::MissingElement("hamburger menu"));
        }

        let (events, _) = broadcast::channel(1024);
        Ok(Self {
            catalog,
            confirmer,
            store: Mutex::new(store),
            inner: Mutex::new(PageState {
                results: layout.results_container.then(ResultsView::default),
                form: layout.add_form.then(RecipeForm::default),
                menu_open: false,
            }),
            notifications: NotificationCenter::new(config.notification_policy, events.clone()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    /// Initial load: shows every recipe the catalog and the local store hold.
    pub async fn start(&self) -> SearchOutcome {
        self.search("").await
    }

    pub async fn toggle_menu(&self) -> bool {
        let mut guard = self.inner.lock().await;
        guard.menu_open = !guard.menu_open;
        let open = guard.menu_open;
        let _ = self.events.send(ViewEvent::MenuToggled { open });
        open
    }

    pub async fn menu_open(&self) -> bool {
        self.inner.lock().await.menu_open
    }

    /// Cards currently in the results container, in display order.
    pub async fn cards(&self) -> Vec<RecipeCard> {
        let guard = self.inner.lock().await;
        guard
            .results
            .as_ref()
            .map(|results| results.cards().to_vec())
            .unwrap_or_default()
    }

    pub async fn local_recipes(&self) -> Vec<Recipe> {
        self.store.lock().await.recipes().to_vec()
    }

    /// Current form values, or `None` when the page has no add form.
    pub async fn form(&self) -> Option<RecipeForm> {
        self.inner.lock().await.form.clone()
    }

    /// Applies `edit` to the form. Returns `false` when the page has no form.
    pub async fn edit_form(&self, edit: impl FnOnce(&mut RecipeForm)) -> bool {
        let mut guard = self.inner.lock().await;
        match guard.form.as_mut() {
            Some(form) => {
                edit(form);
                true
            }
            None => false,
        }
    }

    /// Clears the results, then renders local matches followed by catalog
    /// matches. A catalog failure renders nothing.
    pub async fn search(&self, query: &str) -> SearchOutcome {
        let query = query.to_lowercase();
        self.clear_results().await;

        let remote = match self.catalog.search(&query).await {
            Ok(recipes) => recipes,
            Err(err) => {
                error!(code = ?err.code(), query = %query, "recipe search failed: {err}");
                self.notifications
                    .display(NotificationKind::Error, MSG_SEARCH_FAILED);
                return SearchOutcome::Failed;
            }
        };
        let local = self.store.lock().await.matching(&query);

        if local.is_empty() && remote.is_empty() {
            self.notifications
                .display(NotificationKind::Info, MSG_NO_RESULTS);
            return SearchOutcome::NoResults;
        }

        for recipe in &local {
            self.render_card(recipe, RecipeOrigin::Local).await;
        }
        for recipe in &remote {
            self.render_card(recipe, RecipeOrigin::Remote).await;
        }
        info!(
            query = %query,
            local = local.len(),
            remote = remote.len(),
            "rendered search results"
        );
        SearchOutcome::Rendered {
            local: local.len(),
            remote: remote.len(),
        }
    }

    /// Submits the current form values and resets the form on success.
    pub async fn submit_form(&self) -> CreateOutcome {
        let Some(form) = self.form().await else {
            warn!("add recipe requested but the page has no add form");
            return CreateOutcome::Unavailable;
        };

        let outcome = self.add_recipe(&form.to_new_recipe()).await;
        if matches!(outcome, CreateOutcome::Created(_)) {
            let mut guard = self.inner.lock().await;
            if let Some(form) = guard.form.as_mut() {
                form.reset();
            }
            let _ = self.events.send(ViewEvent::FormReset);
        }
        outcome
    }

    /// Creates the recipe in the catalog, then records it locally (newest
    /// first) and renders it. Nothing local changes unless the catalog call
    /// succeeds.
    pub async fn add_recipe(&self, new_recipe: &NewRecipe) -> CreateOutcome {
        if self.inner.lock().await.form.is_none() {
            warn!("add recipe requested but the page has no add form");
            return CreateOutcome::Unavailable;
        }

        let created = match self.catalog.create(new_recipe).await {
            Ok(created) => created,
            Err(err) => {
                error!(code = ?err.code(), name = %new_recipe.name, "recipe create failed: {err}");
                self.notifications
                    .display(NotificationKind::Error, MSG_CREATE_FAILED);
                return CreateOutcome::Failed;
            }
        };

        let recipe = {
            let mut store = self.store.lock().await;
            let recipe = created.into_recipe(|| store.next_local_id());
            if let Err(err) = store.add(recipe.clone()).await {
                error!(
                    code = ?ErrorCode::Storage,
                    recipe_id = %recipe.id,
                    "failed to persist created recipe: {err:#}"
                );
                self.notifications
                    .display(NotificationKind::Error, MSG_CREATE_FAILED);
                return CreateOutcome::Failed;
            }
            recipe
        };

        self.render_card(&recipe, RecipeOrigin::Local).await;
        self.notifications.display(
            NotificationKind::Success,
            format!("Recipe \"{}\" created!", recipe.name),
        );
        info!(recipe_id = %recipe.id, name = %recipe.name, "recipe created");
        CreateOutcome::Created(recipe)
    }

    /// Deletes the recipe behind a rendered card, routed by the card's origin.
    pub async fn delete_card(&self, card_id: CardId) -> DeleteOutcome {
        let card = {
            let guard = self.inner.lock().await;
            guard
                .results
                .as_ref()
                .and_then(|results| results.get(card_id))
                .cloned()
        };
        let Some(card) = card else {
            warn!(?card_id, "delete requested for a card that is not rendered");
            return DeleteOutcome::UnknownCard;
        };
        self.delete_recipe(card.recipe_id, card.origin, Some(card.card_id))
            .await
    }

    /// Deletes by id alone. The origin is inferred from membership in the
    /// local store.
    pub async fn delete_by_id(&self, recipe_id: RecipeId) -> DeleteOutcome {
        let origin = if self.store.lock().await.contains(recipe_id) {
            RecipeOrigin::Local
        } else {
            RecipeOrigin::Remote
        };
        let card_id = {
            let guard = self.inner.lock().await;
            guard
                .results
                .as_ref()
                .and_then(|results| results.find_recipe(recipe_id, origin))
                .map(|card| card.card_id)
        };
        self.delete_recipe(recipe_id, origin, card_id).await
    }

    async fn delete_recipe(
        &self,
        recipe_id: RecipeId,
        origin: RecipeOrigin,
        card_id: Option<CardId>,
    ) -> DeleteOutcome {
        if !self.confirmer.confirm(CONFIRM_DELETE_MESSAGE).await {
            debug!(recipe_id = %recipe_id, "delete declined");
            return DeleteOutcome::Declined;
        }

        match origin {
            RecipeOrigin::Local => {
                let removed = self.store.lock().await.remove(recipe_id).await;
                match removed {
                    Ok(removed) => {
                        if removed.is_none() {
                            warn!(
                                recipe_id = %recipe_id,
                                "local delete matched no stored recipe; removing card only"
                            );
                        }
                        self.remove_card(card_id).await;
                        self.notifications
                            .display(NotificationKind::Success, MSG_DELETED);
                        info!(recipe_id = %recipe_id, "local recipe deleted");
                        DeleteOutcome::DeletedLocally(recipe_id)
                    }
                    Err(err) => {
                        error!(
                            code = ?ErrorCode::Storage,
                            recipe_id = %recipe_id,
                            "failed to persist local delete: {err:#}"
                        );
                        self.notifications
                            .display(NotificationKind::Error, MSG_DELETE_FAILED);
                        DeleteOutcome::Failed
                    }
                }
            }
            RecipeOrigin::Remote => match self.catalog.delete(recipe_id).await {
                Ok(()) => {
                    self.notifications
                        .display(NotificationKind::Success, MSG_DELETED);
                    self.remove_card(card_id).await;
                    info!(recipe_id = %recipe_id, "catalog recipe deleted");
                    DeleteOutcome::DeletedRemotely(recipe_id)
                }
                Err(err) => {
                    error!(
                        code = ?err.code(),
                        recipe_id = %recipe_id,
                        "catalog delete failed: {err}"
                    );
                    self.notifications
                        .display(NotificationKind::Error, MSG_DELETE_FAILED);
                    DeleteOutcome::Failed
                }
            },
        }
    }

    async fn clear_results(&self) {
        let mut guard = self.inner.lock().await;
        if let Some(results) = guard.results.as_mut() {
            results.clear();
            let _ = self.events.send(ViewEvent::ResultsCleared);
        }
    }

    async fn render_card(&self, recipe: &Recipe, origin: RecipeOrigin) {
        let mut guard = self.inner.lock().await;
        let Some(results) = guard.results.as_mut() else {
            debug!(recipe_id = %recipe.id, "no results container; skipping render");
            return;
        };
        let card = RecipeCard::render(recipe, origin);
        results.append(card.clone());
        let _ = self.events.send(ViewEvent::CardRendered(card));
    }

    async fn remove_card(&self, card_id: Option<CardId>) {
        let Some(card_id) = card_id else {
            return;
        };
        let mut guard = self.inner.lock().await;
        if let Some(results) = guard.results.as_mut() {
            if results.remove(card_id).is_some() {
                let _ = self.events.send(ViewEvent::CardRemoved(card_id));
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
