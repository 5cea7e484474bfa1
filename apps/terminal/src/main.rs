use std::{io, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use recipe_core::{
    Confirmer, CreateOutcome, DeleteOutcome, FixedConfirmer, HttpCatalogClient, PageConfig,
    RecipePage, SearchOutcome,
};
use shared::domain::RecipeId;
use storage::{RecipeStore, Storage};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod prompt;
mod render;
mod shell;

use config::load_settings;
use prompt::{LineInput, TerminalConfirmer};
use render::TextRenderer;

#[derive(Parser, Debug)]
#[command(name = "recipes", about = "Search, add and delete recipes")]
struct Cli {
    /// Base URL of the recipe catalog.
    #[arg(long)]
    catalog_url: Option<String>,
    /// SQLite database holding locally created recipes.
    #[arg(long)]
    database_url: Option<String>,
    /// Key the local recipe list is stored under.
    #[arg(long)]
    storage_key: Option<String>,
    /// Answer yes to every confirmation.
    #[arg(long, short = 'y')]
    yes: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search the catalog and local recipes; local matches come first.
    Search { query: Option<String> },
    /// Print locally stored recipes, newest first.
    List,
    /// Create a recipe in the catalog and keep it locally.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        image: String,
        /// One entry per line; a literal `\n` also separates entries.
        #[arg(long, default_value = "")]
        ingredients: String,
        #[arg(long, default_value = "")]
        instructions: String,
    },
    /// Delete a recipe by id: locally if stored here, otherwise in the catalog.
    Delete { id: i64 },
    /// Interactive session.
    Shell,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(v) = cli.catalog_url {
        settings.catalog_url = v;
    }
    if let Some(v) = cli.database_url {
        settings.database_url = v;
    }
    if let Some(v) = cli.storage_key {
        settings.storage_key = v;
    }

    let database_url = settings.resolved_database_url();
    let storage = Arc::new(
        Storage::new(&database_url)
            .await
            .with_context(|| format!("failed to open local store at '{database_url}'"))?,
    );
    storage.health_check().await?;
    let store = RecipeStore::load(storage, settings.storage_key.clone()).await?;
    let catalog = Arc::new(
        HttpCatalogClient::with_timeout(&settings.catalog_url, settings.request_timeout())
            .context("failed to build catalog client")?,
    );
    info!(catalog = %catalog.base_url(), database = %database_url, "recipe page ready");

    let input = LineInput::stdin();
    let confirmer: Arc<dyn Confirmer> = if cli.yes {
        Arc::new(FixedConfirmer(true))
    } else {
        Arc::new(TerminalConfirmer::new(input.clone()))
    };
    let page = RecipePage::new_with_dependencies(
        PageConfig {
            notification_policy: settings.notification_policy(),
            ..PageConfig::default()
        },
        store,
        catalog,
        confirmer,
    )?;

    let mut events = page.subscribe_events();
    let mut renderer = TextRenderer::new(io::stdout());

    let succeeded = match cli.command {
        Command::Search { query } => !matches!(
            page.search(query.as_deref().unwrap_or_default()).await,
            SearchOutcome::Failed
        ),
        Command::List => {
            renderer.print_recipes(&page.local_recipes().await)?;
            true
        }
        Command::Add {
            name,
            image,
            ingredients,
            instructions,
        } => {
            page.edit_form(|form| {
                form.name = name;
                form.image = image;
                form.ingredients = ingredients.replace("\\n", "\n");
                form.instructions = instructions.replace("\\n", "\n");
            })
            .await;
            matches!(page.submit_form().await, CreateOutcome::Created(_))
        }
        Command::Delete { id } => !matches!(
            page.delete_by_id(RecipeId(id)).await,
            DeleteOutcome::Failed | DeleteOutcome::UnknownCard
        ),
        Command::Shell => {
            shell::run_shell(&page, &input, &mut renderer, &mut events).await?;
            true
        }
    };
    renderer.drain(&mut events)?;

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
