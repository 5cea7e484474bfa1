//! Interactive loop driving one page for the lifetime of the process.

use std::io::Write;

use anyhow::Result;
use recipe_core::{RecipePage, ViewEvent};
use tokio::sync::broadcast;

use crate::{prompt::LineInput, render::TextRenderer};

const HELP: &str = "\
commands:
  search [query]   search the catalog and local recipes
  add              add a recipe (blank line ends ingredient/instruction lists)
  delete <n>       delete card #n as last printed (see `cards`)
  cards            list rendered cards
  menu             toggle the menu
  help             show this help
  quit             exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Search(String),
    Add,
    Delete(usize),
    Cards,
    Menu,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

pub fn parse_command(line: &str) -> ShellCommand {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    match verb.to_ascii_lowercase().as_str() {
        "" => ShellCommand::Empty,
        "search" | "s" => ShellCommand::Search(rest.to_string()),
        "add" | "a" => ShellCommand::Add,
        "delete" | "d" => match rest.parse::<usize>() {
            Ok(number) if number > 0 => ShellCommand::Delete(number),
            _ => ShellCommand::Invalid(format!("expected a card number, got '{rest}'")),
        },
        "cards" | "c" => ShellCommand::Cards,
        "menu" | "m" => ShellCommand::Menu,
        "help" | "h" | "?" => ShellCommand::Help,
        "quit" | "q" | "exit" => ShellCommand::Quit,
        other => ShellCommand::Invalid(format!("unknown command '{other}'")),
    }
}

pub async fn run_shell<W: Write>(
    page: &RecipePage,
    input: &LineInput,
    renderer: &mut TextRenderer<W>,
    events: &mut broadcast::Receiver<ViewEvent>,
) -> Result<()> {
    page.start().await;
    renderer.drain(events)?;
    renderer.line("type `help` for commands")?;

    while let Some(line) = input.read_line("recipes> ").await? {
        match parse_command(&line) {
            ShellCommand::Search(query) => {
                page.search(&query).await;
            }
            ShellCommand::Add => {
                let name = input.read_line("name: ").await?.unwrap_or_default();
                let image = input.read_line("image url: ").await?.unwrap_or_default();
                let ingredients = input.read_block("ingredient: ").await?;
                let instructions = input.read_block("instruction: ").await?;
                page.edit_form(|form| {
                    form.name = name;
                    form.image = image;
                    form.ingredients = ingredients;
                    form.instructions = instructions;
                })
                .await;
                page.submit_form().await;
            }
            ShellCommand::Delete(number) => match renderer.card_at(number) {
                Some(card_id) => {
                    page.delete_card(card_id).await;
                }
                None => renderer.line(&format!("no card #{number}"))?,
            },
            ShellCommand::Cards => renderer.print_cards(&page.cards().await)?,
            ShellCommand::Menu => {
                page.toggle_menu().await;
            }
            ShellCommand::Help => renderer.line(HELP)?,
            ShellCommand::Quit => break,
            ShellCommand::Empty => {}
            ShellCommand::Invalid(reason) => renderer.line(&reason)?,
        }
        renderer.drain(events)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use recipe_core::{CatalogClient, CatalogError, FixedConfirmer};
    use shared::{
        domain::{NewRecipe, Recipe, RecipeId},
        protocol::CreatedRecipe,
    };
    use storage::{MemoryKeyValueStore, RecipeStore, DEFAULT_RECIPES_KEY};

    use super::*;

    struct EmptyCatalog;

    #[async_trait]
    impl CatalogClient for EmptyCatalog {
        async fn search(&self, _query: &str) -> Result<Vec<Recipe>, CatalogError> {
            Ok(Vec::new())
        }

        async fn create(&self, recipe: &NewRecipe) -> Result<CreatedRecipe, CatalogError> {
            Ok(CreatedRecipe {
                id: Some(RecipeId(40)),
                name: recipe.name.clone(),
                image: recipe.image.clone(),
                ingredients: recipe.ingredients.clone(),
                instructions: recipe.instructions.clone(),
            })
        }

        async fn delete(&self, _id: RecipeId) -> Result<(), CatalogError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn delete_targets_the_card_printed_under_that_number() {
        let backend = Arc::new(MemoryKeyValueStore::with_item(
            DEFAULT_RECIPES_KEY,
            r#"[{"id":1,"name":"A"},{"id":2,"name":"B"},{"id":3,"name":"C"}]"#,
        ));
        let store = RecipeStore::load(backend, DEFAULT_RECIPES_KEY)
            .await
            .expect("store");
        let page = RecipePage::new(
            store,
            Arc::new(EmptyCatalog),
            Arc::new(FixedConfirmer(true)),
        )
        .expect("page");

        let script: &'static [u8] = b"delete 1\nadd\nD\n\nflour\n\nmix\n\ndelete 3\nquit\n";
        let input = LineInput::new(script, false);
        let mut events = page.subscribe_events();
        let mut buf = Vec::new();
        let mut renderer = TextRenderer::new(&mut buf);

        run_shell(&page, &input, &mut renderer, &mut events)
            .await
            .expect("shell");
        drop(renderer);

        let names: Vec<_> = page
            .local_recipes()
            .await
            .into_iter()
            .map(|recipe| recipe.name)
            .collect();
        assert_eq!(names, vec!["B", "C"]);

        let output = String::from_utf8(buf).expect("utf8");
        assert!(output.contains("(#1 A removed)"));
        assert!(output.contains("#3 D [local, id 40]"));
        assert!(output.contains("(#3 D removed)"));
    }

    #[test]
    fn parses_commands_and_arguments() {
        assert_eq!(
            parse_command("search  Creamy Pasta "),
            ShellCommand::Search("Creamy Pasta".into())
        );
        assert_eq!(parse_command("search"), ShellCommand::Search(String::new()));
        assert_eq!(parse_command("D 2"), ShellCommand::Delete(2));
        assert_eq!(parse_command("  "), ShellCommand::Empty);
        assert_eq!(parse_command("quit"), ShellCommand::Quit);
        assert!(matches!(parse_command("delete 0"), ShellCommand::Invalid(_)));
        assert!(matches!(parse_command("delete x"), ShellCommand::Invalid(_)));
        assert!(matches!(parse_command("bake"), ShellCommand::Invalid(_)));
    }
}
