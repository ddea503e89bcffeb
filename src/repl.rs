use std::fmt::Write as _;

use tracing::warn;

use crate::pantry::PantryItem;
use crate::recipe_session::ModalView;
use crate::workspace::Workspace;

pub const CUISINES: &[&str] = &["srilankan", "indian", "french", "italian", "mexican"];

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Add(String),
    Remove(String),
    Increment(String),
    Decrement(String),
    List,
    Cuisine(Option<String>),
    Recipe,
    Recipes,
    Show(usize),
    Close,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue(String),
    Quit,
}

fn required(argument: &str, usage: &str) -> Result<String, String> {
    if argument.is_empty() {
        Err(format!("Usage: {}", usage))
    } else {
        Ok(argument.to_string())
    }
}

impl ReplCommand {
    /// Parses a command line. Item names may contain spaces.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (verb, argument) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb.to_lowercase().as_str() {
            "add" => required(argument, "add <item>").map(ReplCommand::Add),
            "remove" | "rm" => required(argument, "remove <item>").map(ReplCommand::Remove),
            "inc" | "+" => required(argument, "inc <item>").map(ReplCommand::Increment),
            "dec" | "-" => required(argument, "dec <item>").map(ReplCommand::Decrement),
            "list" | "ls" => Ok(ReplCommand::List),
            "cuisine" => Ok(ReplCommand::Cuisine(
                Some(argument.to_string()).filter(|s| !s.is_empty()),
            )),
            "recipe" => Ok(ReplCommand::Recipe),
            "recipes" => Ok(ReplCommand::Recipes),
            "show" => argument
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .map(ReplCommand::Show)
                .ok_or_else(|| "Usage: show <recipe number>".to_string()),
            "close" => Ok(ReplCommand::Close),
            "help" | "?" => Ok(ReplCommand::Help),
            "quit" | "exit" => Ok(ReplCommand::Quit),
            "" => Err(String::new()),
            other => Err(format!("Unknown command '{}'. Type 'help' for a list.", other)),
        }
    }
}

pub fn help_text() -> String {
    format!(
        "Commands:
  add <item>        add one of an item
  remove <item>     remove an item entirely
  inc <item>        one more
  dec <item>        one fewer (removes at zero)
  list              show the pantry
  cuisine [style]   set or clear the recipe twist ({})
  recipe            generate a recipe from the pantry
  recipes           list saved recipes
  show <n>          open saved recipe n
  close             close the recipe view
  quit              sign out and exit",
        CUISINES.join(", ")
    )
}

pub fn render_items(items: &[PantryItem]) -> String {
    if items.is_empty() {
        return "Pantry is empty.".to_string();
    }
    let width = items.iter().map(|item| item.name.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for item in items {
        let _ = writeln!(out, "  {:<width$}  {}", item.name, item.quantity, width = width);
    }
    out.trim_end().to_string()
}

pub fn render_modal(view: ModalView<'_>) -> String {
    match view {
        ModalView::Closed => String::new(),
        ModalView::Loading => "Generating Recipe...".to_string(),
        ModalView::Showing(result) => format!("Saved Recipe\n\n{}", result),
        ModalView::Empty => "Saved Recipe\n".to_string(),
    }
}

/// Runs one command against the workspace and returns what to print.
pub async fn execute(workspace: &mut Workspace, command: ReplCommand) -> Flow {
    let reply = match command {
        ReplCommand::Add(name) => match workspace.pantry_mut().add(&name).await {
            Ok(_) => render_items(workspace.items()),
            Err(e) => failure("add", e),
        },
        ReplCommand::Remove(name) => match workspace.pantry_mut().remove(&name).await {
            Ok(()) => render_items(workspace.items()),
            Err(e) => failure("remove", e),
        },
        ReplCommand::Increment(name) => match workspace.pantry_mut().increment(&name) {
            Ok(_) => render_items(workspace.items()),
            Err(e) => failure("increment", e),
        },
        ReplCommand::Decrement(name) => match workspace.pantry_mut().decrement(&name).await {
            Ok(_) => render_items(workspace.items()),
            Err(e) => failure("decrement", e),
        },
        ReplCommand::List => render_items(workspace.items()),
        ReplCommand::Cuisine(style) => {
            workspace.set_cuisine_style(style.as_deref());
            match workspace.cuisine_style() {
                Some(style) => format!("Recipes will have a {} twist.", style),
                None => "Cuisine cleared.".to_string(),
            }
        }
        ReplCommand::Recipe => match workspace.create_recipe().await.map(|_| ()) {
            Ok(_) => render_modal(workspace.recipes().view()),
            Err(e) => failure("recipe", e),
        },
        ReplCommand::Recipes => {
            let count = workspace.recipes().recipes().len();
            if count == 0 {
                "No saved recipes yet.".to_string()
            } else {
                (1..=count)
                    .map(|n| format!("  Saved Recipe {}", n))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
        ReplCommand::Show(number) => match workspace.recipes_mut().select(number - 1).map(|_| ()) {
            Ok(_) => render_modal(workspace.recipes().view()),
            Err(e) => failure("show", e),
        },
        ReplCommand::Close => {
            workspace.recipes_mut().close();
            "Closed.".to_string()
        }
        ReplCommand::Help => help_text(),
        ReplCommand::Quit => return Flow::Quit,
    };
    Flow::Continue(reply)
}

fn failure(action: &str, error: impl std::fmt::Display) -> String {
    warn!(%action, %error, "Command failed");
    format!("Could not {}: {}", action, error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ItemStore, MemoryStore};
    use crate::workspace::AuthSession;
    use std::sync::Arc;

    #[test]
    fn parses_commands_with_multiword_items() {
        assert_eq!(
            ReplCommand::parse("add  brown rice "),
            Ok(ReplCommand::Add("brown rice".to_string()))
        );
        assert_eq!(ReplCommand::parse("DEC egg"), Ok(ReplCommand::Decrement("egg".to_string())));
        assert_eq!(ReplCommand::parse("cuisine"), Ok(ReplCommand::Cuisine(None)));
        assert_eq!(
            ReplCommand::parse("cuisine french"),
            Ok(ReplCommand::Cuisine(Some("french".to_string())))
        );
        assert_eq!(ReplCommand::parse("show 2"), Ok(ReplCommand::Show(2)));
        assert_eq!(ReplCommand::parse("quit"), Ok(ReplCommand::Quit));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(ReplCommand::parse("add").is_err());
        assert!(ReplCommand::parse("show 0").is_err());
        assert!(ReplCommand::parse("show x").is_err());
        assert!(ReplCommand::parse("bake cake").is_err());
    }

    #[test]
    fn renders_aligned_items() {
        let items = [PantryItem::new("Egg", 2), PantryItem::new("Brown Rice", 1)];
        assert_eq!(render_items(&items), "  Egg         2\n  Brown Rice  1");
        assert_eq!(render_items(&[]), "Pantry is empty.");
    }

    #[tokio::test]
    async fn session_commands_update_pantry() {
        let memory = Arc::new(MemoryStore::default());
        let mut workspace = Workspace::sign_in(AuthSession::new("Ada"), ItemStore::new(memory.clone()), None)
            .await
            .unwrap();

        execute(&mut workspace, ReplCommand::Add("egg".to_string())).await;
        execute(&mut workspace, ReplCommand::Decrement("apple".to_string())).await;
        let flow = execute(&mut workspace, ReplCommand::List).await;

        let Flow::Continue(listing) = flow else {
            panic!("list should not quit");
        };
        assert!(listing.contains("Egg"));
        assert!(!listing.contains("Apple"));
        assert!(!memory.ids().contains(&"apple".to_string()));
        assert_eq!(execute(&mut workspace, ReplCommand::Quit).await, Flow::Quit);
    }

    #[tokio::test]
    async fn unknown_item_is_reported_not_fatal() {
        let memory = Arc::new(MemoryStore::default());
        let mut workspace = Workspace::sign_in(AuthSession::new("Ada"), ItemStore::new(memory), None)
            .await
            .unwrap();

        let flow = execute(&mut workspace, ReplCommand::Remove("saffron".to_string())).await;
        assert_eq!(
            flow,
            Flow::Continue("Could not remove: 'saffron' is not in the pantry".to_string())
        );
    }
}
