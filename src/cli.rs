use clap::{Parser, Subcommand};
use serde::Deserialize;

use crate::pantry::{capitalize_words, PantryItem};

#[derive(Parser, Debug)]
#[command(author, version, about = "Track a pantry and generate recipes from it", long_about = None)]
pub struct Cli {
    /// Display name of the signed-in user
    #[arg(short, long, default_value = "Guest")]
    pub user: String,

    /// Identity token forwarded to the document store
    #[arg(long, env = "PANTRY_ID_TOKEN", hide_env_values = true)]
    pub id_token: Option<String>,

    /// Keep the pantry in memory instead of Firestore
    #[arg(long)]
    pub memory_store: bool,

    /// Cuisine twist for generated recipes (e.g. srilankan, indian, french, italian, mexican)
    #[arg(short, long)]
    pub cuisine: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Interactive pantry session (default)
    Session,
    /// Generate one recipe from a pantry listing and exit
    Generate {
        /// JSON list of {"name": ..., "count": ...} entries
        #[arg(long)]
        pantry_json: String,
    },
}

#[derive(Debug, Deserialize)]
struct PantryEntry {
    name: String,
    #[serde(default)]
    count: u32,
}

/// Parses the `[{"name": "Egg", "count": 2}]` listing used by one-shot generation.
pub fn parse_pantry_json(json: &str) -> Result<Vec<PantryItem>, serde_json::Error> {
    let entries: Vec<PantryEntry> = serde_json::from_str(json)?;
    Ok(entries
        .into_iter()
        .map(|entry| PantryItem::new(capitalize_words(entry.name.trim()), entry.count))
        .collect())
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
