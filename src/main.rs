use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use pantry_chef::api_connection::RecipeClient;
use pantry_chef::cli::{parse_args, parse_pantry_json, Cli, Command};
use pantry_chef::config::Config;
use pantry_chef::recipe_session::GENERATION_FAILED;
use pantry_chef::repl::{execute, Flow, ReplCommand};
use pantry_chef::store::{DocumentStore, FirestoreStore, ItemStore, MemoryStore};
use pantry_chef::workspace::{generate_once, AuthSession, Workspace};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn recipe_client(config: &Config) -> Result<Option<RecipeClient>> {
    match config.recipe_endpoint() {
        Ok(endpoint) => Ok(Some(
            RecipeClient::new(endpoint, config.recipe_timeout).context("Failed to build recipe client")?,
        )),
        Err(_) => Ok(None),
    }
}

fn document_store(cli: &Cli, config: &Config, auth: &AuthSession) -> Result<Arc<dyn DocumentStore>> {
    if cli.memory_store {
        info!("Using in-memory pantry store");
        return Ok(Arc::new(MemoryStore::default()));
    }
    let firestore = config
        .firestore()
        .context("Set FIRESTORE_PROJECT_ID or pass --memory-store")?;
    info!(project = %firestore.project_id, collection = %firestore.collection, "Using Firestore pantry store");
    Ok(Arc::new(FirestoreStore::new(firestore, auth)?))
}

async fn run_generate(config: &Config, pantry_json: &str) -> Result<()> {
    let items = parse_pantry_json(pantry_json).context("Failed to parse --pantry-json")?;
    let endpoint = config.recipe_endpoint()?;
    let client = RecipeClient::new(endpoint, config.recipe_timeout)?;

    println!("Generating recipe...");
    match generate_once(&client, &items).await {
        Ok(recipe) => {
            println!("\nGenerated Recipe\n");
            println!("{}", recipe);
        }
        Err(e) => {
            error!(error = %e, "Error generating recipe");
            println!("{}", GENERATION_FAILED);
        }
    }
    Ok(())
}

async fn run_session(cli: &Cli, config: &Config) -> Result<()> {
    let mut auth = AuthSession::new(cli.user.clone());
    if let Some(token) = &cli.id_token {
        auth = auth.with_id_token(token.clone());
    }

    let store = ItemStore::new(document_store(cli, config, &auth)?);
    let client = recipe_client(config)?;
    let mut workspace = Workspace::sign_in(auth, store, client)
        .await
        .context("Failed to load the pantry")?;
    workspace.set_cuisine_style(cli.cuisine.as_deref());

    println!("Welcome, {}! Type 'help' for commands.", workspace.user().display_name);
    if let Flow::Continue(listing) = execute(&mut workspace, ReplCommand::List).await {
        println!("{}", listing);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match ReplCommand::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };
        if command == ReplCommand::Recipe {
            println!("Generating Recipe...");
        }
        match execute(&mut workspace, command).await {
            Flow::Continue(output) => println!("{}", output),
            Flow::Quit => break,
        }
    }

    let auth = workspace.sign_out();
    println!("Goodbye, {}.", auth.display_name);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok(); // Load .env for endpoint and store settings
    init_logging();

    let cli = parse_args();
    let config = Config::from_env().context("Invalid configuration")?;

    match &cli.command {
        Some(Command::Generate { pantry_json }) => run_generate(&config, pantry_json).await,
        Some(Command::Session) | None => {
            if cli.command.is_none() {
                info!("No command given, starting interactive session");
            }
            run_session(&cli, &config).await
        }
    }
}
