use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

pub const RECIPE_URL_VAR: &str = "GEMINI_API_URL";
// Name used by the original web deployment's .env files.
pub const LEGACY_RECIPE_URL_VAR: &str = "NEXT_PUBLIC_GEMINI_API_URL";
pub const RECIPE_TIMEOUT_VAR: &str = "RECIPE_TIMEOUT_SECS";
pub const FIRESTORE_PROJECT_VAR: &str = "FIRESTORE_PROJECT_ID";
pub const FIRESTORE_API_KEY_VAR: &str = "FIRESTORE_API_KEY";
pub const FIRESTORE_BASE_URL_VAR: &str = "FIRESTORE_BASE_URL";
pub const COLLECTION_VAR: &str = "PANTRY_COLLECTION";

const DEFAULT_TIMEOUT_SECS: &str = "60";
const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";
const DEFAULT_COLLECTION: &str = "pantry";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("Invalid {key} value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirestoreConfig {
    pub base_url: String,
    pub project_id: String,
    pub collection: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub recipe_endpoint: Option<String>,
    pub recipe_timeout: Duration,
    /// `None` when no Firestore project is configured.
    pub firestore: Option<FirestoreConfig>,
}

impl Config {
    /// Reads the process environment. Call `dotenv` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let recipe_endpoint = var(RECIPE_URL_VAR).or_else(|| var(LEGACY_RECIPE_URL_VAR));
        if recipe_endpoint.is_none() {
            warn!("{} not set, recipe generation is unavailable", RECIPE_URL_VAR);
        }

        let timeout_secs: u64 = try_load(RECIPE_TIMEOUT_VAR, var(RECIPE_TIMEOUT_VAR), DEFAULT_TIMEOUT_SECS)?;

        let firestore = var(FIRESTORE_PROJECT_VAR).map(|project_id| FirestoreConfig {
            base_url: var(FIRESTORE_BASE_URL_VAR).unwrap_or_else(|| DEFAULT_FIRESTORE_BASE_URL.to_string()),
            project_id,
            collection: var(COLLECTION_VAR).unwrap_or_else(|| {
                info!("{} not set, using default: {}", COLLECTION_VAR, DEFAULT_COLLECTION);
                DEFAULT_COLLECTION.to_string()
            }),
            api_key: var(FIRESTORE_API_KEY_VAR),
        });

        Ok(Self {
            recipe_endpoint,
            recipe_timeout: Duration::from_secs(timeout_secs),
            firestore,
        })
    }

    pub fn recipe_endpoint(&self) -> Result<&str, ConfigError> {
        self.recipe_endpoint
            .as_deref()
            .ok_or(ConfigError::Missing(RECIPE_URL_VAR))
    }

    pub fn firestore(&self) -> Result<&FirestoreConfig, ConfigError> {
        self.firestore
            .as_ref()
            .ok_or(ConfigError::Missing(FIRESTORE_PROJECT_VAR))
    }
}

fn try_load<T: FromStr>(key: &'static str, value: Option<String>, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = value.unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}
