use tracing::{error, info};

use crate::api_connection::{ApiConnectionError, RecipeClient};
use crate::pantry::{PantryError, PantryItem, PantryManager};
use crate::recipe_request::build_request;
use crate::recipe_response::RecipeResult;
use crate::recipe_session::{RecipeSession, SessionError};
use crate::store::ItemStore;

/// What the identity provider hands back after sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub display_name: String,
    pub id_token: Option<String>,
}

impl AuthSession {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            id_token: None,
        }
    }

    pub fn with_id_token(mut self, token: impl Into<String>) -> Self {
        self.id_token = Some(token.into());
        self
    }
}

/// Everything a signed-in user works with. Created by [`Workspace::sign_in`] and torn
/// down by [`Workspace::sign_out`].
pub struct Workspace {
    auth: AuthSession,
    pantry: PantryManager,
    recipes: RecipeSession,
    client: Option<RecipeClient>,
    cuisine_style: Option<String>,
}

impl Workspace {
    /// Resets the pantry collection to the default items and loads it.
    pub async fn sign_in(
        auth: AuthSession,
        store: ItemStore,
        client: Option<RecipeClient>,
    ) -> Result<Self, PantryError> {
        info!(user = %auth.display_name, "Signing in");
        store.reset_store().await?;

        let mut pantry = PantryManager::new(store);
        pantry.rebuild().await?;

        Ok(Self {
            auth,
            pantry,
            recipes: RecipeSession::new(),
            client,
            cuisine_style: None,
        })
    }

    pub fn sign_out(self) -> AuthSession {
        info!(user = %self.auth.display_name, recipes = self.recipes.recipes().len(), "Signing out");
        self.auth
    }

    pub fn user(&self) -> &AuthSession {
        &self.auth
    }

    pub fn items(&self) -> &[PantryItem] {
        self.pantry.items()
    }

    pub fn pantry_mut(&mut self) -> &mut PantryManager {
        &mut self.pantry
    }

    pub fn recipes(&self) -> &RecipeSession {
        &self.recipes
    }

    pub fn recipes_mut(&mut self) -> &mut RecipeSession {
        &mut self.recipes
    }

    pub fn cuisine_style(&self) -> Option<&str> {
        self.cuisine_style.as_deref()
    }

    pub fn set_cuisine_style(&mut self, style: Option<&str>) {
        self.cuisine_style = style
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
    }

    /// Generates a recipe from the current pantry and selected cuisine. A rejected or
    /// failed request ends with the modal showing the generic failure text.
    pub async fn create_recipe(&mut self) -> Result<&RecipeResult, SessionError> {
        let token = self.recipes.begin()?;
        let request = build_request(self.pantry.items(), self.cuisine_style.as_deref());

        let outcome = match &self.client {
            Some(client) => client.generate(&request).await.map(|parsed| parsed.into_result()),
            None => Err(ApiConnectionError::MissingEndpoint),
        };
        if let Err(e) = &outcome {
            error!(error = %e, "Error generating recipe");
        }

        self.recipes
            .complete(token, outcome)
            .ok_or(SessionError::StaleRequest)
    }
}

/// One-shot generation from a pantry listing, without a cuisine twist and without a
/// session.
pub async fn generate_once(client: &RecipeClient, items: &[PantryItem]) -> Result<RecipeResult, ApiConnectionError> {
    let request = build_request(items, None);
    let parsed = client.generate(&request).await?;
    Ok(parsed.into_result())
}
