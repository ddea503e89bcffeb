use thiserror::Error;
use tracing::{debug, warn};

use crate::recipe_response::RecipeResult;

/// Shown in place of a recipe when the request itself failed.
pub const GENERATION_FAILED: &str = "Error generating recipe.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("A recipe is already being generated")]
    RequestInFlight,

    #[error("No saved recipe at position {0}")]
    NoSuchRecipe(usize),

    #[error("Recipe request was superseded")]
    StaleRequest,
}

/// Identifies the single request allowed in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

/// What the recipe modal currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalView<'a> {
    Closed,
    Loading,
    Showing(&'a RecipeResult),
    Empty,
}

/// Recipes generated during this session, plus the modal pointer.
#[derive(Debug, Default)]
pub struct RecipeSession {
    recipes: Vec<RecipeResult>,
    current: Option<RecipeResult>,
    open: bool,
    pending: Option<RequestToken>,
    next_token: u64,
}

impl RecipeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recipes(&self) -> &[RecipeResult] {
        &self.recipes
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn record(&mut self, result: RecipeResult) {
        self.recipes.push(result);
    }

    /// Starts a generation. Rejected while another one is pending.
    pub fn begin(&mut self) -> Result<RequestToken, SessionError> {
        if self.pending.is_some() {
            warn!("Recipe request rejected, one is already in flight");
            return Err(SessionError::RequestInFlight);
        }
        self.next_token += 1;
        let token = RequestToken(self.next_token);
        self.pending = Some(token);
        self.current = None;
        self.open = true;
        Ok(token)
    }

    /// Finishes the generation started with `token`. A generated result is recorded and
    /// becomes the displayed one; a failed request shows [`GENERATION_FAILED`] without
    /// being recorded. Returns the displayed result, or `None` for a token that is not
    /// the pending one.
    pub fn complete<E>(
        &mut self,
        token: RequestToken,
        outcome: Result<RecipeResult, E>,
    ) -> Option<&RecipeResult> {
        if self.pending != Some(token) {
            debug!(?token, "Ignoring completion for a stale request");
            return None;
        }
        self.pending = None;

        let shown = match outcome {
            Ok(result) => {
                self.recipes.push(result.clone());
                result
            }
            Err(_) => RecipeResult::Diagnostic(GENERATION_FAILED.to_string()),
        };
        Some(self.current.insert(shown))
    }

    /// Opens the modal on a saved recipe.
    pub fn select(&mut self, index: usize) -> Result<&RecipeResult, SessionError> {
        let result = self
            .recipes
            .get(index)
            .cloned()
            .ok_or(SessionError::NoSuchRecipe(index))?;
        self.open = true;
        Ok(self.current.insert(result))
    }

    /// Hides the modal. A pending request keeps running and still lands in the list.
    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn current(&self) -> Option<&RecipeResult> {
        self.current.as_ref()
    }

    pub fn view(&self) -> ModalView<'_> {
        if !self.open {
            return ModalView::Closed;
        }
        if self.pending.is_some() {
            return ModalView::Loading;
        }
        match &self.current {
            Some(result) => ModalView::Showing(result),
            None => ModalView::Empty,
        }
    }
}
