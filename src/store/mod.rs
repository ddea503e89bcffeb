pub mod firestore;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use thiserror::Error;
use tracing::{info, warn};

use crate::pantry::capitalize_words;

pub use firestore::FirestoreStore;
pub use memory::{MemoryStore, StoreOp};

/// Items seeded into the collection on every sign-in.
pub const DEFAULT_ITEMS: &[&str] = &["Apple", "Banana", "Carrot"];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Store returned {status} for {operation} '{id}': {body}")]
    Rejected {
        operation: &'static str,
        id: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Malformed store response: {0}")]
    Malformed(String),

    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),
}

/// A keyed collection of documents with empty payloads.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Ids of every document in the collection.
    async fn list_ids(&self) -> Result<Vec<String>, StoreError>;

    /// Creates or overwrites the document with an empty payload.
    async fn set_empty(&self, id: &str) -> Result<(), StoreError>;

    /// Removes the document. Missing documents are not an error.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// Storage key for an item name.
pub fn item_key(name: &str) -> String {
    name.to_lowercase()
}

/// Translates pantry item presence into document operations.
#[derive(Clone)]
pub struct ItemStore {
    documents: Arc<dyn DocumentStore>,
}

impl ItemStore {
    pub fn new(documents: Arc<dyn DocumentStore>) -> Self {
        Self { documents }
    }

    /// Wipes the collection and seeds [`DEFAULT_ITEMS`]. Every delete finishes before the
    /// first create, and every create before this returns.
    pub async fn reset_store(&self) -> Result<(), StoreError> {
        let existing = self.documents.list_ids().await?;
        info!(count = existing.len(), "Clearing pantry collection");

        // Wait for the whole wipe, so no delete can land on a freshly seeded item
        let deletes = existing.iter().map(|id| self.documents.delete(id));
        first_failure("delete", &existing, join_all(deletes).await)?;

        let keys: Vec<String> = DEFAULT_ITEMS.iter().map(|item| item_key(item)).collect();
        let creates = keys.iter().map(|key| self.documents.set_empty(key));
        first_failure("create", &keys, join_all(creates).await)?;

        info!(items = ?DEFAULT_ITEMS, "Seeded default pantry items");
        Ok(())
    }

    /// Display names of every stored item.
    pub async fn list_items(&self) -> Result<Vec<String>, StoreError> {
        let ids = self.documents.list_ids().await?;
        Ok(ids.iter().map(|id| capitalize_words(id)).collect())
    }

    pub async fn create_item(&self, name: &str) -> Result<(), StoreError> {
        self.documents.set_empty(&item_key(name)).await
    }

    pub async fn delete_item(&self, name: &str) -> Result<(), StoreError> {
        self.documents.delete(&item_key(name)).await
    }
}

fn first_failure(
    operation: &str,
    ids: &[String],
    results: Vec<Result<(), StoreError>>,
) -> Result<(), StoreError> {
    let mut first = None;
    for (id, result) in ids.iter().zip(results) {
        if let Err(e) = result {
            warn!(%id, error = %e, "Pantry {} failed", operation);
            first.get_or_insert(e);
        }
    }
    match first {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
