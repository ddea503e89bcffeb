use thiserror::Error;
use tracing::{debug, info};

use crate::store::{item_key, ItemStore, StoreError};

#[derive(Debug, Error)]
pub enum PantryError {
    #[error("Item name is empty")]
    EmptyName,

    #[error("Item name '{0}' cannot contain '/'")]
    SlashInName(String),

    #[error("'{0}' is not in the pantry")]
    UnknownItem(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PantryItem {
    pub name: String,
    pub quantity: u32,
}

impl PantryItem {
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            quantity,
        }
    }

    pub fn key(&self) -> String {
        item_key(&self.name)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Upper-cases the first character of every word, leaving the rest untouched:
/// `"brown rice"` becomes `"Brown Rice"`, `"o'neil's"` becomes `"O'Neil'S"`.
pub fn capitalize_words(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut previous_is_word = false;
    for c in input.chars() {
        let current_is_word = is_word_char(c);
        if current_is_word && !previous_is_word {
            output.extend(c.to_uppercase());
        } else {
            output.push(c);
        }
        previous_is_word = current_is_word;
    }
    output
}

/// Local pantry contents kept in step with the item store. Only presence is persisted;
/// quantities live here.
pub struct PantryManager {
    store: ItemStore,
    items: Vec<PantryItem>,
}

impl PantryManager {
    pub fn new(store: ItemStore) -> Self {
        Self {
            store,
            items: Vec::new(),
        }
    }

    /// Replaces local state with the stored items, one of each.
    pub async fn rebuild(&mut self) -> Result<(), PantryError> {
        let names = self.store.list_items().await?;
        self.items.clear();
        for name in names {
            // Ids differing only in case collapse to the first one listed
            if self.position(&name).is_none() {
                self.items.push(PantryItem::new(name, 1));
            }
        }
        info!(count = self.items.len(), "Pantry rebuilt from store");
        Ok(())
    }

    pub fn items(&self) -> &[PantryItem] {
        &self.items
    }

    pub fn quantity(&self, name: &str) -> Option<u32> {
        self.position(name).map(|idx| self.items[idx].quantity)
    }

    fn position(&self, name: &str) -> Option<usize> {
        let key = item_key(name);
        self.items.iter().position(|item| item.key() == key)
    }

    fn require(&self, name: &str) -> Result<usize, PantryError> {
        self.position(name)
            .ok_or_else(|| PantryError::UnknownItem(name.to_string()))
    }

    /// Adds one of `raw_name`. A new item is created in the store; an existing one only
    /// has its count bumped. Returns the new quantity.
    pub async fn add(&mut self, raw_name: &str) -> Result<u32, PantryError> {
        let trimmed = raw_name.trim();
        if trimmed.is_empty() {
            return Err(PantryError::EmptyName);
        }
        // The name becomes a document id, where '/' would start a new path segment
        if trimmed.contains('/') {
            return Err(PantryError::SlashInName(trimmed.to_string()));
        }
        let name = capitalize_words(trimmed);

        // Same key means same item, whatever the casing
        if self.position(&name).is_some() {
            return self.increment(&name);
        }

        self.store.create_item(&name).await?;
        debug!(item = %name, "Created pantry item");
        self.items.push(PantryItem::new(name, 1));
        Ok(1)
    }

    /// Deletes the item from the store, then drops it locally. A failed delete leaves
    /// local state untouched.
    pub async fn remove(&mut self, name: &str) -> Result<(), PantryError> {
        let idx = self.require(name)?;
        self.store.delete_item(&self.items[idx].name).await?;
        let removed = self.items.remove(idx);
        debug!(item = %removed.name, "Removed pantry item");
        Ok(())
    }

    pub fn increment(&mut self, name: &str) -> Result<u32, PantryError> {
        let idx = self.require(name)?;
        self.items[idx].quantity += 1;
        let quantity = self.items[idx].quantity;
        self.prune_zero();
        Ok(quantity)
    }

    /// Takes one away. Going from one to zero removes the item, store included.
    /// Returns the new quantity.
    pub async fn decrement(&mut self, name: &str) -> Result<u32, PantryError> {
        let idx = self.require(name)?;
        // Pre-decrement count picks the path: at one the item leaves the store too
        let previous = self.items[idx].quantity;

        if previous == 1 {
            self.remove(name).await?;
            return Ok(0);
        }

        self.items[idx].quantity = previous.saturating_sub(1);
        let quantity = self.items[idx].quantity;
        self.prune_zero();
        Ok(quantity)
    }

    /// Drops every item whose quantity is zero. Returns how many were dropped.
    pub fn prune_zero(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(|item| item.quantity > 0);
        before - self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreOp};
    use std::collections::HashSet;
    use std::sync::Arc;

    fn manager_with(memory: &Arc<MemoryStore>) -> PantryManager {
        PantryManager::new(ItemStore::new(memory.clone()))
    }

    #[test]
    fn capitalizes_every_word() {
        assert_eq!(capitalize_words("brown rice"), "Brown Rice");
        assert_eq!(capitalize_words("sun-dried tomato"), "Sun-Dried Tomato");
        assert_eq!(capitalize_words("CARROT"), "CARROT");
        assert_eq!(capitalize_words("7up"), "7up");
        assert_eq!(capitalize_words("crème brûlée"), "Crème Brûlée");
        assert_eq!(capitalize_words(""), "");
    }

    #[tokio::test]
    async fn add_normalizes_and_counts_duplicates() {
        let memory = Arc::new(MemoryStore::default());
        let mut pantry = manager_with(&memory);

        assert_eq!(pantry.add("carrot").await.unwrap(), 1);
        assert_eq!(pantry.add("Carrot").await.unwrap(), 2);

        assert_eq!(pantry.items(), &[PantryItem::new("Carrot", 2)]);
        assert_eq!(memory.ops(), vec![StoreOp::Set("carrot".to_string())]);
    }

    #[tokio::test]
    async fn add_trims_and_rejects_blank() {
        let memory = Arc::new(MemoryStore::default());
        let mut pantry = manager_with(&memory);

        assert!(matches!(pantry.add("   ").await, Err(PantryError::EmptyName)));
        pantry.add("  olive oil ").await.unwrap();
        assert_eq!(pantry.items()[0].name, "Olive Oil");
        assert_eq!(memory.ids(), vec!["olive oil"]);
    }

    #[tokio::test]
    async fn add_rejects_names_with_slash() {
        let memory = Arc::new(MemoryStore::default());
        let mut pantry = manager_with(&memory);

        let result = pantry.add("salt/pepper").await;

        assert!(matches!(result, Err(PantryError::SlashInName(name)) if name == "salt/pepper"));
        assert!(pantry.items().is_empty());
        assert!(memory.ops().is_empty());
    }

    #[tokio::test]
    async fn decrement_from_one_deletes_from_store() {
        let memory = Arc::new(MemoryStore::default());
        let mut pantry = manager_with(&memory);
        pantry.add("egg").await.unwrap();
        memory.clear_ops();

        assert_eq!(pantry.decrement("Egg").await.unwrap(), 0);

        assert!(pantry.items().is_empty());
        assert_eq!(pantry.quantity("Egg"), None);
        assert_eq!(memory.ops(), vec![StoreOp::Delete("egg".to_string())]);
    }

    #[tokio::test]
    async fn decrement_above_one_stays_local() {
        let memory = Arc::new(MemoryStore::default());
        let mut pantry = manager_with(&memory);
        pantry.add("egg").await.unwrap();
        pantry.increment("egg").unwrap();
        pantry.increment("EGG").unwrap();
        memory.clear_ops();

        assert_eq!(pantry.decrement("egg").await.unwrap(), 2);
        assert!(memory.ops().is_empty());
    }

    #[tokio::test]
    async fn remove_unknown_item_fails() {
        let memory = Arc::new(MemoryStore::default());
        let mut pantry = manager_with(&memory);

        assert!(matches!(
            pantry.remove("Saffron").await,
            Err(PantryError::UnknownItem(_))
        ));
        assert!(matches!(pantry.increment("Saffron"), Err(PantryError::UnknownItem(_))));
    }

    #[tokio::test]
    async fn failed_remove_keeps_local_item() {
        let memory = Arc::new(MemoryStore::default());
        let mut pantry = manager_with(&memory);
        pantry.add("milk").await.unwrap();
        memory.fail_deletes_of("milk");

        assert!(pantry.remove("Milk").await.is_err());
        assert_eq!(pantry.quantity("milk"), Some(1));
    }

    #[tokio::test]
    async fn rebuild_lists_store_items_once_each() {
        let memory = Arc::new(MemoryStore::with_ids(["banana", "apple"]));
        let mut pantry = manager_with(&memory);
        pantry.add("stale").await.unwrap();

        pantry.rebuild().await.unwrap();

        assert_eq!(
            pantry.items(),
            &[PantryItem::new("Apple", 1), PantryItem::new("Banana", 1)]
        );
    }

    #[test]
    fn prune_drops_zero_quantities() {
        let mut pantry = PantryManager::new(ItemStore::new(Arc::new(MemoryStore::default())));
        pantry.items = vec![
            PantryItem::new("Apple", 0),
            PantryItem::new("Banana", 2),
            PantryItem::new("Carrot", 0),
        ];

        assert_eq!(pantry.prune_zero(), 2);
        assert_eq!(pantry.items(), &[PantryItem::new("Banana", 2)]);
    }

    #[tokio::test]
    async fn listed_items_stay_positive_and_unique() {
        let memory = Arc::new(MemoryStore::default());
        let mut pantry = manager_with(&memory);
        let names = ["apple", "Apple", "brown rice", "Brown Rice", "egg"];
        let mut seed: u64 = 0x2545_f491;

        for _ in 0..400 {
            seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            let name = names[(seed >> 33) as usize % names.len()];
            let _ = match (seed >> 40) % 4 {
                0 => pantry.add(name).await.map(|_| ()),
                1 => pantry.remove(name).await,
                2 => pantry.increment(name).map(|_| ()),
                _ => pantry.decrement(name).await.map(|_| ()),
            };
            pantry.prune_zero();

            let keys: HashSet<String> = pantry.items().iter().map(PantryItem::key).collect();
            assert_eq!(keys.len(), pantry.items().len());
            assert!(pantry.items().iter().all(|item| item.quantity > 0));

            let mut stored = memory.ids();
            stored.sort();
            let mut local: Vec<String> = keys.into_iter().collect();
            local.sort();
            assert_eq!(stored, local);
        }
    }
}
