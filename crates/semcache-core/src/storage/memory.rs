use std::collections::HashMap;

use parking_lot::RwLock;

use super::error::StorageError;
use super::ContentStore;

/// In-memory `ContentStore`. The default backend for tests and for
/// deployments that haven't wired up a durable store yet — durability is
/// delegated entirely to whatever backs this trait (spec.md §6: "No
/// persisted state is owned by this process").
#[derive(Default)]
pub struct InMemoryContentStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ContentStore for InMemoryContentStore {
    async fn get(&self, id: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().get(id).cloned())
    }

    async fn put(&self, id: &str, text: &str) -> Result<(), StorageError> {
        self.entries.write().insert(id.to_string(), text.to_string());
        Ok(())
    }
}
