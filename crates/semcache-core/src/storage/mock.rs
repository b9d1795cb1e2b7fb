//! Error-injecting `ContentStore` test double (gated behind the `mock` feature).

use super::{ContentStore, StorageError};

/// Always fails with the given error; used to exercise `STORE_UNAVAILABLE`
/// on both `Get` (treated as miss) and `Put` (background write discarded).
pub struct FailingContentStore {
    error: StorageError,
}

impl FailingContentStore {
    pub fn new(error: StorageError) -> Self {
        Self { error }
    }
}

impl ContentStore for FailingContentStore {
    async fn get(&self, _id: &str) -> Result<Option<String>, StorageError> {
        Err(self.error.clone())
    }

    async fn put(&self, _id: &str, _text: &str) -> Result<(), StorageError> {
        Err(self.error.clone())
    }
}
