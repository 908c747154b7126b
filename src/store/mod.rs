//! Session key-value storage used by the restorer.
//!
//! Values are opaque strings; the restorer owns their encoding.
use async_trait::async_trait;
use std::sync::Arc;

/// Minimal persistence interface: tab-scoped view state, nothing durable.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Value stored under `key`, if any.
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Insert or overwrite `key`.
    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;

    /// Remove `key`; removing a missing key is not an error.
    async fn delete(&self, key: &str) -> anyhow::Result<()>;
}

#[async_trait]
impl<T: StateStore + ?Sized> StateStore for Arc<T> {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        (**self).set(key, value).await
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        (**self).delete(key).await
    }
}

// submodules / concrete stores live here
pub mod memory_store;
pub use memory_store::MemoryStore;

#[cfg(feature = "store-sqlite")]
pub mod sqlite_store;
#[cfg(feature = "store-sqlite")]
pub use sqlite_store::SqliteStore;
