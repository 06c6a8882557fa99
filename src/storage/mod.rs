pub mod sqlite;

use crate::model::{CatalogEntry, StorageError};

pub use sqlite::SqliteStorage;

/// Persistence seam the reconciler works against.
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    async fn retrieve_by_name(&self, name: &str) -> Result<Option<CatalogEntry>, StorageError>;

    /// True if the entry named `name` has `store_name` as its home store.
    async fn exists_at_store(&self, name: &str, store_name: &str) -> Result<bool, StorageError>;

    /// Inserts a new entry. Fails with `StorageError::Duplicate` if the id or name is taken.
    async fn create(&self, entry: CatalogEntry) -> Result<CatalogEntry, StorageError>;

    /// Persists home fields and the comparison list of an existing entry.
    async fn save(&self, entry: &CatalogEntry) -> Result<(), StorageError>;
}
