//! Storage gateway for harvested posts.
//!
//! Every backend keeps `(author, created)` unique and reports a collision as
//! [`InsertOutcome::DuplicateKey`] rather than an error, since overlapping
//! pages make duplicates routine.
//!
//! - `mongo`: MongoDB collection with a unique compound index (feature `mongo`)
//! - `local`: JSON-lines file with an in-memory unique index

pub mod local;
#[cfg(feature = "mongo")]
pub mod mongo;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{NormalizedPost, StorageBackend, StorageConfig};

// Re-export for convenience
pub use local::LocalStorage;
#[cfg(feature = "mongo")]
pub use mongo::MongoStorage;

/// Result of a single insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new document was written
    Inserted,
    /// A post with the same `(author, created)` already exists
    DuplicateKey,
    /// Any other write error
    Failed(String),
}

/// Trait for post storage backends.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Clear the collection and (re)create the unique `(author, created)` constraint.
    ///
    /// Destructive. Only called from an explicit reset, never during ingestion.
    async fn ensure_schema(&self) -> Result<()>;

    /// Persist one post.
    async fn insert_post(&self, post: &NormalizedPost) -> InsertOutcome;

    /// Release the connection.
    async fn close(&self) -> Result<()> {
        Ok(())
    }

    /// Human-readable location for logs.
    fn describe(&self) -> String;
}

/// Open the backend selected in the configuration.
pub async fn open(config: &StorageConfig) -> Result<Box<dyn PostStore>> {
    match config.backend {
        StorageBackend::Local => Ok(Box::new(LocalStorage::open(&config.local.path).await?)),
        #[cfg(feature = "mongo")]
        StorageBackend::Mongo => Ok(Box::new(MongoStorage::connect(&config.mongo).await?)),
        #[cfg(not(feature = "mongo"))]
        StorageBackend::Mongo => Err(crate::error::AppError::unavailable(
            "built without the `mongo` feature",
        )),
    }
}
