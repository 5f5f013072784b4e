//! MongoDB storage implementation.
//!
//! Posts go to a single collection guarded by a unique compound index on
//! `{author: 1, created: 1}`. The server reports collisions as write error
//! code 11000, which maps to [`InsertOutcome::DuplicateKey`].

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, Credential, IndexOptions, ServerApi, ServerApiVersion};
use mongodb::{Client, Collection, IndexModel};

use crate::error::{AppError, Result};
use crate::models::{MongoConfig, NormalizedPost};
use crate::storage::{InsertOutcome, PostStore};

/// Server error code for unique index violations.
const DUPLICATE_KEY_CODE: i32 = 11000;

/// MongoDB-backed post storage.
pub struct MongoStorage {
    client: Client,
    collection: Collection<NormalizedPost>,
    namespace: String,
}

impl MongoStorage {
    /// Connect to the cluster and verify it answers a ping.
    pub async fn connect(config: &MongoConfig) -> Result<Self> {
        let mut options = ClientOptions::parse(connection_uri(&config.cluster))
            .await
            .map_err(|e| AppError::unavailable(format!("parsing connection string: {e}")))?;

        options.credential = Some(
            Credential::builder()
                .username(config.username.clone())
                .password(config.password.clone())
                .build(),
        );
        options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());

        let client = Client::with_options(options).map_err(AppError::unavailable)?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| AppError::unavailable(format!("ping failed: {e}")))?;

        log::info!("Pinged deployment at {}; connected to MongoDB", config.cluster);

        let collection = client
            .database(&config.database)
            .collection::<NormalizedPost>(&config.collection);

        Ok(Self {
            client,
            collection,
            namespace: format!("{}.{}", config.database, config.collection),
        })
    }
}

#[async_trait]
impl PostStore for MongoStorage {
    async fn ensure_schema(&self) -> Result<()> {
        log::info!("Setting up collection {} and its indexes", self.namespace);

        let deleted = self
            .collection
            .delete_many(doc! {})
            .await
            .map_err(AppError::storage)?;
        log::info!("Deleted {} documents", deleted.deleted_count);

        let index = IndexModel::builder()
            .keys(doc! { "author": 1, "created": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        let created = self
            .collection
            .create_index(index)
            .await
            .map_err(AppError::storage)?;
        log::info!("Unique index {} in place", created.index_name);

        Ok(())
    }

    async fn insert_post(&self, post: &NormalizedPost) -> InsertOutcome {
        match self.collection.insert_one(post).await {
            Ok(_) => InsertOutcome::Inserted,
            Err(e) if is_duplicate_key(&e) => InsertOutcome::DuplicateKey,
            Err(e) => InsertOutcome::Failed(e.to_string()),
        }
    }

    async fn close(&self) -> Result<()> {
        self.client.clone().shutdown().await;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("mongo:{}", self.namespace)
    }
}

/// SRV connection string for a cluster host. Credentials travel in the
/// driver options so they never need URI escaping.
fn connection_uri(cluster: &str) -> String {
    format!("mongodb+srv://{}", cluster.trim().trim_end_matches('/'))
}

fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == DUPLICATE_KEY_CODE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_uri() {
        assert_eq!(
            connection_uri("cluster0.abcde.mongodb.net"),
            "mongodb+srv://cluster0.abcde.mongodb.net"
        );
        assert_eq!(
            connection_uri(" cluster0.abcde.mongodb.net/ "),
            "mongodb+srv://cluster0.abcde.mongodb.net"
        );
    }
}
