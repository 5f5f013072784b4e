//! Ingestion sink: writes a page's posts and tallies the outcomes.

use crate::error::Result;
use crate::models::{IngestCounts, PageResult};
use crate::services::extractor::extract_posts;
use crate::storage::{InsertOutcome, PostStore};

/// Writes extracted posts to a [`PostStore`].
pub struct IngestionSink<'a> {
    store: &'a dyn PostStore,
}

impl<'a> IngestionSink<'a> {
    pub fn new(store: &'a dyn PostStore) -> Self {
        Self { store }
    }

    /// Extract `page` and insert every post, one at a time.
    ///
    /// Duplicates and failed writes are counted, never raised; only a
    /// malformed page is an error.
    pub async fn ingest(&self, page: &PageResult) -> Result<IngestCounts> {
        let posts = extract_posts(page)?;
        log::debug!(
            "Extracted {} text posts from {} items",
            posts.len(),
            page.len()
        );

        let mut counts = IngestCounts::default();
        for post in &posts {
            match self.store.insert_post(post).await {
                InsertOutcome::Inserted => counts.inserted += 1,
                InsertOutcome::DuplicateKey => counts.duplicate += 1,
                InsertOutcome::Failed(reason) => {
                    log::debug!(
                        "Failed to save post by {} at {}: {}",
                        post.author,
                        post.created,
                        reason
                    );
                    counts.failed += 1;
                }
            }
        }

        log::info!(
            "Saved to {}: {} posts. Duplicated: {}, Failed: {}",
            self.store.describe(),
            counts.inserted,
            counts.duplicate,
            counts.failed
        );

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::AppError;
    use crate::models::Cursor;
    use crate::testing::MemoryStore;

    fn child(author: &str, created: u64, selftext: &str) -> serde_json::Value {
        json!({"data": {
            "author": author,
            "created": created,
            "link_flair_text": null,
            "title": "T",
            "selftext": selftext,
            "url": "u"
        }})
    }

    fn page(children: Vec<serde_json::Value>) -> PageResult {
        PageResult {
            children,
            after: Cursor::start(),
        }
    }

    #[tokio::test]
    async fn test_counts_each_outcome() {
        let store = MemoryStore::default().failing_for("mallory");
        let sink = IngestionSink::new(&store);

        let counts = sink
            .ingest(&page(vec![
                child("a", 1, "x"),
                child("a", 1, "same key"),
                child("mallory", 2, "x"),
                child("b", 3, ""),
                child("b", 4, "y"),
            ]))
            .await
            .unwrap();

        assert_eq!(
            counts,
            IngestCounts {
                inserted: 2,
                duplicate: 1,
                failed: 1,
            }
        );
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_reingesting_page_only_yields_duplicates() {
        let store = MemoryStore::default();
        let sink = IngestionSink::new(&store);
        let listing = page(vec![child("a", 1, "x"), child("b", 2, "y")]);

        let first = sink.ingest(&listing).await.unwrap();
        let second = sink.ingest(&listing).await.unwrap();

        assert_eq!(first.inserted, 2);
        assert_eq!(second.inserted, 0);
        assert_eq!(second.duplicate, 2);
    }

    #[tokio::test]
    async fn test_malformed_page_writes_nothing() {
        let store = MemoryStore::default();
        let sink = IngestionSink::new(&store);

        let err = sink
            .ingest(&page(vec![child("a", 1, "x"), json!({"data": {"author": "b"}})]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::MalformedPage(_)));
        assert_eq!(store.len(), 0);
    }
}
