// src/pipeline/reset.rs

//! Collection reset.

use crate::error::Result;
use crate::storage::PostStore;
use crate::utils::report;

/// Clear every stored post and recreate the `(author, created)` constraint.
///
/// Destructive; only reachable through the explicit `reset` command.
pub async fn run_reset(store: &dyn PostStore) -> Result<()> {
    report::header("Resetting document store");
    log::warn!("Deleting every post in {}", store.describe());
    store.ensure_schema().await?;
    log::info!("Schema ready on {}", store.describe());
    Ok(())
}
