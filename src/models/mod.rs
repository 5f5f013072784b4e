// src/models/mod.rs

//! Domain models for the harvester.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod page;
mod post;
mod stats;

// Re-export all public types
pub use config::{
    Config, ListingConfig, LocalConfig, MAX_PAGE_SIZE, MongoConfig, RetryConfig, RunConfig,
    StorageBackend, StorageConfig,
};
pub use page::{Cursor, PageResult};
pub use post::{NormalizedPost, PostKey, RawPost};
pub use stats::{IngestCounts, RunStats};
