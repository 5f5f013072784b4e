//! Service layer for the harvester.
//!
//! This module contains the business logic for:
//! - Post extraction (`extract_posts`)
//! - Page ingestion (`IngestionSink`)
//! - Listing retrieval with rate-limit retries (`PageFetcher`)

pub mod extractor;
mod fetcher;
mod sink;

pub use extractor::extract_posts;
pub use fetcher::{FetchedPage, ListingClient, ListingResponse, PageFetcher, page_url};
pub use sink::IngestionSink;
