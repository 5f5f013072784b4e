// src/lib.rs

//! Harvester Library
//!
//! Walks a forum's paginated JSON listing and stores its text posts,
//! deduplicated on `(author, created)`.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;
