//! Pipeline entry points for harvester operations.
//!
//! - `run_harvest`: Walk the listing and ingest text posts
//! - `run_reset`: Clear the store and recreate its unique constraint

pub mod reset;
pub mod run;

pub use reset::run_reset;
pub use run::{PaginationDriver, run_harvest};
