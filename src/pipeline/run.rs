// src/pipeline/run.rs

//! Pagination run: walks the listing page by page.

use std::time::Duration;

use crate::error::Result;
use crate::models::{Config, Cursor, RunStats};
use crate::services::{IngestionSink, ListingClient, PageFetcher};
use crate::storage::PostStore;
use crate::utils::{Pause, report};

/// Drives a fixed number of page fetches, threading the cursor through.
pub struct PaginationDriver<'a> {
    fetcher: &'a PageFetcher<'a>,
    pause: &'a dyn Pause,
    stop_on_exhausted: bool,
}

impl<'a> PaginationDriver<'a> {
    pub fn new(fetcher: &'a PageFetcher<'a>, pause: &'a dyn Pause, stop_on_exhausted: bool) -> Self {
        Self {
            fetcher,
            pause,
            stop_on_exhausted,
        }
    }

    /// Fetch up to `page_count` pages starting from the first one, pausing
    /// `interval` after each. The first fatal fetch error ends the run.
    pub async fn run(&self, page_count: u32, interval: Duration) -> Result<RunStats> {
        let mut stats = RunStats::begin();
        let mut cursor = Cursor::start();

        for iteration in 1..=page_count {
            report::step(
                iteration,
                page_count,
                &format!("Fetching posts from page cursor {cursor}"),
            );

            let page = self.fetcher.fetch_page(&cursor).await?;
            stats.pages_fetched += 1;
            stats.counts += page.counts;
            cursor = page.next;
            stats.last_cursor = cursor.clone();

            if cursor.is_start() && self.stop_on_exhausted {
                log::info!(
                    "Listing exhausted after {} of {} pages",
                    iteration,
                    page_count
                );
                stats.stopped_early = iteration < page_count;
                break;
            }

            log::info!("Pausing for {} seconds", interval.as_secs());
            self.pause.pause(interval).await;
        }

        stats.finish();
        Ok(stats)
    }
}

/// Run a full harvest with the given collaborators.
pub async fn run_harvest(
    config: &Config,
    store: &dyn PostStore,
    client: &dyn ListingClient,
    pause: &dyn Pause,
) -> Result<RunStats> {
    report::header("Harvest starting");

    let retry_buffer =
        u64::from(config.retry.max_attempts).saturating_mul(config.retry.backoff_secs);
    log::info!(
        "Estimated time to completion: {:.1} minutes",
        report::estimated_minutes(config.run.pages, config.run.interval_secs, retry_buffer)
    );
    log::info!("Writing to {}", store.describe());

    let sink = IngestionSink::new(store);
    let fetcher = PageFetcher::new(client, &sink, pause, &config.listing, &config.retry);
    let driver = PaginationDriver::new(&fetcher, pause, config.run.stop_on_exhausted);

    let stats = driver.run(config.run.pages, config.run.interval()).await?;

    report::summary(
        "Harvest complete",
        &[
            ("Pages fetched", stats.pages_fetched.to_string()),
            ("Inserted", stats.counts.inserted.to_string()),
            ("Duplicated", stats.counts.duplicate.to_string()),
            ("Failed", stats.counts.failed.to_string()),
            ("Stopped early", stats.stopped_early.to_string()),
            ("Elapsed", format!("{}s", stats.elapsed_secs())),
        ],
    );

    Ok(stats)
}
