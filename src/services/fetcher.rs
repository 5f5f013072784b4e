//! Page fetcher: one listing page per call, with rate-limit retries.
//!
//! Each attempt ends in one of three ways:
//!
//! - `200`: the page is ingested and its `after` cursor returned
//! - `429`: pause for the constant backoff and try the same cursor again,
//!   until `max_attempts` requests have been rate limited
//! - anything else, or a transport failure: fatal, no retry

use async_trait::async_trait;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Cursor, IngestCounts, ListingConfig, PageResult, RetryConfig};
use crate::services::IngestionSink;
use crate::utils::Pause;

const STATUS_OK: u16 = 200;
const STATUS_TOO_MANY_REQUESTS: u16 = 429;

/// Raw HTTP response as seen by the fetcher.
#[derive(Debug, Clone)]
pub struct ListingResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Transport for listing requests.
///
/// Implementations map timeouts and connection failures to
/// [`AppError::Network`].
#[async_trait]
pub trait ListingClient: Send + Sync {
    async fn get(&self, url: &str) -> Result<ListingResponse>;
}

/// A successfully fetched and ingested page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub next: Cursor,
    pub counts: IngestCounts,
    /// Requests spent on this page, including rate-limited ones
    pub attempts: u32,
}

/// Fetches listing pages and hands them to the sink.
pub struct PageFetcher<'a> {
    client: &'a dyn ListingClient,
    sink: &'a IngestionSink<'a>,
    pause: &'a dyn Pause,
    listing: &'a ListingConfig,
    retry: &'a RetryConfig,
}

impl<'a> PageFetcher<'a> {
    pub fn new(
        client: &'a dyn ListingClient,
        sink: &'a IngestionSink<'a>,
        pause: &'a dyn Pause,
        listing: &'a ListingConfig,
        retry: &'a RetryConfig,
    ) -> Self {
        Self {
            client,
            sink,
            pause,
            listing,
            retry,
        }
    }

    /// Listing URL for `cursor`: `<base>/.json?limit=<n>&after=<cursor>`.
    pub fn page_url(&self, cursor: &Cursor) -> Result<String> {
        page_url(self.listing, cursor)
    }

    /// Fetch the page at `cursor`, ingest it, and return the next cursor.
    pub async fn fetch_page(&self, cursor: &Cursor) -> Result<FetchedPage> {
        let url = self.page_url(cursor)?;
        let mut rate_limited = 0u32;

        loop {
            let response = self.client.get(&url).await?;

            match response.status {
                STATUS_OK => {
                    log::info!("Success {} retrieving posts", response.status);
                    let page = PageResult::parse(&response.body)?;
                    let counts = self.sink.ingest(&page).await?;
                    return Ok(FetchedPage {
                        next: page.after,
                        counts,
                        attempts: rate_limited + 1,
                    });
                }
                STATUS_TOO_MANY_REQUESTS => {
                    rate_limited += 1;
                    log::warn!(
                        "Rate limit reached (status {}), attempt {}/{}",
                        response.status,
                        rate_limited,
                        self.retry.max_attempts
                    );
                    for (name, value) in &response.headers {
                        log::warn!("    {}: {}", name, value);
                    }

                    if rate_limited >= self.retry.max_attempts {
                        return Err(AppError::RateLimitExhausted {
                            url,
                            attempts: rate_limited,
                        });
                    }

                    log::info!(
                        "Pausing for {} seconds then retrying",
                        self.retry.backoff_secs
                    );
                    self.pause.pause(self.retry.backoff()).await;
                }
                status => {
                    log::error!("Unhandled status {} for {}", status, url);
                    return Err(AppError::UnexpectedStatus { url, status });
                }
            }
        }
    }
}

/// Listing URL for `cursor` under `listing.base_url`.
pub fn page_url(listing: &ListingConfig, cursor: &Cursor) -> Result<String> {
    let base = listing.base_url.trim().trim_end_matches('/');
    let mut url = Url::parse(&format!("{base}/.json"))?;
    url.query_pairs_mut()
        .append_pair("limit", &listing.page_size.to_string())
        .append_pair("after", cursor.as_str());
    Ok(url.to_string())
}
