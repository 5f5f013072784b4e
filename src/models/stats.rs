//! Ingestion counters and run statistics.

use std::ops::AddAssign;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Cursor;

/// Outcome counts for one or more ingested pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestCounts {
    pub inserted: usize,
    pub duplicate: usize,
    pub failed: usize,
}

impl IngestCounts {
    /// Total records that reached the store.
    pub fn total(&self) -> usize {
        self.inserted + self.duplicate + self.failed
    }
}

impl AddAssign for IngestCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.inserted += rhs.inserted;
        self.duplicate += rhs.duplicate;
        self.failed += rhs.failed;
    }
}

/// Statistics for a completed pagination run.
#[derive(Debug, Clone, Serialize)]
pub struct RunStats {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub pages_fetched: u32,
    pub counts: IngestCounts,
    /// Cursor the next page would have been fetched with
    #[serde(skip)]
    pub last_cursor: Cursor,
    /// The listing ran out of pages before the configured count
    pub stopped_early: bool,
}

impl RunStats {
    pub fn begin() -> Self {
        let now = Utc::now();
        Self {
            start_time: now,
            end_time: now,
            pages_fetched: 0,
            counts: IngestCounts::default(),
            last_cursor: Cursor::start(),
            stopped_early: false,
        }
    }

    pub fn finish(&mut self) {
        self.end_time = Utc::now();
    }

    pub fn elapsed_secs(&self) -> i64 {
        (self.end_time - self.start_time).num_seconds()
    }
}
