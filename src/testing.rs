//! Test doubles for the listing, the store, and the clock.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{NormalizedPost, PostKey};
use crate::services::{ListingClient, ListingResponse};
use crate::storage::{InsertOutcome, PostStore};
use crate::utils::Pause;

/// In-memory store with the same uniqueness rule as the real backends.
#[derive(Default)]
pub struct MemoryStore {
    posts: Mutex<Vec<NormalizedPost>>,
    keys: Mutex<HashSet<PostKey>>,
    failing_author: Option<String>,
}

impl MemoryStore {
    /// Make every insert by `author` fail.
    pub fn failing_for(mut self, author: &str) -> Self {
        self.failing_author = Some(author.to_string());
        self
    }

    pub fn len(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    pub fn posts(&self) -> Vec<NormalizedPost> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn ensure_schema(&self) -> Result<()> {
        self.posts.lock().unwrap().clear();
        self.keys.lock().unwrap().clear();
        Ok(())
    }

    async fn insert_post(&self, post: &NormalizedPost) -> InsertOutcome {
        if self.failing_author.as_deref() == Some(post.author.as_str()) {
            return InsertOutcome::Failed("write refused".into());
        }
        if !self.keys.lock().unwrap().insert(post.key()) {
            return InsertOutcome::DuplicateKey;
        }
        self.posts.lock().unwrap().push(post.clone());
        InsertOutcome::Inserted
    }

    fn describe(&self) -> String {
        "memory".into()
    }
}

/// Listing client that replays canned responses and records requested URLs.
#[derive(Default)]
pub struct ScriptedClient {
    responses: Mutex<VecDeque<Result<ListingResponse>>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: &str) -> Self {
        self.responses.lock().unwrap().push_back(Ok(ListingResponse {
            status,
            headers: vec![("x-ratelimit-remaining".into(), "0".into())],
            body: body.as_bytes().to_vec(),
        }));
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(AppError::network("scripted", message)));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ListingClient for ScriptedClient {
    async fn get(&self, url: &str) -> Result<ListingResponse> {
        self.requests.lock().unwrap().push(url.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted response left for {url}"))
    }
}

/// Pause that records durations instead of sleeping.
#[derive(Default)]
pub struct RecordingPause {
    pauses: Mutex<Vec<Duration>>,
}

impl RecordingPause {
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().unwrap().clone()
    }
}

#[async_trait]
impl Pause for RecordingPause {
    async fn pause(&self, duration: Duration) {
        self.pauses.lock().unwrap().push(duration);
    }
}

/// A listing body with one item per `(author, created, selftext)` and the given `after`.
pub fn listing_body(items: &[(&str, u64, &str)], after: Option<&str>) -> String {
    let children: Vec<serde_json::Value> = items
        .iter()
        .map(|(author, created, selftext)| {
            serde_json::json!({"kind": "t3", "data": {
                "author": author,
                "created": created,
                "link_flair_text": null,
                "title": format!("post {created}"),
                "selftext": selftext,
                "url": format!("https://example.com/{created}"),
            }})
        })
        .collect();
    serde_json::json!({"kind": "Listing", "data": {"children": children, "after": after}})
        .to_string()
}
