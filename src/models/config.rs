//! Application configuration structures.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Upper bound the listing accepts for `limit`.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote listing endpoint settings
    #[serde(default)]
    pub listing: ListingConfig,

    /// Rate-limit retry behavior
    #[serde(default)]
    pub retry: RetryConfig,

    /// Pagination run settings
    #[serde(default)]
    pub run: RunConfig,

    /// Document store settings
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Overlay values taken from environment-style variables.
    ///
    /// `lookup` is usually `std::env::var(..).ok()`; empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("REDDIT_PAGE") {
            self.listing.base_url = v;
        }
        if let Some(v) = get("USERAGENT") {
            self.listing.user_agent = v;
        }
        if let Some(v) = get("MONGO_CLUSTER") {
            self.storage.mongo.cluster = v;
        }
        if let Some(v) = get("MONGO_USERNAME") {
            self.storage.mongo.username = v;
        }
        if let Some(v) = get("MONGO_PASSWORD") {
            self.storage.mongo.password = v;
        }
        if let Some(v) = get("MONGO_DATABASE") {
            self.storage.mongo.database = v;
        }
        if let Some(v) = get("MONGO_COLLECTION") {
            self.storage.mongo.collection = v;
        }
        if let Some(v) = get("HARVEST_STORAGE") {
            match v.parse() {
                Ok(backend) => self.storage.backend = backend,
                Err(e) => log::warn!("Ignoring HARVEST_STORAGE: {}", e),
            }
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.listing.base_url.trim().is_empty() {
            return Err(AppError::validation("listing.base_url is empty"));
        }
        Url::parse(&self.listing.base_url).map_err(|e| {
            AppError::validation(format!(
                "listing.base_url '{}' is not a valid URL: {e}",
                self.listing.base_url
            ))
        })?;
        if self.listing.user_agent.trim().is_empty() {
            return Err(AppError::validation("listing.user_agent is empty"));
        }
        if self.listing.timeout_secs == 0 {
            return Err(AppError::validation("listing.timeout_secs must be > 0"));
        }
        if self.listing.page_size == 0 || self.listing.page_size > MAX_PAGE_SIZE {
            return Err(AppError::validation(format!(
                "listing.page_size must be within 1..={MAX_PAGE_SIZE}"
            )));
        }
        if self.retry.max_attempts == 0 {
            return Err(AppError::validation("retry.max_attempts must be > 0"));
        }
        if self.run.pages == 0 {
            return Err(AppError::validation("run.pages must be > 0"));
        }
        if self.storage.backend == StorageBackend::Mongo {
            self.storage.mongo.validate()?;
        }
        Ok(())
    }
}

/// Remote listing endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Listing base URL, e.g. `https://www.reddit.com/r/rust`
    #[serde(default)]
    pub base_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Items requested per page
    #[serde(default = "defaults::page_size")]
    pub page_size: u32,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            user_agent: defaults::user_agent(),
            page_size: defaults::page_size(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Retry behavior for rate-limited requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per page before giving up on 429
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,

    /// Constant pause before re-attempting, in seconds
    #[serde(default = "defaults::backoff")]
    pub backoff_secs: u64,
}

impl RetryConfig {
    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::max_attempts(),
            backoff_secs: defaults::backoff(),
        }
    }
}

/// Pagination run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of pages fetched per run
    #[serde(default = "defaults::pages")]
    pub pages: u32,

    /// Pause after each fetched page, in seconds
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,

    /// Stop before `pages` when the listing reports no next cursor
    #[serde(default = "defaults::stop_on_exhausted")]
    pub stop_on_exhausted: bool,
}

impl RunConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            pages: defaults::pages(),
            interval_secs: defaults::interval(),
            stop_on_exhausted: defaults::stop_on_exhausted(),
        }
    }
}

/// Which document store backs the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Mongo,
    Local,
}

impl FromStr for StorageBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(Self::Mongo),
            "local" => Ok(Self::Local),
            other => Err(AppError::config(format!(
                "unknown storage backend '{other}' (expected mongo or local)"
            ))),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mongo => f.write_str("mongo"),
            Self::Local => f.write_str("local"),
        }
    }
}

/// Document store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    #[serde(default)]
    pub mongo: MongoConfig,

    #[serde(default)]
    pub local: LocalConfig,
}

/// MongoDB connection settings.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct MongoConfig {
    /// Cluster host, e.g. `cluster0.abcde.mongodb.net`
    #[serde(default)]
    pub cluster: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub database: String,

    #[serde(default)]
    pub collection: String,
}

impl MongoConfig {
    fn validate(&self) -> Result<()> {
        let fields = [
            ("cluster", &self.cluster),
            ("username", &self.username),
            ("password", &self.password),
            ("database", &self.database),
            ("collection", &self.collection),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(AppError::validation(format!("storage.mongo.{name} is empty")));
            }
        }
        Ok(())
    }
}

// Keeps the password out of logs.
impl fmt::Debug for MongoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MongoConfig")
            .field("cluster", &self.cluster)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("collection", &self.collection)
            .finish()
    }
}

/// Local JSON-lines store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalConfig {
    #[serde(default = "defaults::local_path")]
    pub path: PathBuf,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            path: defaults::local_path(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Listing defaults
    pub fn user_agent() -> String {
        "harvester/0.1 (text post archiver)".into()
    }
    pub fn page_size() -> u32 {
        super::MAX_PAGE_SIZE
    }
    pub fn timeout() -> u64 {
        5
    }

    // Retry defaults
    pub fn max_attempts() -> u32 {
        3
    }
    pub fn backoff() -> u64 {
        60
    }

    // Run defaults: the listing stops paginating around 1000 items.
    pub fn pages() -> u32 {
        10
    }
    pub fn interval() -> u64 {
        30
    }
    pub fn stop_on_exhausted() -> bool {
        true
    }

    // Storage defaults
    pub fn local_path() -> PathBuf {
        PathBuf::from("storage/posts.jsonl")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.listing.base_url = "https://www.reddit.com/r/rust".into();
        config.storage.backend = StorageBackend::Local;
        config
    }

    #[test]
    fn defaults_match_listing_contract() {
        let config = Config::default();
        assert_eq!(config.listing.page_size, 100);
        assert_eq!(config.listing.timeout_secs, 5);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.backoff(), Duration::from_secs(60));
        assert_eq!(config.run.pages, 10);
        assert_eq!(config.run.interval(), Duration::from_secs(30));
        assert_eq!(config.storage.backend, StorageBackend::Mongo);
    }

    #[test]
    fn validate_accepts_local_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_base_url() {
        let mut config = valid_config();
        config.listing.base_url = "  ".into();
        assert!(config.validate().is_err());

        config.listing.base_url = "not a url".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_oversized_page() {
        let mut config = valid_config();
        config.listing.page_size = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_attempts() {
        let mut config = valid_config();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_requires_mongo_fields_for_mongo_backend() {
        let mut config = valid_config();
        config.storage.backend = StorageBackend::Mongo;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("storage.mongo.cluster"));
    }

    #[test]
    fn apply_env_overrides_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("REDDIT_PAGE", "https://www.reddit.com/r/learnrust"),
            ("USERAGENT", "test-agent/1.0"),
            ("MONGO_CLUSTER", "cluster0.example.net"),
            ("MONGO_DATABASE", ""),
            ("HARVEST_STORAGE", "local"),
        ]);
        let mut config = Config::default();
        config.storage.mongo.database = "posts".into();

        config.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.listing.base_url, "https://www.reddit.com/r/learnrust");
        assert_eq!(config.listing.user_agent, "test-agent/1.0");
        assert_eq!(config.storage.mongo.cluster, "cluster0.example.net");
        // Empty values leave the file value in place
        assert_eq!(config.storage.mongo.database, "posts");
        assert_eq!(config.storage.backend, StorageBackend::Local);
    }

    #[test]
    fn parses_toml_sections() {
        let toml = r#"
            [listing]
            base_url = "https://www.reddit.com/r/rust"

            [run]
            pages = 3
            stop_on_exhausted = false

            [storage]
            backend = "local"

            [storage.local]
            path = "tmp/posts.jsonl"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.run.pages, 3);
        assert!(!config.run.stop_on_exhausted);
        assert_eq!(config.run.interval_secs, 30);
        assert_eq!(config.storage.backend, StorageBackend::Local);
        assert_eq!(config.storage.local.path, PathBuf::from("tmp/posts.jsonl"));
        assert_eq!(config.listing.page_size, 100);
    }

    #[test]
    fn mongo_debug_redacts_password() {
        let mongo = MongoConfig {
            password: "hunter2".into(),
            ..Default::default()
        };
        let out = format!("{mongo:?}");
        assert!(!out.contains("hunter2"));
        assert!(out.contains("<redacted>"));
    }

    #[test]
    fn backend_from_str() {
        assert_eq!("Mongo".parse::<StorageBackend>().unwrap(), StorageBackend::Mongo);
        assert_eq!("local".parse::<StorageBackend>().unwrap(), StorageBackend::Local);
        assert!("s3".parse::<StorageBackend>().is_err());
    }
}
