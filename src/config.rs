// src/config.rs

//! Configuration loading utilities.
//!
//! Resolution order, later wins:
//! 1. serde defaults
//! 2. the TOML file (missing file = defaults)
//! 3. `.env` in the working directory, then the process environment

use std::path::Path;

use crate::models::Config;

/// Load configuration from `path`, then overlay the environment.
///
/// Falls back to defaults if the file cannot be read.
pub fn load_config(path: &Path) -> Config {
    match dotenvy::dotenv() {
        Ok(env_path) => log::debug!("Loaded environment from {}", env_path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => log::warn!("Ignoring unreadable .env file: {}", e),
    }

    load_config_with(path, |key| std::env::var(key).ok())
}

/// Load configuration from `path`, overlaying values from `lookup`.
pub fn load_config_with<F>(path: &Path, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = if path.exists() {
        Config::load_or_default(path)
    } else {
        log::debug!("No config file at {}; using defaults", path.display());
        Config::default()
    };
    config.apply_env(lookup);
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StorageBackend;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_file_values_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            [run]
            pages = 4
            interval_secs = 1

            [storage]
            backend = "local"
            "#,
        )
        .unwrap();

        let config = load_config_with(&path, no_env);
        assert_eq!(config.run.pages, 4);
        assert_eq!(config.run.interval_secs, 1);
        assert_eq!(config.storage.backend, StorageBackend::Local);
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[storage]\nbackend = \"local\"\n").unwrap();

        let config = load_config_with(&path, |key| match key {
            "HARVEST_STORAGE" => Some("mongo".to_string()),
            "REDDIT_PAGE" => Some("https://www.reddit.com/r/rust".to_string()),
            _ => None,
        });

        assert_eq!(config.storage.backend, StorageBackend::Mongo);
        assert_eq!(config.listing.base_url, "https://www.reddit.com/r/rust");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_with(&dir.path().join("absent.toml"), no_env);
        assert_eq!(config.run.pages, 10);
        assert_eq!(config.storage.backend, StorageBackend::Mongo);
    }

    #[test]
    fn test_broken_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[run\npages = ").unwrap();

        let config = load_config_with(&path, no_env);
        assert_eq!(config.run.pages, 10);
    }
}
