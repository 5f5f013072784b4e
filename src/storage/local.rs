//! Local filesystem storage implementation.
//!
//! Stores one JSON document per line and keeps the `(author, created)`
//! unique index in memory, rebuilt from the file on open. Meant for offline
//! runs and testing; production runs use MongoStorage.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::{NormalizedPost, PostKey};
use crate::storage::{InsertOutcome, PostStore};

/// JSON-lines storage backend.
pub struct LocalStorage {
    path: PathBuf,
    index: Mutex<HashSet<PostKey>>,
}

impl LocalStorage {
    /// Open (or create) the store at `path`, rebuilding the unique index.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        Self::ensure_dir(&path)
            .await
            .map_err(|e| AppError::unavailable(format!("{}: {e}", path.display())))?;

        let index = match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                let content = Self::repair_tail(&path, content)
                    .await
                    .map_err(|e| AppError::unavailable(format!("{}: {e}", path.display())))?;
                Self::build_index(&path, &content)?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => {
                return Err(AppError::unavailable(format!("{}: {e}", path.display())));
            }
        };

        log::debug!(
            "Opened local store {} with {} posts",
            path.display(),
            index.len()
        );

        Ok(Self {
            path,
            index: Mutex::new(index),
        })
    }

    /// Number of stored posts.
    pub async fn len(&self) -> usize {
        self.index.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Read every stored post back.
    pub async fn load_all(&self) -> Result<Vec<NormalizedPost>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::Io(e)),
        };
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(AppError::from))
            .collect()
    }

    /// Drop an unterminated final line left by an interrupted append, or
    /// terminate it when it is a complete document.
    async fn repair_tail(path: &Path, content: String) -> std::io::Result<String> {
        if content.is_empty() || content.ends_with('\n') {
            return Ok(content);
        }

        let keep = content.rfind('\n').map_or(0, |i| i + 1);
        if serde_json::from_str::<NormalizedPost>(&content[keep..]).is_ok() {
            let mut file = tokio::fs::OpenOptions::new().append(true).open(path).await?;
            file.write_all(b"\n").await?;
            file.flush().await?;
            return Ok(content + "\n");
        }

        log::warn!(
            "Discarding torn final line in {} ({} bytes)",
            path.display(),
            content.len() - keep
        );
        let file = tokio::fs::OpenOptions::new().write(true).open(path).await?;
        file.set_len(keep as u64).await?;
        Ok(content[..keep].to_string())
    }

    fn build_index(path: &Path, content: &str) -> Result<HashSet<PostKey>> {
        let mut index = HashSet::new();
        for (n, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let post: NormalizedPost = serde_json::from_str(line).map_err(|e| {
                AppError::unavailable(format!("{} line {}: {e}", path.display(), n + 1))
            })?;
            index.insert(post.key());
        }
        Ok(index)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(path: &Path) -> std::io::Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                tokio::fs::create_dir_all(parent).await
            }
            _ => Ok(()),
        }
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn append_line(&self, post: &NormalizedPost) -> Result<()> {
        let mut line = serde_json::to_vec(post)?;
        line.push(b'\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        let len = file.metadata().await?.len();

        if let Err(e) = Self::write_line(&mut file, &line).await {
            if let Err(rollback) = file.set_len(len).await {
                log::warn!(
                    "Could not roll back partial write to {}: {}",
                    self.path.display(),
                    rollback
                );
            }
            return Err(e.into());
        }
        Ok(())
    }

    async fn write_line(file: &mut tokio::fs::File, line: &[u8]) -> std::io::Result<()> {
        file.write_all(line).await?;
        file.flush().await
    }
}

#[async_trait]
impl PostStore for LocalStorage {
    async fn ensure_schema(&self) -> Result<()> {
        let mut index = self.index.lock().await;
        self.write_bytes(b"")
            .await
            .map_err(|e| AppError::storage(format!("reset {}: {e}", self.path.display())))?;
        index.clear();
        log::info!("Cleared local store {}", self.path.display());
        Ok(())
    }

    async fn insert_post(&self, post: &NormalizedPost) -> InsertOutcome {
        let mut index = self.index.lock().await;
        let key = post.key();
        if index.contains(&key) {
            return InsertOutcome::DuplicateKey;
        }
        match self.append_line(post).await {
            Ok(()) => {
                index.insert(key);
                InsertOutcome::Inserted
            }
            Err(e) => InsertOutcome::Failed(e.to_string()),
        }
    }

    fn describe(&self) -> String {
        format!("local:{}", self.path.display())
    }
}
