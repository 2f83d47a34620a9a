//! Directory-backed source of truth.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::info;

use super::Getter;
use crate::error::{CacheError, Result};

/// Serves each key from the file of the same relative path under `root`.
///
/// Keys that would escape `root` (absolute paths, `..`) are treated as
/// missing.
#[derive(Debug, Clone)]
pub struct DirectoryGetter {
    root: PathBuf,
}

impl DirectoryGetter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> Option<PathBuf> {
        let relative = Path::new(key);
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        contained.then(|| self.root.join(relative))
    }
}

#[async_trait]
impl Getter for DirectoryGetter {
    async fn get(&self, key: &str) -> Result<Bytes> {
        info!("[SlowDB] search key {}", key);
        let not_found = || CacheError::LookupFailed(format!("{} not exist", key));

        let path = self.path_for(key).ok_or_else(not_found)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(not_found()),
            Err(e) => Err(CacheError::LookupFailed(format!(
                "reading {}: {}",
                path.display(),
                e
            ))),
        }
    }
}
