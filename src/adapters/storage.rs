use crate::core::ManifestSource;
use crate::utils::error::{MarketplaceError, Result};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// 從本機目錄讀取 manifest
#[derive(Debug, Clone)]
pub struct FsManifestSource {
    base_path: PathBuf,
}

impl FsManifestSource {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl ManifestSource for FsManifestSource {
    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let full_path = self.base_path.join(path);

        match tokio::fs::read(&full_path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(MarketplaceError::ManifestNotFound {
                path: path.display().to_string(),
            }),
            Err(e) => Err(MarketplaceError::IoError(e)),
        }
    }
}

/// 記憶體內的 manifest，用於測試或內嵌的 manifest
#[derive(Debug, Clone, Default)]
pub struct MemoryManifestSource {
    files: Arc<RwLock<HashMap<PathBuf, Vec<u8>>>>,
}

impl MemoryManifestSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        let mut files = self
            .files
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        files.insert(path.into(), contents.into());
    }

    pub fn remove(&self, path: impl AsRef<Path>) -> bool {
        let mut files = self
            .files
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        files.remove(path.as_ref()).is_some()
    }
}

impl ManifestSource for MemoryManifestSource {
    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let files = self
            .files
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        files
            .get(path)
            .cloned()
            .ok_or_else(|| MarketplaceError::ManifestNotFound {
                path: path.display().to_string(),
            })
    }
}
