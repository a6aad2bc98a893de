use crate::core::{Manifest, ManifestSource};
use crate::utils::error::{MarketplaceError, Result};
use std::path::Path;

/// 每次呼叫都重新讀取並解析，不做快取
pub struct ManifestStore<S: ManifestSource> {
    source: S,
}

impl<S: ManifestSource> ManifestStore<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn load<P: AsRef<Path>>(&self, path: P) -> Result<Manifest> {
        let path = path.as_ref();
        tracing::debug!("Loading manifest: {}", path.display());

        let bytes = self.source.read(path).await?;
        let manifest: Manifest =
            serde_json::from_slice(&bytes).map_err(|source| MarketplaceError::ManifestParse {
                path: path.display().to_string(),
                source,
            })?;

        let duplicates = manifest.duplicate_question_ids();
        if !duplicates.is_empty() {
            tracing::warn!(
                "⚠️ Manifest {} has duplicate question ids {:?}, first match wins",
                path.display(),
                duplicates
            );
        }

        Ok(manifest)
    }
}
