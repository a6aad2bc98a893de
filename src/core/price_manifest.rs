use crate::core::manifest_store::ManifestStore;
use crate::core::{Manifest, ManifestSource};
use crate::utils::error::{MarketplaceError, Result};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

const PRICE_MANIFEST_FILE: &str = "manifest.json";

/// 依 provisioning type 載入對應的價格 manifest
pub struct PriceManifestProvider<S: ManifestSource> {
    store: Arc<ManifestStore<S>>,
    price_dir: PathBuf,
}

impl<S: ManifestSource> PriceManifestProvider<S> {
    pub fn new(store: Arc<ManifestStore<S>>, price_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            price_dir: price_dir.into(),
        }
    }

    pub fn price_dir(&self) -> &Path {
        &self.price_dir
    }

    /// 統一轉小寫；不是單一目錄名稱的 key 回傳 `None`
    pub fn normalize_type(provisioning_type: &str) -> Option<String> {
        let normalized = provisioning_type.trim().to_lowercase();

        // "." 會指回價格目錄本身
        let mut components = Path::new(&normalized).components();
        let single_dir = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );

        let unsafe_key = !single_dir
            || normalized.contains('/')
            || normalized.contains('\\')
            || normalized.contains("..")
            || normalized.contains('\0');

        if unsafe_key {
            None
        } else {
            Some(normalized)
        }
    }

    pub fn manifest_path(&self, provisioning_type: &str) -> Option<PathBuf> {
        Self::normalize_type(provisioning_type)
            .map(|key| self.price_dir.join(key).join(PRICE_MANIFEST_FILE))
    }

    /// 不檢查 type 是否在已知清單中，未知的 type 由底層載入回報 not found
    pub async fn get_price_manifest(&self, provisioning_type: &str) -> Result<Manifest> {
        let path = self.manifest_path(provisioning_type).ok_or_else(|| {
            tracing::warn!("Rejected provisioning type key: {:?}", provisioning_type);
            MarketplaceError::ManifestNotFound {
                path: self
                    .price_dir
                    .join(provisioning_type)
                    .join(PRICE_MANIFEST_FILE)
                    .display()
                    .to_string(),
            }
        })?;

        self.store.load(path).await
    }
}
