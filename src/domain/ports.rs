use crate::domain::model::{Session, SessionId};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// manifest 原始位元組的來源。路徑不存在時必須回傳 `ManifestNotFound`。
pub trait ManifestSource: Send + Sync {
    fn read(&self, path: &Path) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn manifests_root(&self) -> &str;
    fn price_manifest_dir(&self) -> &str;
    fn page_manifest(&self, page: &str) -> Option<&str>;
    fn page_keys(&self) -> Vec<&str>;
    fn bind_address(&self) -> &str;
    fn session_cookie_name(&self) -> &str;
    fn session_idle_minutes(&self) -> u64;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// 過期或不存在的 session 回傳 `None`
    async fn load(&self, id: SessionId) -> Result<Option<Session>>;
    async fn commit(&self, session: Session) -> Result<()>;
    async fn remove(&self, id: SessionId) -> Result<()>;
}

/// 模板渲染由外部元件負責，核心只提供 context
pub trait Renderer: Send + Sync {
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String>;
    fn content_type(&self) -> &'static str;
}
