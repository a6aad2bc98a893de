pub mod flow;
pub mod lint;
pub mod manifest_store;
pub mod price_manifest;
pub mod question_resolver;
pub mod rules;
pub mod session_gateway;

pub use crate::domain::model::{Manifest, PricePoint, QuestionDefinition, Session, SessionId};
pub use crate::domain::ports::{ConfigProvider, ManifestSource, Renderer, SessionStore};
pub use crate::utils::error::Result;
