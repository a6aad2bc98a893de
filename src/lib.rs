pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::{
    http::{build_router, serve, AppState},
    render::JsonRenderer,
    session::{spawn_session_reaper, InMemorySessionStore},
    storage::{FsManifestSource, MemoryManifestSource},
};
pub use core::{
    flow::{FlowEngine, Submission},
    manifest_store::ManifestStore,
    price_manifest::PriceManifestProvider,
    question_resolver::resolve,
    session_gateway::{get_from_session, save_to_session, RequestContext, SessionScope},
};
pub use utils::error::{MarketplaceError, Result};
pub use utils::price::format_price;
