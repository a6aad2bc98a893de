#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use toml_config::TomlConfig;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_page_key, validate_path, validate_positive_number,
    validate_relative_path, validate_socket_addr,
};

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";
pub const DEFAULT_PRICE_DIR: &str = "price";
pub const DEFAULT_SESSION_COOKIE: &str = "marketplace_session";
pub const DEFAULT_SESSION_IDLE_MINUTES: u64 = 30;

/// 不論設定來源（CLI 或 TOML），共用的檢查規則
pub fn validate_provider<C: ConfigProvider>(config: &C) -> Result<()> {
    validate_path("manifests.root", config.manifests_root())?;
    validate_relative_path("manifests.price_dir", config.price_manifest_dir())?;

    for key in config.page_keys() {
        validate_page_key("pages", key)?;
        if let Some(path) = config.page_manifest(key) {
            validate_relative_path(&format!("pages.{}", key), path)?;
        }
    }

    validate_socket_addr("server.bind", config.bind_address())?;
    validate_non_empty_string("session.cookie_name", config.session_cookie_name())?;
    validate_positive_number(
        "session.idle_timeout_minutes",
        config.session_idle_minutes(),
        1,
    )?;

    Ok(())
}
