use crate::config::{
    validate_provider, DEFAULT_BIND_ADDRESS, DEFAULT_PRICE_DIR, DEFAULT_SESSION_COOKIE,
};
use crate::core::ConfigProvider;
use crate::utils::validation::Validate;
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "marketplace-flow")]
#[command(about = "Manifest-driven catalogue and price selection service")]
pub struct CliConfig {
    #[arg(long, default_value = "./manifests")]
    pub manifests_root: String,

    #[arg(long, default_value = DEFAULT_PRICE_DIR)]
    pub price_dir: String,

    /// Page manifest mapping, e.g. --page order-items=pages/order-items/manifest.json
    #[arg(long = "page", value_parser = parse_page_mapping)]
    pub pages: Vec<(String, String)>,

    #[arg(long, default_value = DEFAULT_BIND_ADDRESS)]
    pub bind: String,

    #[arg(long, default_value = DEFAULT_SESSION_COOKIE)]
    pub session_cookie: String,

    #[arg(long, default_value = "30")]
    pub session_idle_minutes: u64,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

fn parse_page_mapping(raw: &str) -> Result<(String, String), String> {
    let (key, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=PATH, got '{}'", raw))?;
    if key.trim().is_empty() || path.trim().is_empty() {
        return Err(format!("expected KEY=PATH, got '{}'", raw));
    }
    Ok((key.trim().to_string(), path.trim().to_string()))
}

impl ConfigProvider for CliConfig {
    fn manifests_root(&self) -> &str {
        &self.manifests_root
    }

    fn price_manifest_dir(&self) -> &str {
        &self.price_dir
    }

    fn page_manifest(&self, page: &str) -> Option<&str> {
        self.pages
            .iter()
            .find(|(key, _)| key == page)
            .map(|(_, path)| path.as_str())
    }

    fn page_keys(&self) -> Vec<&str> {
        self.pages.iter().map(|(key, _)| key.as_str()).collect()
    }

    fn bind_address(&self) -> &str {
        &self.bind
    }

    fn session_cookie_name(&self) -> &str {
        &self.session_cookie
    }

    fn session_idle_minutes(&self) -> u64 {
        self.session_idle_minutes
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> crate::utils::error::Result<()> {
        validate_provider(self)
    }
}
