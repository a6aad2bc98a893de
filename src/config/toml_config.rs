use crate::config::{
    validate_provider, DEFAULT_BIND_ADDRESS, DEFAULT_PRICE_DIR, DEFAULT_SESSION_COOKIE,
    DEFAULT_SESSION_IDLE_MINUTES,
};
use crate::core::ConfigProvider;
use crate::utils::error::{MarketplaceError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub manifests: ManifestsConfig,
    #[serde(default)]
    pub pages: BTreeMap<String, String>,
    #[serde(default)]
    pub session: SessionConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND_ADDRESS.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestsConfig {
    pub root: String,
    #[serde(default = "default_price_dir")]
    pub price_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub idle_timeout_minutes: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
            idle_timeout_minutes: DEFAULT_SESSION_IDLE_MINUTES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// "compact" 或 "json"
    pub format: Option<String>,
    pub verbose: Option<bool>,
}

fn default_price_dir() -> String {
    DEFAULT_PRICE_DIR.to_string()
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(MarketplaceError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| MarketplaceError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MANIFESTS_ROOT})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| MarketplaceError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn json_logs(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.format.as_deref())
            .map(|format| format == "json")
            .unwrap_or(false)
    }

    pub fn verbose(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.verbose)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn manifests_root(&self) -> &str {
        &self.manifests.root
    }

    fn price_manifest_dir(&self) -> &str {
        &self.manifests.price_dir
    }

    fn page_manifest(&self, page: &str) -> Option<&str> {
        self.pages.get(page).map(String::as_str)
    }

    fn page_keys(&self) -> Vec<&str> {
        self.pages.keys().map(String::as_str).collect()
    }

    fn bind_address(&self) -> &str {
        &self.server.bind
    }

    fn session_cookie_name(&self) -> &str {
        &self.session.cookie_name
    }

    fn session_idle_minutes(&self) -> u64 {
        self.session.idle_timeout_minutes
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)?;

        if let Some(format) = self.logging.as_ref().and_then(|l| l.format.as_deref()) {
            let valid_formats = ["compact", "json"];
            if !valid_formats.contains(&format) {
                return Err(MarketplaceError::InvalidConfigValueError {
                    field: "logging.format".to_string(),
                    value: format.to_string(),
                    reason: format!(
                        "Unsupported format. Valid formats: {}",
                        valid_formats.join(", ")
                    ),
                });
            }
        }

        Ok(())
    }
}
