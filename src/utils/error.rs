use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketplaceError {
    #[error("Manifest not found: {path}")]
    ManifestNotFound { path: String },

    #[error("Manifest parse error in {path}: {source}")]
    ManifestParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Invalid price '{value}': {reason}")]
    InvalidPrice { value: String, reason: String },

    #[error("Failed to render template '{template}': {message}")]
    RenderError { template: String, message: String },

    #[error("Session error: {message}")]
    SessionError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl MarketplaceError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            MarketplaceError::ManifestNotFound { .. }
            | MarketplaceError::InvalidRequest { .. }
            | MarketplaceError::InvalidPrice { .. } => ErrorSeverity::Low,
            MarketplaceError::SessionError { .. } => ErrorSeverity::Medium,
            MarketplaceError::ManifestParse { .. }
            | MarketplaceError::SerializationError(_)
            | MarketplaceError::RenderError { .. } => ErrorSeverity::High,
            MarketplaceError::IoError(_)
            | MarketplaceError::ConfigError { .. }
            | MarketplaceError::ConfigValidationError { .. }
            | MarketplaceError::InvalidConfigValueError { .. } => ErrorSeverity::Critical,
        }
    }

    /// 是否屬於「找不到」類型（上游對應 404）
    pub fn is_not_found(&self) -> bool {
        matches!(self, MarketplaceError::ManifestNotFound { .. })
    }

    /// 呼叫端送來的資料有誤（上游對應 400）
    pub fn is_bad_request(&self) -> bool {
        matches!(self, MarketplaceError::InvalidRequest { .. })
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            MarketplaceError::InvalidRequest { message } => message.clone(),
            MarketplaceError::ManifestNotFound { .. } => {
                "The requested page or provisioning type does not exist".to_string()
            }
            MarketplaceError::ManifestParse { path, .. } => {
                format!("Manifest '{}' is not valid", path)
            }
            MarketplaceError::InvalidPrice { value, .. } => {
                format!("'{}' cannot be displayed as a price", value)
            }
            MarketplaceError::ConfigError { .. }
            | MarketplaceError::ConfigValidationError { .. }
            | MarketplaceError::InvalidConfigValueError { .. } => {
                format!("Configuration problem: {}", self)
            }
            _ => "Something went wrong while handling the request".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            MarketplaceError::ManifestNotFound { .. } => {
                "Check the provisioning type or page key, and that the manifest file is deployed"
            }
            MarketplaceError::ManifestParse { .. } => {
                "Run manifest-lint against the manifests directory and fix the reported file"
            }
            MarketplaceError::IoError(_) => "Check file permissions and that the manifests root exists",
            MarketplaceError::ConfigError { .. }
            | MarketplaceError::ConfigValidationError { .. }
            | MarketplaceError::InvalidConfigValueError { .. } => {
                "Review the configuration file or command line flags"
            }
            MarketplaceError::InvalidRequest { .. } => "Check the submitted form fields",
            MarketplaceError::InvalidPrice { .. } => "Price values must be finite and non-negative",
            MarketplaceError::RenderError { .. } => "Check the template name and render context",
            MarketplaceError::SessionError { .. } => "Start a new session and retry",
            MarketplaceError::SerializationError(_) => "Check the submitted data format",
        }
    }
}

pub type Result<T> = std::result::Result<T, MarketplaceError>;
