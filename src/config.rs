//! Application initialization config for the hosted backend clients.
//!
//! SYSTEM CONTEXT
//! ==============
//! The startup routine builds one `AppConfig` and passes it to the identity
//! client. Nothing reads connection parameters from ambient global state.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const DEFAULT_IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1";

/// Environment variable naming a JSON config file. Takes precedence over
/// the individual `FIREBASE_*` variables in [`AppConfig::load`].
pub const CONFIG_PATH_VAR: &str = "ORDERDESK_CONFIG";

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing config: env var {var} not set")]
    Missing { var: String },
    #[error("invalid config field {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("config parse failed: {0}")]
    Parse(String),
    #[error("config read failed: {0}")]
    Io(String),
}

// =============================================================================
// CONFIG
// =============================================================================

/// Connection parameters for the document store and identity provider.
///
/// Field names follow the hosted SDK's camelCase JSON so a web config
/// snippet can be dropped in unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    #[serde(default)]
    pub storage_bucket: Option<String>,
    #[serde(default)]
    pub messaging_sender_id: Option<String>,
    pub app_id: String,
    #[serde(default)]
    pub measurement_id: Option<String>,
    #[serde(default = "default_identity_toolkit_url")]
    pub identity_toolkit_url: String,
    #[serde(default = "default_secure_token_url")]
    pub secure_token_url: String,
    /// Where the signed-in session is persisted. `None` keeps it in memory.
    #[serde(default)]
    pub session_path: Option<PathBuf>,
}

fn default_identity_toolkit_url() -> String {
    DEFAULT_IDENTITY_TOOLKIT_URL.to_owned()
}

fn default_secure_token_url() -> String {
    DEFAULT_SECURE_TOKEN_URL.to_owned()
}

impl AppConfig {
    /// Load from the file named by `ORDERDESK_CONFIG` if set, else from env.
    pub async fn load() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_file(path).await,
            Err(_) => Self::from_env(),
        }
    }

    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `FIREBASE_API_KEY`, `FIREBASE_AUTH_DOMAIN`, `FIREBASE_PROJECT_ID`, `FIREBASE_APP_ID`
    ///
    /// Optional:
    /// - `FIREBASE_STORAGE_BUCKET`, `FIREBASE_MESSAGING_SENDER_ID`, `FIREBASE_MEASUREMENT_ID`
    /// - `IDENTITY_TOOLKIT_URL`, `SECURE_TOKEN_URL`: hosted service by default
    /// - `SESSION_PATH`: session kept in memory when absent
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Parse a camelCase JSON config document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.normalized()
    }

    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::Missing { var: key.to_owned() })
        };
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Self {
            api_key: required("FIREBASE_API_KEY")?,
            auth_domain: required("FIREBASE_AUTH_DOMAIN")?,
            project_id: required("FIREBASE_PROJECT_ID")?,
            storage_bucket: optional("FIREBASE_STORAGE_BUCKET"),
            messaging_sender_id: optional("FIREBASE_MESSAGING_SENDER_ID"),
            app_id: required("FIREBASE_APP_ID")?,
            measurement_id: optional("FIREBASE_MEASUREMENT_ID"),
            identity_toolkit_url: optional("IDENTITY_TOOLKIT_URL").unwrap_or_else(default_identity_toolkit_url),
            secure_token_url: optional("SECURE_TOKEN_URL").unwrap_or_else(default_secure_token_url),
            session_path: optional("SESSION_PATH").map(PathBuf::from),
        };
        config.normalized()
    }

    fn normalized(mut self) -> Result<Self, ConfigError> {
        for (field, value) in [
            ("apiKey", &self.api_key),
            ("authDomain", &self.auth_domain),
            ("projectId", &self.project_id),
            ("appId", &self.app_id),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid { field, reason: "must not be empty".into() });
            }
        }
        self.identity_toolkit_url = normalize_url("identityToolkitUrl", &self.identity_toolkit_url)?;
        self.secure_token_url = normalize_url("secureTokenUrl", &self.secure_token_url)?;
        Ok(self)
    }
}

fn normalize_url(field: &'static str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::Invalid { field, reason: format!("expected http(s) URL, got '{raw}'") });
    }
    Ok(trimmed.to_owned())
}
