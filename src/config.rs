use serde::Deserialize;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::list::state::ResponseOrdering;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub list: ListConfig,
}

#[derive(Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token sent with every request, if set.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

// Manual Debug impl to avoid leaking the API token
impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ListConfig {
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default)]
    pub ordering: ResponseOrdering,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
            ordering: ResponseOrdering::default(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8888".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_per_page() -> u32 {
    25
}

impl AppConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        } else {
            builder = builder.add_source(config::File::with_name("accio").required(false));
        }

        // Environment variable overrides with ACCIO_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("ACCIO")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.list.per_page == 0 {
            return Err(AppError::Config("list.per_page must be at least 1".to_string()));
        }
        if self.api.base_url.trim().is_empty() {
            return Err(AppError::Config("api.base_url must not be empty".to_string()));
        }
        Ok(())
    }
}
