//! # Catalog Configuration
//!
//! Configuration management for the catalog engine.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CATALOG_API_URL=https://dummyjson.com                              │
//! │     CATALOG_PAGE_SIZE=10                                               │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/catalog-sync/catalog.toml (Linux)                        │
//! │     ~/Library/Application Support/com.catalog.catalog-sync/ (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # catalog.toml
//! [api]
//! base_url = "https://dummyjson.com"
//! timeout_secs = 10
//! max_retries = 2
//!
//! [paging]
//! page_size = 10
//! search_debounce_ms = 500
//! related_limit = 4
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{CatalogError, CatalogResult};

// =============================================================================
// API Settings
// =============================================================================

/// Remote catalog API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL of the catalog API (http or https).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Retries for idempotent GET requests. 0 disables retry.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff before the first retry (milliseconds).
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    /// Upper bound for a single backoff interval (seconds).
    #[serde(default = "default_max_backoff")]
    pub max_backoff_secs: u64,
}

fn default_base_url() -> String {
    "https://dummyjson.com".to_string()
}
fn default_timeout() -> u64 {
    10
}
fn default_max_retries() -> u32 {
    2
}
fn default_initial_backoff() -> u64 {
    200
}
fn default_max_backoff() -> u64 {
    5
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_secs: default_max_backoff(),
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs(self.max_backoff_secs)
    }
}

// =============================================================================
// Paging Settings
// =============================================================================

/// Listing and scheduling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagingSettings {
    /// Items per listing page; also the pagination advance.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Quiescence window after a query mode change (milliseconds).
    #[serde(default = "default_debounce")]
    pub search_debounce_ms: u64,

    /// Items requested for the related-products strip.
    #[serde(default = "default_related_limit")]
    pub related_limit: u32,
}

fn default_page_size() -> u32 {
    catalog_core::PAGE_SIZE
}
fn default_debounce() -> u64 {
    catalog_core::SEARCH_DEBOUNCE_MS
}
fn default_related_limit() -> u32 {
    catalog_core::RELATED_LIMIT
}

impl Default for PagingSettings {
    fn default() -> Self {
        PagingSettings {
            page_size: default_page_size(),
            search_debounce_ms: default_debounce(),
            related_limit: default_related_limit(),
        }
    }
}

impl PagingSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete catalog configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub paging: PagingSettings,
}

impl CatalogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (catalog.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CatalogResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading catalog config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load catalog config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> CatalogResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| CatalogError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CatalogError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| CatalogError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Catalog config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CatalogResult<()> {
        let url = url::Url::parse(&self.api.base_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(CatalogError::InvalidUrl(format!(
                "API URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(CatalogError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.paging.page_size == 0 {
            return Err(CatalogError::InvalidConfig(
                "page_size must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("CATALOG_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Ok(timeout) = std::env::var("CATALOG_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(t) => self.api.timeout_secs = t,
                Err(_) => warn!(value = %timeout, "Ignoring invalid CATALOG_TIMEOUT_SECS"),
            }
        }

        if let Ok(retries) = std::env::var("CATALOG_MAX_RETRIES") {
            if let Ok(r) = retries.parse::<u32>() {
                self.api.max_retries = r;
            }
        }

        if let Ok(size) = std::env::var("CATALOG_PAGE_SIZE") {
            if let Ok(s) = size.parse::<u32>() {
                debug!(page_size = s, "Overriding page size from environment");
                self.paging.page_size = s;
            }
        }

        if let Ok(ms) = std::env::var("CATALOG_DEBOUNCE_MS") {
            if let Ok(ms) = ms.parse::<u64>() {
                self.paging.search_debounce_ms = ms;
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "catalog", "catalog-sync")
            .map(|dirs| dirs.config_dir().join("catalog.toml"))
    }

    /// Returns the API base URL.
    pub fn base_url(&self) -> &str {
        &self.api.base_url
    }
}
