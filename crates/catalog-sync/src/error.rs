//! # Catalog Error Types
//!
//! Error types for orchestration, transport, and mutation operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Catalog Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Protocol            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Connection     │  │  DecodeFailed           │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │  SerializationFailed    │ │
//! │  │  ConfigLoad/Save│  │  HttpStatus     │  │                         │ │
//! │  │                 │  │  NotFound       │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │    Mutation     │  │    Internal     │                              │
//! │  │                 │  │                 │                              │
//! │  │  Validation     │  │  ShuttingDown   │                              │
//! │  │  DeleteFailed   │  │                 │                              │
//! │  │  CreateFailed   │  │                 │                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No variant ever crosses into `CatalogState`: the engine stores only the
//! rendered message.

use catalog_core::ValidationError;
use thiserror::Error;

/// Result type alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog error type covering all engine failures.
#[derive(Debug, Error)]
pub enum CatalogError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration.
    #[error("Invalid catalog configuration: {0}")]
    InvalidConfig(String),

    /// Invalid API URL.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Could not reach the remote.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Remote answered 404.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Remote answered with another non-success status.
    #[error("Request failed with status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    // =========================================================================
    // Protocol Errors
    // =========================================================================
    /// Response body did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    DecodeFailed(String),

    /// Request body could not be serialized.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    // =========================================================================
    // Mutation Errors
    // =========================================================================
    /// Input rejected before any remote call.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Product is neither held locally nor known to the remote.
    #[error("Product not found: {0}")]
    ProductNotFound(u64),

    /// Remote refused to delete a product.
    #[error("Failed to delete product {id}: {reason}")]
    DeleteFailed { id: u64, reason: String },

    /// Remote refused to create a product.
    #[error("Failed to create product: {0}")]
    CreateFailed(String),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Engine is shutting down.
    #[error("Catalog engine is shutting down")]
    ShuttingDown,
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CatalogError::Timeout(err.to_string())
        } else if err.is_decode() {
            CatalogError::DecodeFailed(err.to_string())
        } else if let Some(status) = err.status() {
            CatalogError::HttpStatus {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            CatalogError::ConnectionFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::DecodeFailed(err.to_string())
    }
}

impl From<url::ParseError> for CatalogError {
    fn from(err: url::ParseError) -> Self {
        CatalogError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for CatalogError {
    fn from(err: toml::de::Error) -> Self {
        CatalogError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for CatalogError {
    fn from(err: toml::ser::Error) -> Self {
        CatalogError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization (for retry logic)
// =============================================================================

impl CatalogError {
    /// Returns true if the request may succeed when simply repeated.
    ///
    /// ## Retryable Errors
    /// - Connection failures
    /// - Timeouts
    /// - 5xx and 429 responses
    pub fn is_retryable(&self) -> bool {
        match self {
            CatalogError::ConnectionFailed(_) | CatalogError::Timeout(_) => true,
            CatalogError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            CatalogError::InvalidConfig(_)
                | CatalogError::InvalidUrl(_)
                | CatalogError::ConfigLoadFailed(_)
                | CatalogError::ConfigSaveFailed(_)
        )
    }

    /// Returns true if the remote does not know the requested resource.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CatalogError::NotFound(_)
                | CatalogError::ProductNotFound(_)
                | CatalogError::HttpStatus { status: 404, .. }
        )
    }
}
