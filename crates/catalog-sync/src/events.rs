//! # User Notices
//!
//! Toast-style feedback produced by the engine and the mutation gateway.
//! Notices never change catalog state; they only tell the user what the
//! remote did with a request.

use catalog_core::ProductId;
use serde::{Deserialize, Serialize};

// =============================================================================
// Notice
// =============================================================================

/// One user-facing notice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// The remote created a product.
    Created { id: ProductId, title: String },

    /// An edit was committed and the remote accepted it.
    Updated { id: ProductId },

    /// An edit was committed locally but the remote rejected it.
    UpdateRemoteFailed { id: ProductId, reason: String },

    /// The remote confirmed a delete.
    Deleted { id: ProductId, title: Option<String> },

    /// The remote refused a delete; nothing was removed.
    DeleteFailed { id: ProductId, reason: String },

    /// The remote refused a create.
    CreateFailed { reason: String },
}

impl Notice {
    /// Returns true for notices that report a failure.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Notice::UpdateRemoteFailed { .. } | Notice::DeleteFailed { .. } | Notice::CreateFailed { .. }
        )
    }

    /// Human-readable text.
    pub fn message(&self) -> String {
        match self {
            Notice::Created { title, .. } => format!("Product \"{}\" added", title),
            Notice::Updated { id } => format!("Product {} updated", id),
            Notice::UpdateRemoteFailed { id, reason } => {
                format!("Product {} updated locally; server update failed: {}", id, reason)
            }
            Notice::Deleted { title: Some(title), .. } => format!("\"{}\" deleted", title),
            Notice::Deleted { id, title: None } => format!("Product {} deleted", id),
            Notice::DeleteFailed { id, reason } => format!("Could not delete product {}: {}", id, reason),
            Notice::CreateFailed { reason } => format!("Could not add product: {}", reason),
        }
    }
}

// =============================================================================
// Event Emitter Trait
// =============================================================================

/// Receives engine feedback (implemented by the presentation layer).
pub trait CatalogEventEmitter: Send + Sync {
    /// Emits a mutation notice.
    fn emit_notice(&self, notice: &Notice);

    /// Emits a listing fetch failure that was recorded in the state.
    fn emit_fetch_error(&self, message: &str, retryable: bool);
}

/// No-op event emitter.
pub struct NoOpEmitter;

impl CatalogEventEmitter for NoOpEmitter {
    fn emit_notice(&self, _notice: &Notice) {}
    fn emit_fetch_error(&self, _message: &str, _retryable: bool) {}
}
