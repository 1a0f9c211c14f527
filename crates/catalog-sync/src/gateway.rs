//! # Mutation Gateway
//!
//! Create, update and delete against the remote, each with its own
//! consistency policy.
//!
//! ## Policies
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Mutation Policies                                  │
//! │                                                                         │
//! │  UPDATE (local-first)                                                  │
//! │    validate ──► PATCH ──► commit UpdateCommitted (always)              │
//! │                   │                                                     │
//! │                   └── failure ──► notice only, caller still gets Ok    │
//! │                                                                         │
//! │  DELETE (remote-confirmed)                                             │
//! │    DELETE ──► ok ──► commit DeleteFulfilled ──► Ok                     │
//! │          └──► err ──► notice, nothing committed ──► Err(DeleteFailed)  │
//! │                                                                         │
//! │  CREATE (remote-required)                                              │
//! │    validate ──► POST ──► ok ──► echoed product returned                │
//! │                     └──► err ──► notice ──► Err(CreateFailed)          │
//! │    The listing is not touched: no local id can be fabricated.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The gateway never writes catalog state itself. It hands events to a
//! [`CatalogSink`], which the engine implements by forwarding them to the
//! single state owner.

use std::sync::Arc;

use async_trait::async_trait;
use catalog_core::validation::normalize_draft;
use catalog_core::{CatalogEvent, Product, ProductDraft, ProductId, ProductPatch};
use tracing::{info, warn};

use crate::api::CatalogApi;
use crate::error::{CatalogError, CatalogResult};
use crate::events::{CatalogEventEmitter, Notice};

// =============================================================================
// Sink
// =============================================================================

/// Where committed mutation events go.
#[async_trait]
pub trait CatalogSink: Send + Sync {
    async fn commit(&self, event: CatalogEvent) -> CatalogResult<()>;
}

// =============================================================================
// Update Report
// =============================================================================

/// Result of a local-first update.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateReport {
    /// The value committed locally.
    pub product: Product,

    /// Set when the remote rejected the edit.
    pub remote_error: Option<String>,
}

impl UpdateReport {
    pub fn remote_confirmed(&self) -> bool {
        self.remote_error.is_none()
    }
}

// =============================================================================
// Gateway
// =============================================================================

/// Wraps remote writes with the catalog's consistency policies.
#[derive(Clone)]
pub struct MutationGateway {
    api: CatalogApi,
    sink: Arc<dyn CatalogSink>,
    emitter: Arc<dyn CatalogEventEmitter>,
}

impl MutationGateway {
    pub fn new(
        api: CatalogApi,
        sink: Arc<dyn CatalogSink>,
        emitter: Arc<dyn CatalogEventEmitter>,
    ) -> Self {
        MutationGateway { api, sink, emitter }
    }

    /// Applies `draft` on top of `base` and commits it locally regardless of
    /// what the remote says.
    ///
    /// Fails only on invalid input or when the engine is gone.
    pub async fn update(&self, base: &Product, draft: ProductDraft) -> CatalogResult<UpdateReport> {
        let draft = normalize_draft(draft)?;
        let product = base.with_draft(&draft);
        let patch = ProductPatch::editable_fields(&product);

        let remote_error = match self.api.patch(product.id, &patch).await {
            Ok(_) => None,
            Err(e) => {
                warn!(product_id = product.id, error = %e, "Remote update failed, keeping local edit");
                Some(e.to_string())
            }
        };

        self.sink
            .commit(CatalogEvent::UpdateCommitted(product.clone()))
            .await?;

        let notice = match &remote_error {
            None => Notice::Updated { id: product.id },
            Some(reason) => Notice::UpdateRemoteFailed {
                id: product.id,
                reason: reason.clone(),
            },
        };
        self.emitter.emit_notice(&notice);

        info!(product_id = product.id, remote_ok = remote_error.is_none(), "Product update committed");
        Ok(UpdateReport {
            product,
            remote_error,
        })
    }

    /// Deletes `id` on the remote, then locally.
    ///
    /// `title` is only used for the notice.
    pub async fn delete(&self, id: ProductId, title: Option<String>) -> CatalogResult<()> {
        if let Err(e) = self.api.delete(id).await {
            let reason = e.to_string();
            warn!(product_id = id, error = %reason, "Remote delete failed");
            self.emitter.emit_notice(&Notice::DeleteFailed {
                id,
                reason: reason.clone(),
            });
            return Err(CatalogError::DeleteFailed { id, reason });
        }

        self.sink.commit(CatalogEvent::DeleteFulfilled(id)).await?;
        self.emitter.emit_notice(&Notice::Deleted { id, title });

        info!(product_id = id, "Product deleted");
        Ok(())
    }

    /// Creates a product on the remote and returns its echo.
    pub async fn create(&self, draft: ProductDraft) -> CatalogResult<Product> {
        let draft = normalize_draft(draft)?;

        match self.api.create(&draft).await {
            Ok(product) => {
                self.emitter.emit_notice(&Notice::Created {
                    id: product.id,
                    title: product.title.clone(),
                });
                info!(product_id = product.id, "Product created");
                Ok(product)
            }
            Err(e) => {
                let reason = e.to_string();
                warn!(error = %reason, "Remote create failed");
                self.emitter.emit_notice(&Notice::CreateFailed {
                    reason: reason.clone(),
                });
                Err(CatalogError::CreateFailed(reason))
            }
        }
    }
}
