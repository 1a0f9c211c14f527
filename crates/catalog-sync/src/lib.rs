//! # catalog-sync: Catalog Synchronization Engine
//!
//! This crate keeps a locally held, paginated, filterable, searchable view of
//! a remote product catalog consistent with user actions, on top of the pure
//! reducers in `catalog-core`.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Catalog Engine Architecture                       │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 CatalogEngine (single state owner)               │  │
//! │  │                                                                  │  │
//! │  │  Spawned as a tokio task; all reducers run here                 │  │
//! │  │  Publishes CatalogState snapshots over a watch channel          │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │FetchOrchestrat.│  │ MutationGateway│  │   CatalogApi           │    │
//! │  │                │  │                │  │                        │    │
//! │  │ Debounce,      │  │ Local-first    │  │ Typed endpoints over   │    │
//! │  │ epochs,        │  │ update, remote │  │ CatalogTransport       │    │
//! │  │ pagination     │  │ confirmed      │  │ (reqwest + backoff)    │    │
//! │  │ trigger guard  │  │ delete/create  │  │                        │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  LOCAL-ONLY STORES (library API; not driven by the catalog CLI)        │
//! │  • FavoritesState - products the user marked                           │
//! │  • SessionStore   - local login flag                                   │
//! │                                                                         │
//! │  NOTICES (to the presentation layer via CatalogEventEmitter):          │
//! │  • created / updated / update-remote-failed                            │
//! │  • deleted / delete-failed / create-failed                             │
//! │  • listing fetch errors                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! ### Engine
//! - [`engine`] - `CatalogEngine` task, `CatalogHandle`, builder
//! - [`orchestrator`] - Fetch sequencing (debounce, epochs, coalescing)
//! - [`trigger`] - Pagination trigger guard
//! - [`gateway`] - Mutation policies
//! - [`events`] - User notices and the emitter trait
//!
//! ### Remote Access
//! - [`api`] - Typed catalog endpoints
//! - [`transport`] - Transport trait and HTTP implementation
//!
//! ### Support
//! - [`config`] - TOML + environment configuration
//! - [`error`] - Error types
//! - [`favorites`] - Local favorites (library-only)
//! - [`session`] - Local session (library-only)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use catalog_sync::{CatalogConfig, CatalogEngineBuilder};
//!
//! let config = CatalogConfig::load_or_default(None);
//! let catalog = CatalogEngineBuilder::new(config).spawn()?;
//!
//! catalog.refresh().await?;
//! let state = catalog.wait_until_settled().await?;
//! println!("{} products, more: {}", state.items.len(), state.has_more);
//!
//! catalog.set_category("smartphones").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod favorites;
pub mod gateway;
pub mod orchestrator;
pub mod session;
pub mod transport;
pub mod trigger;

#[cfg(test)]
pub(crate) mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use api::CatalogApi;
pub use config::{ApiSettings, CatalogConfig, PagingSettings};
pub use engine::{CatalogEngine, CatalogEngineBuilder, CatalogHandle};
pub use error::{CatalogError, CatalogResult};
pub use events::{CatalogEventEmitter, NoOpEmitter, Notice};
pub use favorites::{Favorites, FavoritesState};
pub use gateway::{CatalogSink, MutationGateway, UpdateReport};
pub use orchestrator::FetchOrchestrator;
pub use session::SessionStore;
pub use transport::{CatalogTransport, HttpTransport};
pub use trigger::{PaginationTrigger, SkipReason, TriggerDecision};
