//! # catalog-core: Pure Catalog State Machine
//!
//! This crate is the **heart** of the catalog sync engine. It holds the data
//! model and every state transition as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Catalog Sync Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Presentation (external)                        │   │
//! │  │    Search box ──► Category picker ──► Grid ──► Edit form       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ CatalogHandle                          │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 catalog-sync (async layer)                      │   │
//! │  │    Orchestrator, Pagination Trigger, Mutation Gateway, HTTP     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ catalog-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   query   │  │   state   │  │ validation│  │   │
//! │  │   │  Product  │  │  Builder  │  │ Reducers  │  │  drafts   │  │   │
//! │  │   │  Page     │  │  Mode     │  │  Status   │  │  patches  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO TIMERS • NO NETWORK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Product, pages, drafts, patches, users
//! - [`query`] - Query modes and the request builder
//! - [`state`] - `CatalogState` and its reducers
//! - [`error`] - Domain error types
//! - [`validation`] - Draft validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use catalog_core::query::{build_request, CatalogQuery, ListingRequest};
//!
//! let query = CatalogQuery::new("phone", "smartphones", 20);
//!
//! // Free-text search dominates the category filter and the offset.
//! assert_eq!(
//!     build_request(&query),
//!     ListingRequest::Search { text: "phone".into() }
//! );
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod query;
pub mod state;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::ValidationError;
pub use query::{build_request, CatalogMode, CatalogQuery, ListingRequest};
pub use state::{CatalogEvent, CatalogState, CatalogStatus, FetchTicket};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Number of products requested per listing page.
///
/// The remote reports its cursor only as `skip`/`total`, so every page
/// advance moves the offset by exactly this many items.
pub const PAGE_SIZE: u32 = 10;

/// Quiescence window applied after a query mode change before fetching.
pub const SEARCH_DEBOUNCE_MS: u64 = 500;

/// Number of products requested for the related-products strip.
pub const RELATED_LIMIT: u32 = 4;
