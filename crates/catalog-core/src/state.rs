//! # Catalog Store
//!
//! The authoritative in-memory catalog state and its reducers.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       CatalogState Transitions                          │
//! │                                                                         │
//! │  ┌──────┐  FetchPending   ┌─────────┐  FetchFulfilled  ┌───────────┐   │
//! │  │ Idle │ ──────────────► │ Loading │ ───────────────► │ Succeeded │   │
//! │  └──────┘                 └────┬────┘                  └─────┬─────┘   │
//! │      ▲                         │ FetchRejected               │         │
//! │      │                         ▼                             │         │
//! │      │                    ┌─────────┐    FetchPending        │         │
//! │      │                    │ Failed  │ ◄──────────────────────┘         │
//! │      │                    └─────────┘   (via Loading)                  │
//! │      │                                                                  │
//! │      └──── Reset (from any status)                                     │
//! │                                                                         │
//! │  Status-independent: DeleteFulfilled, UpdateCommitted                  │
//! │                                                                         │
//! │  STILL-RELEVANT CHECK (fulfilled / rejected):                          │
//! │  status == Loading && ticket.epoch == epoch && ticket.mode == mode      │
//! │  Anything else is a superseded response and is dropped silently.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - `items` never holds two products with the same `id`
//! - `items` order is arrival order; merges append, edits replace in place
//! - an offset-0 fetch clears `items` and adopts the ticket's mode
//! - a failed fetch never touches `items` or `has_more`

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::query::{CatalogMode, ListingRequest};
use crate::types::{Product, ProductId, ProductPage};

// =============================================================================
// Status
// =============================================================================

/// Request status of the catalog listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

impl std::fmt::Display for CatalogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogStatus::Idle => write!(f, "idle"),
            CatalogStatus::Loading => write!(f, "loading"),
            CatalogStatus::Succeeded => write!(f, "succeeded"),
            CatalogStatus::Failed => write!(f, "failed"),
        }
    }
}

// =============================================================================
// Fetch Ticket
// =============================================================================

/// Identity of one logical fetch.
///
/// `epoch` increases on every query mode change, so two tickets for the same
/// mode issued on either side of a change are still distinguishable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchTicket {
    pub epoch: u64,
    pub mode: CatalogMode,
    pub offset: u32,
    pub request: ListingRequest,
}

impl FetchTicket {
    /// Returns true if this fetch starts a fresh listing.
    pub fn is_first_page(&self) -> bool {
        self.offset == 0
    }
}

// =============================================================================
// Events
// =============================================================================

/// Every transition the catalog state accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEvent {
    /// A listing fetch is about to be issued.
    FetchPending(FetchTicket),

    /// A listing fetch returned a page.
    FetchFulfilled { ticket: FetchTicket, page: ProductPage },

    /// A listing fetch failed; the message is already normalized.
    FetchRejected { ticket: FetchTicket, message: String },

    /// The remote confirmed a delete.
    DeleteFulfilled(ProductId),

    /// Local-first commit of an edited product.
    UpdateCommitted(Product),

    /// Return to the initial value.
    Reset,
}

impl CatalogEvent {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            CatalogEvent::FetchPending(_) => "fetch_pending",
            CatalogEvent::FetchFulfilled { .. } => "fetch_fulfilled",
            CatalogEvent::FetchRejected { .. } => "fetch_rejected",
            CatalogEvent::DeleteFulfilled(_) => "delete_fulfilled",
            CatalogEvent::UpdateCommitted(_) => "update_committed",
            CatalogEvent::Reset => "reset",
        }
    }
}

// =============================================================================
// Catalog State
// =============================================================================

/// The catalog view held by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogState {
    /// Accumulated products in arrival order, unique by id.
    pub items: Vec<Product>,

    pub status: CatalogStatus,

    /// Last listing failure; cleared when the next fetch starts.
    pub error: Option<String>,

    /// True iff the remote reported more items than are held for this mode.
    pub has_more: bool,

    /// Mode that produced `items`.
    pub mode: CatalogMode,

    /// Epoch of the fetch that last reset `items`.
    pub epoch: u64,
}

impl Default for CatalogState {
    fn default() -> Self {
        CatalogState {
            items: Vec::new(),
            status: CatalogStatus::Idle,
            error: None,
            has_more: true,
            mode: CatalogMode::Unfiltered,
            epoch: 0,
        }
    }
}

impl CatalogState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `items` came from a listing that loads page by page.
    pub fn is_paginated(&self) -> bool {
        self.mode.is_paginated()
    }

    pub fn is_loading(&self) -> bool {
        self.status == CatalogStatus::Loading
    }

    /// Looks up a held product by id.
    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.items.iter().find(|p| p.id == id)
    }

    /// Returns true if a response for `ticket` may still be merged.
    pub fn is_relevant(&self, ticket: &FetchTicket) -> bool {
        self.status == CatalogStatus::Loading
            && ticket.epoch == self.epoch
            && ticket.mode == self.mode
    }

    /// Pure reducer: `(state, event) → state`.
    pub fn reduce(mut self, event: CatalogEvent) -> Self {
        self.apply(event);
        self
    }

    /// Applies `event` in place.
    ///
    /// Returns false when the event was dropped (stale fetch response or a
    /// pending fetch from an older epoch). Deletes and updates of unknown ids
    /// are no-ops but still count as applied.
    pub fn apply(&mut self, event: CatalogEvent) -> bool {
        match event {
            CatalogEvent::FetchPending(ticket) => self.fetch_pending(ticket),
            CatalogEvent::FetchFulfilled { ticket, page } => self.fetch_fulfilled(&ticket, page),
            CatalogEvent::FetchRejected { ticket, message } => self.fetch_rejected(&ticket, message),
            CatalogEvent::DeleteFulfilled(id) => {
                self.items.retain(|p| p.id != id);
                true
            }
            CatalogEvent::UpdateCommitted(product) => {
                if let Some(slot) = self.items.iter_mut().find(|p| p.id == product.id) {
                    *slot = product;
                }
                true
            }
            CatalogEvent::Reset => {
                *self = CatalogState::default();
                true
            }
        }
    }

    fn fetch_pending(&mut self, ticket: FetchTicket) -> bool {
        if ticket.is_first_page() {
            if ticket.epoch < self.epoch {
                return false;
            }
            self.items.clear();
            self.mode = ticket.mode;
            self.epoch = ticket.epoch;
        } else if ticket.epoch != self.epoch || ticket.mode != self.mode {
            return false;
        }

        self.status = CatalogStatus::Loading;
        self.error = None;
        true
    }

    fn fetch_fulfilled(&mut self, ticket: &FetchTicket, page: ProductPage) -> bool {
        if !self.is_relevant(ticket) {
            return false;
        }

        self.status = CatalogStatus::Succeeded;

        let mut seen: HashSet<ProductId> = self.items.iter().map(|p| p.id).collect();
        for product in page.products {
            // `insert` also rejects repeats within the same page
            if seen.insert(product.id) {
                self.items.push(product);
            }
        }

        self.has_more = (self.items.len() as u64) < page.total;
        true
    }

    fn fetch_rejected(&mut self, ticket: &FetchTicket, message: String) -> bool {
        if !self.is_relevant(ticket) {
            return false;
        }

        self.status = CatalogStatus::Failed;
        self.error = Some(message);
        true
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
