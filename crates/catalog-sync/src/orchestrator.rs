//! # Fetch Orchestrator
//!
//! Decides when a listing fetch is issued and which ticket it carries. The
//! orchestrator does no I/O and owns no tasks: the engine asks it for the
//! debounce deadline, tells it the time, and executes the tickets it hands
//! out.
//!
//! ## Scheduling
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Fetch Scheduling                                  │
//! │                                                                         │
//! │  set_search_text / set_category                                        │
//! │        │                                                                │
//! │        ├── (text, category) unchanged ──► nothing                      │
//! │        ▼                                                                │
//! │   epoch += 1, offset = 0, in-flight forgotten                          │
//! │   deadline = now + debounce  (replaces any earlier deadline)           │
//! │        │                                                                │
//! │        ▼  deadline reached (fire_due)                                  │
//! │   ticket { epoch, mode, offset: 0 }                                    │
//! │                                                                         │
//! │  request_next_page                                                     │
//! │        │                                                                │
//! │        ├── trigger guard fails ─────────► nothing                      │
//! │        ├── page at offset not loaded ───► re-issue offset              │
//! │        ▼                                                                │
//! │   offset += page_size, ticket issued immediately                       │
//! │                                                                         │
//! │  complete(ticket)                                                      │
//! │        ├── ticket.epoch != epoch ───────► stale, drop                  │
//! │        ▼                                                                │
//! │   in-flight cleared, loaded = succeeded                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use catalog_core::query::build_request_with_limit;
use catalog_core::{CatalogMode, CatalogQuery, CatalogState, FetchTicket};
use tokio::time::Instant;
use tracing::debug;

use crate::config::PagingSettings;
use crate::trigger::{PaginationTrigger, TriggerDecision};

/// Request sequencing for the catalog listing.
#[derive(Debug, Clone)]
pub struct FetchOrchestrator {
    page_size: u32,
    debounce: Duration,

    /// Committed inputs; `offset` is the offset of the latest ticket.
    query: CatalogQuery,

    /// Bumped on every mode change, refresh and reset.
    epoch: u64,

    /// Debounce timer for the committed inputs.
    deadline: Option<Instant>,

    in_flight: Option<FetchTicket>,

    /// True once the page at `query.offset` has been merged.
    loaded: bool,
}

impl FetchOrchestrator {
    pub fn new(page_size: u32, debounce: Duration) -> Self {
        FetchOrchestrator {
            page_size,
            debounce,
            query: CatalogQuery::default(),
            epoch: 0,
            deadline: None,
            in_flight: None,
            loaded: false,
        }
    }

    pub fn from_settings(settings: &PagingSettings) -> Self {
        Self::new(settings.page_size, settings.debounce())
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn query(&self) -> &CatalogQuery {
        &self.query
    }

    /// Mode the next ticket will carry.
    pub fn mode(&self) -> CatalogMode {
        self.query.mode()
    }

    /// When the pending debounced fetch is due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn in_flight(&self) -> Option<&FetchTicket> {
        self.in_flight.as_ref()
    }

    /// True while a fetch is in flight or a debounced fetch is pending.
    pub fn is_busy(&self) -> bool {
        self.deadline.is_some() || self.in_flight.is_some()
    }

    // =========================================================================
    // Input Changes
    // =========================================================================

    /// Commits new search text. Returns true if a fetch was scheduled.
    pub fn set_search_text(&mut self, text: &str, now: Instant) -> bool {
        let next = CatalogQuery::new(text.trim(), self.query.category.clone(), 0);
        self.change(next, now)
    }

    /// Commits a new category and clears the search text.
    /// Returns true if a fetch was scheduled.
    pub fn set_category(&mut self, category: &str, now: Instant) -> bool {
        let next = CatalogQuery::new("", category.trim(), 0);
        self.change(next, now)
    }

    fn change(&mut self, next: CatalogQuery, now: Instant) -> bool {
        if !next.filters_differ(&self.query) {
            return false;
        }

        self.query = next;
        self.advance_epoch();
        self.deadline = Some(now + self.debounce);

        debug!(
            epoch = self.epoch,
            mode = %self.query.mode(),
            debounce_ms = self.debounce.as_millis() as u64,
            "Query changed, fetch debounced"
        );
        true
    }

    /// Issues the debounced fetch once its deadline has passed.
    pub fn fire_due(&mut self, now: Instant) -> Option<FetchTicket> {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                Some(self.issue())
            }
            _ => None,
        }
    }

    // =========================================================================
    // Explicit Requests
    // =========================================================================

    /// Handles a proximity notification from the presentation layer.
    pub fn request_next_page(&mut self, state: &CatalogState) -> Option<FetchTicket> {
        let decision = PaginationTrigger::evaluate(state, &self.query.mode(), self.is_busy());
        if let TriggerDecision::Skip(reason) = decision {
            debug!(?reason, offset = self.query.offset, "Next page request skipped");
            return None;
        }

        if self.loaded {
            self.query.offset += self.page_size;
            self.loaded = false;
        }

        Some(self.issue())
    }

    /// Re-fetches the first page of the committed mode now, superseding any
    /// pending debounce and in-flight fetch.
    pub fn refresh(&mut self) -> FetchTicket {
        self.deadline = None;
        self.query.offset = 0;
        self.advance_epoch();
        self.issue()
    }

    /// Forgets the committed inputs and invalidates everything in flight.
    pub fn reset(&mut self) {
        self.deadline = None;
        self.query = CatalogQuery::default();
        self.advance_epoch();
    }

    // =========================================================================
    // Completion
    // =========================================================================

    /// Records the outcome of `ticket`. Returns false if the ticket belongs
    /// to a superseded epoch and its response must be dropped.
    pub fn complete(&mut self, ticket: &FetchTicket, succeeded: bool) -> bool {
        if ticket.epoch != self.epoch {
            debug!(
                ticket_epoch = ticket.epoch,
                epoch = self.epoch,
                mode = %ticket.mode,
                "Stale fetch response"
            );
            return false;
        }

        if self.in_flight.as_ref() == Some(ticket) {
            self.in_flight = None;
        }
        if ticket.offset == self.query.offset {
            self.loaded = succeeded;
        }
        true
    }

    fn advance_epoch(&mut self) {
        self.epoch += 1;
        self.in_flight = None;
        self.loaded = false;
    }

    fn issue(&mut self) -> FetchTicket {
        let ticket = FetchTicket {
            epoch: self.epoch,
            mode: self.query.mode(),
            offset: self.query.offset,
            request: build_request_with_limit(&self.query, self.page_size),
        };
        debug!(epoch = ticket.epoch, mode = %ticket.mode, offset = ticket.offset, "Fetch issued");
        self.in_flight = Some(ticket.clone());
        ticket
    }
}
