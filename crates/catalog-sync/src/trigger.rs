//! # Pagination Trigger
//!
//! Guards the "near the end of the list" signal before it reaches the
//! orchestrator.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  notify proximity                                                      │
//! │        │                                                                │
//! │        ├── status == loading ─────────────► Skip(Loading)              │
//! │        ├── fetch in flight / debounce ────► Skip(Busy)                 │
//! │        ├── has_more == false ─────────────► Skip(Exhausted)            │
//! │        ├── search mode ───────────────────► Skip(SearchMode)           │
//! │        ▼                                                                │
//! │      Fire                                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use catalog_core::{CatalogMode, CatalogState};

/// Why a proximity notification was not acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Loading,
    Busy,
    Exhausted,
    SearchMode,
}

/// Outcome of evaluating a proximity notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerDecision {
    Fire,
    Skip(SkipReason),
}

/// Stateless guard for page-advance requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaginationTrigger;

impl PaginationTrigger {
    /// Decides whether a next-page request may proceed.
    ///
    /// `busy` is true while a listing fetch is in flight or a query change is
    /// waiting out its debounce. `pending_mode` is the mode the next fetch
    /// would use; it can differ from `state.mode` before the first fetch.
    pub fn evaluate(state: &CatalogState, pending_mode: &CatalogMode, busy: bool) -> TriggerDecision {
        if state.is_loading() {
            TriggerDecision::Skip(SkipReason::Loading)
        } else if busy {
            TriggerDecision::Skip(SkipReason::Busy)
        } else if !state.has_more {
            TriggerDecision::Skip(SkipReason::Exhausted)
        } else if !state.is_paginated() || !pending_mode.is_paginated() {
            TriggerDecision::Skip(SkipReason::SearchMode)
        } else {
            TriggerDecision::Fire
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::CatalogStatus;

    #[test]
    fn test_fires_on_fresh_state() {
        let state = CatalogState::new();
        assert_eq!(
            PaginationTrigger::evaluate(&state, &CatalogMode::Unfiltered, false),
            TriggerDecision::Fire
        );
    }

    #[test]
    fn test_guards() {
        let mut state = CatalogState::new();
        state.status = CatalogStatus::Loading;
        assert_eq!(
            PaginationTrigger::evaluate(&state, &CatalogMode::Unfiltered, false),
            TriggerDecision::Skip(SkipReason::Loading)
        );

        state.status = CatalogStatus::Succeeded;
        assert_eq!(
            PaginationTrigger::evaluate(&state, &CatalogMode::Unfiltered, true),
            TriggerDecision::Skip(SkipReason::Busy)
        );

        state.has_more = false;
        assert_eq!(
            PaginationTrigger::evaluate(&state, &CatalogMode::Unfiltered, false),
            TriggerDecision::Skip(SkipReason::Exhausted)
        );

        state.has_more = true;
        state.mode = CatalogMode::Search("phone".into());
        assert_eq!(
            PaginationTrigger::evaluate(&state, &state.mode.clone(), false),
            TriggerDecision::Skip(SkipReason::SearchMode)
        );
    }

    #[test]
    fn test_pending_search_blocks_before_first_fetch() {
        let state = CatalogState::new();
        let decision =
            PaginationTrigger::evaluate(&state, &CatalogMode::Search("x".into()), false);
        assert_eq!(decision, TriggerDecision::Skip(SkipReason::SearchMode));
    }

    #[test]
    fn test_category_mode_still_pages() {
        let mut state = CatalogState::new();
        state.mode = CatalogMode::Category("laptops".into());
        assert_eq!(
            PaginationTrigger::evaluate(&state, &state.mode.clone(), false),
            TriggerDecision::Fire
        );
    }
}
