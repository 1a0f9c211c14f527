//! # Catalog Query Builder
//!
//! Maps the user's `(text, category, offset)` inputs to exactly one remote
//! listing request.
//!
//! ## Precedence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Request Shape Selection                            │
//! │                                                                         │
//! │   text non-empty? ──yes──► Search { text }          (offset ignored)   │
//! │        │                                                                │
//! │        no                                                               │
//! │        ▼                                                                │
//! │   category non-empty? ──yes──► Category { category, limit, offset }    │
//! │        │                                                                │
//! │        no                                                               │
//! │        ▼                                                                │
//! │   All { limit, offset }                                                │
//! │                                                                         │
//! │   Search dominates Category dominates All. Changing the category while │
//! │   text is present does not change the request shape.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::PAGE_SIZE;

// =============================================================================
// Query Mode
// =============================================================================

/// The active query discriminator.
///
/// Search and category filtering are mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CatalogMode {
    /// Unfiltered listing.
    #[default]
    Unfiltered,
    /// Free-text search.
    Search(String),
    /// Category listing.
    Category(String),
}

impl CatalogMode {
    /// Returns true in free-text search mode.
    pub fn is_search(&self) -> bool {
        matches!(self, CatalogMode::Search(_))
    }

    /// Returns true if this mode supports page-by-page loading.
    ///
    /// The search endpoint returns its own bounded result set in one call.
    pub fn is_paginated(&self) -> bool {
        !self.is_search()
    }
}

impl std::fmt::Display for CatalogMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogMode::Unfiltered => write!(f, "all"),
            CatalogMode::Search(text) => write!(f, "search:{}", text),
            CatalogMode::Category(category) => write!(f, "category:{}", category),
        }
    }
}

// =============================================================================
// Query Inputs
// =============================================================================

/// The raw query inputs as the presentation layer holds them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CatalogQuery {
    pub text: String,
    pub category: String,
    pub offset: u32,
}

impl CatalogQuery {
    pub fn new(text: impl Into<String>, category: impl Into<String>, offset: u32) -> Self {
        CatalogQuery {
            text: text.into(),
            category: category.into(),
            offset,
        }
    }

    /// Returns the mode these inputs select.
    pub fn mode(&self) -> CatalogMode {
        if !self.text.is_empty() {
            CatalogMode::Search(self.text.clone())
        } else if !self.category.is_empty() {
            CatalogMode::Category(self.category.clone())
        } else {
            CatalogMode::Unfiltered
        }
    }

    /// Returns true if `(text, category)` differ from `other`'s.
    ///
    /// The offset is deliberately not compared.
    pub fn filters_differ(&self, other: &CatalogQuery) -> bool {
        self.text != other.text || self.category != other.category
    }
}

// =============================================================================
// Listing Request
// =============================================================================

/// One of the three mutually exclusive listing request shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ListingRequest {
    /// `GET /products/search?q={text}`
    Search { text: String },
    /// `GET /products/category/{category}?limit=L&skip=S`
    Category {
        category: String,
        limit: u32,
        offset: u32,
    },
    /// `GET /products?limit=L&skip=S`
    All { limit: u32, offset: u32 },
}

impl ListingRequest {
    /// Path segments below the API base URL.
    pub fn path_segments(&self) -> Vec<String> {
        match self {
            ListingRequest::Search { .. } => vec!["products".into(), "search".into()],
            ListingRequest::Category { category, .. } => {
                vec!["products".into(), "category".into(), category.clone()]
            }
            ListingRequest::All { .. } => vec!["products".into()],
        }
    }

    /// Query-string pairs, unencoded.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        match self {
            ListingRequest::Search { text } => vec![("q".into(), text.clone())],
            ListingRequest::Category { limit, offset, .. } | ListingRequest::All { limit, offset } => {
                vec![
                    ("limit".into(), limit.to_string()),
                    ("skip".into(), offset.to_string()),
                ]
            }
        }
    }

    /// The mode this request belongs to.
    pub fn mode(&self) -> CatalogMode {
        match self {
            ListingRequest::Search { text } => CatalogMode::Search(text.clone()),
            ListingRequest::Category { category, .. } => CatalogMode::Category(category.clone()),
            ListingRequest::All { .. } => CatalogMode::Unfiltered,
        }
    }
}

/// Builds the listing request for `query` with the default page size.
pub fn build_request(query: &CatalogQuery) -> ListingRequest {
    build_request_with_limit(query, PAGE_SIZE)
}

/// Builds the listing request for `query` with an explicit page size.
pub fn build_request_with_limit(query: &CatalogQuery, limit: u32) -> ListingRequest {
    match query.mode() {
        CatalogMode::Search(text) => ListingRequest::Search { text },
        CatalogMode::Category(category) => ListingRequest::Category {
            category,
            limit,
            offset: query.offset,
        },
        CatalogMode::Unfiltered => ListingRequest::All {
            limit,
            offset: query.offset,
        },
    }
}
