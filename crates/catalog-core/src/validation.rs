//! # Validation Module
//!
//! Input validation for product drafts and login credentials.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation (form widgets)                                  │
//! │  └── required / min=0 attributes, immediate feedback                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Trim text fields                                                  │
//! │  └── Reject empty / negative / non-finite values                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Remote API                                                   │
//! │  └── Whatever the server enforces (not relied upon)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use catalog_core::types::ProductDraft;
//! use catalog_core::validation::normalize_draft;
//!
//! let draft = ProductDraft {
//!     title: "  Desk Lamp ".into(),
//!     description: "LED".into(),
//!     price: 24.0,
//!     stock: 3,
//!     brand: "Lumo".into(),
//!     category: "home-decoration".into(),
//! };
//! assert_eq!(normalize_draft(draft).unwrap().title, "Desk Lamp");
//! ```

use crate::error::ValidationError;
use crate::types::ProductDraft;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of a product title.
pub const MAX_TITLE_LEN: usize = 200;

// =============================================================================
// Field Validators
// =============================================================================

/// Trims `value` and rejects it if nothing is left.
pub fn required_text(field: &str, value: &str) -> ValidationResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Validates a price: finite and not negative.
pub fn validate_price(price: f64) -> ValidationResult<()> {
    if !price.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: "must be a number".to_string(),
        });
    }
    if price < 0.0 {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }
    Ok(())
}

/// Validates a stock level.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::Negative {
            field: "stock".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Draft Validation
// =============================================================================

/// Trims every text field of `draft` and validates the result.
///
/// ## Rules
/// - `title`, `description`, `brand`, `category` are required
/// - `title` is at most 200 characters
/// - `price` is finite and non-negative
/// - `stock` is non-negative
pub fn normalize_draft(draft: ProductDraft) -> ValidationResult<ProductDraft> {
    let title = required_text("title", &draft.title)?;
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::TooLong {
            field: "title".to_string(),
            max: MAX_TITLE_LEN,
        });
    }

    let description = required_text("description", &draft.description)?;
    validate_price(draft.price)?;
    validate_stock(draft.stock)?;
    let brand = required_text("brand", &draft.brand)?;
    let category = required_text("category", &draft.category)?;

    Ok(ProductDraft {
        title,
        description,
        price: draft.price,
        stock: draft.stock,
        brand,
        category,
    })
}

/// Validates login credentials and returns the trimmed username.
pub fn validate_credentials(username: &str, password: &str) -> ValidationResult<String> {
    let username = required_text("username", username)?;
    if password.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }
    Ok(username)
}
