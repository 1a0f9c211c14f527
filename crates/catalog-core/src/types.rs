//! # Domain Types
//!
//! Core domain types used throughout the catalog engine.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │  ProductPage    │   │  ProductDraft   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (remote)    │   │  products[]     │   │  title, price   │       │
//! │  │  category       │   │  total          │   │  stock, brand   │       │
//! │  │  title, price   │   │  skip, limit    │   │  (create body)  │       │
//! │  │  extra {...}    │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                        ┌─────────────────┐   ┌─────────────────┐       │
//! │                        │  ProductPatch   │   │      User       │       │
//! │                        │  ─────────────  │   │  ─────────────  │       │
//! │                        │  editable only  │   │  local session  │       │
//! │                        │  (PATCH body)   │   │  identity       │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine never interprets a product beyond `id` and `category`. Every
//! other field is carried through untouched, including attributes this crate
//! does not know about (kept in [`Product::extra`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Remote-assigned product identity.
pub type ProductId = u64;

// =============================================================================
// Product
// =============================================================================

/// Physical dimensions reported by the remote.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

/// A customer review attached to a product.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Review {
    pub rating: f64,
    pub comment: String,
    pub date: String,
    pub reviewer_name: String,
    pub reviewer_email: String,
}

/// Remote bookkeeping metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductMeta {
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
}

/// A product as served by the remote catalog.
///
/// Missing fields default rather than fail: the remote echo of a freshly
/// created product only carries the submitted fields plus `id`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    /// Remote-assigned identifier, unique across the catalog.
    pub id: ProductId,

    pub title: String,
    pub description: String,
    pub price: f64,
    pub stock: i64,
    pub brand: String,

    /// Category slug; used for related-product lookups.
    pub category: String,

    pub rating: f64,
    pub thumbnail: String,
    pub images: Vec<String>,

    // -------------------------------------------------------------------------
    // Extended attributes (optional on the remote)
    // -------------------------------------------------------------------------
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warranty_information: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_information: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<Vec<Review>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_order_quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ProductMeta>,

    /// Attributes not modelled above, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    /// Returns a copy with the editable fields replaced by the draft's.
    ///
    /// This is how an edit form turns the loaded product plus user input into
    /// the full value that is committed locally.
    pub fn with_draft(&self, draft: &ProductDraft) -> Product {
        Product {
            title: draft.title.clone(),
            description: draft.description.clone(),
            price: draft.price,
            stock: draft.stock,
            brand: draft.brand.clone(),
            category: draft.category.clone(),
            ..self.clone()
        }
    }
}

// =============================================================================
// Listing Page
// =============================================================================

/// One page of a listing response.
///
/// The remote reports cursor state only as `skip`/`total`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
}

// =============================================================================
// Create / Update Payloads
// =============================================================================

/// The editable fields of a product, as submitted by a form.
///
/// Used as the body of `POST /products/add`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductDraft {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub stock: i64,
    pub brand: String,
    pub category: String,
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        ProductDraft {
            title: product.title.clone(),
            description: product.description.clone(),
            price: product.price,
            stock: product.stock,
            brand: product.brand.clone(),
            category: product.category.clone(),
        }
    }
}

/// Partial update body for `PATCH /products/{id}`.
///
/// Only set fields are serialized.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ProductPatch {
    /// Builds a patch carrying every editable field of `product`.
    pub fn editable_fields(product: &Product) -> Self {
        ProductPatch {
            title: Some(product.title.clone()),
            description: Some(product.description.clone()),
            price: Some(product.price),
            stock: Some(product.stock),
            brand: Some(product.brand.clone()),
            category: Some(product.category.clone()),
        }
    }
}

// =============================================================================
// Categories
// =============================================================================

/// Normalizes one entry of the category listing to a plain identifier.
///
/// Entries are either plain strings or objects carrying `slug`/`name`.
/// Preference order: string, `slug`, `name`, stringified JSON.
pub fn normalize_category(entry: &Value) -> String {
    match entry {
        Value::String(s) => s.clone(),
        Value::Object(obj) => obj
            .get("slug")
            .and_then(non_empty_str)
            .or_else(|| obj.get("name").and_then(non_empty_str))
            .map(str::to_string)
            .unwrap_or_else(|| entry.to_string()),
        other => other.to_string(),
    }
}

/// Normalizes a whole category listing payload.
///
/// A payload that is not an array yields no categories.
pub fn normalize_categories(payload: &Value) -> Vec<String> {
    match payload {
        Value::Array(entries) => entries.iter().map(normalize_category).collect(),
        _ => Vec::new(),
    }
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

// =============================================================================
// Session
// =============================================================================

/// A locally authenticated user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub logged_in_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_keeps_unknown_attributes() {
        let raw = json!({
            "id": 7,
            "title": "Lamp",
            "category": "home-decoration",
            "price": 19.5,
            "stock": 3,
            "warehouseCode": "W-12"
        });

        let product: Product = serde_json::from_value(raw).unwrap();
        assert_eq!(product.id, 7);
        assert_eq!(product.category, "home-decoration");
        assert_eq!(product.extra.get("warehouseCode"), Some(&json!("W-12")));

        let back = serde_json::to_value(&product).unwrap();
        assert_eq!(back["warehouseCode"], json!("W-12"));
    }

    #[test]
    fn test_created_echo_with_sparse_fields() {
        let raw = json!({ "id": 195, "title": "Desk", "price": 120.0 });
        let product: Product = serde_json::from_value(raw).unwrap();
        assert_eq!(product.id, 195);
        assert!(product.images.is_empty());
        assert!(product.reviews.is_none());
    }

    #[test]
    fn test_page_defaults() {
        let page: ProductPage =
            serde_json::from_value(json!({ "products": [], "total": 0 })).unwrap();
        assert_eq!(page.skip, 0);
        assert_eq!(page.limit, 0);
    }

    #[test]
    fn test_patch_serializes_only_set_fields() {
        let patch = ProductPatch {
            title: Some("New".into()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({ "title": "New" }));
        assert_eq!(serde_json::to_value(ProductPatch::default()).unwrap(), json!({}));
    }

    #[test]
    fn test_with_draft_replaces_editable_fields_only() {
        let original = Product {
            id: 3,
            title: "Old".into(),
            rating: 4.5,
            thumbnail: "t.png".into(),
            ..Default::default()
        };
        let draft = ProductDraft {
            title: "New".into(),
            price: 9.99,
            ..Default::default()
        };

        let updated = original.with_draft(&draft);
        assert_eq!(updated.id, 3);
        assert_eq!(updated.title, "New");
        assert_eq!(updated.price, 9.99);
        assert_eq!(updated.rating, 4.5);
        assert_eq!(updated.thumbnail, "t.png");
    }

    #[test]
    fn test_normalize_category_variants() {
        assert_eq!(normalize_category(&json!("beauty")), "beauty");
        assert_eq!(
            normalize_category(&json!({ "slug": "mens-shoes", "name": "Mens Shoes" })),
            "mens-shoes"
        );
        assert_eq!(normalize_category(&json!({ "name": "Tops" })), "Tops");
        assert_eq!(normalize_category(&json!({ "slug": "", "name": "Tops" })), "Tops");
        assert_eq!(normalize_category(&json!({ "url": "x" })), r#"{"url":"x"}"#);
        assert_eq!(normalize_category(&json!(42)), "42");
    }

    #[test]
    fn test_normalize_categories_non_array() {
        assert!(normalize_categories(&json!({ "categories": [] })).is_empty());
        assert_eq!(
            normalize_categories(&json!(["a", { "slug": "b" }])),
            vec!["a".to_string(), "b".to_string()]
        );
    }
}
