//! # Catalog API Client
//!
//! Typed calls for every remote catalog endpoint, layered over a
//! [`CatalogTransport`].
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  list(request)        GET    /products?limit&skip                      │
//! │                       GET    /products/category/{c}?limit&skip         │
//! │                       GET    /products/search?q                        │
//! │  categories()         GET    /products/categories                      │
//! │  product(id)          GET    /products/{id}                            │
//! │  related(c, id, n)    GET    /products/category/{c}?limit=n            │
//! │  create(draft)        POST   /products/add                             │
//! │  patch(id, patch)     PATCH  /products/{id}                            │
//! │  delete(id)           DELETE /products/{id}                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use catalog_core::{
    normalize_categories, ListingRequest, Product, ProductDraft, ProductId, ProductPage,
    ProductPatch,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{CatalogError, CatalogResult};
use crate::transport::CatalogTransport;

/// Typed catalog API over a shared transport.
#[derive(Clone)]
pub struct CatalogApi {
    transport: Arc<dyn CatalogTransport>,
}

impl CatalogApi {
    pub fn new(transport: Arc<dyn CatalogTransport>) -> Self {
        CatalogApi { transport }
    }

    /// Fetches one listing page.
    pub async fn list(&self, request: &ListingRequest) -> CatalogResult<ProductPage> {
        let segments = request.path_segments();
        let path: Vec<&str> = segments.iter().map(String::as_str).collect();
        let value = self.transport.get(&path, &request.query_pairs()).await?;
        decode(value)
    }

    /// Fetches a single product.
    pub async fn product(&self, id: ProductId) -> CatalogResult<Product> {
        let id_segment = id.to_string();
        match self.transport.get(&["products", id_segment.as_str()], &[]).await {
            Ok(value) => decode(value),
            Err(e) if e.is_not_found() => Err(CatalogError::ProductNotFound(id)),
            Err(e) => Err(e),
        }
    }

    /// Fetches and normalizes the category list.
    pub async fn categories(&self) -> CatalogResult<Vec<String>> {
        let value = self.transport.get(&["products", "categories"], &[]).await?;
        Ok(normalize_categories(&value))
    }

    /// Fetches up to `limit` products of `category`, excluding `exclude`.
    pub async fn related(
        &self,
        category: &str,
        exclude: ProductId,
        limit: u32,
    ) -> CatalogResult<Vec<Product>> {
        let value = self
            .transport
            .get(
                &["products", "category", category],
                &[("limit".to_string(), limit.to_string())],
            )
            .await?;
        let page: ProductPage = decode(value)?;

        Ok(page
            .products
            .into_iter()
            .filter(|p| p.id != exclude)
            .collect())
    }

    /// Creates a product and returns the remote's echo.
    pub async fn create(&self, draft: &ProductDraft) -> CatalogResult<Product> {
        let body = serde_json::to_value(draft)
            .map_err(|e| CatalogError::SerializationFailed(e.to_string()))?;
        let value = self.transport.post(&["products", "add"], body).await?;
        let product: Product = decode(value)?;
        debug!(product_id = product.id, "Remote created product");
        Ok(product)
    }

    /// Sends a partial update.
    pub async fn patch(&self, id: ProductId, patch: &ProductPatch) -> CatalogResult<Product> {
        let body = serde_json::to_value(patch)
            .map_err(|e| CatalogError::SerializationFailed(e.to_string()))?;
        let id_segment = id.to_string();
        let value = self.transport.patch(&["products", id_segment.as_str()], body).await?;
        decode(value)
    }

    /// Deletes a product. The response body is ignored.
    pub async fn delete(&self, id: ProductId) -> CatalogResult<()> {
        let id_segment = id.to_string();
        self.transport.delete(&["products", id_segment.as_str()]).await?;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> CatalogResult<T> {
    serde_json::from_value(value).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Reply, ScriptedTransport};
    use serde_json::json;

    fn api(transport: &Arc<ScriptedTransport>) -> CatalogApi {
        CatalogApi::new(transport.clone())
    }

    #[tokio::test]
    async fn test_list_uses_request_shape() {
        let transport = ScriptedTransport::new();
        transport.reply(
            "GET products/category/tops",
            Reply::page(&[1, 2], 12),
        );

        let page = api(&transport)
            .list(&ListingRequest::Category {
                category: "tops".into(),
                limit: 10,
                offset: 10,
            })
            .await
            .unwrap();

        assert_eq!(page.products.len(), 2);
        assert_eq!(page.total, 12);
        assert_eq!(
            transport.requests(),
            vec!["GET products/category/tops?limit=10&skip=10"]
        );
    }

    #[tokio::test]
    async fn test_categories_are_normalized() {
        let transport = ScriptedTransport::new();
        transport.reply(
            "GET products/categories",
            Reply::Json(json!(["beauty", { "slug": "tops", "name": "Tops" }, { "name": "Laptops" }])),
        );

        let categories = api(&transport).categories().await.unwrap();
        assert_eq!(categories, vec!["beauty", "tops", "Laptops"]);
    }

    #[tokio::test]
    async fn test_product_not_found_maps_to_id() {
        let transport = ScriptedTransport::new();
        transport.reply("GET products/404", Reply::Status(404));

        let err = api(&transport).product(404).await.unwrap_err();
        assert!(matches!(err, CatalogError::ProductNotFound(404)));
    }

    #[tokio::test]
    async fn test_related_excludes_self() {
        let transport = ScriptedTransport::new();
        transport.reply("GET products/category/tops", Reply::page(&[1, 2, 3, 4], 20));

        let related = api(&transport).related("tops", 2, 4).await.unwrap();
        let ids: Vec<_> = related.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3, 4]);
        assert_eq!(transport.requests(), vec!["GET products/category/tops?limit=4"]);
    }

    #[tokio::test]
    async fn test_create_returns_echo() {
        let transport = ScriptedTransport::new();
        transport.reply(
            "POST products/add",
            Reply::Json(json!({ "id": 195, "title": "Desk", "price": 120.0 })),
        );

        let draft = ProductDraft {
            title: "Desk".into(),
            price: 120.0,
            ..Default::default()
        };
        let created = api(&transport).create(&draft).await.unwrap();
        assert_eq!(created.id, 195);
        assert_eq!(created.title, "Desk");
    }

    #[tokio::test]
    async fn test_malformed_page_is_decode_error() {
        let transport = ScriptedTransport::new();
        transport.reply("GET products", Reply::Json(json!({ "products": "nope" })));

        let err = api(&transport)
            .list(&ListingRequest::All { limit: 10, offset: 0 })
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::DecodeFailed(_)));
    }
}
