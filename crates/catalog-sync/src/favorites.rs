//! # Favorites
//!
//! Local-only collection of products the user marked. Not synchronized with
//! the remote and independent of the catalog listing: deleting a product
//! from the catalog leaves it here until the user removes it.
//!
//! Library-only API for long-lived front ends that embed the engine. The
//! `catalog` CLI runs one command per process, so it has nothing to keep
//! favorites in and does not use this module.
//!
//! ## Thread Safety
//! [`FavoritesState`] wraps the collection in `Arc<Mutex<T>>` so clones of it
//! can be handed to any number of presentation callbacks.

use std::sync::{Arc, Mutex};

use catalog_core::{Product, ProductId};
use tracing::debug;

/// Ordered favorites, unique by product id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Favorites {
    items: Vec<Product>,
}

impl Favorites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `product` if absent, removes it if present.
    ///
    /// Returns true if the product is a favorite afterwards.
    pub fn toggle(&mut self, product: &Product) -> bool {
        if self.remove(product.id) {
            false
        } else {
            self.items.push(product.clone());
            true
        }
    }

    pub fn is_favorite(&self, id: ProductId) -> bool {
        self.items.iter().any(|p| p.id == id)
    }

    /// Removes `id`. Returns true if it was present.
    pub fn remove(&mut self, id: ProductId) -> bool {
        let initial_len = self.items.len();
        self.items.retain(|p| p.id != id);
        self.items.len() != initial_len
    }

    /// Favorites in the order they were added.
    pub fn list(&self) -> &[Product] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Shared favorites.
#[derive(Debug, Clone, Default)]
pub struct FavoritesState {
    inner: Arc<Mutex<Favorites>>,
}

impl FavoritesState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes a function with read access to the favorites.
    pub fn with_favorites<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Favorites) -> R,
    {
        let favorites = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&favorites)
    }

    /// Executes a function with write access to the favorites.
    pub fn with_favorites_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Favorites) -> R,
    {
        let mut favorites = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut favorites)
    }

    pub fn toggle(&self, product: &Product) -> bool {
        let now_favorite = self.with_favorites_mut(|f| f.toggle(product));
        debug!(product_id = product.id, now_favorite, "Favorite toggled");
        now_favorite
    }

    pub fn is_favorite(&self, id: ProductId) -> bool {
        self.with_favorites(|f| f.is_favorite(id))
    }

    pub fn remove(&self, id: ProductId) -> bool {
        self.with_favorites_mut(|f| f.remove(id))
    }

    /// Snapshot of the favorites.
    pub fn list(&self) -> Vec<Product> {
        self.with_favorites(|f| f.list().to_vec())
    }

    pub fn clear(&self) {
        self.with_favorites_mut(Favorites::clear)
    }
}
