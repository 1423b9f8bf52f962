//! Product cache.
//!
//! Read-through cache used by product lookups and cart enrichment. Entries
//! never expire on their own: they are replaced by writes to the same
//! product, evicted on delete, and dropped wholesale on logout.

use moka::future::Cache;
use solar_market_core::ProductId;
use tracing::debug;

use crate::types::Product;

/// In-memory `ProductId → Product` map.
#[derive(Clone)]
pub struct ProductCache {
    inner: Cache<ProductId, Product>,
}

impl ProductCache {
    /// Create a cache holding at most `capacity` products.
    #[must_use]
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: Cache::builder().max_capacity(capacity).build(),
        }
    }

    pub async fn get(&self, id: &ProductId) -> Option<Product> {
        let hit = self.inner.get(id).await;
        if hit.is_some() {
            debug!(product_id = %id, "Cache hit for product");
        }
        hit
    }

    pub async fn insert(&self, product: Product) {
        self.inner.insert(product.id.clone(), product).await;
    }

    /// Patch a cached product in place. No-op if it is not cached.
    pub async fn update_with<F>(&self, id: &ProductId, patch: F)
    where
        F: FnOnce(&mut Product),
    {
        if let Some(mut product) = self.inner.get(id).await {
            patch(&mut product);
            self.inner.insert(id.clone(), product).await;
        }
    }

    pub async fn invalidate(&self, id: &ProductId) {
        self.inner.invalidate(id).await;
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        self.inner.invalidate_all();
        self.inner.run_pending_tasks().await;
    }

    /// Approximate number of cached products.
    pub async fn len(&self) -> u64 {
        self.inner.run_pending_tasks().await;
        self.inner.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl std::fmt::Debug for ProductCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductCache")
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}
