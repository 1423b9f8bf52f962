//! Cart reads and writes.
//!
//! Every successful write is followed by a cart refresh, so the cart a write
//! returns always includes that write. Refreshes for one session never
//! overlap: [`CommerceProvider::refresh_cart`] called while one is running
//! returns immediately, and a write waits for the running one before
//! fetching again.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde_json::json;
use solar_market_core::ProductId;
use tokio::sync::Notify;
use tracing::{debug, info, instrument, warn};

use super::{CommerceProvider, decode, nested, validate};
use crate::cart::{RawCart, enrich};
use crate::error::{ClientError, Result};
use crate::http::ApiRequest;
use crate::session::SessionEvent;
use crate::types::Cart;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddToCartBody<'a> {
    product_id: &'a ProductId,
    quantity: u32,
}

/// Marks a cart refresh as in flight for one session.
///
/// A refresh left over from an earlier session never blocks the current
/// one: acquiring takes the flag over from a stale generation.
struct RefreshGuard<'a> {
    flag: &'a AtomicU64,
    settled: &'a Notify,
    marker: u64,
}

impl<'a> RefreshGuard<'a> {
    fn acquire(flag: &'a AtomicU64, settled: &'a Notify, generation: u64) -> Option<Self> {
        let marker = generation + 1;
        let mut current = flag.load(Ordering::Acquire);
        loop {
            if current == marker {
                return None;
            }
            match flag.compare_exchange(current, marker, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => {
                    return Some(Self {
                        flag,
                        settled,
                        marker,
                    });
                }
                Err(actual) => current = actual,
            }
        }
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        // A newer session may have taken the flag over
        let _ = self
            .flag
            .compare_exchange(self.marker, 0, Ordering::AcqRel, Ordering::Acquire);
        self.settled.notify_waiters();
    }
}

/// Outcome of one refresh attempt.
enum Refresh {
    /// Another refresh for this session is running
    InFlight,
    Stored,
    /// The session changed while fetching
    Discarded,
}

impl CommerceProvider {
    /// Fetch and enrich the cart without touching provider state.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` without a session.
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Result<Cart> {
        self.require_session().await?;
        let value = self.api_call(ApiRequest::get("/cart")).await?;
        let raw: RawCart = if value.is_null() {
            RawCart::default()
        } else {
            decode(nested(value, "cart"))?
        };
        Ok(enrich(raw, |id| async move { self.get_product_by_id(&id).await }).await)
    }

    /// Re-fetch the cart into provider state.
    ///
    /// Returns `false` without a request if a refresh is already running,
    /// and `false` if the session ended or changed before the fetch came
    /// back (the result is then dropped).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` without a session.
    #[instrument(skip(self))]
    pub async fn refresh_cart(&self) -> Result<bool> {
        Ok(matches!(self.try_refresh_cart().await?, Refresh::Stored))
    }

    async fn try_refresh_cart(&self) -> Result<Refresh> {
        let generation = self.generation();
        let Some(_guard) = RefreshGuard::acquire(
            &self.inner.refreshing_cart,
            &self.inner.cart_settled,
            generation,
        ) else {
            debug!("Cart refresh already in flight");
            return Ok(Refresh::InFlight);
        };

        let cart = self.get_cart().await?;

        // Logins and logouts bump the generation before touching the cart,
        // so checking under the lock cannot race them
        let mut slot = self.inner.cart.write().await;
        if self.generation() != generation || !self.is_authenticated() {
            debug!("Session changed during cart refresh, discarding result");
            return Ok(Refresh::Discarded);
        }
        let total_items = cart.total_items;
        *slot = Some(cart);
        drop(slot);

        self.emit(SessionEvent::CartRefreshed { total_items });
        debug!(total_items, "Cart refreshed");
        Ok(Refresh::Stored)
    }

    /// Refresh the cart after a session starts. Failures are logged only.
    pub(crate) async fn load_cart_quietly(&self) {
        if let Err(e) = self.refresh_cart().await {
            warn!(error = %e, "Failed to load cart");
        }
    }

    /// Add `quantity` of a product to the cart and return the refreshed cart.
    ///
    /// The configured add endpoint is tried first, then the legacy paths if
    /// enabled. The first success wins; if every path fails, the last error
    /// is returned. A rejected session stops the probing.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for a zero quantity and
    /// `ClientError::NotAuthenticated` without a session.
    #[instrument(skip(self))]
    pub async fn add_to_cart(&self, product_id: &ProductId, quantity: u32) -> Result<Cart> {
        validate::quantity(quantity)?;
        self.require_session().await?;

        let body = AddToCartBody {
            product_id,
            quantity,
        };
        let candidates = self.config().cart_add_candidates();
        let mut last_error = None;

        for (attempt, path) in candidates.iter().enumerate() {
            let request = ApiRequest::post(*path).json(&body)?;
            match self.api_call(request).await {
                Ok(_) => {
                    if attempt > 0 {
                        warn!(
                            path = %path,
                            configured = %self.config().cart_add_endpoint,
                            "Added to cart through a legacy endpoint"
                        );
                    }
                    info!("Added to cart");
                    return self.cart_after_write().await;
                }
                Err(ClientError::Unauthorized) => return Err(ClientError::Unauthorized),
                Err(e) => {
                    debug!(path = %path, error = %e, "Add-to-cart endpoint failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ClientError::Validation("No add-to-cart endpoint configured".to_string())
        }))
    }

    /// Remove a product's line from the cart.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` without a session.
    #[instrument(skip(self))]
    pub async fn remove_from_cart(&self, product_id: &ProductId) -> Result<Cart> {
        self.require_session().await?;
        self.api_call(ApiRequest::delete(format!("/cart/item/{product_id}")))
            .await?;
        self.cart_after_write().await
    }

    /// Set the quantity of a product's line. A quantity of zero removes it.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` without a session.
    #[instrument(skip(self))]
    pub async fn update_cart_item_quantity(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Cart> {
        if quantity == 0 {
            return self.remove_from_cart(product_id).await;
        }
        self.require_session().await?;

        let request = ApiRequest::patch(format!("/cart/item/{product_id}"))
            .json(&json!({ "quantity": quantity }))?;
        self.api_call(request).await?;
        self.cart_after_write().await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` without a session.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<Cart> {
        self.require_session().await?;
        self.api_call(ApiRequest::delete("/cart/clear")).await?;
        self.cart_after_write().await
    }

    /// Refresh after a successful write and return the resulting cart.
    ///
    /// A refresh already in flight may have fetched before the write, so
    /// this waits for it and then fetches again.
    async fn cart_after_write(&self) -> Result<Cart> {
        loop {
            let settled = self.inner.cart_settled.notified();
            tokio::pin!(settled);
            settled.as_mut().enable();

            match self.try_refresh_cart().await? {
                Refresh::InFlight => settled.await,
                Refresh::Stored | Refresh::Discarded => {
                    return Ok(self.cart().await.unwrap_or_default());
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::ClientConfig;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_refresh_guard_is_exclusive() {
        let flag = AtomicU64::new(0);
        let settled = Notify::new();
        let guard = RefreshGuard::acquire(&flag, &settled, 3).unwrap();
        assert!(RefreshGuard::acquire(&flag, &settled, 3).is_none());
        drop(guard);
        assert_eq!(flag.load(Ordering::Acquire), 0);
        assert!(RefreshGuard::acquire(&flag, &settled, 3).is_some());
    }

    #[test]
    fn test_refresh_guard_from_old_session_does_not_block() {
        let flag = AtomicU64::new(0);
        let settled = Notify::new();
        let stale = RefreshGuard::acquire(&flag, &settled, 1).unwrap();
        let current = RefreshGuard::acquire(&flag, &settled, 2).unwrap();

        // The stale guard must not release the newer session's flag
        drop(stale);
        assert!(RefreshGuard::acquire(&flag, &settled, 2).is_none());
        drop(current);
        assert_eq!(flag.load(Ordering::Acquire), 0);
    }

    #[test]
    fn test_add_body_shape() {
        let id = ProductId::new("p1");
        let body = AddToCartBody {
            product_id: &id,
            quantity: 2,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "productId": "p1", "quantity": 2 })
        );
    }

    #[tokio::test]
    async fn test_cart_writes_validate_before_sending() {
        let config = ClientConfig::new("http://127.0.0.1:9").unwrap();
        let provider = CommerceProvider::new(config, Arc::new(MemoryStorage::new())).unwrap();

        assert!(matches!(
            provider.add_to_cart(&"p1".into(), 0).await,
            Err(ClientError::Validation(_))
        ));
        assert!(matches!(
            provider.add_to_cart(&"p1".into(), 1).await,
            Err(ClientError::NotAuthenticated)
        ));
        assert!(matches!(
            provider.refresh_cart().await,
            Err(ClientError::NotAuthenticated)
        ));
    }
}
