//! Checkout bookkeeping kept in session storage.
//!
//! None of this touches the network: the cart snapshot taken when checkout
//! starts, the last placed order (for the confirmation page), and the
//! user's recent product searches.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{instrument, warn};

use super::CommerceProvider;
use crate::error::Result;
use crate::storage::StorageKey;
use crate::types::{Cart, Order};

/// How many recent searches are remembered.
pub const MAX_RECENT_SEARCHES: usize = 5;

impl CommerceProvider {
    /// Snapshot the cart for the checkout page.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if the snapshot cannot be written.
    #[instrument(skip(self, cart), fields(total_items = cart.total_items))]
    pub fn save_checkout_cart(&self, cart: &Cart) -> Result<()> {
        self.write_json(StorageKey::CheckoutCart, cart)
    }

    /// The cart snapshot taken when checkout started.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if storage cannot be read.
    pub fn checkout_cart(&self) -> Result<Option<Cart>> {
        self.read_json(StorageKey::CheckoutCart)
    }

    /// Forget the checkout snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if storage cannot be written.
    pub fn clear_checkout_cart(&self) -> Result<()> {
        Ok(self.inner.storage.remove(StorageKey::CheckoutCart)?)
    }

    /// Remember the order just placed.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if the order cannot be written.
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    pub fn save_last_order(&self, order: &Order) -> Result<()> {
        self.write_json(StorageKey::LastOrder, order)
    }

    /// The most recently placed order.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if storage cannot be read.
    pub fn last_order(&self) -> Result<Option<Order>> {
        self.read_json(StorageKey::LastOrder)
    }

    /// Record a search term. The newest term comes first, repeats
    /// (compared case-insensitively) move to the front, and only the last
    /// [`MAX_RECENT_SEARCHES`] are kept. Blank terms are ignored.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if storage cannot be written.
    pub fn add_recent_search(&self, term: &str) -> Result<Vec<String>> {
        let term = term.trim();
        let mut searches = self.recent_searches()?;
        if term.is_empty() {
            return Ok(searches);
        }

        let folded = term.to_lowercase();
        searches.retain(|existing| existing.to_lowercase() != folded);
        searches.insert(0, term.to_string());
        searches.truncate(MAX_RECENT_SEARCHES);

        self.write_json(StorageKey::RecentSearches, &searches)?;
        Ok(searches)
    }

    /// Recent search terms, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if storage cannot be read.
    pub fn recent_searches(&self) -> Result<Vec<String>> {
        Ok(self
            .read_json(StorageKey::RecentSearches)?
            .unwrap_or_default())
    }

    /// Forget all recent searches.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if storage cannot be written.
    pub fn clear_recent_searches(&self) -> Result<()> {
        Ok(self.inner.storage.remove(StorageKey::RecentSearches)?)
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.inner.storage.set(key, &json)?;
        Ok(())
    }

    /// Read a stored value. Unreadable JSON is dropped rather than failing
    /// the page that asked for it.
    fn read_json<T: DeserializeOwned>(&self, key: StorageKey) -> Result<Option<T>> {
        let Some(raw) = self.inner.storage.get(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key = %key, error = %e, "Discarding unreadable stored value");
                self.inner.storage.remove(key)?;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::config::ClientConfig;
    use crate::storage::{MemoryStorage, SessionStorage};
    use crate::types::CartItem;

    fn provider() -> (CommerceProvider, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let config = ClientConfig::new("http://127.0.0.1:9").unwrap();
        let provider = CommerceProvider::new(config, storage.clone()).unwrap();
        (provider, storage)
    }

    #[test]
    fn test_recent_searches_are_capped_and_deduplicated() {
        let (provider, _) = provider();
        for term in ["inverter", "battery", "panel", "charge controller", "cable"] {
            provider.add_recent_search(term).unwrap();
        }
        provider.add_recent_search("  ").unwrap();
        let searches = provider.add_recent_search("Battery").unwrap();

        assert_eq!(
            searches,
            vec!["Battery", "cable", "charge controller", "panel", "inverter"]
        );

        let searches = provider.add_recent_search("mounting rail").unwrap();
        assert_eq!(searches.len(), MAX_RECENT_SEARCHES);
        assert_eq!(searches.first().map(String::as_str), Some("mounting rail"));
        assert!(!searches.contains(&"inverter".to_string()));

        provider.clear_recent_searches().unwrap();
        assert!(provider.recent_searches().unwrap().is_empty());
    }

    #[test]
    fn test_checkout_cart_snapshot() {
        let (provider, _) = provider();
        assert!(provider.checkout_cart().unwrap().is_none());

        let product = serde_json::from_value(json!({ "id": "p1", "name": "Panel", "price": 120 }))
            .unwrap();
        let cart = Cart::from_items(
            None,
            vec![CartItem {
                id: None,
                product_id: "p1".into(),
                quantity: 2,
                product,
            }],
        );
        provider.save_checkout_cart(&cart).unwrap();

        let restored = provider.checkout_cart().unwrap().unwrap();
        assert_eq!(restored.total_items, 2);
        assert_eq!(restored.subtotal, Decimal::from(240));

        provider.clear_checkout_cart().unwrap();
        assert!(provider.checkout_cart().unwrap().is_none());
    }

    #[test]
    fn test_unreadable_last_order_is_discarded() {
        let (provider, storage) = provider();
        storage.set(StorageKey::LastOrder, "{broken").unwrap();

        assert!(provider.last_order().unwrap().is_none());
        assert_eq!(storage.get(StorageKey::LastOrder).unwrap(), None);
    }
}
