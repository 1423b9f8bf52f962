//! Cart payload decoding and enrichment.
//!
//! The backend's cart lines may carry a bare product id, a populated
//! product, or both. Enrichment resolves every line to a full product and
//! recomputes the totals client-side; the backend's own `totalItems` and
//! `subtotal` are ignored.

use std::future::Future;

use futures::future::join_all;
use serde::Deserialize;
use solar_market_core::{CartId, CartItemId, ProductId};
use tracing::warn;

use crate::error::ClientError;
use crate::types::{Cart, CartItem, Product, ProductRef};

/// Cart as returned by `GET /cart`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawCart {
    #[serde(default, alias = "_id")]
    pub id: Option<CartId>,
    #[serde(default)]
    pub items: Vec<RawCartItem>,
}

/// One cart line before enrichment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawCartItem {
    #[serde(default, alias = "_id")]
    pub id: Option<CartItemId>,
    #[serde(default)]
    pub product_id: Option<ProductRef>,
    #[serde(default)]
    pub product: Option<ProductRef>,
    pub quantity: u32,
}

impl RawCartItem {
    /// The line's product id and embedded product, if any.
    fn resolve(self) -> Option<(Option<CartItemId>, ProductId, Option<Product>, u32)> {
        let mut embedded = None;
        let mut id = None;

        for reference in [self.product_id, self.product].into_iter().flatten() {
            match reference {
                ProductRef::Embedded(product) => {
                    id.get_or_insert_with(|| product.id.clone());
                    embedded.get_or_insert(*product);
                }
                ProductRef::Id(product_id) => {
                    id.get_or_insert(product_id);
                }
            }
        }

        id.map(|product_id| (self.id, product_id, embedded, self.quantity))
    }
}

/// Resolve every line of `raw` to a full product and compute totals.
///
/// Lines without embedded product data are looked up through `lookup`
/// concurrently. A failed lookup replaces that line's product with
/// [`Product::placeholder`] instead of failing the cart. Lines that name
/// no product at all are dropped.
pub(crate) async fn enrich<F, Fut>(raw: RawCart, lookup: F) -> Cart
where
    F: Fn(ProductId) -> Fut,
    Fut: Future<Output = Result<Product, ClientError>>,
{
    let lines = raw.items.into_iter().filter_map(|item| {
        let resolved = item.resolve();
        if resolved.is_none() {
            warn!("Dropping cart line without a product reference");
        }
        resolved
    });

    let items = join_all(lines.map(|(id, product_id, embedded, quantity)| {
        let lookup = &lookup;
        async move {
            let product = match embedded {
                Some(product) => product,
                None => match lookup(product_id.clone()).await {
                    Ok(product) => product,
                    Err(e) => {
                        warn!(
                            product_id = %product_id,
                            error = %e,
                            "Failed to load cart product, using placeholder"
                        );
                        Product::placeholder(product_id.clone())
                    }
                },
            };
            CartItem {
                id,
                product_id,
                quantity,
                product,
            }
        }
    }))
    .await;

    Cart::from_items(raw.id, items)
}
