//! Order placement and status changes.

use solar_market_core::{OrderId, OrderStatus};
use tracing::{info, instrument, warn};

use super::{CommerceProvider, decode, nested, validate};
use crate::error::{ClientError, Result};
use crate::http::ApiRequest;
use crate::types::{NewOrder, Order, OrderUpdate};

impl CommerceProvider {
    /// Place an order, then empty the cart.
    ///
    /// The order stands even if emptying the cart fails afterwards; that
    /// failure is only logged.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for an order without items or with
    /// an incomplete shipping address.
    #[instrument(skip(self, order), fields(items = order.items.len(), total = %order.total()))]
    pub async fn create_order(&self, order: &NewOrder) -> Result<Order> {
        validate::new_order(order)?;
        self.require_session().await?;

        let request = ApiRequest::post("/orders").json(order)?;
        let created: Order = decode(nested(self.api_call(request).await?, "order"))?;
        info!(order_id = %created.id, "Order placed");

        if let Err(e) = self.clear_cart().await {
            warn!(order_id = %created.id, error = %e, "Order placed but cart was not cleared");
        }
        Ok(created)
    }

    /// The user's orders (all orders for admins, own-product orders for
    /// vendors; the backend decides).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` without a session.
    #[instrument(skip(self))]
    pub async fn get_orders(&self) -> Result<Vec<Order>> {
        self.require_session().await?;
        let value = self.api_call(ApiRequest::get("/orders")).await?;
        decode(nested(value, "orders"))
    }

    /// Fetch one order.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` (404) for an unknown order.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: &OrderId) -> Result<Order> {
        self.require_session().await?;
        let value = self
            .api_call(ApiRequest::get(format!("/orders/{id}")))
            .await?;
        decode(nested(value, "order"))
    }

    /// Change an order's status or tracking number.
    ///
    /// The backend enforces who may make which change; use
    /// [`advance_order`](Self::advance_order) to also check the status
    /// transition locally.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for an empty update.
    #[instrument(skip(self, update), fields(order_id = %id, status = ?update.status))]
    pub async fn update_order(&self, id: &OrderId, update: &OrderUpdate) -> Result<Order> {
        if update.status.is_none() && update.tracking_number.is_none() {
            return Err(ClientError::Validation("Nothing to update".to_string()));
        }
        self.require_session().await?;

        let request = ApiRequest::patch(format!("/orders/{id}")).json(update)?;
        let value = self.api_call(request).await?;
        match serde_json::from_value::<Order>(nested(value, "order")) {
            Ok(order) => Ok(order),
            Err(_) => self.get_order(id).await,
        }
    }

    /// Move `order` to `next`, refusing transitions the lifecycle does not
    /// allow before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidTransition` for a disallowed change.
    #[instrument(skip(self, order), fields(order_id = %order.id, from = %order.status, to = %next))]
    pub async fn advance_order(&self, order: &Order, next: OrderStatus) -> Result<Order> {
        if !order.status.can_transition_to(next) {
            return Err(ClientError::InvalidTransition {
                from: order.status,
                to: next,
            });
        }

        let update = OrderUpdate {
            status: Some(next),
            tracking_number: None,
        };
        self.update_order(&order.id, &update).await
    }

    /// Cancel an order that has not shipped yet.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidTransition` once the order has shipped.
    pub async fn cancel_order(&self, order: &Order) -> Result<Order> {
        self.advance_order(order, OrderStatus::Cancelled).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::config::ClientConfig;
    use crate::storage::MemoryStorage;

    fn order(status: &str) -> Order {
        serde_json::from_value(json!({
            "_id": "o1",
            "items": [{ "productId": "p1", "price": 10, "quantity": 1 }],
            "shippingAddress": {
                "fullName": "Ada Lovelace", "phone": "555", "street": "1 Sun St",
                "city": "Tucson", "state": "AZ", "zipCode": "85701", "country": "US"
            },
            "paymentMethod": "card",
            "status": status,
            "totalAmount": 10
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_cancel_refuses_shipped_orders_locally() {
        let config = ClientConfig::new("http://127.0.0.1:9").unwrap();
        let provider = CommerceProvider::new(config, Arc::new(MemoryStorage::new())).unwrap();

        let err = provider.cancel_order(&order("shipped")).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::InvalidTransition {
                from: OrderStatus::Shipped,
                to: OrderStatus::Cancelled
            }
        ));

        // Allowed transitions get as far as the session check
        let err = provider.cancel_order(&order("pending")).await.unwrap_err();
        assert!(matches!(err, ClientError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_empty_update_is_rejected() {
        let config = ClientConfig::new("http://127.0.0.1:9").unwrap();
        let provider = CommerceProvider::new(config, Arc::new(MemoryStorage::new())).unwrap();
        let err = provider
            .update_order(&"o1".into(), &OrderUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }
}
