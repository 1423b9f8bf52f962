//! Order placement and status changes against the fake backend.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use solar_market_client::{ClientError, NewOrder, OrderUpdate, ShippingAddress};
use solar_market_core::OrderStatus;
use solar_market_integration_tests::FakeBackend;

fn address() -> ShippingAddress {
    ShippingAddress {
        full_name: "Sunny Vendor".into(),
        phone: "+1 520 555 0100".into(),
        street: "12 Array Rd".into(),
        city: "Tucson".into(),
        state: "AZ".into(),
        zip_code: "85701".into(),
        country: "US".into(),
    }
}

#[tokio::test]
async fn test_create_order_empties_cart() {
    let backend = FakeBackend::start().await;
    let provider = backend.logged_in_provider().await;
    let cart = provider.add_to_cart(&"p1".into(), 2).await.unwrap();

    let order = provider
        .create_order(&NewOrder::from_cart(&cart, address(), "card"))
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_amount, Decimal::from(240));
    assert_eq!(order.items.len(), 1);

    assert!(provider.cart().await.unwrap().items.is_empty());
    assert_eq!(provider.cart_item_count().await, 0);
    assert_eq!(backend.hits("DELETE /cart/clear"), 1);
    assert_eq!(backend.cart_quantity("p1"), 0);

    let orders = provider.get_orders().await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders.first().map(|o| &o.id), Some(&order.id));
}

#[tokio::test]
async fn test_incomplete_address_never_reaches_backend() {
    let backend = FakeBackend::start().await;
    let provider = backend.logged_in_provider().await;
    let cart = provider.add_to_cart(&"p2".into(), 1).await.unwrap();

    let mut shipping = address();
    shipping.street = String::new();
    let err = provider
        .create_order(&NewOrder::from_cart(&cart, shipping, "card"))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(backend.hits("POST /orders"), 0);
    assert_eq!(backend.order_count(), 0);
    assert_eq!(provider.cart_item_count().await, 1);
}

#[tokio::test]
async fn test_order_moves_through_its_lifecycle() {
    let backend = FakeBackend::start().await;
    let provider = backend.logged_in_provider().await;
    let cart = provider.add_to_cart(&"p2".into(), 4).await.unwrap();
    let placed = provider
        .create_order(&NewOrder::from_cart(&cart, address(), "card"))
        .await
        .unwrap();

    let order = provider.get_order(&placed.id).await.unwrap();
    assert_eq!(order.id, placed.id);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_amount, Decimal::new(14_200, 2));

    let order = provider
        .advance_order(&order, OrderStatus::Processing)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Processing);

    let order = provider
        .update_order(
            &order.id,
            &OrderUpdate {
                status: Some(OrderStatus::Shipped),
                tracking_number: Some("1Z999AA10123456784".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Shipped);
    assert_eq!(order.tracking_number.as_deref(), Some("1Z999AA10123456784"));

    // Shipped orders cannot be cancelled, and nothing is sent
    let err = provider.cancel_order(&order).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidTransition { .. }));
    assert_eq!(backend.hits(&format!("PATCH /orders/{}", order.id)), 2);

    let reread = provider.get_order(&order.id).await.unwrap();
    assert_eq!(reread.status, OrderStatus::Shipped);
}

#[tokio::test]
async fn test_unknown_order_is_an_api_error() {
    let backend = FakeBackend::start().await;
    let provider = backend.logged_in_provider().await;

    let err = provider.get_order(&"order-404".into()).await.unwrap_err();

    assert_eq!(err.status().map(|s| s.as_u16()), Some(404));
    assert_eq!(err.to_string(), "Order not found");
    assert!(provider.is_authenticated());
}
