//! Domain types for the marketplace REST API.
//!
//! Field names follow the backend's camelCase JSON. Documents may carry
//! their id as `id` or `_id`, and references (a product's category, a cart
//! line's product) may be either a bare id or the populated document.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use solar_market_core::{
    CartId, CartItemId, CategoryId, Money, OrderId, OrderStatus, ProductId, Role, UserId,
    VerificationStatus, line_total,
};

const fn default_true() -> bool {
    true
}

// =============================================================================
// Users
// =============================================================================

/// Authenticated account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default)]
    pub is_email_verified: bool,
    /// Present for vendors only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_info: Option<VendorInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Vendor business profile with aggregate sales figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorInfo {
    pub business_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_details: Option<BankDetails>,
    #[serde(default)]
    pub verification_status: VerificationStatus,
    #[serde(default)]
    pub total_sales: Money,
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

/// Payout account for a vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankDetails {
    pub account_name: String,
    pub account_number: String,
    pub bank_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_number: Option<String>,
}

/// Postal address stored on a profile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub country: String,
}

/// Vendor details supplied when registering a vendor account.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorRegistration {
    pub business_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
}

/// Fields accepted by `PATCH /profile`. Role is deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_details: Option<BankDetails>,
}

/// Result of `GET /auth/verify-status`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationState {
    #[serde(alias = "isVerified")]
    pub is_email_verified: bool,
    #[serde(default)]
    pub email: Option<String>,
}

// =============================================================================
// Catalog
// =============================================================================

/// A product's category: either just its id or the populated document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Id(CategoryId),
    Embedded(Box<Category>),
}

impl CategoryRef {
    /// Id of the referenced category.
    #[must_use]
    pub const fn id(&self) -> &CategoryId {
        match self {
            Self::Id(id) => id,
            Self::Embedded(category) => &category.id,
        }
    }
}

/// Seller shown on a product: either just the user id or a summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VendorRef {
    Id(UserId),
    Embedded(VendorSummary),
}

/// Populated vendor on a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorSummary {
    #[serde(alias = "_id")]
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
}

/// Catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<VendorRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub images: Vec<String>,
    /// Free-form technical data (wattage, efficiency, warranty...).
    #[serde(default)]
    pub specifications: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub num_reviews: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Name given to cart lines whose product could not be loaded.
    pub const NOT_FOUND_NAME: &'static str = "Product Not Found";

    /// Stand-in for a cart line whose product lookup failed: zero price,
    /// out of stock, inactive.
    #[must_use]
    pub fn placeholder(id: ProductId) -> Self {
        Self {
            id,
            name: Self::NOT_FOUND_NAME.to_string(),
            description: String::new(),
            price: Decimal::ZERO,
            category: None,
            vendor: None,
            brand: None,
            stock: 0,
            images: Vec::new(),
            specifications: BTreeMap::new(),
            rating: None,
            num_reviews: 0,
            is_active: false,
            created_at: None,
        }
    }

    /// Whether this is a [`Product::placeholder`].
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        !self.is_active && self.stock == 0 && self.name == Self::NOT_FOUND_NAME
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Payload for `POST /products`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Money,
    pub category: CategoryId,
    pub stock: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub specifications: BTreeMap<String, serde_json::Value>,
}

/// Partial update for `PATCH /products/:id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl ProductUpdate {
    /// Apply the set fields to a product in place.
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            product.description.clone_from(description);
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(category) = &self.category {
            product.category = Some(CategoryRef::Id(category.clone()));
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(brand) = &self.brand {
            product.brand = Some(brand.clone());
        }
        if let Some(images) = &self.images {
            product.images.clone_from(images);
        }
        if let Some(is_active) = self.is_active {
            product.is_active = is_active;
        }
    }
}

/// Sort order for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    Newest,
    PriceAsc,
    PriceDesc,
    Rating,
}

/// Filters and pagination for `GET /products`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<ProductSort>,
}

/// One page of products.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: u64,
    pub page: u32,
    pub total_pages: u32,
}

/// Wire shapes of `GET /products`: paginated envelope or a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum ProductListing {
    Paged {
        #[serde(alias = "data")]
        products: Vec<Product>,
        #[serde(default)]
        total: Option<u64>,
        #[serde(default)]
        page: Option<u32>,
        #[serde(default, alias = "pages", rename = "totalPages")]
        total_pages: Option<u32>,
    },
    Bare(Vec<Product>),
}

impl From<ProductListing> for ProductPage {
    fn from(listing: ProductListing) -> Self {
        match listing {
            ProductListing::Paged {
                products,
                total,
                page,
                total_pages,
            } => Self {
                total: total.unwrap_or(products.len() as u64),
                page: page.unwrap_or(1),
                total_pages: total_pages.unwrap_or(1),
                products,
            },
            ProductListing::Bare(products) => Self {
                total: products.len() as u64,
                page: 1,
                total_pages: 1,
                products,
            },
        }
    }
}

/// Product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(alias = "_id")]
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<CategoryId>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Payload for `POST /categories`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<CategoryId>,
}

/// Partial update for `PATCH /categories/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

// =============================================================================
// Cart
// =============================================================================

/// A cart line's product: either just its id or the embedded document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductRef {
    Id(ProductId),
    Embedded(Box<Product>),
}

impl ProductRef {
    /// Id of the referenced product.
    #[must_use]
    pub const fn id(&self) -> &ProductId {
        match self {
            Self::Id(id) => id,
            Self::Embedded(product) => &product.id,
        }
    }
}

/// Enriched cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CartItemId>,
    pub product_id: ProductId,
    pub quantity: u32,
    /// Product snapshot, or [`Product::placeholder`] when it could not be loaded.
    pub product: Product,
}

impl CartItem {
    #[must_use]
    pub fn line_total(&self) -> Money {
        line_total(self.product.price, self.quantity)
    }
}

/// The user's cart with client-side totals.
///
/// `total_items` and `subtotal` are always derived from `items`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CartId>,
    pub items: Vec<CartItem>,
    pub total_items: u32,
    pub subtotal: Money,
}

impl Cart {
    /// Build a cart and compute its totals.
    #[must_use]
    pub fn from_items(id: Option<CartId>, items: Vec<CartItem>) -> Self {
        let total_items = items.iter().map(|item| item.quantity).sum();
        let subtotal = items.iter().map(CartItem::line_total).sum();
        Self {
            id,
            items,
            total_items,
            subtotal,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Quantity of a product in the cart (0 if absent).
    #[must_use]
    pub fn quantity_of(&self, product_id: &ProductId) -> u32 {
        self.items
            .iter()
            .filter(|item| &item.product_id == product_id)
            .map(|item| item.quantity)
            .sum()
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Delivery address captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    pub country: String,
}

impl ShippingAddress {
    /// Names of required fields that are blank.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("fullName", &self.full_name),
            ("phone", &self.phone),
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("country", &self.country),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Line of a placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(rename = "productId", alias = "product")]
    pub product: ProductRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub price: Money,
    pub quantity: u32,
}

/// Placed order. Only status and tracking change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(alias = "_id")]
    pub id: OrderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserId>,
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(alias = "total", alias = "totalPrice")]
    pub total_amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Line of a new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Money,
}

/// Payload for `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub items: Vec<NewOrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewOrder {
    /// Order everything in the cart. Placeholder lines are skipped.
    #[must_use]
    pub fn from_cart(
        cart: &Cart,
        shipping_address: ShippingAddress,
        payment_method: impl Into<String>,
    ) -> Self {
        let items = cart
            .items
            .iter()
            .filter(|item| !item.product.is_placeholder())
            .map(|item| NewOrderItem {
                product_id: item.product_id.clone(),
                quantity: item.quantity,
                price: item.product.price,
            })
            .collect();

        Self {
            items,
            shipping_address,
            payment_method: payment_method.into(),
            notes: None,
        }
    }

    #[must_use]
    pub fn total(&self) -> Money {
        self.items
            .iter()
            .map(|item| line_total(item.price, item.quantity))
            .sum()
    }
}

/// Partial update for `PATCH /orders/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn product(id: &str, price: i64) -> Product {
        serde_json::from_value(json!({ "_id": id, "name": "Panel", "price": price })).unwrap()
    }

    #[test]
    fn test_product_accepts_underscore_id_and_defaults() {
        let p = product("p1", 250);
        assert_eq!(p.id, ProductId::new("p1"));
        assert_eq!(p.price, Decimal::from(250));
        assert!(p.is_active);
        assert_eq!(p.stock, 0);
        assert!(p.category.is_none());
    }

    #[test]
    fn test_product_price_from_string() {
        let p: Product =
            serde_json::from_value(json!({ "id": 9, "name": "Inverter", "price": "199.99" }))
                .unwrap();
        assert_eq!(p.id.as_str(), "9");
        assert_eq!(p.price, Decimal::new(19_999, 2));
    }

    #[test]
    fn test_category_ref_variants() {
        let by_id: CategoryRef = serde_json::from_value(json!("cat-1")).unwrap();
        assert_eq!(by_id.id().as_str(), "cat-1");

        let embedded: CategoryRef =
            serde_json::from_value(json!({ "_id": "cat-2", "name": "Batteries" })).unwrap();
        assert!(matches!(embedded, CategoryRef::Embedded(_)));
        assert_eq!(embedded.id().as_str(), "cat-2");
    }

    #[test]
    fn test_placeholder() {
        let p = Product::placeholder(ProductId::new("gone"));
        assert!(p.is_placeholder());
        assert_eq!(p.price, Decimal::ZERO);
        assert!(!p.in_stock());
        assert!(!product("p1", 10).is_placeholder());
    }

    #[test]
    fn test_cart_totals() {
        let cart = Cart::from_items(
            None,
            vec![
                CartItem {
                    id: None,
                    product_id: ProductId::new("a"),
                    quantity: 2,
                    product: product("a", 100),
                },
                CartItem {
                    id: None,
                    product_id: ProductId::new("b"),
                    quantity: 3,
                    product: product("b", 15),
                },
            ],
        );
        assert_eq!(cart.total_items, 5);
        assert_eq!(cart.subtotal, Decimal::from(245));
        assert_eq!(cart.quantity_of(&ProductId::new("b")), 3);
        assert_eq!(cart.quantity_of(&ProductId::new("zzz")), 0);
    }

    #[test]
    fn test_product_update_apply() {
        let mut p = product("p1", 100);
        let update = ProductUpdate {
            price: Some(Decimal::from(80)),
            stock: Some(4),
            ..ProductUpdate::default()
        };
        update.apply_to(&mut p);
        assert_eq!(p.price, Decimal::from(80));
        assert_eq!(p.stock, 4);
        assert_eq!(p.name, "Panel");
    }

    #[test]
    fn test_product_update_serializes_only_set_fields() {
        let update = ProductUpdate {
            name: Some("Mono 400W".into()),
            ..ProductUpdate::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({ "name": "Mono 400W" })
        );
    }

    #[test]
    fn test_product_listing_shapes() {
        let paged: ProductListing = serde_json::from_value(json!({
            "products": [{ "id": "a", "name": "A", "price": 1 }],
            "total": 40,
            "page": 2,
            "totalPages": 4
        }))
        .unwrap();
        let page = ProductPage::from(paged);
        assert_eq!((page.total, page.page, page.total_pages), (40, 2, 4));

        let bare: ProductListing =
            serde_json::from_value(json!([{ "id": "a", "name": "A", "price": 1 }])).unwrap();
        let page = ProductPage::from(bare);
        assert_eq!((page.total, page.page, page.total_pages), (1, 1, 1));
    }

    #[test]
    fn test_shipping_address_missing_fields() {
        let address = ShippingAddress {
            full_name: "Ada".into(),
            city: "Lagos".into(),
            ..ShippingAddress::default()
        };
        assert_eq!(
            address.missing_fields(),
            vec!["phone", "street", "state", "country"]
        );
    }

    #[test]
    fn test_order_accepts_populated_product() {
        let order: Order = serde_json::from_value(json!({
            "_id": "o1",
            "items": [{
                "product": { "_id": "p1", "name": "Panel", "price": 100 },
                "price": 100,
                "quantity": 1
            }],
            "shippingAddress": {
                "fullName": "Ada", "phone": "1", "street": "s", "city": "c",
                "state": "st", "country": "NG"
            },
            "paymentMethod": "card",
            "status": "processing",
            "total": 100
        }))
        .unwrap();
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.items.first().unwrap().product.id().as_str(), "p1");
        assert_eq!(order.total_amount, Decimal::from(100));
    }

    #[test]
    fn test_user_vendor_info() {
        let user: User = serde_json::from_value(json!({
            "_id": "u1",
            "name": "Sun Co",
            "email": "sales@sun.co",
            "role": "vendor",
            "vendorInfo": {
                "businessName": "Sun Co",
                "verificationStatus": "verified",
                "totalSales": "1520.50",
                "totalOrders": 12
            }
        }))
        .unwrap();
        assert_eq!(user.role, Role::Vendor);
        let info = user.vendor_info.unwrap();
        assert_eq!(info.verification_status, VerificationStatus::Verified);
        assert_eq!(info.total_sales, Decimal::new(152_050, 2));
    }
}
