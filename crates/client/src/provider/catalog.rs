//! Products and categories.
//!
//! Single-product reads go through the shared [`ProductCache`]: a cached
//! product is returned without a request, and every write keeps the cache
//! in step with the backend.
//!
//! [`ProductCache`]: crate::cache::ProductCache

use serde_json::Value;
use solar_market_core::{CategoryId, ProductId};
use tracing::{debug, info, instrument};

use super::{CommerceProvider, decode, nested, validate};
use crate::error::{ClientError, Result};
use crate::http::ApiRequest;
use crate::types::{
    Category, CategoryUpdate, NewCategory, NewProduct, Product, ProductListing, ProductPage,
    ProductQuery, ProductUpdate,
};

impl CommerceProvider {
    // =========================================================================
    // Products
    // =========================================================================

    /// List products with filters and pagination.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` if the backend refuses the query.
    #[instrument(skip(self, query), fields(page = ?query.page, search = ?query.search))]
    pub async fn get_products(&self, query: &ProductQuery) -> Result<ProductPage> {
        let request = ApiRequest::get("/products").query(query)?;
        let listing: ProductListing = self.api_call_as(request).await?;
        let page = ProductPage::from(listing);
        debug!(count = page.products.len(), total = page.total, "Fetched products");
        Ok(page)
    }

    /// Fetch one product, serving it from the cache when possible.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` (404) for an unknown product.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product_by_id(&self, id: &ProductId) -> Result<Product> {
        if let Some(product) = self.inner.products.get(id).await {
            return Ok(product);
        }

        let value = self
            .api_call(ApiRequest::get(format!("/products/{id}")))
            .await?;
        let product = decode_product(value)?;
        self.inner.products.insert(product.clone()).await;
        Ok(product)
    }

    /// Create a product (vendors and admins).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for a blank name or negative price.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: &NewProduct) -> Result<Product> {
        validate::new_product(product)?;
        self.require_session().await?;

        let request = ApiRequest::post("/products").json(product)?;
        let created = decode_product(self.api_call(request).await?)?;
        self.inner.products.insert(created.clone()).await;
        info!(product_id = %created.id, "Created product");
        Ok(created)
    }

    /// Update a product and refresh its cache entry.
    ///
    /// The cache takes the backend's answer. If the answer carries no
    /// product, the update is applied to the cached copy instead.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for a blank name or negative price.
    #[instrument(skip(self, update), fields(product_id = %id))]
    pub async fn update_product(&self, id: &ProductId, update: &ProductUpdate) -> Result<Product> {
        if update.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(ClientError::Validation(
                "Product name is required".to_string(),
            ));
        }
        if update.price.is_some_and(|price| price.is_sign_negative()) {
            return Err(ClientError::Validation(
                "Price cannot be negative".to_string(),
            ));
        }
        self.require_session().await?;

        let request = ApiRequest::patch(format!("/products/{id}")).json(update)?;
        let value = self.api_call(request).await?;

        if let Ok(product) = serde_json::from_value::<Product>(nested(value, "product")) {
            self.inner.products.insert(product.clone()).await;
            return Ok(product);
        }

        debug!("Update response carried no product, patching cached copy");
        self.inner
            .products
            .update_with(id, |product| update.apply_to(product))
            .await;
        self.get_product_by_id(id).await
    }

    /// Delete a product and evict it from the cache.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` if the backend refuses the deletion.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<()> {
        self.require_session().await?;
        self.api_call(ApiRequest::delete(format!("/products/{id}")))
            .await?;
        self.inner.products.invalidate(id).await;
        info!("Deleted product");
        Ok(())
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` on backend failure.
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Result<Vec<Category>> {
        let value = self.api_call(ApiRequest::get("/categories")).await?;
        decode(nested(value, "categories"))
    }

    /// Fetch one category.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` (404) for an unknown category.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn get_category(&self, id: &CategoryId) -> Result<Category> {
        let value = self
            .api_call(ApiRequest::get(format!("/categories/{id}")))
            .await?;
        decode_category(value)
    }

    /// Create a category (admins).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for a blank name.
    #[instrument(skip(self, category), fields(name = %category.name))]
    pub async fn create_category(&self, category: &NewCategory) -> Result<Category> {
        validate::new_category(category)?;
        self.require_session().await?;

        let request = ApiRequest::post("/categories").json(category)?;
        let created = decode_category(self.api_call(request).await?)?;
        info!(category_id = %created.id, "Created category");
        Ok(created)
    }

    /// Update a category.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for a blank name.
    #[instrument(skip(self, update), fields(category_id = %id))]
    pub async fn update_category(
        &self,
        id: &CategoryId,
        update: &CategoryUpdate,
    ) -> Result<Category> {
        if update.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(ClientError::Validation(
                "Category name is required".to_string(),
            ));
        }
        self.require_session().await?;

        let request = ApiRequest::patch(format!("/categories/{id}")).json(update)?;
        let value = self.api_call(request).await?;
        match serde_json::from_value::<Category>(nested(value, "category")) {
            Ok(category) => Ok(category),
            Err(_) => self.get_category(id).await,
        }
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` if the backend refuses the deletion.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn delete_category(&self, id: &CategoryId) -> Result<()> {
        self.require_session().await?;
        self.api_call(ApiRequest::delete(format!("/categories/{id}")))
            .await?;
        info!("Deleted category");
        Ok(())
    }
}

fn decode_product(value: Value) -> Result<Product> {
    decode(nested(value, "product"))
}

fn decode_category(value: Value) -> Result<Category> {
    decode(nested(value, "category"))
}
