//! Input checks run before any request is sent.

use secrecy::ExposeSecret;
use solar_market_core::{Email, Role};

use crate::error::{ClientError, Result};
use crate::types::{NewCategory, NewOrder, NewProduct};

use super::auth::Registration;

/// Minimum password length accepted by the backend.
pub(crate) const MIN_PASSWORD_LEN: usize = 6;

fn invalid(message: impl Into<String>) -> ClientError {
    ClientError::Validation(message.into())
}

pub(crate) fn email(raw: &str) -> Result<Email> {
    Ok(Email::parse(raw)?)
}

pub(crate) fn password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(invalid(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub(crate) fn quantity(quantity: u32) -> Result<()> {
    if quantity == 0 {
        return Err(invalid("Quantity must be at least 1"));
    }
    Ok(())
}

pub(crate) fn registration(registration: &Registration) -> Result<()> {
    if registration.name.trim().is_empty() {
        return Err(invalid("Name is required"));
    }
    email(&registration.email)?;
    password(registration.password.expose_secret())?;

    if registration.role == Role::Vendor {
        let has_business = registration
            .vendor
            .as_ref()
            .is_some_and(|v| !v.business_name.trim().is_empty());
        if !has_business {
            return Err(invalid("Business name is required for vendor accounts"));
        }
    }
    Ok(())
}

pub(crate) fn new_product(product: &NewProduct) -> Result<()> {
    if product.name.trim().is_empty() {
        return Err(invalid("Product name is required"));
    }
    if product.price.is_sign_negative() {
        return Err(invalid("Price cannot be negative"));
    }
    Ok(())
}

pub(crate) fn new_category(category: &NewCategory) -> Result<()> {
    if category.name.trim().is_empty() {
        return Err(invalid("Category name is required"));
    }
    Ok(())
}

pub(crate) fn new_order(order: &NewOrder) -> Result<()> {
    if order.items.is_empty() {
        return Err(invalid("Order has no items"));
    }
    if order.items.iter().any(|item| item.quantity == 0) {
        return Err(invalid("Quantity must be at least 1"));
    }
    let missing = order.shipping_address.missing_fields();
    if !missing.is_empty() {
        return Err(invalid(format!(
            "Shipping address is missing: {}",
            missing.join(", ")
        )));
    }
    if order.payment_method.trim().is_empty() {
        return Err(invalid("Payment method is required"));
    }
    Ok(())
}
