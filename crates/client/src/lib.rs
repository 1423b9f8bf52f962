//! Solar Market client library.
//!
//! The session & commerce provider for the Solar Market REST backend:
//! authentication and token lifecycle, profile, product and category CRUD,
//! the cart (with product enrichment) and orders.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use solar_market_client::{ClientConfig, CommerceProvider, MemoryStorage};
//!
//! let config = ClientConfig::from_env()?;
//! let provider = CommerceProvider::new(config, Arc::new(MemoryStorage::new()))?;
//!
//! // Restore a persisted session, if any.
//! provider.hydrate().await;
//!
//! provider.login("buyer@example.com", &"hunter22".into()).await?;
//! provider.add_to_cart(&"5".into(), 2).await?;
//! assert_eq!(provider.cart_item_count().await, 2);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod cart;
pub mod config;
pub mod error;
mod http;
pub mod provider;
pub mod session;
pub mod storage;
pub mod telemetry;
pub mod types;

pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, Result};
pub use provider::{CommerceProvider, Registration};
pub use session::{AuthState, SessionEvent};
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError, StorageKey};
pub use types::*;
