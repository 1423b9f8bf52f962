//! Core types for Solar Market.
//!
//! This module provides type-safe wrappers for marketplace domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{Money, line_total};
pub use status::*;
