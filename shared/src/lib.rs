//! Shared types for the hook server
//!
//! Data models for identifier owners, reservations (orders) and the products
//! whose stock they hold, plus small time utilities.

pub mod models;
pub mod util;

// Re-exports
pub use models::{
    IdScheme, Identifier, Order, OrderCreate, OrderItem, OrderItemCreate, OrderStatus, OwnerKind,
    Product, ProductCreate, RestockOutcome,
};
pub use serde::{Deserialize, Serialize};
