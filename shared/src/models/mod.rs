//! Data models
//!
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! Record IDs are `i64` (SQLite INTEGER PRIMARY KEY), timestamps are Unix millis.

pub mod identifier;
pub mod order;
pub mod product;

// Re-exports
pub use identifier::*;
pub use order::*;
pub use product::*;
