//! Order (Reservation) Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order status
///
/// `Pending` may move to `Paid` or `Cancelled`; both are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "paid" => Ok(OrderStatus::Paid),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("Unknown order status: {}", other)),
        }
    }
}

/// Line item holding reserved stock of one product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    /// Product reference (may dangle if the product was deleted)
    pub product_id: i64,
    pub quantity: i64,
    /// Reserved quantity has been returned to the product
    pub restocked: bool,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    /// Human-readable order number (assigned by the pre-insert hook)
    pub order_no: Option<String>,
    pub status: OrderStatus,
    /// Unix millis
    pub created_at: i64,
    /// Set when the order was cancelled by reservation expiry.
    /// Host-side cancellations leave it `None`.
    pub expired_at: Option<i64>,
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Items whose stock has not been returned yet
    pub fn unrestocked_items(&self) -> impl Iterator<Item = &OrderItem> {
        self.items.iter().filter(|i| !i.restocked)
    }
}

/// Line item payload for order creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemCreate {
    pub product_id: i64,
    pub quantity: i64,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub order_no: Option<String>,
    /// Unix millis; `None` means now
    pub created_at: Option<i64>,
    pub items: Vec<OrderItemCreate>,
}

/// Result of returning one line item's quantity to stock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestockOutcome {
    /// Stock incremented, item flagged
    Restored { product_id: i64, new_stock: i64 },
    /// Item was flagged by an earlier pass; nothing changed
    AlreadyRestored,
    /// Product no longer exists; item flagged without a stock change
    ResourceMissing { product_id: i64 },
}
