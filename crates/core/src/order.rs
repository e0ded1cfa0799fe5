//! Order history models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::{OrderId, OrderStatus, Price};

/// A line item within a placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub product: Product,
    pub quantity: u32,
    pub price: Price,
}

impl OrderItem {
    /// The line subtotal (`price * quantity`).
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.price * self.quantity
    }
}

/// A placed order as returned by `GET /orders/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub total_amount: Price,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub status_display: Option<String>,
    #[serde(default)]
    pub ordered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Status label for display, preferring the server-provided one.
    #[must_use]
    pub fn status_label(&self) -> &str {
        self.status_display
            .as_deref()
            .unwrap_or_else(|| self.status.display_name())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_decode() {
        let json = r#"{
            "id": 12,
            "total_amount": "27.40",
            "status": "pending",
            "status_display": "Pending",
            "ordered_at": "2026-03-01T10:15:00Z",
            "items": [{
                "id": 1,
                "product": {"id": 3, "name": "Honey", "price": "13.70", "stock": 5},
                "quantity": 2,
                "price": "13.70"
            }]
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.id.as_i64(), 12);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.status_label(), "Pending");
        assert_eq!(order.items[0].subtotal().to_string(), "27.40");
    }

    #[test]
    fn test_status_label_falls_back_to_enum() {
        let json = r#"{"id": 1, "total_amount": "1.00", "status": "shipped"}"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.status_label(), "Shipped");
    }
}
