//! Checkout submission.
//!
//! Builds the order payload from the cart and submits it. The cart is only
//! emptied after the server confirms, so a failed submission loses nothing.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use bee_commerce_core::{CartStore, OrderId, Price, ProductId};

use crate::api::ApiClient;
use crate::error::{ClientError, Result};

/// One line of the order payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutItem {
    pub product: ProductId,
    pub quantity: u32,
    pub price: Price,
}

/// Request body for `POST /checkout/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutRequest {
    pub order_items: Vec<CheckoutItem>,
}

impl CheckoutRequest {
    /// Snapshot the cart into an order payload.
    #[must_use]
    pub fn from_cart(cart: &CartStore) -> Self {
        Self {
            order_items: cart
                .lines()
                .iter()
                .map(|line| CheckoutItem {
                    product: line.product_id,
                    quantity: line.quantity,
                    price: line.unit_price,
                })
                .collect(),
        }
    }
}

/// The server's acknowledgement of a placed order.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutReceipt {
    #[serde(default, alias = "order_id")]
    pub id: Option<OrderId>,
    #[serde(default)]
    pub total_amount: Option<Price>,
}

/// Submit the cart as an order and empty it on success.
///
/// An empty cart is rejected locally; no request is made.
///
/// # Errors
///
/// Returns [`ClientError::EmptyCart`] for an empty cart, and propagates
/// authentication, validation, and transport failures otherwise. The cart
/// is left untouched on any failure.
#[instrument(skip(client, cart), fields(lines = cart.lines().len()))]
pub async fn submit(client: &ApiClient, cart: &mut CartStore) -> Result<CheckoutReceipt> {
    if cart.is_empty() {
        return Err(ClientError::EmptyCart);
    }

    let request = CheckoutRequest::from_cart(cart);
    let body = serde_json::to_value(&request)?;
    let receipt: CheckoutReceipt = client.post_json("/checkout/", &body).await?;

    cart.clear();
    info!(order_id = ?receipt.id, "order placed");
    Ok(receipt)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bee_commerce_core::Product;
    use rust_decimal::Decimal;

    fn product(id: i64, price: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("product-{id}"),
            description: None,
            price: Price::new(price.parse::<Decimal>().unwrap()),
            stock: 10,
            available: true,
            category: None,
            image: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_payload_mirrors_cart_lines() {
        let mut cart = CartStore::new();
        cart.add_item(&product(1, "5.00"));
        cart.add_item(&product(1, "5.00"));
        cart.add_item(&product(2, "3.50"));

        let request = CheckoutRequest::from_cart(&cart);
        assert_eq!(request.order_items.len(), 2);
        assert_eq!(request.order_items[0].product, ProductId::new(1));
        assert_eq!(request.order_items[0].quantity, 2);
        assert_eq!(request.order_items[1].quantity, 1);
    }

    #[test]
    fn test_payload_serializes_expected_shape() {
        let mut cart = CartStore::new();
        cart.add_item(&product(7, "12.99"));

        let json = serde_json::to_value(CheckoutRequest::from_cart(&cart)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "order_items": [
                    { "product": 7, "quantity": 1, "price": "12.99" }
                ]
            })
        );
    }
}
