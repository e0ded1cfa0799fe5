//! Order history listing.

use bee_commerce_client::Storefront;

/// Print the logged-in user's orders, newest first as the server returns them.
pub async fn list(shop: &Storefront) -> Result<(), Box<dyn std::error::Error>> {
    let orders = shop.orders().await?;
    if orders.is_empty() {
        println!("No orders yet");
        return Ok(());
    }

    for order in &orders {
        let placed = order
            .ordered_at
            .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string());
        println!(
            "Order {:>6}  {placed}  {:>10}  {}",
            order.id.to_string(),
            order.total_amount.to_string(),
            order.status_label()
        );
        for item in &order.items {
            println!(
                "    {:>3} x {:<40} {:>10}",
                item.quantity,
                item.product.name,
                item.subtotal().to_string()
            );
        }
    }
    Ok(())
}
