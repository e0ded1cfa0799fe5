//! Order placement from the command line.

use bee_commerce_core::ProductId;

use bee_commerce_client::Storefront;

/// Fill the cart from `product_id:quantity` arguments and check out.
///
/// Product details (name, current price) are fetched before anything goes
/// into the cart, so a typo in any id fails the whole command up front.
pub async fn place_order(
    shop: &mut Storefront,
    items: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    for arg in items {
        let (id, quantity) = parse_item(arg)?;
        let product = shop.client().product(id).await?;
        if !product.in_stock() {
            return Err(format!("{} is out of stock", product.name).into());
        }
        for _ in 0..quantity {
            shop.add_to_cart(&product);
        }
    }

    let total = shop.cart().total_price();
    let receipt = shop.checkout().await?;
    match receipt.id {
        Some(id) => println!("Order {id} placed, total {total}"),
        None => println!("Order placed, total {total}"),
    }
    Ok(())
}

/// Parse a `product_id:quantity` argument; a bare id means quantity 1.
fn parse_item(arg: &str) -> Result<(ProductId, u32), String> {
    let (id, quantity) = match arg.split_once(':') {
        Some((id, quantity)) => (id, quantity),
        None => (arg, "1"),
    };
    let id: i64 = id
        .parse()
        .map_err(|_| format!("invalid product id in '{arg}'"))?;
    let quantity: u32 = quantity
        .parse()
        .map_err(|_| format!("invalid quantity in '{arg}'"))?;
    if quantity == 0 {
        return Err(format!("quantity must be at least 1 in '{arg}'"));
    }
    Ok((ProductId::new(id), quantity))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item_with_quantity() {
        assert_eq!(parse_item("7:2").unwrap(), (ProductId::new(7), 2));
    }

    #[test]
    fn test_parse_item_bare_id_defaults_to_one() {
        assert_eq!(parse_item("12").unwrap(), (ProductId::new(12), 1));
    }

    #[test]
    fn test_parse_item_rejects_zero_quantity() {
        assert!(parse_item("7:0").is_err());
    }

    #[test]
    fn test_parse_item_rejects_garbage() {
        assert!(parse_item("banana").is_err());
        assert!(parse_item("7:many").is_err());
    }
}
