//! Catalog browsing commands.

use bee_commerce_core::CategoryId;

use bee_commerce_client::{ClientError, PageSize, Storefront};

/// Print the category list.
pub async fn categories(shop: &Storefront) -> Result<(), Box<dyn std::error::Error>> {
    let categories = shop.client().categories().await?;
    if categories.is_empty() {
        println!("No categories");
        return Ok(());
    }
    for category in categories.iter() {
        println!("{:>6}  {}", category.id.to_string(), category.name);
    }
    Ok(())
}

/// Print one page of products with pagination controls.
pub async fn products(
    shop: &mut Storefront,
    category: Option<i64>,
    search: Option<String>,
    page: u32,
    page_size: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let page_size = PageSize::from_count(page_size)
        .ok_or_else(|| format!("page size must be 10, 20, or 50, got {page_size}"))?;

    let pager = shop.catalog();
    pager
        .set_filters(category.map(CategoryId::new), search, page_size)
        .await?;
    if page > 1 {
        match pager.go_to_page(page).await {
            Ok(_) => {}
            Err(ClientError::InvalidPage { requested, total }) => {
                println!("Page {requested} is out of range (1..={total})");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }
    }

    let result = pager.current();
    if result.items.is_empty() {
        println!("No products found");
        return Ok(());
    }

    for product in &result.items {
        let stock = if product.in_stock() {
            format!("{} in stock", product.stock)
        } else {
            "out of stock".to_string()
        };
        println!(
            "{:>6}  {:<40}  {:>10}  {stock}",
            product.id.to_string(),
            product.name,
            product.price.to_string()
        );
    }

    let window = pager.window();
    let mut pages: Vec<String> = window
        .pages
        .iter()
        .map(|&p| {
            if p == pager.query().page {
                format!("[{p}]")
            } else {
                p.to_string()
            }
        })
        .collect();
    if let Some(last) = window.jump_to_last {
        pages.push("...".to_string());
        pages.push(last.to_string());
    }
    println!(
        "\n{} products, page {} of {}: {}",
        result.total_count,
        pager.query().page,
        result.total_pages(),
        pages.join(" ")
    );
    Ok(())
}
