//! Catalog pagination: page math, filters, and navigation bounds.
//!
//! The backend seeds 23 products, so the default page size of 10 yields
//! three pages with a short last page.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::atomic::Ordering;

use bee_commerce_core::CategoryId;

use bee_commerce_client::session::MemoryStorage;
use bee_commerce_client::{ApiClient, CatalogPager, ClientConfig, ClientError, PageSize};
use bee_commerce_integration_tests::{MockBackend, PASSWORD, USERNAME};

async fn pager_for(backend: &MockBackend) -> CatalogPager {
    let config = ClientConfig::with_base_url(&backend.base_url()).unwrap();
    let client = ApiClient::new(&config, Box::new(MemoryStorage::new())).unwrap();
    client.login(USERNAME, PASSWORD).await.unwrap();
    CatalogPager::new(client)
}

#[tokio::test]
async fn test_first_page_and_totals() {
    let backend = MockBackend::start().await;
    let mut pager = pager_for(&backend).await;

    let page = pager.fetch().await.unwrap();
    assert_eq!(page.items.len(), 10);
    assert_eq!(page.total_count, 23);
    assert_eq!(page.total_pages(), 3);
}

#[tokio::test]
async fn test_last_page_is_short() {
    let backend = MockBackend::start().await;
    let mut pager = pager_for(&backend).await;

    pager.fetch().await.unwrap();
    let page = pager.go_to_page(3).await.unwrap();
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.page, 3);
}

#[tokio::test]
async fn test_out_of_range_page_is_rejected_locally() {
    let backend = MockBackend::start().await;
    let mut pager = pager_for(&backend).await;

    pager.fetch().await.unwrap();
    let before = backend.counters().products.load(Ordering::SeqCst);

    let err = pager.go_to_page(9).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::InvalidPage {
            requested: 9,
            total: 3
        }
    ));
    let err = pager.go_to_page(0).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidPage { requested: 0, .. }));

    // Rejected before any request went out; position unchanged.
    assert_eq!(backend.counters().products.load(Ordering::SeqCst), before);
    assert_eq!(pager.query().page, 1);
}

#[tokio::test]
async fn test_next_and_previous_respect_bounds() {
    let backend = MockBackend::start().await;
    let mut pager = pager_for(&backend).await;

    pager.fetch().await.unwrap();
    assert!(matches!(
        pager.previous_page().await.unwrap_err(),
        ClientError::InvalidPage { .. }
    ));

    pager.next_page().await.unwrap();
    pager.next_page().await.unwrap();
    assert_eq!(pager.query().page, 3);
    assert!(matches!(
        pager.next_page().await.unwrap_err(),
        ClientError::InvalidPage { .. }
    ));
}

#[tokio::test]
async fn test_search_resets_to_page_one() {
    let backend = MockBackend::start().await;
    let mut pager = pager_for(&backend).await;

    pager.fetch().await.unwrap();
    pager.go_to_page(2).await.unwrap();

    // 7 of the 23 seeded products are honey jars.
    let page = pager.set_search("honey").await.unwrap();
    assert_eq!(page.total_count, 7);
    assert_eq!(page.page, 1);
    assert!(page.items.iter().all(|p| p.name.contains("Honey")));
    assert_eq!(pager.query().page, 1);
}

#[tokio::test]
async fn test_category_filter() {
    let backend = MockBackend::start().await;
    let mut pager = pager_for(&backend).await;

    let page = pager.set_category(Some(CategoryId::new(2))).await.unwrap();
    assert!(
        page.items
            .iter()
            .all(|p| p.category.as_ref().map(|c| c.id) == Some(CategoryId::new(2)))
    );

    let page = pager.set_category(None).await.unwrap();
    assert_eq!(page.total_count, 23);
}

#[tokio::test]
async fn test_page_size_change_reshapes_pages() {
    let backend = MockBackend::start().await;
    let mut pager = pager_for(&backend).await;

    let page = pager.set_page_size(PageSize::Twenty).await.unwrap();
    assert_eq!(page.items.len(), 20);
    assert_eq!(page.total_pages(), 2);
}

#[tokio::test]
async fn test_bare_list_response_normalizes_to_single_page() {
    let backend = MockBackend::start().await;
    backend.set_bare_product_list(true);
    let mut pager = pager_for(&backend).await;

    let page = pager.fetch().await.unwrap();
    assert_eq!(page.items.len(), 23);
    assert_eq!(page.total_count, 23);
    assert_eq!(page.page, 1);
    assert_eq!(page.total_pages(), 3);
}

#[tokio::test]
async fn test_window_follows_current_page() {
    let backend = MockBackend::start().await;
    let mut pager = pager_for(&backend).await;

    pager.fetch().await.unwrap();
    let window = pager.window();
    assert_eq!(window.pages, vec![1, 2, 3]);
    assert_eq!(window.jump_to_last, None);
}
