//! Paginated product browsing.
//!
//! [`CatalogPager`] keeps the current filter and page, fetches pages through
//! the API client, and exposes navigation that is validated against the
//! total reported by the last fetch.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use bee_commerce_core::{CategoryId, PageResult, PageWindow, Product};

use crate::api::ApiClient;
use crate::error::{ClientError, Result};

/// Allowed page sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    Ten,
    Twenty,
    Fifty,
}

impl PageSize {
    /// The numeric size sent to the server.
    #[must_use]
    pub const fn count(self) -> u32 {
        match self {
            Self::Ten => 10,
            Self::Twenty => 20,
            Self::Fifty => 50,
        }
    }

    /// Parse a numeric size, rejecting anything outside the allowed set.
    #[must_use]
    pub const fn from_count(count: u32) -> Option<Self> {
        match count {
            10 => Some(Self::Ten),
            20 => Some(Self::Twenty),
            50 => Some(Self::Fifty),
            _ => None,
        }
    }
}

/// The current catalog filter and position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub category: Option<CategoryId>,
    pub search: Option<String>,
    pub page: u32,
    pub page_size: PageSize,
}

impl CatalogQuery {
    /// Query for the first page with no filters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            page: 1,
            ..Self::default()
        }
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("page_size", self.page_size.count().to_string()),
        ];
        if let Some(category) = self.category {
            params.push(("category_id", category.to_string()));
        }
        if let Some(search) = &self.search {
            if !search.is_empty() {
                params.push(("search", search.clone()));
            }
        }
        params
    }
}

/// Stateful pager over the product catalog.
///
/// Changing any filter (category, search, page size) resets to page one;
/// explicit page navigation is validated against the last known page count.
#[derive(Debug)]
pub struct CatalogPager {
    client: ApiClient,
    query: CatalogQuery,
    current: PageResult<Product>,
}

impl CatalogPager {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            query: CatalogQuery::new(),
            current: PageResult::empty(PageSize::default().count()),
        }
    }

    /// The active filter and position.
    #[must_use]
    pub const fn query(&self) -> &CatalogQuery {
        &self.query
    }

    /// The most recently fetched page.
    #[must_use]
    pub const fn current(&self) -> &PageResult<Product> {
        &self.current
    }

    /// Pagination controls for the current position.
    #[must_use]
    pub fn window(&self) -> PageWindow {
        PageWindow::compute(self.current.total_pages(), self.query.page)
    }

    /// Fetch the page for the current query.
    ///
    /// # Errors
    ///
    /// Propagates authentication, transport, and decode failures.
    #[instrument(skip(self), fields(page = self.query.page))]
    pub async fn fetch(&mut self) -> Result<&PageResult<Product>> {
        let page = self.client.products(&self.query.params()).await?;
        self.current = page.into_page_result(self.query.page, self.query.page_size.count());
        Ok(&self.current)
    }

    /// Replace every filter at once and load page one.
    ///
    /// One fetch regardless of how many filters changed; the per-filter
    /// setters below are for incremental narrowing.
    ///
    /// # Errors
    ///
    /// Propagates fetch failures.
    pub async fn set_filters(
        &mut self,
        category: Option<CategoryId>,
        search: Option<String>,
        page_size: PageSize,
    ) -> Result<&PageResult<Product>> {
        self.query = CatalogQuery {
            category,
            search: search.filter(|s| !s.is_empty()),
            page: 1,
            page_size,
        };
        self.fetch().await
    }

    /// Restrict to one category (or clear the filter) and reload page one.
    ///
    /// # Errors
    ///
    /// Propagates fetch failures.
    pub async fn set_category(&mut self, category: Option<CategoryId>) -> Result<&PageResult<Product>> {
        self.query.category = category;
        self.query.page = 1;
        self.fetch().await
    }

    /// Apply a search term (empty clears it) and reload page one.
    ///
    /// # Errors
    ///
    /// Propagates fetch failures.
    pub async fn set_search(&mut self, term: &str) -> Result<&PageResult<Product>> {
        self.query.search = if term.is_empty() {
            None
        } else {
            Some(term.to_string())
        };
        self.query.page = 1;
        self.fetch().await
    }

    /// Change the page size and reload page one.
    ///
    /// # Errors
    ///
    /// Propagates fetch failures.
    pub async fn set_page_size(&mut self, size: PageSize) -> Result<&PageResult<Product>> {
        self.query.page_size = size;
        self.query.page = 1;
        self.fetch().await
    }

    /// Jump to a specific page.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidPage`] when `page` is zero or beyond
    /// the last known page; the current position is left untouched.
    pub async fn go_to_page(&mut self, page: u32) -> Result<&PageResult<Product>> {
        let total = self.current.total_pages();
        if page == 0 || page > total {
            return Err(ClientError::InvalidPage {
                requested: page,
                total,
            });
        }
        let previous = self.query.page;
        self.query.page = page;
        match self.fetch().await {
            Ok(_) => Ok(&self.current),
            Err(err) => {
                self.query.page = previous;
                Err(err)
            }
        }
    }

    /// Advance one page, if not already on the last.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidPage`] on the last page.
    pub async fn next_page(&mut self) -> Result<&PageResult<Product>> {
        self.go_to_page(self.query.page + 1).await
    }

    /// Step back one page, if not already on the first.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidPage`] on the first page.
    pub async fn previous_page(&mut self) -> Result<&PageResult<Product>> {
        self.go_to_page(self.query.page.saturating_sub(1)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_round_trips_allowed_values() {
        for size in [PageSize::Ten, PageSize::Twenty, PageSize::Fifty] {
            assert_eq!(PageSize::from_count(size.count()), Some(size));
        }
        assert_eq!(PageSize::from_count(25), None);
        assert_eq!(PageSize::from_count(0), None);
    }

    #[test]
    fn test_params_omit_empty_filters() {
        let query = CatalogQuery::new();
        let params = query.params();
        assert_eq!(
            params,
            vec![
                ("page", "1".to_string()),
                ("page_size", "10".to_string()),
            ]
        );
    }

    #[test]
    fn test_params_include_category_and_search() {
        let query = CatalogQuery {
            category: Some(CategoryId::new(7)),
            search: Some("honey".to_string()),
            page: 3,
            page_size: PageSize::Twenty,
        };
        let params = query.params();
        assert!(params.contains(&("category_id", "7".to_string())));
        assert!(params.contains(&("search", "honey".to_string())));
        assert!(params.contains(&("page", "3".to_string())));
        assert!(params.contains(&("page_size", "20".to_string())));
    }
}
