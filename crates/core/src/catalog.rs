//! Product catalog models and paginated listing results.
//!
//! The backend is inconsistent about list shapes: paginated endpoints return
//! `{"results": [...], "count": N}` while unpaginated ones return a bare
//! JSON array. [`Paginated`] absorbs both at the decode boundary and
//! normalizes into a single [`PageResult`] so the ambiguity never leaks into
//! domain logic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, Price, ProductId};

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub stock: i64,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub category: Option<Category>,
    /// Absolute URL of the product image, when one is set.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

const fn default_available() -> bool {
    true
}

impl Product {
    /// Whether the product can currently be added to a cart.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.available && self.stock > 0
    }
}

/// Raw shape of a backend list response.
///
/// Deserializes either a DRF-paginated envelope or a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Paginated<T> {
    Paged { results: Vec<T>, count: u64 },
    Bare(Vec<T>),
}

impl<T> Paginated<T> {
    /// Normalize into a [`PageResult`] for the request that produced it.
    ///
    /// A bare (unpaginated) response is treated as the entirety of page 1,
    /// regardless of the requested page.
    #[must_use]
    pub fn into_page_result(self, page: u32, page_size: u32) -> PageResult<T> {
        match self {
            Self::Paged { results, count } => PageResult {
                items: results,
                total_count: count,
                page,
                page_size,
            },
            Self::Bare(items) => PageResult {
                total_count: items.len() as u64,
                items,
                page: 1,
                page_size,
            },
        }
    }

    /// Flatten into the item list, discarding pagination metadata.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Paged { results, .. } => results,
            Self::Bare(items) => items,
        }
    }
}

/// One page of a catalog listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> PageResult<T> {
    /// Total number of pages, always at least 1.
    #[must_use]
    pub const fn total_pages(&self) -> u32 {
        if self.page_size == 0 {
            return 1;
        }
        let pages = self.total_count.div_ceil(self.page_size as u64);
        if pages == 0 {
            1
        } else {
            #[allow(clippy::cast_possible_truncation)]
            {
                pages as u32
            }
        }
    }

    /// An empty first page.
    #[must_use]
    pub const fn empty(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            page: 1,
            page_size,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_paginated_envelope() {
        let json = r#"{"results": [1, 2, 3], "count": 30}"#;
        let parsed: Paginated<u64> = serde_json::from_str(json).unwrap();
        let page = parsed.into_page_result(2, 10);
        assert_eq!(page.items, vec![1, 2, 3]);
        assert_eq!(page.total_count, 30);
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn test_paginated_bare_list_is_single_page() {
        let json = "[1, 2, 3, 4]";
        let parsed: Paginated<u64> = serde_json::from_str(json).unwrap();
        let page = parsed.into_page_result(5, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_count, 4);
        assert_eq!(page.total_pages(), 1);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let page = PageResult::<u64> {
            items: vec![],
            total_count: 21,
            page: 1,
            page_size: 10,
        };
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn test_total_pages_minimum_one() {
        assert_eq!(PageResult::<u64>::empty(10).total_pages(), 1);
    }

    #[test]
    fn test_product_decode_with_nested_category() {
        let json = r#"{
            "id": 7,
            "name": "Raw Honey",
            "description": "500g jar",
            "price": "12.50",
            "stock": 3,
            "available": true,
            "category": {"id": 1, "name": "Pantry", "slug": "pantry"}
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id.as_i64(), 7);
        assert_eq!(product.price.to_string(), "12.50");
        assert!(product.in_stock());
        assert_eq!(product.category.unwrap().name, "Pantry");
    }

    #[test]
    fn test_product_out_of_stock() {
        let json = r#"{"id": 1, "name": "Wax", "price": "2.00", "stock": 0}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert!(!product.in_stock());
    }
}
