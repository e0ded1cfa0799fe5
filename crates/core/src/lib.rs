//! BEE-Commerce Core - Shared domain types.
//!
//! This crate provides the types used across the BEE-Commerce components:
//! - `client` - storefront API client
//! - `cli` - command-line storefront frontend
//!
//! # Architecture
//!
//! The core crate contains only types and pure domain logic - no I/O, no
//! HTTP clients, no async. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, and statuses
//! - [`catalog`] - Product and category models, paginated listing results
//! - [`cart`] - In-memory shopping cart with derived totals
//! - [`order`] - Order history models
//! - [`paging`] - Page-window computation for pagination controls

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod order;
pub mod paging;
pub mod types;

pub use cart::{CartLine, CartStore};
pub use catalog::{Category, PageResult, Paginated, Product};
pub use order::{Order, OrderItem};
pub use paging::PageWindow;
pub use types::*;
