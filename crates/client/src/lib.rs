//! BEE-Commerce storefront API client.
//!
//! Talks to the storefront backend over JSON/HTTP with short-lived JWT
//! credentials. The pieces, leaf to root:
//!
//! - [`session`] - credential persistence and unverified claims decoding
//! - [`api`] - authenticated request wrapper with single-retry recovery
//! - [`scheduler`] - proactive background token renewal
//! - [`catalog`] - paginated product listing state
//! - [`checkout`] - cart submission
//! - [`account`] - registration and profile operations
//! - [`storefront`] - session facade tying the above together
//!
//! # Example
//!
//! ```rust,ignore
//! use bee_commerce_client::{ClientConfig, Storefront};
//!
//! let config = ClientConfig::from_env()?;
//! let mut shop = Storefront::new(config)?;
//!
//! shop.login("bee", "hunter2").await?;
//! let page = shop.catalog().set_search("honey").await?;
//! for product in &page.items {
//!     println!("{} - {}", product.name, product.price);
//! }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
pub mod api;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod session;
pub mod storefront;

pub use account::{Profile, ProfileUpdate};
pub use api::ApiClient;
pub use catalog::{CatalogPager, CatalogQuery, PageSize};
pub use checkout::{CheckoutReceipt, CheckoutRequest};
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, Result};
pub use scheduler::RefreshScheduler;
pub use session::{Claims, CredentialStore, Session};
pub use storefront::Storefront;
