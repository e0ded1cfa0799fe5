//! Type-safe wrappers for common values.
//!
//! # Modules
//!
//! - [`id`] - Newtype IDs (`ProductId`, `CategoryId`, `OrderId`, `UserId`)
//! - [`price`] - Decimal price with 2-decimal display rounding
//! - [`status`] - Order status lifecycle

pub mod id;
pub mod price;
pub mod status;

pub use id::{CategoryId, OrderId, ProductId, UserId};
pub use price::Price;
pub use status::OrderStatus;
