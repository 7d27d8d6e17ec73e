//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `users` - User registration
//! - `catalog` - Product CRUD
//! - `cart` - Session carts and stock reconciliation
//!
//! Services borrow the pool and are built per request. Route handlers call
//! them and convert their errors into [`crate::error::AppError`].

pub mod cart;
pub mod catalog;
pub mod users;

pub use cart::{CartError, CartService};
pub use catalog::{CatalogError, CatalogService};
pub use users::{UserError, UserService};
