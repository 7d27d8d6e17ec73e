//! Shopcart Core - Domain types and inventory rules.
//!
//! This crate provides the types shared by every Shopcart component:
//! - `storefront` - HTTP API for users, products and session carts
//! - `cli` - Command-line tools (through the storefront library)
//!
//! # Architecture
//!
//! The core crate contains only types and pure decision logic - no I/O, no
//! database access, no HTTP. The storefront loads rows inside a transaction
//! and asks this crate whether a change is admissible.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, quantities, emails and sessions
//! - [`inventory`] - The inventory guard deciding whether stock covers a quantity

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod inventory;
pub mod types;

pub use inventory::{StockError, check_available, merged_quantity};
pub use types::*;
