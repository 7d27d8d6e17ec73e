//! Core types for Shopcart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod patch;
pub mod price;
pub mod quantity;
pub mod session;

pub use email::{Email, EmailError};
pub use id::*;
pub use patch::{Patch, PatchError};
pub use price::{Price, PriceError};
pub use quantity::{Quantity, QuantityError, Stock};
pub use session::{SessionId, SessionIdError};
