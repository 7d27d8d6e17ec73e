//! Domain models for the storefront.
//!
//! These are validated domain objects, separate from database row types
//! (which live next to their queries in [`crate::db`]) and from request
//! bodies (which arrive as raw input and are validated by the services).

pub mod cart;
pub mod product;
pub mod user;

pub use cart::{Cart, CartItem, CartLine, CartView};
pub use product::{
    CreateProductInput, NewProduct, Product, ProductChanges, ProductInputError, UpdateProductInput,
};
pub use user::{CreateUserInput, User};
