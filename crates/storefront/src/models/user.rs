//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopcart_core::{Email, UserId};

/// A registered storefront user.
///
/// Users may own carts, but carts are keyed by session and never require one.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address, unique across users.
    pub email: Email,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}

/// Raw input for registering a user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserInput {
    /// Display name.
    pub name: String,
    /// Email address, validated by the user service.
    pub email: String,
}
