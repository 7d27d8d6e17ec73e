//! Opaque session identifiers that key guest carts.
//!
//! The storefront does not authenticate callers. Whoever presents a session
//! identifier owns the cart behind it, so the value is treated as an opaque
//! bearer token and only checked for shape.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`SessionId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionIdError {
    /// The identifier is empty or only whitespace.
    #[error("session id cannot be empty")]
    Empty,
    /// The identifier is longer than allowed.
    #[error("session id must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The identifier contains control characters.
    #[error("session id contains control characters")]
    ControlCharacter,
}

/// Identifier naming a guest's (or user's) cart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Maximum accepted length in bytes.
    pub const MAX_LENGTH: usize = 255;

    /// Parse a session identifier.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionIdError`] if the value is empty, too long, or
    /// contains control characters.
    pub fn parse(s: &str) -> Result<Self, SessionIdError> {
        if s.trim().is_empty() {
            return Err(SessionIdError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(SessionIdError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if s.chars().any(char::is_control) {
            return Err(SessionIdError::ControlCharacter);
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SessionId {
    type Error = SessionIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
