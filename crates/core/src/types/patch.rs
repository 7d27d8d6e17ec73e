//! Field presence for partial updates.
//!
//! A JSON partial update has three states per field: the key is missing
//! (leave the field alone), the key is `null` (clear it), or the key holds a
//! value (replace it). `Option<T>` collapses the first two, so updates use
//! [`Patch<T>`] instead.
//!
//! Fields must be marked `#[serde(default)]` so a missing key becomes
//! [`Patch::Absent`]:
//!
//! ```
//! use serde::Deserialize;
//! use shopcart_core::Patch;
//!
//! #[derive(Deserialize)]
//! struct Update {
//!     #[serde(default)]
//!     description: Patch<String>,
//! }
//!
//! let absent: Update = serde_json::from_str("{}").unwrap();
//! assert_eq!(absent.description, Patch::Absent);
//!
//! let cleared: Update = serde_json::from_str(r#"{"description": null}"#).unwrap();
//! assert_eq!(cleared.description, Patch::Null);
//! ```

use serde::{Deserialize, Deserializer};

/// A field in a partial update.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    /// The field was not supplied.
    #[default]
    Absent,
    /// The field was supplied as `null`.
    Null,
    /// The field was supplied with a value.
    Value(T),
}

/// Errors that can occur when applying a [`Patch`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    /// `null` was supplied for a field that must always hold a value.
    #[error("{0} cannot be null")]
    NullNotAllowed(&'static str),
}

impl<T> Patch<T> {
    /// Whether the field was left out of the update.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Convert the carried value, keeping the presence state.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns when it rejects the value.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Patch<U>, E> {
        match self {
            Self::Absent => Ok(Patch::Absent),
            Self::Null => Ok(Patch::Null),
            Self::Value(v) => f(v).map(Patch::Value),
        }
    }

    /// Collapse a patch for a field that cannot be null.
    ///
    /// `Absent` becomes `None` and `Value` becomes `Some`.
    ///
    /// # Errors
    ///
    /// Returns `PatchError::NullNotAllowed` if the patch is `Null`.
    pub fn into_required(self, name: &'static str) -> Result<Option<T>, PatchError> {
        match self {
            Self::Absent => Ok(None),
            Self::Null => Err(PatchError::NullNotAllowed(name)),
            Self::Value(v) => Ok(Some(v)),
        }
    }

    /// Apply to a field that cannot be null.
    ///
    /// Returns `true` if the field was replaced.
    ///
    /// # Errors
    ///
    /// Returns `PatchError::NullNotAllowed` if the patch is `Null`.
    pub fn apply(self, field: &mut T, name: &'static str) -> Result<bool, PatchError> {
        match self {
            Self::Absent => Ok(false),
            Self::Null => Err(PatchError::NullNotAllowed(name)),
            Self::Value(v) => {
                *field = v;
                Ok(true)
            }
        }
    }

    /// Apply to a nullable field. `Null` clears it.
    ///
    /// Returns `true` if the field was touched.
    pub fn apply_nullable(self, field: &mut Option<T>) -> bool {
        match self {
            Self::Absent => false,
            Self::Null => {
                *field = None;
                true
            }
            Self::Value(v) => {
                *field = Some(v);
                true
            }
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(|value| value.map_or(Self::Null, Self::Value))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Update {
        #[serde(default)]
        name: Patch<String>,
        #[serde(default)]
        note: Patch<String>,
    }

    #[test]
    fn test_three_states_deserialize() {
        let update: Update = serde_json::from_str(r#"{"name": "Lamp", "note": null}"#).unwrap();
        assert_eq!(update.name, Patch::Value("Lamp".to_owned()));
        assert_eq!(update.note, Patch::Null);

        let update: Update = serde_json::from_str("{}").unwrap();
        assert!(update.name.is_absent());
        assert!(update.note.is_absent());
    }

    #[test]
    fn test_apply_required_field() {
        let mut name = "old".to_owned();
        assert!(!Patch::Absent.apply(&mut name, "name").unwrap());
        assert_eq!(name, "old");

        assert!(Patch::Value("new".to_owned()).apply(&mut name, "name").unwrap());
        assert_eq!(name, "new");

        assert_eq!(
            Patch::Null.apply(&mut name, "name"),
            Err(PatchError::NullNotAllowed("name"))
        );
        assert_eq!(name, "new");
    }

    #[test]
    fn test_apply_nullable_field() {
        let mut note = Some("keep".to_owned());
        assert!(!Patch::Absent.apply_nullable(&mut note));
        assert_eq!(note.as_deref(), Some("keep"));

        assert!(Patch::Null.apply_nullable(&mut note));
        assert_eq!(note, None);

        assert!(Patch::Value("set".to_owned()).apply_nullable(&mut note));
        assert_eq!(note.as_deref(), Some("set"));
    }

    #[test]
    fn test_into_required() {
        assert_eq!(Patch::<i32>::Absent.into_required("stock"), Ok(None));
        assert_eq!(Patch::Value(3).into_required("stock"), Ok(Some(3)));
        assert_eq!(
            Patch::<i32>::Null.into_required("stock"),
            Err(PatchError::NullNotAllowed("stock"))
        );
    }

    #[test]
    fn test_try_map_keeps_presence() {
        let parse = |s: &str| s.parse::<i32>();
        assert_eq!(
            Patch::Value("7").try_map(parse).unwrap(),
            Patch::Value(7)
        );
        assert_eq!(Patch::<&str>::Null.try_map(parse).unwrap(), Patch::Null);
        assert_eq!(Patch::<&str>::Absent.try_map(parse).unwrap(), Patch::Absent);
        assert!(Patch::Value("x").try_map(parse).is_err());
    }
}
