//! Tri-state field type for partial updates.
//!
//! JSON merge-style update payloads need to distinguish "field not sent"
//! from "field explicitly set to null". A plain `Option<T>` collapses both
//! into `None`, which makes it impossible to clear a nullable column.
//! [`Patch`] keeps the two apart: a missing field deserializes to
//! [`Patch::Absent`] (via `#[serde(default)]`), an explicit `null` to
//! [`Patch::Null`], and anything else to [`Patch::Value`].

use serde::{Deserialize, Deserializer};

/// A field in a partial-update payload.
///
/// # Example
///
/// ```
/// use chapterhouse_core::Patch;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct BookPatch {
///     #[serde(default)]
///     isbn: Patch<String>,
/// }
///
/// let missing: BookPatch = serde_json::from_str("{}").unwrap();
/// assert!(missing.isbn.is_absent());
///
/// let cleared: BookPatch = serde_json::from_str(r#"{"isbn": null}"#).unwrap();
/// assert_eq!(cleared.isbn, Patch::Null);
///
/// let set: BookPatch = serde_json::from_str(r#"{"isbn": "978-3"}"#).unwrap();
/// assert_eq!(set.isbn, Patch::Value("978-3".to_owned()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patch<T> {
    /// The field was not present in the payload; keep the current value.
    Absent,
    /// The field was explicitly `null`; clear the current value.
    Null,
    /// The field was set to a new value.
    Value(T),
}

impl<T> Patch<T> {
    /// Returns `true` if the field was not present in the payload.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Returns `true` if the field was present (as `null` or a value).
    #[must_use]
    pub const fn is_present(&self) -> bool {
        !self.is_absent()
    }

    /// Resolve the patch against the current value.
    ///
    /// `Absent` keeps `current`, `Null` clears it, `Value(v)` replaces it.
    #[must_use]
    pub fn apply(self, current: Option<T>) -> Option<T> {
        match self {
            Self::Absent => current,
            Self::Null => None,
            Self::Value(v) => Some(v),
        }
    }

    /// Borrow the patch contents, if any.
    #[must_use]
    pub const fn as_ref(&self) -> Patch<&T> {
        match self {
            Self::Absent => Patch::Absent,
            Self::Null => Patch::Null,
            Self::Value(v) => Patch::Value(v),
        }
    }

    /// Map the contained value, preserving `Absent`/`Null`.
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Self::Absent => Patch::Absent,
            Self::Null => Patch::Null,
            Self::Value(v) => Patch::Value(f(v)),
        }
    }
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Self::Value)
    }
}

// Present fields deserialize through Option: null becomes Null, anything
// else becomes Value. Absent is only reachable through #[serde(default)].
impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Into::into)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[serde(default)]
        pages: Patch<i32>,
    }

    #[test]
    fn test_missing_field_is_absent() {
        let p: Payload = serde_json::from_str("{}").unwrap();
        assert_eq!(p.pages, Patch::Absent);
        assert!(p.pages.is_absent());
    }

    #[test]
    fn test_null_field() {
        let p: Payload = serde_json::from_str(r#"{"pages": null}"#).unwrap();
        assert_eq!(p.pages, Patch::Null);
        assert!(p.pages.is_present());
    }

    #[test]
    fn test_value_field() {
        let p: Payload = serde_json::from_str(r#"{"pages": 320}"#).unwrap();
        assert_eq!(p.pages, Patch::Value(320));
    }

    #[test]
    fn test_apply() {
        assert_eq!(Patch::Absent.apply(Some(1)), Some(1));
        assert_eq!(Patch::<i32>::Null.apply(Some(1)), None);
        assert_eq!(Patch::Value(2).apply(Some(1)), Some(2));
        assert_eq!(Patch::Value(2).apply(None), Some(2));
    }

    #[test]
    fn test_map() {
        assert_eq!(Patch::Value(2).map(|v| v * 10), Patch::Value(20));
        assert_eq!(Patch::<i32>::Null.map(|v| v * 10), Patch::Null);
        assert_eq!(Patch::<i32>::Absent.map(|v| v * 10), Patch::Absent);
    }
}
