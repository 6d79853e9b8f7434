//! Explicit optional-field value for partial updates.

use serde::{Deserialize, Deserializer};

/// One updatable field of a partial update.
///
/// `Unchanged` means the caller did not mention the field. `Set` carries the
/// new value. For nullable columns use `Patch<Option<T>>`, so
/// `Set(None)` clears the column while `Unchanged` leaves it alone.
///
/// Deserializes from JSON with a missing field as `Unchanged` when the
/// containing struct marks the field `#[serde(default)]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Unchanged,
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Unchanged
    }
}

impl<T> Patch<T> {
    pub fn is_set(&self) -> bool {
        matches!(self, Patch::Set(_))
    }

    /// Returns the new value if present.
    pub fn as_set(&self) -> Option<&T> {
        match self {
            Patch::Set(value) => Some(value),
            Patch::Unchanged => None,
        }
    }

    /// Returns the patched value or `current` when unchanged.
    pub fn resolve(self, current: T) -> T {
        match self {
            Patch::Set(value) => value,
            Patch::Unchanged => current,
        }
    }

    /// Like [`resolve`](Self::resolve) but borrows and clones.
    pub fn resolve_ref(&self, current: &T) -> T
    where
        T: Clone,
    {
        match self {
            Patch::Set(value) => value.clone(),
            Patch::Unchanged => current.clone(),
        }
    }

    /// True when set to a value different from `current`.
    pub fn changes(&self, current: &T) -> bool
    where
        T: PartialEq,
    {
        matches!(self, Patch::Set(value) if value != current)
    }
}

impl<T> From<T> for Patch<T> {
    fn from(value: T) -> Self {
        Patch::Set(value)
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
        T::deserialize(deserializer).map(Patch::Set)
    }
}
