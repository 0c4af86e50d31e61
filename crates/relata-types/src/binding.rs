use serde::{Deserialize, Serialize};

/// One slot of a binding pattern: either a concrete value or "unspecified".
///
/// A pattern for a relation of arity N is a tuple of N bindings. Unlike a nullable
/// argument, `Unbound` is never confused with a real value, so a field whose type is
/// itself `Option<T>` can still be searched for `None` with `Bound(None)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Binding<T> {
    /// The field must equal this value.
    Bound(T),
    /// The field is unconstrained.
    #[default]
    Unbound,
}

impl<T> Binding<T> {
    /// Returns `true` if this slot carries a value.
    pub const fn is_bound(&self) -> bool {
        matches!(self, Self::Bound(_))
    }

    /// Borrow the bound value, if any.
    pub const fn as_bound(&self) -> Option<&T> {
        match self {
            Self::Bound(value) => Some(value),
            Self::Unbound => None,
        }
    }

    /// Convert into an `Option`, dropping the distinction from nullable values.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Bound(value) => Some(value),
            Self::Unbound => None,
        }
    }

    /// Map the bound value, keeping `Unbound` as is.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Binding<U> {
        match self {
            Self::Bound(value) => Binding::Bound(f(value)),
            Self::Unbound => Binding::Unbound,
        }
    }
}

impl<T> From<Option<T>> for Binding<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Unbound, Self::Bound)
    }
}

/// Shorthand for `Binding::Bound(value.into())`.
pub fn bound<T, V: Into<T>>(value: V) -> Binding<T> {
    Binding::Bound(value.into())
}

/// Shorthand for `Binding::Unbound`.
pub const fn unbound<T>() -> Binding<T> {
    Binding::Unbound
}
