use crate::comparer::{Comparer, DefaultComparer};
use std::borrow::Cow;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Descriptor for one position of a relation: an optional name plus the comparer that
/// defines equality for values in that position.
pub struct Field<T> {
    name: Option<Cow<'static, str>>,
    comparer: Arc<dyn Comparer<T>>,
}

impl<T: Eq + Hash + 'static> Field<T> {
    /// Unnamed field using the type's natural equality.
    pub fn new() -> Self {
        Self { name: None, comparer: Arc::new(DefaultComparer::new()) }
    }

    /// Named field using the type's natural equality.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self::new().with_name(name)
    }
}

impl<T: Eq + Hash + 'static> Default for Field<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Field<T> {
    /// Field with a caller-supplied comparer.
    pub fn with_comparer<C: Comparer<T> + 'static>(comparer: C) -> Self {
        Self { name: None, comparer: Arc::new(comparer) }
    }

    /// Attach a display name, used in log events and statistics.
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The display name, if one was given.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The comparer backing this field.
    pub fn comparer(&self) -> &dyn Comparer<T> {
        self.comparer.as_ref()
    }

    /// Compare two values of this field.
    pub fn equals(&self, left: &T, right: &T) -> bool {
        self.comparer.equals(left, right)
    }

    /// Hash a value of this field.
    pub fn hash(&self, value: &T) -> u64 {
        self.comparer.hash(value)
    }

    /// Whether `value` is this field's absent sentinel.
    pub fn is_absent(&self, value: &T) -> bool {
        self.comparer.is_absent(value)
    }
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        Self { name: self.name.clone(), comparer: Arc::clone(&self.comparer) }
    }
}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field").field("name", &self.name).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparer::OptionComparer;

    #[test]
    fn test_named_field() {
        let field: Field<String> = Field::named("person");
        assert_eq!(field.name(), Some("person"));
        assert!(field.equals(&"a".to_string(), &"a".to_string()));
        assert_eq!(field.hash(&"a".to_string()), field.clone().hash(&"a".to_string()));
    }

    #[test]
    fn test_nullable_field() {
        let field: Field<Option<i64>> = Field::with_comparer(OptionComparer::new(DefaultComparer::new()));
        assert!(field.is_absent(&None));
        assert!(!field.is_absent(&Some(7)));
        assert_eq!(field.name(), None);
    }
}
