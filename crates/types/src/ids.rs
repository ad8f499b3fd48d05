//! Newtype wrapper for runtime type identities.
//!
//! A `TypeKey` names the logical type a node is read as or created for. The
//! catalogs map it to and from serialized XML names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// An opaque identity for a runtime type (e.g., `Item`, `my_crate::Customer`)
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TypeKey(Arc<str>);

impl TypeKey {
    /// Creates a new TypeKey from a string
    pub fn new(key: impl Into<Arc<str>>) -> Self {
        Self(key.into())
    }

    /// Derives a TypeKey from a Rust type's name
    pub fn of<T: ?Sized>() -> Self {
        Self(std::any::type_name::<T>().into())
    }

    /// Returns the string representation of this type key
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TypeKey {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for TypeKey {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl From<Arc<str>> for TypeKey {
    fn from(s: Arc<str>) -> Self {
        Self(s)
    }
}

impl From<TypeKey> for String {
    fn from(key: TypeKey) -> Self {
        key.0.to_string()
    }
}

impl AsRef<str> for TypeKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Customer;

    #[test]
    fn test_type_key_creation() {
        let k1 = TypeKey::new("Item");
        let k2 = TypeKey::from("Item");
        let k3 = TypeKey::from(String::from("Item"));

        assert_eq!(k1, k2);
        assert_eq!(k2, k3);
        assert_eq!(k1.as_str(), "Item");
    }

    #[test]
    fn test_type_key_of_rust_type() {
        let key = TypeKey::of::<Customer>();
        assert!(key.as_str().ends_with("Customer"));
        assert_eq!(key, TypeKey::of::<Customer>());
        assert_ne!(key, TypeKey::of::<String>());
    }

    #[test]
    fn test_type_key_serde_as_plain_string() {
        let key: TypeKey = serde_json::from_str("\"Order\"").unwrap();
        assert_eq!(key.as_str(), "Order");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"Order\"");
    }
}
