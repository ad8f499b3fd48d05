//! The catalog contract shared by every type set.

use crate::{TypeKey, XmlName};

/// Maps serialized names to runtime types and back.
///
/// A `KnownTypeSet` resolves element or attribute names. An `IncludedTypeSet`
/// resolves the polymorphism marker (`xsi:type`) written on a node.
pub trait TypeCatalog {
    /// Resolves a serialized name to the runtime type it denotes.
    fn resolve(&self, local_name: &str, namespace_uri: Option<&str>) -> Option<TypeKey>;

    /// The serialized name written for a runtime type.
    fn name_for(&self, type_key: &TypeKey) -> Option<XmlName>;

    /// Returns true if `type_key` is the catalog's default type.
    fn is_default(&self, type_key: &TypeKey) -> bool;
}
