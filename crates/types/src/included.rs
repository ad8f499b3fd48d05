use crate::{TypeCatalog, TypeKey, XmlName};

/// A subtype that may appear in place of a declared base type, recognized
/// by its `xsi:type` marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludedType {
    pub xsi_type: XmlName,
    pub type_key: TypeKey,
}

impl IncludedType {
    pub fn new(xsi_type: XmlName, type_key: impl Into<TypeKey>) -> Self {
        Self {
            xsi_type,
            type_key: type_key.into(),
        }
    }
}

/// The declared base type of a path plus the subtypes it admits.
///
/// A node without a marker is read as the default (base) type, and creating
/// the default type writes no marker.
#[derive(Debug, Clone)]
pub struct IncludedTypeSet {
    default: IncludedType,
    included: Vec<IncludedType>,
}

impl IncludedTypeSet {
    pub fn new(default_type: IncludedType) -> Self {
        Self {
            default: default_type,
            included: Vec::new(),
        }
    }

    /// A set whose only member is an unmarked base type.
    pub fn single(type_key: impl Into<TypeKey>) -> Self {
        Self::new(IncludedType::new(XmlName::empty(), type_key))
    }

    pub fn include(&mut self, included: IncludedType) {
        if included.type_key == self.default.type_key {
            return;
        }
        self.included.retain(|t| t.type_key != included.type_key);
        self.included.push(included);
    }

    pub fn with(mut self, included: IncludedType) -> Self {
        self.include(included);
        self
    }

    pub fn default_type(&self) -> &IncludedType {
        &self.default
    }

    pub fn iter(&self) -> impl Iterator<Item = &IncludedType> {
        std::iter::once(&self.default).chain(self.included.iter())
    }

    /// Resolves a node's marker. An empty marker denotes the default type.
    pub fn try_get_by_xsi(&self, xsi_type: &XmlName) -> Option<&IncludedType> {
        if xsi_type.is_empty() {
            return Some(&self.default);
        }
        self.iter().find(|t| {
            !t.xsi_type.is_empty()
                && t.xsi_type
                    .matches(xsi_type.local_name(), xsi_type.namespace_uri())
        })
    }

    pub fn try_get_by_key(&self, type_key: &TypeKey) -> Option<&IncludedType> {
        self.iter().find(|t| &t.type_key == type_key)
    }
}

impl TypeCatalog for IncludedTypeSet {
    fn resolve(&self, local_name: &str, namespace_uri: Option<&str>) -> Option<TypeKey> {
        self.try_get_by_xsi(&XmlName::new(local_name, namespace_uri))
            .map(|t| t.type_key.clone())
    }

    fn name_for(&self, type_key: &TypeKey) -> Option<XmlName> {
        self.try_get_by_key(type_key).map(|t| t.xsi_type.clone())
    }

    fn is_default(&self, type_key: &TypeKey) -> bool {
        &self.default.type_key == type_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shapes() -> IncludedTypeSet {
        IncludedTypeSet::new(IncludedType::new(XmlName::local("Shape"), "Shape"))
            .with(IncludedType::new(XmlName::local("Circle"), "Circle"))
            .with(IncludedType::new(
                XmlName::qualified("Square", "urn:shapes"),
                "Square",
            ))
    }

    #[test]
    fn test_missing_marker_is_default() {
        let set = shapes();
        assert_eq!(
            set.try_get_by_xsi(&XmlName::empty()).unwrap().type_key.as_str(),
            "Shape"
        );
    }

    #[test]
    fn test_marker_resolution() {
        let set = shapes();
        assert_eq!(set.resolve("Circle", Some("urn:any")), Some(TypeKey::new("Circle")));
        assert_eq!(set.resolve("Square", Some("urn:shapes")), Some(TypeKey::new("Square")));
        assert_eq!(set.resolve("Square", Some("urn:other")), None);
        assert_eq!(set.resolve("Triangle", None), None);
    }

    #[test]
    fn test_name_for_and_default() {
        let set = shapes();
        assert_eq!(
            set.name_for(&TypeKey::new("Circle")),
            Some(XmlName::local("Circle"))
        );
        assert!(set.is_default(&TypeKey::new("Shape")));
        assert!(!set.is_default(&TypeKey::new("Circle")));
        assert!(set.try_get_by_key(&TypeKey::new("Hexagon")).is_none());
    }
}
