use crate::{TypeCatalog, TypeKey, XmlName};

/// A runtime type together with the node name (and optional `xsi:type`
/// marker) it is serialized as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownType {
    pub name: XmlName,
    pub xsi_type: XmlName,
    pub type_key: TypeKey,
}

impl KnownType {
    pub fn new(name: XmlName, xsi_type: XmlName, type_key: impl Into<TypeKey>) -> Self {
        Self {
            name,
            xsi_type,
            type_key: type_key.into(),
        }
    }

    /// A type serialized under `local_name` with no namespace preference and no marker.
    pub fn named(local_name: &str, type_key: impl Into<TypeKey>) -> Self {
        Self::new(XmlName::local(local_name), XmlName::empty(), type_key)
    }

    pub fn with_xsi_type(mut self, xsi_type: XmlName) -> Self {
        self.xsi_type = xsi_type;
        self
    }

    /// Returns true if a node with this name and marker is an instance of the type.
    pub fn is_match(&self, name: &XmlName, xsi_type: &XmlName) -> bool {
        if !self.name.matches(name.local_name(), name.namespace_uri()) {
            return false;
        }
        if self.xsi_type.is_empty() {
            xsi_type.is_empty()
        } else {
            self.xsi_type
                .matches(xsi_type.local_name(), xsi_type.namespace_uri())
        }
    }
}

/// An ordered set of known types with exactly one default entry.
#[derive(Debug, Clone)]
pub struct KnownTypeSet {
    types: Vec<KnownType>,
    default_index: usize,
}

impl KnownTypeSet {
    pub fn new(default_type: KnownType) -> Self {
        Self {
            types: vec![default_type],
            default_index: 0,
        }
    }

    /// Adds a type. A type already registered under the same key is replaced.
    pub fn add(&mut self, known_type: KnownType) {
        match self
            .types
            .iter()
            .position(|t| t.type_key == known_type.type_key)
        {
            Some(index) => self.types[index] = known_type,
            None => self.types.push(known_type),
        }
    }

    pub fn with(mut self, known_type: KnownType) -> Self {
        self.add(known_type);
        self
    }

    pub fn default_type(&self) -> &KnownType {
        &self.types[self.default_index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &KnownType> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Finds the type a node with the given name and marker belongs to.
    pub fn try_get(&self, name: &XmlName, xsi_type: &XmlName) -> Option<&KnownType> {
        self.types.iter().find(|t| t.is_match(name, xsi_type))
    }

    /// Finds the entry registered for a runtime type.
    pub fn try_get_by_key(&self, type_key: &TypeKey) -> Option<&KnownType> {
        self.types.iter().find(|t| &t.type_key == type_key)
    }
}

impl TypeCatalog for KnownTypeSet {
    fn resolve(&self, local_name: &str, namespace_uri: Option<&str>) -> Option<TypeKey> {
        let name = XmlName::new(local_name, namespace_uri);
        self.try_get(&name, &XmlName::empty())
            .or_else(|| {
                self.types
                    .iter()
                    .find(|t| t.name.matches(local_name, namespace_uri))
            })
            .map(|t| t.type_key.clone())
    }

    fn name_for(&self, type_key: &TypeKey) -> Option<XmlName> {
        self.try_get_by_key(type_key).map(|t| t.name.clone())
    }

    fn is_default(&self, type_key: &TypeKey) -> bool {
        &self.default_type().type_key == type_key
    }
}
