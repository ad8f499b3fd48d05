use serde::{Deserialize, Serialize};
use std::fmt;

/// An expanded XML name: a local name plus an optional namespace URI.
///
/// A namespace of `None` means "unspecified". When such a name is used to
/// create a node, the node inherits its parent's namespace, and when it is
/// used for matching, any namespace is accepted. `Some("")` is the explicit
/// empty namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XmlName {
    local_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    namespace_uri: Option<String>,
}

impl XmlName {
    pub fn new(local_name: impl Into<String>, namespace_uri: Option<&str>) -> Self {
        Self {
            local_name: local_name.into(),
            namespace_uri: namespace_uri.map(str::to_string),
        }
    }

    /// A name with an unspecified namespace.
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            namespace_uri: None,
        }
    }

    /// A name bound to an explicit namespace.
    pub fn qualified(local_name: impl Into<String>, namespace_uri: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            namespace_uri: Some(namespace_uri.into()),
        }
    }

    /// The null name, used where no name (or no type marker) applies.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.local_name.is_empty()
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn namespace_uri(&self) -> Option<&str> {
        self.namespace_uri.as_deref()
    }

    /// The namespace as stored in a document, where "none" and "empty" coincide.
    pub fn effective_namespace(&self) -> Option<&str> {
        self.namespace_uri.as_deref().filter(|ns| !ns.is_empty())
    }

    pub fn with_namespace(&self, namespace_uri: Option<&str>) -> Self {
        Self::new(self.local_name.clone(), namespace_uri)
    }

    /// Resolves an unspecified namespace against the namespace of the node
    /// that will own a newly created node of this name.
    pub fn with_inherited_namespace(&self, parent_namespace: Option<&str>) -> Self {
        match self.namespace_uri {
            Some(_) => self.clone(),
            None => self.with_namespace(parent_namespace),
        }
    }

    /// Returns true if a node named `local_name` in `namespace_uri` satisfies this name.
    pub fn matches(&self, local_name: &str, namespace_uri: Option<&str>) -> bool {
        if self.local_name != local_name {
            return false;
        }
        match &self.namespace_uri {
            None => true,
            Some(ns) => ns.as_str() == namespace_uri.unwrap_or(""),
        }
    }

    /// Returns true if both names denote the same expanded name.
    pub fn same_as(&self, other: &XmlName) -> bool {
        self.local_name == other.local_name
            && self.effective_namespace() == other.effective_namespace()
    }
}

impl fmt::Display for XmlName {
    /// Formats the name in Clark notation (`{uri}local`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.effective_namespace() {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unspecified_namespace_matches_any() {
        let name = XmlName::local("Item");
        assert!(name.matches("Item", None));
        assert!(name.matches("Item", Some("urn:a")));
        assert!(!name.matches("Other", None));
    }

    #[test]
    fn test_qualified_namespace_matches_exactly() {
        let name = XmlName::qualified("Item", "urn:a");
        assert!(name.matches("Item", Some("urn:a")));
        assert!(!name.matches("Item", Some("urn:b")));
        assert!(!name.matches("Item", None));

        let no_ns = XmlName::qualified("Item", "");
        assert!(no_ns.matches("Item", None));
    }

    #[test]
    fn test_inherited_namespace() {
        let name = XmlName::local("Item");
        assert_eq!(
            name.with_inherited_namespace(Some("urn:parent")),
            XmlName::qualified("Item", "urn:parent")
        );

        let explicit = XmlName::qualified("Item", "urn:own");
        assert_eq!(explicit.with_inherited_namespace(Some("urn:parent")), explicit);
    }

    #[test]
    fn test_display_uses_clark_notation() {
        assert_eq!(XmlName::qualified("A", "urn:x").to_string(), "{urn:x}A");
        assert_eq!(XmlName::local("A").to_string(), "A");
        assert!(XmlName::empty().is_empty());
    }
}
