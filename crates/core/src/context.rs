//! Namespace bindings and variables visible to paths.

use crate::error::CursorError;
use xmlview_xpath1::{StaticContext, ValueExpr, XML_NAMESPACE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceBinding {
    pub prefix: String,
    pub uri: String,
    /// Declared on the document element when a view creates it.
    pub is_root: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Variable {
    namespace_uri: Option<String>,
    local_name: String,
    value: String,
}

/// Resolves the prefixes and `$variables` a path refers to, for reading and
/// for creating nodes alike.
#[derive(Debug, Clone, Default)]
pub struct XmlContext {
    namespaces: Vec<NamespaceBinding>,
    variables: Vec<Variable>,
}

impl XmlContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `prefix`, replacing an earlier binding of the same prefix.
    pub fn add_namespace(&mut self, prefix: &str, uri: &str, is_root: bool) {
        self.namespaces.retain(|b| b.prefix != prefix);
        self.namespaces.push(NamespaceBinding {
            prefix: prefix.to_string(),
            uri: uri.to_string(),
            is_root,
        });
    }

    pub fn with_namespace(mut self, prefix: &str, uri: &str) -> Self {
        self.add_namespace(prefix, uri, false);
        self
    }

    pub fn namespace_uri(&self, prefix: &str) -> Option<&str> {
        if prefix == "xml" {
            return Some(XML_NAMESPACE);
        }
        self.namespaces
            .iter()
            .find(|b| b.prefix == prefix)
            .map(|b| b.uri.as_str())
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &NamespaceBinding> {
        self.namespaces.iter()
    }

    pub fn root_namespaces(&self) -> impl Iterator<Item = &NamespaceBinding> {
        self.namespaces.iter().filter(|b| b.is_root)
    }

    /// Defines `$prefix:local_name`. The prefix must already be bound.
    pub fn add_variable(
        &mut self,
        prefix: Option<&str>,
        local_name: &str,
        value: &str,
    ) -> Result<(), CursorError> {
        let namespace_uri = self.resolve_prefix(prefix)?.map(str::to_string);
        self.variables
            .retain(|v| !(v.namespace_uri == namespace_uri && v.local_name == local_name));
        self.variables.push(Variable {
            namespace_uri,
            local_name: local_name.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    pub fn with_variable(mut self, prefix: Option<&str>, local_name: &str, value: &str) -> Result<Self, CursorError> {
        self.add_variable(prefix, local_name, value)?;
        Ok(self)
    }

    /// The namespace a prefixed name refers to; `None` for an unprefixed name.
    pub fn resolve_prefix(&self, prefix: Option<&str>) -> Result<Option<&str>, CursorError> {
        match prefix {
            None => Ok(None),
            Some(p) => self
                .namespace_uri(p)
                .map(Some)
                .ok_or_else(|| CursorError::UnknownPrefix(p.to_string())),
        }
    }

    /// The text a comparison value stands for.
    pub fn resolve_value(&self, value: &ValueExpr) -> Result<String, CursorError> {
        match value {
            ValueExpr::Literal(text) => Ok(text.clone()),
            ValueExpr::Variable { prefix, local_name } => self
                .lookup_variable(prefix.as_deref(), local_name)
                .ok_or_else(|| CursorError::UnknownVariable(value.to_string())),
        }
    }
}

impl StaticContext for XmlContext {
    fn lookup_namespace(&self, prefix: &str) -> Option<&str> {
        self.namespace_uri(prefix)
    }

    fn lookup_variable(&self, prefix: Option<&str>, local_name: &str) -> Option<String> {
        let namespace_uri = match prefix {
            Some(p) => Some(self.namespace_uri(p)?),
            None => None,
        };
        self.variables
            .iter()
            .find(|v| v.namespace_uri.as_deref() == namespace_uri && v.local_name == local_name)
            .map(|v| v.value.clone())
    }
}
