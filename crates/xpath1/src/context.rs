//! Static context supplied by the caller: namespace bindings and variables.

pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Resolves the prefixes and variables an expression refers to.
pub trait StaticContext {
    /// The namespace URI bound to `prefix`. The `xml` prefix is always bound.
    fn lookup_namespace(&self, prefix: &str) -> Option<&str>;

    /// The string value of the variable `$prefix:local_name`.
    fn lookup_variable(&self, prefix: Option<&str>, local_name: &str) -> Option<String>;
}

/// A context with no bindings besides the predeclared `xml` prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyContext;

impl StaticContext for EmptyContext {
    fn lookup_namespace(&self, prefix: &str) -> Option<&str> {
        (prefix == "xml").then_some(XML_NAMESPACE)
    }

    fn lookup_variable(&self, _prefix: Option<&str>, _local_name: &str) -> Option<String> {
        None
    }
}

/// Splits a name as written (`p:v` or `v`) into prefix and local part.
pub fn split_qualified(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}
