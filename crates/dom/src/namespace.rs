//! Choosing prefixes for new names and declaring what is missing.

use crate::document::Document;
use crate::error::DomError;
use crate::NodeId;

impl Document {
    /// Names an attached element `local_name` in `ns`, reusing an in-scope
    /// binding when one exists and declaring one on the element otherwise.
    ///
    /// A `preferred_prefix` is used (and declared if needed) when given. An
    /// element in no namespace under an in-scope default namespace gets
    /// `xmlns=""`.
    pub fn bind_element_name(
        &mut self,
        element: NodeId,
        preferred_prefix: Option<&str>,
        local_name: &str,
        ns: Option<&str>,
    ) -> Result<(), DomError> {
        if !self.is_element(element) {
            return Err(DomError::NotAnElement(element));
        }
        let scope = self.parent(element).unwrap_or(element);
        let ns = ns.filter(|ns| !ns.is_empty());

        let Some(uri) = ns else {
            self.rename(element, None, local_name, None);
            if self.lookup_namespace(scope, None).is_some() {
                self.declare_namespace(element, None, "")?;
            }
            return Ok(());
        };

        let prefix = match preferred_prefix {
            Some(p) => {
                if self.lookup_namespace(scope, Some(p)) != Some(uri) {
                    self.declare_namespace(element, Some(p), uri)?;
                }
                Some(p.to_string())
            }
            None if self.lookup_namespace(scope, None) == Some(uri) => None,
            None => match self.lookup_prefix(scope, uri) {
                Some(p) => Some(p),
                None => {
                    self.declare_namespace(element, None, uri)?;
                    None
                }
            },
        };
        self.rename(element, prefix.as_deref(), local_name, Some(uri));
        Ok(())
    }

    /// The prefix an attribute in `ns` must carry on `element`, declaring
    /// one when nothing suitable is in scope. Attributes in no namespace
    /// are unprefixed.
    pub fn attribute_prefix(
        &mut self,
        element: NodeId,
        preferred_prefix: Option<&str>,
        ns: Option<&str>,
    ) -> Result<Option<String>, DomError> {
        let Some(uri) = ns.filter(|ns| !ns.is_empty()) else {
            return Ok(None);
        };
        if let Some(p) = preferred_prefix {
            if self.lookup_namespace(element, Some(p)) == Some(uri) {
                return Ok(Some(p.to_string()));
            }
        }
        if let Some(p) = self.lookup_prefix(element, uri) {
            return Ok(Some(p));
        }
        let prefix = match preferred_prefix {
            Some(p) if self.lookup_namespace(element, Some(p)).is_none() => p.to_string(),
            _ => self.unused_prefix(element),
        };
        self.declare_namespace(element, Some(&prefix), uri)?;
        Ok(Some(prefix))
    }

    fn unused_prefix(&self, element: NodeId) -> String {
        (1..)
            .map(|n| format!("ns{}", n))
            .find(|p| self.lookup_namespace(element, Some(p.as_str())).is_none())
            .unwrap_or_else(|| "ns".to_string())
    }
}
