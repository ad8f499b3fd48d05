//! `xsi:type` and `xsi:nil` markers.

use crate::NodeId;
use crate::document::Document;
use crate::error::DomError;
use xmlview_types::XmlName;
use xmlview_xpath1::split_qualified;

pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const XSI_PREFIX: &str = "xsi";

impl Document {
    /// The resolved `xsi:type` of an element, or the empty name.
    pub fn xsi_type(&self, element: NodeId) -> XmlName {
        let Some(raw) = self.attribute_value(element, "type", Some(XSI_NAMESPACE)) else {
            return XmlName::empty();
        };
        let (prefix, local) = split_qualified(raw.trim());
        match self.lookup_namespace(element, prefix) {
            Some(ns) => XmlName::qualified(local, ns),
            None if prefix.is_none() => XmlName::new(local, Some("")),
            None => XmlName::local(local),
        }
    }

    /// Writes (or with an empty name, removes) the `xsi:type` marker.
    pub fn set_xsi_type(&mut self, element: NodeId, xsi_type: &XmlName) -> Result<(), DomError> {
        if !self.is_element(element) {
            return Err(DomError::NotAnElement(element));
        }
        if xsi_type.is_empty() {
            self.remove_attribute(element, "type", Some(XSI_NAMESPACE));
            return Ok(());
        }
        let value = match xsi_type.effective_namespace() {
            None => xsi_type.local_name().to_string(),
            Some(ns) if self.lookup_namespace(element, None) == Some(ns) => {
                xsi_type.local_name().to_string()
            }
            Some(ns) => {
                let prefix = self.attribute_prefix(element, None, Some(ns))?;
                match prefix {
                    Some(p) => format!("{}:{}", p, xsi_type.local_name()),
                    None => xsi_type.local_name().to_string(),
                }
            }
        };
        self.set_xsi_attribute(element, "type", &value)
    }

    pub fn is_nil(&self, element: NodeId) -> bool {
        matches!(
            self.attribute_value(element, "nil", Some(XSI_NAMESPACE)).map(str::trim),
            Some("true" | "1")
        )
    }

    /// `true` drops the element's content and marks it nil; `false` removes
    /// the marker.
    pub fn set_nil(&mut self, element: NodeId, nil: bool) -> Result<(), DomError> {
        if !self.is_element(element) {
            return Err(DomError::NotAnElement(element));
        }
        if nil {
            self.remove_children(element);
            self.set_xsi_attribute(element, "nil", "true")
        } else {
            self.remove_attribute(element, "nil", Some(XSI_NAMESPACE));
            Ok(())
        }
    }

    fn set_xsi_attribute(&mut self, element: NodeId, local_name: &str, value: &str) -> Result<(), DomError> {
        let prefix = self.attribute_prefix(element, Some(XSI_PREFIX), Some(XSI_NAMESPACE))?;
        self.set_attribute(element, prefix.as_deref(), local_name, Some(XSI_NAMESPACE), value)?;
        Ok(())
    }
}
