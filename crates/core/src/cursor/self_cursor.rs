//! A cursor whose only position is the node it was created on.

use super::{XmlCursor, require_mutable};
use crate::error::CursorError;
use crate::flags::CursorFlags;
use crate::node::{RealNode, XmlNode};
use xmlview_dom::{Document, NodeId};
use xmlview_types::{IncludedTypeSet, TypeKey, XmlName};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    BeforeFirst,
    On,
    AfterLast,
}

pub struct SelfCursor<'p> {
    node: &'p mut (dyn XmlNode + 'p),
    included: &'p IncludedTypeSet,
    flags: CursorFlags,
    state: State,
}

impl<'p> SelfCursor<'p> {
    pub fn new(node: &'p mut (dyn XmlNode + 'p), included: &'p IncludedTypeSet, flags: CursorFlags) -> Self {
        Self {
            node,
            included,
            flags,
            state: State::BeforeFirst,
        }
    }
}

impl XmlCursor for SelfCursor<'_> {
    fn move_next(&mut self, _doc: &Document) -> Result<bool, CursorError> {
        self.state = match self.state {
            State::BeforeFirst => State::On,
            State::On | State::AfterLast => State::AfterLast,
        };
        Ok(self.state == State::On)
    }

    fn reset(&mut self) {
        self.state = State::BeforeFirst;
    }

    fn move_to_end(&mut self) {
        self.state = State::AfterLast;
    }

    fn create(&mut self, _doc: &mut Document, _type_key: &TypeKey) -> Result<(), CursorError> {
        Err(CursorError::Unsupported("a self cursor cannot create nodes".into()))
    }

    fn coerce(&mut self, doc: &mut Document, type_key: &TypeKey) -> Result<(), CursorError> {
        require_mutable(self.flags)?;
        let included = self
            .included
            .try_get_by_key(type_key)
            .ok_or_else(|| CursorError::Serialization(format!("'{}' is not included here", type_key)))?;
        self.node.set_xsi_type(doc, &included.xsi_type)
    }

    fn remove(&mut self, _doc: &mut Document) -> Result<(), CursorError> {
        Err(CursorError::Unsupported("a self cursor cannot remove its node".into()))
    }

    fn move_to(&mut self, _doc: &Document, token: &RealNode) -> Result<(), CursorError> {
        if self.node.node_id() != Some(token.id()) {
            return Err(CursorError::invalid("bookmark does not refer to this node"));
        }
        self.state = State::On;
        Ok(())
    }

    fn as_node_mut(&mut self) -> &mut dyn XmlNode {
        self
    }
}

impl XmlNode for SelfCursor<'_> {
    fn name(&self, doc: &Document) -> XmlName {
        self.node.name(doc)
    }

    fn xsi_type(&self, doc: &Document) -> XmlName {
        self.node.xsi_type(doc)
    }

    fn set_xsi_type(&mut self, doc: &mut Document, xsi_type: &XmlName) -> Result<(), CursorError> {
        self.node.set_xsi_type(doc, xsi_type)
    }

    fn is_element(&self, doc: &Document) -> bool {
        self.node.is_element(doc)
    }

    fn is_attribute(&self, doc: &Document) -> bool {
        self.node.is_attribute(doc)
    }

    fn is_nil(&self, doc: &Document) -> bool {
        self.node.is_nil(doc)
    }

    fn set_nil(&mut self, doc: &mut Document, nil: bool) -> Result<(), CursorError> {
        self.node.set_nil(doc, nil)
    }

    fn value(&self, doc: &Document) -> String {
        self.node.value(doc)
    }

    fn set_value(&mut self, doc: &mut Document, value: &str) -> Result<(), CursorError> {
        self.node.set_value(doc, value)
    }

    fn type_key(&self) -> Option<TypeKey> {
        self.node.type_key()
    }

    fn as_real(&self) -> Option<RealNode> {
        self.node.as_real()
    }

    fn realize(&mut self, doc: &mut Document) -> Result<NodeId, CursorError> {
        self.node.realize(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xmlview_dom::XSI_NAMESPACE;
    use xmlview_types::IncludedType;

    #[test]
    fn yields_its_node_once() {
        let doc = Document::parse("<X>v</X>").unwrap();
        let included = IncludedTypeSet::single("X");
        let mut x = RealNode::new(&doc, doc.document_element().unwrap(), "X");
        let mut cursor = x.select_self(&included, CursorFlags::ELEMENTS);
        assert!(cursor.move_next(&doc).unwrap());
        assert_eq!(cursor.value(&doc), "v");
        assert!(!cursor.move_next(&doc).unwrap());
        cursor.reset();
        assert!(cursor.move_next(&doc).unwrap());
    }

    #[test]
    fn coerce_marks_the_node() {
        let mut doc = Document::parse("<X/>").unwrap();
        let included = IncludedTypeSet::single("Shape").with(IncludedType::new(XmlName::local("Circle"), "Circle"));
        let mut x = RealNode::new(&doc, doc.document_element().unwrap(), "Shape");
        let mut cursor = x.select_self(&included, CursorFlags::ELEMENTS | CursorFlags::MUTABLE);
        cursor.move_next(&doc).unwrap();
        cursor.coerce(&mut doc, &TypeKey::new("Circle")).unwrap();
        assert_eq!(
            doc.to_xml().unwrap(),
            format!(r#"<X xmlns:xsi="{XSI_NAMESPACE}" xsi:type="Circle"/>"#)
        );
        assert!(matches!(cursor.create(&mut doc, &TypeKey::new("Circle")), Err(CursorError::Unsupported(_))));
        assert!(matches!(cursor.remove(&mut doc), Err(CursorError::Unsupported(_))));
    }

    #[test]
    fn move_to_checks_the_node() {
        let doc = Document::parse("<X><A/></X>").unwrap();
        let included = IncludedTypeSet::single("X");
        let element = doc.document_element().unwrap();
        let other = RealNode::new(&doc, doc.element_children(element).next().unwrap(), "A");
        let mut x = RealNode::new(&doc, element, "X");
        let token = x.clone();
        let mut cursor = x.select_self(&included, CursorFlags::ELEMENTS);
        assert!(matches!(cursor.move_to(&doc, &other), Err(CursorError::InvalidOperation(_))));
        cursor.move_to(&doc, &token).unwrap();
        assert_eq!(cursor.name(&doc), XmlName::new("X", Some("")));
    }
}
