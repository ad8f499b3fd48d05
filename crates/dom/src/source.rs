//! Lets the XPath evaluator walk the arena.

use crate::NodeId;
use crate::document::{Document, NodeKind};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use xmlview_xpath1::{DataSourceNode, NodeType, QName};

#[derive(Debug, Clone, Copy)]
pub struct DomNode<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> DomNode<'a> {
    pub fn new(doc: &'a Document, id: NodeId) -> Self {
        Self { doc, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }
}

impl PartialEq for DomNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DomNode<'_> {}

impl Hash for DomNode<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for DomNode<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DomNode<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.doc.compare_order(self.id, other.id)
    }
}

impl<'a> DataSourceNode<'a> for DomNode<'a> {
    fn node_type(&self) -> NodeType {
        match self.doc.kind(self.id) {
            NodeKind::Root => NodeType::Root,
            NodeKind::Element => NodeType::Element,
            NodeKind::Attribute => NodeType::Attribute,
            NodeKind::Text => NodeType::Text,
            NodeKind::Comment => NodeType::Comment,
        }
    }

    fn name(&self) -> Option<QName<'a>> {
        match self.doc.kind(self.id) {
            NodeKind::Element | NodeKind::Attribute => Some(QName {
                prefix: self.doc.prefix(self.id),
                local_part: self.doc.local_name(self.id),
            }),
            _ => None,
        }
    }

    fn namespace_uri(&self) -> Option<&'a str> {
        self.doc.namespace_uri(self.id)
    }

    fn string_value(&self) -> String {
        self.doc.string_value(self.id)
    }

    fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        let doc = self.doc;
        Box::new(doc.attributes(self.id).iter().map(move |&id| DomNode { doc, id }))
    }

    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        let doc = self.doc;
        Box::new(doc.children(self.id).iter().map(move |&id| DomNode { doc, id }))
    }

    fn parent(&self) -> Option<Self> {
        let doc = self.doc;
        doc.parent(self.id).map(|id| DomNode { doc, id })
    }
}
