//! The arena. Every node ever created keeps its slot, so a `NodeId` stays
//! valid for the life of the document; removing a node only detaches it.

use crate::error::DomError;
use std::cmp::Ordering;
use std::sync::atomic::{self, AtomicU64};
use xmlview_types::XmlName;
use xmlview_xpath1::XML_NAMESPACE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Identifies one document instance. Clones get a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(u64);

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

impl DocumentId {
    fn next() -> Self {
        Self(NEXT_DOCUMENT_ID.fetch_add(1, atomic::Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Element,
    Attribute,
    Text,
    Comment,
}

/// An `xmlns` or `xmlns:prefix` declaration carried by an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    pub prefix: Option<String>,
    pub uri: String,
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) prefix: Option<String>,
    pub(crate) local_name: String,
    pub(crate) namespace_uri: Option<String>,
    pub(crate) value: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) attributes: Vec<NodeId>,
    pub(crate) namespaces: Vec<NamespaceDecl>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            prefix: None,
            local_name: String::new(),
            namespace_uri: None,
            value: String::new(),
            parent: None,
            children: Vec::new(),
            attributes: Vec::new(),
            namespaces: Vec::new(),
        }
    }

    fn named(kind: NodeKind, prefix: Option<&str>, local_name: &str, ns: Option<&str>) -> Self {
        Self {
            prefix: prefix.map(str::to_string),
            local_name: local_name.to_string(),
            namespace_uri: ns.filter(|ns| !ns.is_empty()).map(str::to_string),
            ..Self::new(kind)
        }
    }
}

#[derive(Debug)]
pub struct Document {
    id: DocumentId,
    pub(crate) nodes: Vec<NodeData>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Document {
    fn clone(&self) -> Self {
        Self {
            id: DocumentId::next(),
            nodes: self.nodes.clone(),
        }
    }
}

impl Document {
    /// An empty document: a root with no children.
    pub fn new() -> Self {
        Self {
            id: DocumentId::next(),
            nodes: vec![NodeData::new(NodeKind::Root)],
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn document_element(&self) -> Option<NodeId> {
        self.element_children(self.root()).next()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub(crate) fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    pub(crate) fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.data(id).kind
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.kind(id) == NodeKind::Element
    }

    pub fn is_attribute(&self, id: NodeId) -> bool {
        self.kind(id) == NodeKind::Attribute
    }

    pub fn prefix(&self, id: NodeId) -> Option<&str> {
        self.data(id).prefix.as_deref()
    }

    pub fn local_name(&self, id: NodeId) -> &str {
        &self.data(id).local_name
    }

    pub fn namespace_uri(&self, id: NodeId) -> Option<&str> {
        self.data(id).namespace_uri.as_deref()
    }

    /// The expanded name. A node in no namespace gets the explicit empty
    /// namespace.
    pub fn name(&self, id: NodeId) -> XmlName {
        let data = self.data(id);
        XmlName::new(data.local_name.as_str(), Some(data.namespace_uri.as_deref().unwrap_or("")))
    }

    /// The name as written: `prefix:local` or `local`.
    pub fn qualified_name(&self, id: NodeId) -> String {
        let data = self.data(id);
        match &data.prefix {
            Some(prefix) => format!("{}:{}", prefix, data.local_name),
            None => data.local_name.clone(),
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.data(id).children
    }

    pub fn attributes(&self, id: NodeId) -> &[NodeId] {
        &self.data(id).attributes
    }

    pub fn namespaces(&self, id: NodeId) -> &[NamespaceDecl] {
        &self.data(id).namespaces
    }

    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.is_element(child))
    }

    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), |&n| self.parent(n))
    }

    /// True when the node is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root() || self.ancestors(id).any(|a| a == self.root())
    }

    /// The stored value of an attribute, text or comment node.
    pub fn value(&self, id: NodeId) -> &str {
        &self.data(id).value
    }

    /// The XPath string value: descendant text for roots and elements.
    pub fn string_value(&self, id: NodeId) -> String {
        match self.kind(id) {
            NodeKind::Root | NodeKind::Element => {
                let mut out = String::new();
                self.collect_text(id, &mut out);
                out
            }
            _ => self.value(id).to_string(),
        }
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        for &child in self.children(id) {
            match self.kind(child) {
                NodeKind::Text => out.push_str(self.value(child)),
                NodeKind::Element => self.collect_text(child, out),
                _ => {}
            }
        }
    }

    /// An element without children or attributes.
    pub fn is_empty_element(&self, id: NodeId) -> bool {
        let data = self.data(id);
        data.kind == NodeKind::Element && data.children.is_empty() && data.attributes.is_empty()
    }

    pub fn attribute(&self, element: NodeId, local_name: &str, ns: Option<&str>) -> Option<NodeId> {
        let ns = ns.filter(|ns| !ns.is_empty());
        self.attributes(element).iter().copied().find(|&a| {
            let data = self.data(a);
            data.local_name == local_name && data.namespace_uri.as_deref() == ns
        })
    }

    pub fn attribute_value(&self, element: NodeId, local_name: &str, ns: Option<&str>) -> Option<&str> {
        self.attribute(element, local_name, ns).map(|a| self.value(a))
    }

    /// Index of `id` among its parent's children (or attributes).
    pub fn position(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        let siblings = if self.is_attribute(id) {
            self.attributes(parent)
        } else {
            self.children(parent)
        };
        siblings.iter().position(|&s| s == id)
    }

    /// Sort key giving document order: a parent precedes its attributes,
    /// which precede its children.
    fn order_key(&self, id: NodeId) -> Vec<(u8, usize)> {
        let mut key = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            let slot = if self.is_attribute(current) { 0 } else { 1 };
            key.push((slot, self.position(current).unwrap_or(0)));
            current = parent;
        }
        key.reverse();
        key
    }

    pub fn compare_order(&self, a: NodeId, b: NodeId) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        self.order_key(a).cmp(&self.order_key(b))
    }

    // --- Construction ---

    fn push(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(data);
        NodeId(self.nodes.len() - 1)
    }

    /// Creates a detached element. The caller is responsible for making
    /// `prefix` resolve to `ns` once attached; see `bind_element_name`.
    pub fn create_element(&mut self, prefix: Option<&str>, local_name: &str, ns: Option<&str>) -> NodeId {
        self.push(NodeData::named(NodeKind::Element, prefix, local_name, ns))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        let mut data = NodeData::new(NodeKind::Text);
        data.value = text.to_string();
        self.push(data)
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        let mut data = NodeData::new(NodeKind::Comment);
        data.value = text.to_string();
        self.push(data)
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if !self.contains(parent) || !self.contains(child) {
            return Err(DomError::InvalidNode(child));
        }
        if !matches!(self.kind(parent), NodeKind::Root | NodeKind::Element) {
            return Err(DomError::NotAnElement(parent));
        }
        if matches!(self.kind(child), NodeKind::Root | NodeKind::Attribute)
            || child == parent
            || self.ancestors(parent).any(|a| a == child)
        {
            return Err(DomError::InvalidNode(child));
        }
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        self.detach(child);
        self.data_mut(child).parent = Some(parent);
        self.data_mut(parent).children.push(child);
        Ok(())
    }

    /// Inserts `child` before `reference`, which must be a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        if self.parent(reference) != Some(parent) || self.is_attribute(reference) {
            return Err(DomError::InvalidNode(reference));
        }
        self.detach(child);
        let index = self
            .children(parent)
            .iter()
            .position(|&c| c == reference)
            .ok_or(DomError::InvalidNode(reference))?;
        self.data_mut(child).parent = Some(parent);
        self.data_mut(parent).children.insert(index, child);
        Ok(())
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.data_mut(id).parent.take() {
            let data = self.data_mut(parent);
            data.children.retain(|&c| c != id);
            data.attributes.retain(|&a| a != id);
        }
    }

    /// Detaches a node (and its subtree) from the tree. Its id stays valid.
    pub fn remove(&mut self, id: NodeId) -> Result<(), DomError> {
        if id == self.root() || !self.contains(id) {
            return Err(DomError::InvalidNode(id));
        }
        self.detach(id);
        Ok(())
    }

    /// Sets an attribute, replacing one with the same expanded name.
    pub fn set_attribute(
        &mut self,
        element: NodeId,
        prefix: Option<&str>,
        local_name: &str,
        ns: Option<&str>,
        value: &str,
    ) -> Result<NodeId, DomError> {
        if !self.is_element(element) {
            return Err(DomError::NotAnElement(element));
        }
        if let Some(existing) = self.attribute(element, local_name, ns) {
            let data = self.data_mut(existing);
            data.value = value.to_string();
            data.prefix = prefix.map(str::to_string);
            return Ok(existing);
        }
        let mut data = NodeData::named(NodeKind::Attribute, prefix, local_name, ns);
        data.value = value.to_string();
        data.parent = Some(element);
        let id = self.push(data);
        self.data_mut(element).attributes.push(id);
        Ok(id)
    }

    pub fn remove_attribute(&mut self, element: NodeId, local_name: &str, ns: Option<&str>) -> bool {
        match self.attribute(element, local_name, ns) {
            Some(attribute) => {
                self.detach(attribute);
                true
            }
            None => false,
        }
    }

    pub fn remove_children(&mut self, element: NodeId) {
        for child in std::mem::take(&mut self.data_mut(element).children) {
            self.data_mut(child).parent = None;
        }
    }

    /// Replaces the content of a node with `text`: the children of an
    /// element, or the value of an attribute, text or comment node.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        match self.kind(id) {
            NodeKind::Element => {
                self.remove_children(id);
                if !text.is_empty() {
                    let node = self.create_text(text);
                    self.append_child(id, node)?;
                }
                Ok(())
            }
            NodeKind::Root => Err(DomError::InvalidNode(id)),
            _ => {
                self.data_mut(id).value = text.to_string();
                Ok(())
            }
        }
    }

    /// Renames an element or attribute in place.
    pub fn rename(&mut self, id: NodeId, prefix: Option<&str>, local_name: &str, ns: Option<&str>) {
        let data = self.data_mut(id);
        data.prefix = prefix.map(str::to_string);
        data.local_name = local_name.to_string();
        data.namespace_uri = ns.filter(|ns| !ns.is_empty()).map(str::to_string);
    }

    // --- Namespace scope ---

    /// Adds (or replaces) a namespace declaration on an element.
    pub fn declare_namespace(&mut self, element: NodeId, prefix: Option<&str>, uri: &str) -> Result<(), DomError> {
        if !self.is_element(element) {
            return Err(DomError::NotAnElement(element));
        }
        let decls = &mut self.data_mut(element).namespaces;
        decls.retain(|d| d.prefix.as_deref() != prefix);
        decls.push(NamespaceDecl {
            prefix: prefix.map(str::to_string),
            uri: uri.to_string(),
        });
        Ok(())
    }

    /// Resolves `prefix` (`None` for the default namespace) in the scope of
    /// `id`. An undeclared default namespace resolves to `None`.
    pub fn lookup_namespace(&self, id: NodeId, prefix: Option<&str>) -> Option<&str> {
        if prefix == Some("xml") {
            return Some(XML_NAMESPACE);
        }
        std::iter::once(id)
            .chain(self.ancestors(id))
            .flat_map(|n| self.namespaces(n).iter())
            .find(|d| d.prefix.as_deref() == prefix)
            .map(|d| d.uri.as_str())
            .filter(|uri| !uri.is_empty())
    }

    /// A non-empty prefix bound to `uri` in the scope of `id`, skipping
    /// bindings shadowed closer to `id`.
    pub fn lookup_prefix(&self, id: NodeId, uri: &str) -> Option<String> {
        if uri == XML_NAMESPACE {
            return Some("xml".to_string());
        }
        std::iter::once(id)
            .chain(self.ancestors(id))
            .flat_map(|n| self.namespaces(n).iter())
            .filter_map(|d| d.prefix.as_deref().filter(|_| d.uri == uri))
            .find(|&p| self.lookup_namespace(id, Some(p)) == Some(uri))
            .map(str::to_string)
    }
}
