//! A uniform view over a position in a document, real or not yet created.

use crate::context::XmlContext;
use crate::cursor::{DirectCursor, PathCursor, ReadOnlyCursor, SelfCursor, XmlCursor};
use crate::error::CursorError;
use crate::eval::{Value, evaluate_at};
use crate::flags::CursorFlags;
use xmlview_dom::{Document, DocumentId, DomError, NodeId, SubtreeReader, SubtreeWriter};
use xmlview_types::{IncludedTypeSet, KnownTypeSet, TypeKey, XmlName};
use xmlview_xpath1::CompiledPath;

/// A node as seen by a typed view.
///
/// The document is passed to every call; a node never owns it. Reads on a
/// node that does not exist yet return empty values, and writes create it
/// first (see [`realize`](Self::realize)).
pub trait XmlNode {
    /// The node's expanded name; empty while the node is virtual.
    fn name(&self, doc: &Document) -> XmlName;

    /// The `xsi:type` marker; empty when absent.
    fn xsi_type(&self, doc: &Document) -> XmlName;

    fn set_xsi_type(&mut self, doc: &mut Document, xsi_type: &XmlName) -> Result<(), CursorError>;

    fn is_element(&self, doc: &Document) -> bool;

    fn is_attribute(&self, doc: &Document) -> bool;

    fn is_nil(&self, doc: &Document) -> bool;

    fn set_nil(&mut self, doc: &mut Document, nil: bool) -> Result<(), CursorError>;

    fn value(&self, doc: &Document) -> String;

    fn set_value(&mut self, doc: &mut Document, value: &str) -> Result<(), CursorError>;

    /// The runtime type of the node, if one is known at this position.
    fn type_key(&self) -> Option<TypeKey>;

    /// A handle to the existing node at this position, if there is one.
    fn as_real(&self) -> Option<RealNode>;

    /// Creates the node (and any missing ancestors) if it does not exist.
    fn realize(&mut self, doc: &mut Document) -> Result<NodeId, CursorError>;

    fn is_real(&self) -> bool {
        self.as_real().is_some()
    }

    fn node_id(&self) -> Option<NodeId> {
        self.as_real().map(|r| r.id())
    }

    /// Evaluates the whole expression of `path` at this node. `None` while
    /// the node is virtual.
    fn evaluate(
        &self,
        doc: &Document,
        path: &CompiledPath,
        context: &XmlContext,
    ) -> Result<Option<Value>, CursorError> {
        match self.node_id() {
            Some(id) => evaluate_at(doc, id, path.expression(), context).map(Some),
            None => Ok(None),
        }
    }

    /// The node's markup. `None` while the node is virtual.
    fn xml(&self, doc: &Document) -> Result<Option<String>, CursorError> {
        match self.node_id() {
            Some(id) => Ok(Some(doc.node_xml(id)?)),
            None => Ok(None),
        }
    }

    fn read_subtree<'d>(&self, doc: &'d Document) -> Option<SubtreeReader<'d>> {
        self.node_id().map(|id| doc.read_subtree(id))
    }

    fn write_children<'d>(&mut self, doc: &'d mut Document) -> Result<SubtreeWriter<'d>, CursorError> {
        let id = self.realize(doc)?;
        Ok(doc.write_children(id)?)
    }

    fn write_attributes<'d>(&mut self, doc: &'d mut Document) -> Result<SubtreeWriter<'d>, CursorError> {
        let id = self.realize(doc)?;
        Ok(doc.write_attributes(id)?)
    }

    fn select_self<'a>(&'a mut self, included: &'a IncludedTypeSet, flags: CursorFlags) -> SelfCursor<'a>
    where
        Self: Sized,
    {
        SelfCursor::new(self, included, flags)
    }

    fn select_children<'a>(&'a mut self, known_types: &'a KnownTypeSet, flags: CursorFlags) -> DirectCursor<'a>
    where
        Self: Sized,
    {
        DirectCursor::new(self, known_types, flags)
    }

    /// A cursor over the nodes `path` selects below this node. A mutable
    /// cursor needs a creatable path.
    fn select<'a>(
        &'a mut self,
        path: &'a CompiledPath,
        included: &'a IncludedTypeSet,
        context: &'a XmlContext,
        flags: CursorFlags,
    ) -> Result<Box<dyn XmlCursor + 'a>, CursorError>
    where
        Self: Sized,
    {
        select_path(self, path, included, context, flags)
    }
}

/// [`XmlNode::select`] for a node behind a trait object.
pub fn select_path<'a>(
    node: &'a mut dyn XmlNode,
    path: &'a CompiledPath,
    included: &'a IncludedTypeSet,
    context: &'a XmlContext,
    flags: CursorFlags,
) -> Result<Box<dyn XmlCursor + 'a>, CursorError> {
    if flags.is_mutable() {
        Ok(Box::new(PathCursor::new(node, path, included, context, flags)?))
    } else {
        Ok(Box::new(ReadOnlyCursor::new(node, path, included, context, flags)))
    }
}

/// A handle to an existing node. Also serves as the bookmark a cursor hands
/// out from `save`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RealNode {
    document: DocumentId,
    id: NodeId,
    type_key: TypeKey,
}

impl RealNode {
    pub fn new(doc: &Document, id: NodeId, type_key: impl Into<TypeKey>) -> Self {
        Self {
            document: doc.id(),
            id,
            type_key: type_key.into(),
        }
    }

    /// The document root of `doc`.
    pub fn root(doc: &Document, type_key: impl Into<TypeKey>) -> Self {
        Self::new(doc, doc.root(), type_key)
    }

    pub fn document(&self) -> DocumentId {
        self.document
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub(crate) fn set_type_key(&mut self, type_key: TypeKey) {
        self.type_key = type_key;
    }

    fn check(&self, doc: &Document) -> Result<(), CursorError> {
        if doc.id() != self.document || !doc.contains(self.id) {
            return Err(DomError::ForeignDocument.into());
        }
        Ok(())
    }
}

impl XmlNode for RealNode {
    fn name(&self, doc: &Document) -> XmlName {
        doc.name(self.id)
    }

    fn xsi_type(&self, doc: &Document) -> XmlName {
        if doc.is_element(self.id) {
            doc.xsi_type(self.id)
        } else {
            XmlName::empty()
        }
    }

    fn set_xsi_type(&mut self, doc: &mut Document, xsi_type: &XmlName) -> Result<(), CursorError> {
        self.check(doc)?;
        if doc.is_attribute(self.id) {
            if xsi_type.is_empty() {
                return Ok(());
            }
            return Err(CursorError::Unsupported("attributes cannot carry an xsi:type".into()));
        }
        Ok(doc.set_xsi_type(self.id, xsi_type)?)
    }

    fn is_element(&self, doc: &Document) -> bool {
        doc.is_element(self.id)
    }

    fn is_attribute(&self, doc: &Document) -> bool {
        doc.is_attribute(self.id)
    }

    fn is_nil(&self, doc: &Document) -> bool {
        doc.is_element(self.id) && doc.is_nil(self.id)
    }

    fn set_nil(&mut self, doc: &mut Document, nil: bool) -> Result<(), CursorError> {
        self.check(doc)?;
        if doc.is_attribute(self.id) {
            return Err(CursorError::Unsupported("attributes cannot be nil".into()));
        }
        Ok(doc.set_nil(self.id, nil)?)
    }

    fn value(&self, doc: &Document) -> String {
        doc.string_value(self.id)
    }

    fn set_value(&mut self, doc: &mut Document, value: &str) -> Result<(), CursorError> {
        self.check(doc)?;
        doc.set_text(self.id, value)?;
        if doc.is_element(self.id) {
            doc.set_nil(self.id, false)?;
        }
        Ok(())
    }

    fn type_key(&self) -> Option<TypeKey> {
        Some(self.type_key.clone())
    }

    fn as_real(&self) -> Option<RealNode> {
        Some(self.clone())
    }

    fn realize(&mut self, doc: &mut Document) -> Result<NodeId, CursorError> {
        self.check(doc)?;
        Ok(self.id)
    }
}
