//! A cursor over any path expression, for reading only.

use super::{XmlCursor, rescan_to};
use crate::context::XmlContext;
use crate::error::CursorError;
use crate::eval::select_at;
use crate::flags::CursorFlags;
use crate::node::{RealNode, XmlNode};
use xmlview_dom::{Document, NodeId};
use xmlview_types::{IncludedTypeSet, TypeKey, XmlName};
use xmlview_xpath1::CompiledPath;

pub struct ReadOnlyCursor<'p> {
    parent: &'p mut (dyn XmlNode + 'p),
    path: &'p CompiledPath,
    included: &'p IncludedTypeSet,
    context: &'p XmlContext,
    flags: CursorFlags,
    results: Option<Vec<RealNode>>,
    index: usize,
    current: Option<RealNode>,
}

impl<'p> ReadOnlyCursor<'p> {
    pub fn new(
        parent: &'p mut (dyn XmlNode + 'p),
        path: &'p CompiledPath,
        included: &'p IncludedTypeSet,
        context: &'p XmlContext,
        flags: CursorFlags,
    ) -> Self {
        Self {
            parent,
            path,
            included,
            context,
            flags,
            results: None,
            index: 0,
            current: None,
        }
    }

    /// Evaluates the expression and keeps the nodes whose marker is included.
    fn select_results(&self, doc: &Document) -> Result<Vec<RealNode>, CursorError> {
        let Some(parent) = self.parent.node_id() else {
            return Ok(Vec::new());
        };
        let nodes = select_at(doc, parent, self.path.expression(), self.context)?;
        let results: Vec<RealNode> = nodes
            .into_iter()
            .filter_map(|node| self.resolve(doc, node))
            .collect();
        log::trace!("'{}' selected {} node(s)", self.path.source(), results.len());
        if !self.flags.allows_multiple() && results.len() > 1 {
            log::trace!("'{}' matches more than one node", self.path.source());
            return Ok(Vec::new());
        }
        Ok(results)
    }

    fn resolve(&self, doc: &Document, node: NodeId) -> Option<RealNode> {
        let xsi_type = if doc.is_element(node) {
            doc.xsi_type(node)
        } else {
            XmlName::empty()
        };
        self.included
            .try_get_by_xsi(&xsi_type)
            .map(|t| RealNode::new(doc, node, t.type_key.clone()))
    }
}

impl XmlCursor for ReadOnlyCursor<'_> {
    fn move_next(&mut self, doc: &Document) -> Result<bool, CursorError> {
        if self.results.is_none() {
            self.results = Some(self.select_results(doc)?);
        }
        let next = self
            .results
            .as_ref()
            .and_then(|results| results.get(self.index))
            .cloned();
        if next.is_some() {
            self.index += 1;
        }
        self.current = next;
        Ok(self.current.is_some())
    }

    fn reset(&mut self) {
        self.results = None;
        self.index = 0;
        self.current = None;
    }

    fn move_to_end(&mut self) {
        self.index = usize::MAX;
        self.current = None;
    }

    fn create(&mut self, _doc: &mut Document, _type_key: &TypeKey) -> Result<(), CursorError> {
        Err(CursorError::NotCreatable(self.path.source().to_string()))
    }

    fn coerce(&mut self, _doc: &mut Document, _type_key: &TypeKey) -> Result<(), CursorError> {
        Err(CursorError::ReadOnly)
    }

    fn remove(&mut self, _doc: &mut Document) -> Result<(), CursorError> {
        Err(CursorError::ReadOnly)
    }

    fn move_to(&mut self, doc: &Document, token: &RealNode) -> Result<(), CursorError> {
        rescan_to(self, doc, token)
    }

    fn as_node_mut(&mut self) -> &mut dyn XmlNode {
        self
    }
}

impl XmlNode for ReadOnlyCursor<'_> {
    fn name(&self, doc: &Document) -> XmlName {
        self.current.as_ref().map(|n| n.name(doc)).unwrap_or_default()
    }

    fn xsi_type(&self, doc: &Document) -> XmlName {
        self.current.as_ref().map(|n| n.xsi_type(doc)).unwrap_or_default()
    }

    fn set_xsi_type(&mut self, _doc: &mut Document, _xsi_type: &XmlName) -> Result<(), CursorError> {
        Err(CursorError::ReadOnly)
    }

    fn is_element(&self, doc: &Document) -> bool {
        self.current.as_ref().is_some_and(|n| n.is_element(doc))
    }

    fn is_attribute(&self, doc: &Document) -> bool {
        self.current.as_ref().is_some_and(|n| n.is_attribute(doc))
    }

    fn is_nil(&self, doc: &Document) -> bool {
        self.current.as_ref().is_some_and(|n| n.is_nil(doc))
    }

    fn set_nil(&mut self, _doc: &mut Document, _nil: bool) -> Result<(), CursorError> {
        Err(CursorError::ReadOnly)
    }

    fn value(&self, doc: &Document) -> String {
        self.current.as_ref().map(|n| n.value(doc)).unwrap_or_default()
    }

    fn set_value(&mut self, _doc: &mut Document, _value: &str) -> Result<(), CursorError> {
        Err(CursorError::ReadOnly)
    }

    fn type_key(&self) -> Option<TypeKey> {
        match &self.current {
            Some(node) => node.type_key(),
            None => Some(self.included.default_type().type_key.clone()),
        }
    }

    fn as_real(&self) -> Option<RealNode> {
        self.current.clone()
    }

    fn realize(&mut self, doc: &mut Document) -> Result<NodeId, CursorError> {
        match &mut self.current {
            Some(node) => node.realize(doc),
            None => Err(CursorError::NotCreatable(self.path.source().to_string())),
        }
    }
}
