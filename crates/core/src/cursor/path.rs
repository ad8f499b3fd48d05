//! A mutable cursor over the nodes a creatable path selects.
//!
//! The first step of the path is evaluated once against the parent to get
//! the candidates. Every later step must select at most one node below the
//! previous one. A candidate whose chain stops early is a partial match: it
//! reads as empty and is completed when written.

use super::{XmlCursor, require_mutable, rescan_to};
use crate::context::XmlContext;
use crate::error::CursorError;
use crate::eval::select_at;
use crate::flags::CursorFlags;
use crate::materialize::{Anchor, materialize};
use crate::node::{RealNode, XmlNode};
use xmlview_dom::{Document, NodeId};
use xmlview_types::{IncludedType, IncludedTypeSet, TypeKey, XmlName};
use xmlview_xpath1::{CompiledPath, Step};

#[derive(Debug, Clone)]
enum State {
    BeforeFirst,
    /// Every step matched; `chain` holds one node per step.
    Full { chain: Vec<NodeId>, node: RealNode },
    /// Steps up to (but not including) `step` matched.
    Partial { chain: Vec<NodeId>, step: usize },
    /// The current node was removed.
    Primed,
    AfterLast,
}

/// Where a new node goes.
enum Insertion {
    Complete { chain: Vec<NodeId>, step: usize },
    Append,
    Before(NodeId),
}

pub struct PathCursor<'p> {
    parent: &'p mut (dyn XmlNode + 'p),
    path: &'p CompiledPath,
    included: &'p IncludedTypeSet,
    context: &'p XmlContext,
    flags: CursorFlags,
    candidates: Option<Vec<NodeId>>,
    /// Number of candidates consumed so far.
    index: usize,
    state: State,
}

impl<'p> PathCursor<'p> {
    pub fn new(
        parent: &'p mut (dyn XmlNode + 'p),
        path: &'p CompiledPath,
        included: &'p IncludedTypeSet,
        context: &'p XmlContext,
        flags: CursorFlags,
    ) -> Result<Self, CursorError> {
        if !path.is_creatable() {
            return Err(CursorError::NotCreatable(path.source().to_string()));
        }
        Ok(Self {
            parent,
            path,
            included,
            context,
            flags,
            candidates: None,
            index: 0,
            state: State::BeforeFirst,
        })
    }

    fn first_step(&self) -> Result<&'p Step, CursorError> {
        let path: &'p CompiledPath = self.path;
        path.first_step()
            .ok_or_else(|| CursorError::NotCreatable(path.source().to_string()))
    }

    fn ends_in_attribute(&self) -> bool {
        self.path.last_step().is_some_and(|s| s.is_attribute)
    }

    fn buffer(&mut self, doc: &Document) -> Result<(), CursorError> {
        if self.candidates.is_some() {
            return Ok(());
        }
        let nodes = match self.parent.node_id() {
            Some(parent) => select_at(doc, parent, &self.first_step()?.expression, self.context)?,
            None => Vec::new(),
        };
        log::trace!("'{}': {} candidate(s)", self.path.source(), nodes.len());
        self.candidates = Some(nodes);
        Ok(())
    }

    fn live_candidates<'c>(&'c self, doc: &'c Document) -> impl Iterator<Item = NodeId> + 'c {
        self.candidates
            .iter()
            .flatten()
            .copied()
            .filter(|&c| doc.is_attached(c))
    }

    /// Follows the remaining steps below a candidate. `None` rejects it.
    fn seek(&self, doc: &Document, candidate: NodeId) -> Result<Option<State>, CursorError> {
        let mut chain = vec![candidate];
        for (index, step) in self.path.steps().enumerate().skip(1) {
            let last = chain[chain.len() - 1];
            let found = select_at(doc, last, &step.expression, self.context)?;
            match found.as_slice() {
                [] => return Ok(Some(State::Partial { chain, step: index })),
                [node] => chain.push(*node),
                _ => {
                    log::trace!("'{}' is ambiguous below {:?}", step.source, last);
                    return Ok(None);
                }
            }
        }

        let last = chain[chain.len() - 1];
        let xsi_type = if doc.is_element(last) {
            doc.xsi_type(last)
        } else {
            XmlName::empty()
        };
        match self.included.try_get_by_xsi(&xsi_type) {
            Some(included) => {
                let node = RealNode::new(doc, last, included.type_key.clone());
                Ok(Some(State::Full { chain, node }))
            }
            None => {
                log::trace!("skipping {:?}: type {} is not included", last, xsi_type);
                Ok(None)
            }
        }
    }

    fn advance(&mut self, doc: &Document, candidates: &[NodeId]) -> Result<bool, CursorError> {
        if !self.flags.allows_multiple() && candidates.iter().filter(|&&c| doc.is_attached(c)).count() > 1 {
            log::trace!("'{}' matches more than one node", self.path.source());
            self.state = State::AfterLast;
            return Ok(false);
        }
        while let Some(&candidate) = candidates.get(self.index) {
            self.index += 1;
            if !doc.is_attached(candidate) {
                continue;
            }
            if let Some(state) = self.seek(doc, candidate)? {
                self.state = state;
                return Ok(true);
            }
        }
        self.state = State::AfterLast;
        Ok(false)
    }

    /// Decides where a node would be written. `creating` selects the error
    /// reported when there is no place for it.
    fn insertion(&mut self, doc: &Document, creating: bool) -> Result<Insertion, CursorError> {
        self.buffer(doc)?;
        let refuse = |message: &str| {
            if creating {
                CursorError::invalid(message)
            } else {
                CursorError::NotRealizable
            }
        };
        match &self.state {
            State::Full { .. } => Err(refuse("cursor is already on an existing node")),
            State::Partial { chain, step } => Ok(Insertion::Complete {
                chain: chain.clone(),
                step: *step,
            }),
            State::Primed if creating => {
                let first_is_attribute = self.first_step()?.is_attribute;
                let next = self
                    .candidates
                    .iter()
                    .flatten()
                    .skip(self.index)
                    .copied()
                    .find(|&c| doc.is_attached(c));
                Ok(match next {
                    Some(reference) if !first_is_attribute => Insertion::Before(reference),
                    _ => Insertion::Append,
                })
            }
            State::AfterLast if creating => Ok(Insertion::Append),
            _ if self.live_candidates(doc).next().is_none() => Ok(Insertion::Append),
            _ => Err(refuse("no insertion point; call move_next first")),
        }
    }

    /// Writes the missing nodes and moves onto the new one.
    fn build(&mut self, doc: &mut Document, insertion: Insertion, included: &IncludedType) -> Result<NodeId, CursorError> {
        if self.ends_in_attribute() && !included.xsi_type.is_empty() {
            return Err(CursorError::Unsupported("attributes cannot carry an xsi:type".into()));
        }
        let chain = match insertion {
            Insertion::Complete { mut chain, step } => {
                let path: &'p CompiledPath = self.path;
                let step = path
                    .step(step)
                    .ok_or_else(|| CursorError::invalid("partial match past the end of the path"))?;
                let parent = chain[chain.len() - 1];
                chain.extend(materialize(doc, Anchor::Append(parent), step, self.context)?);
                chain
            }
            Insertion::Append | Insertion::Before(_) => {
                let first = self.first_step()?;
                let parent = self.parent.realize(doc)?;
                if doc.is_element(parent) && doc.is_nil(parent) {
                    doc.set_nil(parent, false)?;
                }
                let (anchor, at) = match insertion {
                    Insertion::Before(reference) => {
                        (Anchor::Before { parent, reference }, Some(reference))
                    }
                    _ => (Anchor::Append(parent), None),
                };
                let chain = materialize(doc, anchor, first, self.context)?;
                self.record_candidate(chain[0], at);
                chain
            }
        };

        let node = chain[chain.len() - 1];
        if doc.is_element(node) && !included.xsi_type.is_empty() {
            doc.set_xsi_type(node, &included.xsi_type)?;
        }
        log::debug!("created '{}' as {}", self.path.source(), included.type_key);
        self.state = State::Full {
            chain,
            node: RealNode::new(doc, node, included.type_key.clone()),
        };
        Ok(node)
    }

    /// Keeps the candidate buffer in step with a newly written first-step node.
    fn record_candidate(&mut self, node: NodeId, before: Option<NodeId>) {
        let candidates = self.candidates.get_or_insert_with(Vec::new);
        let position = before
            .and_then(|r| candidates.iter().position(|&c| c == r))
            .unwrap_or(candidates.len());
        candidates.insert(position, node);
        self.index = position + 1;
    }

    fn full(&self) -> Option<&RealNode> {
        match &self.state {
            State::Full { node, .. } => Some(node),
            _ => None,
        }
    }

    fn realized(&mut self, doc: &mut Document) -> Result<&mut RealNode, CursorError> {
        self.realize(doc)?;
        match &mut self.state {
            State::Full { node, .. } => Ok(node),
            _ => Err(CursorError::NotRealizable),
        }
    }
}

impl<'p> XmlCursor for PathCursor<'p> {
    fn move_next(&mut self, doc: &Document) -> Result<bool, CursorError> {
        match self.state {
            State::AfterLast => return Ok(false),
            State::Full { .. } | State::Partial { .. } if !self.flags.allows_multiple() => {
                self.state = State::AfterLast;
                return Ok(false);
            }
            _ => {}
        }
        self.buffer(doc)?;
        let candidates = self.candidates.take().unwrap_or_default();
        let moved = self.advance(doc, &candidates);
        self.candidates = Some(candidates);
        moved
    }

    fn reset(&mut self) {
        self.candidates = None;
        self.index = 0;
        self.state = State::BeforeFirst;
    }

    fn move_to_end(&mut self) {
        self.state = State::AfterLast;
    }

    fn create(&mut self, doc: &mut Document, type_key: &TypeKey) -> Result<(), CursorError> {
        require_mutable(self.flags)?;
        let included_types: &'p IncludedTypeSet = self.included;
        let included = included_types
            .try_get_by_key(type_key)
            .ok_or_else(|| CursorError::Serialization(format!("'{}' is not included by this path", type_key)))?;
        let insertion = self.insertion(doc, true)?;
        self.build(doc, insertion, included)?;
        Ok(())
    }

    fn coerce(&mut self, doc: &mut Document, type_key: &TypeKey) -> Result<(), CursorError> {
        require_mutable(self.flags)?;
        let included_types: &'p IncludedTypeSet = self.included;
        let desired = included_types
            .try_get_by_key(type_key)
            .ok_or_else(|| CursorError::Serialization(format!("'{}' is not included by this path", type_key)))?;
        if let State::Partial { .. } = self.state {
            let insertion = self.insertion(doc, true)?;
            self.build(doc, insertion, desired)?;
            return Ok(());
        }
        let State::Full { node, .. } = &mut self.state else {
            return Err(CursorError::invalid("cursor is not on an existing node"));
        };

        let current = node.xsi_type(doc);
        if doc.is_attribute(node.id()) && !desired.xsi_type.is_empty() {
            return Err(CursorError::Unsupported("attributes cannot carry an xsi:type".into()));
        }
        let unchanged = if desired.xsi_type.is_empty() {
            current.is_empty()
        } else {
            desired.xsi_type.matches(current.local_name(), current.namespace_uri())
        };
        if !unchanged {
            log::debug!("coercing {:?} to {}", node.id(), desired.type_key);
            doc.set_xsi_type(node.id(), &desired.xsi_type)?;
        }
        node.set_type_key(desired.type_key.clone());
        Ok(())
    }

    fn remove(&mut self, doc: &mut Document) -> Result<(), CursorError> {
        require_mutable(self.flags)?;
        let chain = match std::mem::replace(&mut self.state, State::Primed) {
            State::Full { chain, .. } | State::Partial { chain, .. } => chain,
            other => {
                self.state = other;
                return Err(CursorError::invalid("cursor is not on a node"));
            }
        };
        let Some((&last, ancestors)) = chain.split_last() else {
            return Ok(());
        };
        doc.remove(last)?;
        for &node in ancestors.iter().rev() {
            if !doc.is_empty_element(node) {
                break;
            }
            log::trace!("pruning emptied {:?}", node);
            doc.remove(node)?;
        }
        Ok(())
    }

    fn move_to(&mut self, doc: &Document, token: &RealNode) -> Result<(), CursorError> {
        rescan_to(self, doc, token)
    }

    fn as_node_mut(&mut self) -> &mut dyn XmlNode {
        self
    }
}

impl<'p> XmlNode for PathCursor<'p> {
    fn name(&self, doc: &Document) -> XmlName {
        self.full().map(|n| n.name(doc)).unwrap_or_default()
    }

    fn xsi_type(&self, doc: &Document) -> XmlName {
        match self.full() {
            Some(node) => node.xsi_type(doc),
            None => self.included.default_type().xsi_type.clone(),
        }
    }

    fn set_xsi_type(&mut self, doc: &mut Document, xsi_type: &XmlName) -> Result<(), CursorError> {
        self.realized(doc)?.set_xsi_type(doc, xsi_type)
    }

    fn is_element(&self, doc: &Document) -> bool {
        match self.full() {
            Some(node) => node.is_element(doc),
            None => !self.ends_in_attribute(),
        }
    }

    fn is_attribute(&self, doc: &Document) -> bool {
        match self.full() {
            Some(node) => node.is_attribute(doc),
            None => self.ends_in_attribute(),
        }
    }

    fn is_nil(&self, doc: &Document) -> bool {
        self.full().is_some_and(|n| n.is_nil(doc))
    }

    fn set_nil(&mut self, doc: &mut Document, nil: bool) -> Result<(), CursorError> {
        self.realized(doc)?.set_nil(doc, nil)
    }

    fn value(&self, doc: &Document) -> String {
        self.full().map(|n| n.value(doc)).unwrap_or_default()
    }

    fn set_value(&mut self, doc: &mut Document, value: &str) -> Result<(), CursorError> {
        self.realized(doc)?.set_value(doc, value)
    }

    fn type_key(&self) -> Option<TypeKey> {
        match self.full() {
            Some(node) => node.type_key(),
            None => Some(self.included.default_type().type_key.clone()),
        }
    }

    fn as_real(&self) -> Option<RealNode> {
        self.full().cloned()
    }

    fn realize(&mut self, doc: &mut Document) -> Result<NodeId, CursorError> {
        if let State::Full { node, .. } = &mut self.state {
            return node.realize(doc);
        }
        let included_types: &'p IncludedTypeSet = self.included;
        let insertion = self.insertion(doc, false)?;
        self.build(doc, insertion, included_types.default_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xmlview_dom::XSI_NAMESPACE;
    use xmlview_xpath1::compile;

    const FLAGS: CursorFlags = CursorFlags::ELEMENTS;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn many() -> CursorFlags {
        FLAGS | CursorFlags::MULTIPLE | CursorFlags::MUTABLE
    }

    fn one() -> CursorFlags {
        FLAGS | CursorFlags::MUTABLE
    }

    fn root(doc: &Document) -> RealNode {
        RealNode::new(doc, doc.document_element().unwrap(), "X")
    }

    fn values(cursor: &mut PathCursor<'_>, doc: &Document) -> Vec<String> {
        let mut out = Vec::new();
        while cursor.move_next(doc).unwrap() {
            out.push(cursor.value(doc));
        }
        out
    }

    #[test]
    fn iterates_full_matches() {
        init();
        let doc = Document::parse("<X><Item><V>1</V></Item><Other/><Item><V>2</V></Item></X>").unwrap();
        let path = compile("Item/V").unwrap();
        let (included, context) = (IncludedTypeSet::single("V"), XmlContext::new());
        let mut x = root(&doc);
        let mut cursor = PathCursor::new(&mut x, &path, &included, &context, many()).unwrap();
        assert_eq!(values(&mut cursor, &doc), ["1", "2"]);
        cursor.reset();
        assert_eq!(values(&mut cursor, &doc), ["1", "2"]);
    }

    #[test]
    fn ambiguous_deeper_steps_are_skipped() {
        let doc = Document::parse("<X><A><B/><B/></A><A><B>x</B></A></X>").unwrap();
        let path = compile("A/B").unwrap();
        let (included, context) = (IncludedTypeSet::single("B"), XmlContext::new());
        let mut x = root(&doc);
        let mut cursor = PathCursor::new(&mut x, &path, &included, &context, many()).unwrap();
        assert_eq!(values(&mut cursor, &doc), ["x"]);
    }

    #[test]
    fn partial_matches_complete_on_write() {
        init();
        let mut doc = Document::parse("<X><Item/></X>").unwrap();
        let path = compile("Item/V").unwrap();
        let (included, context) = (IncludedTypeSet::single("V"), XmlContext::new());
        let mut x = root(&doc);
        let mut cursor = PathCursor::new(&mut x, &path, &included, &context, one()).unwrap();
        assert!(cursor.move_next(&doc).unwrap());
        assert!(!cursor.is_real());
        assert_eq!(cursor.value(&doc), "");
        cursor.set_value(&mut doc, "v").unwrap();
        assert!(cursor.is_real());
        assert_eq!(doc.to_xml().unwrap(), "<X><Item><V>v</V></Item></X>");
    }

    #[test]
    fn missing_paths_materialize_on_write() {
        let mut doc = Document::parse("<X/>").unwrap();
        let path = compile("A[@k='1']/B").unwrap();
        let (included, context) = (IncludedTypeSet::single("B"), XmlContext::new());
        let mut x = root(&doc);
        let mut cursor = PathCursor::new(&mut x, &path, &included, &context, one()).unwrap();
        assert!(!cursor.move_next(&doc).unwrap());
        assert_eq!(cursor.value(&doc), "");
        assert_eq!(cursor.type_key(), Some(TypeKey::new("B")));
        assert_eq!(doc.to_xml().unwrap(), "<X/>");

        cursor.set_value(&mut doc, "b").unwrap();
        assert_eq!(doc.to_xml().unwrap(), r#"<X><A k="1"><B>b</B></A></X>"#);
    }

    #[test]
    fn attribute_paths_write_attributes() {
        let mut doc = Document::parse("<X/>").unwrap();
        let path = compile("@id").unwrap();
        let (included, context) = (IncludedTypeSet::single("Id"), XmlContext::new());
        let mut x = root(&doc);
        let mut cursor = PathCursor::new(&mut x, &path, &included, &context, one()).unwrap();
        assert!(cursor.is_attribute(&doc));
        cursor.set_value(&mut doc, "7").unwrap();
        assert_eq!(doc.to_xml().unwrap(), r#"<X id="7"/>"#);
        assert!(matches!(cursor.set_nil(&mut doc, true), Err(CursorError::Unsupported(_))));
    }

    #[test]
    fn single_mode_rejects_several_matches() {
        let mut doc = Document::parse("<X><A/><A/></X>").unwrap();
        let path = compile("A").unwrap();
        let (included, context) = (IncludedTypeSet::single("A"), XmlContext::new());
        let mut x = root(&doc);
        let mut cursor = PathCursor::new(&mut x, &path, &included, &context, one()).unwrap();
        assert!(!cursor.move_next(&doc).unwrap());
        assert!(matches!(cursor.realize(&mut doc), Err(CursorError::NotRealizable)));
    }

    #[test]
    fn create_positions() {
        init();
        let mut doc = Document::parse("<X><A>1</A><A>2</A></X>").unwrap();
        let path = compile("A").unwrap();
        let (included, context) = (IncludedTypeSet::single("A"), XmlContext::new());
        let key = TypeKey::new("A");
        let mut x = root(&doc);
        let mut cursor = PathCursor::new(&mut x, &path, &included, &context, many()).unwrap();

        assert!(matches!(cursor.create(&mut doc, &key), Err(CursorError::InvalidOperation(_))));
        assert!(cursor.move_next(&doc).unwrap());
        assert!(matches!(cursor.create(&mut doc, &key), Err(CursorError::InvalidOperation(_))));

        cursor.remove(&mut doc).unwrap();
        cursor.create(&mut doc, &key).unwrap();
        assert_eq!(doc.to_xml().unwrap(), "<X><A/><A>2</A></X>");
        assert!(cursor.move_next(&doc).unwrap());
        assert_eq!(cursor.value(&doc), "2");

        cursor.move_to_end();
        cursor.create(&mut doc, &key).unwrap();
        cursor.set_value(&mut doc, "3").unwrap();
        assert_eq!(doc.to_xml().unwrap(), "<X><A/><A>2</A><A>3</A></X>");
        assert!(!cursor.move_next(&doc).unwrap());
        assert!(matches!(
            cursor.create(&mut doc, &TypeKey::new("B")),
            Err(CursorError::Serialization(_))
        ));
    }

    #[test]
    fn create_clears_nil_parent() {
        let text = format!(r#"<X xmlns:xsi="{XSI_NAMESPACE}" xsi:nil="true"/>"#);
        let mut doc = Document::parse(&text).unwrap();
        let path = compile("A").unwrap();
        let (included, context) = (IncludedTypeSet::single("A"), XmlContext::new());
        let mut x = root(&doc);
        let mut cursor = PathCursor::new(&mut x, &path, &included, &context, many()).unwrap();
        assert!(!cursor.move_next(&doc).unwrap());
        cursor.create(&mut doc, &TypeKey::new("A")).unwrap();
        assert_eq!(doc.to_xml().unwrap(), format!(r#"<X xmlns:xsi="{XSI_NAMESPACE}"><A/></X>"#));
    }

    #[test]
    fn remove_prunes_emptied_ancestors() {
        let mut doc = Document::parse("<X><A><B>1</B></A><A><B>2</B><C/></A></X>").unwrap();
        let path = compile("A/B").unwrap();
        let (included, context) = (IncludedTypeSet::single("B"), XmlContext::new());
        let mut x = root(&doc);
        let mut cursor = PathCursor::new(&mut x, &path, &included, &context, many()).unwrap();
        cursor.remove_all_next(&mut doc).unwrap();
        assert_eq!(doc.to_xml().unwrap(), "<X><A><C/></A></X>");
    }

    #[test]
    fn coerce_writes_markers() {
        let mut doc = Document::parse("<X><S/></X>").unwrap();
        let path = compile("S").unwrap();
        let included = IncludedTypeSet::single("Shape").with(IncludedType::new(XmlName::local("Circle"), "Circle"));
        let context = XmlContext::new();
        let mut x = root(&doc);
        let mut cursor = PathCursor::new(&mut x, &path, &included, &context, one()).unwrap();
        assert!(matches!(
            cursor.coerce(&mut doc, &TypeKey::new("Circle")),
            Err(CursorError::InvalidOperation(_))
        ));
        assert!(cursor.move_next(&doc).unwrap());

        cursor.coerce(&mut doc, &TypeKey::new("Circle")).unwrap();
        let marked = format!(r#"<X><S xmlns:xsi="{XSI_NAMESPACE}" xsi:type="Circle"/></X>"#);
        assert_eq!(doc.to_xml().unwrap(), marked);
        cursor.coerce(&mut doc, &TypeKey::new("Circle")).unwrap();
        assert_eq!(doc.to_xml().unwrap(), marked);
        assert_eq!(cursor.type_key(), Some(TypeKey::new("Circle")));

        cursor.coerce(&mut doc, &TypeKey::new("Shape")).unwrap();
        assert_eq!(doc.to_xml().unwrap(), format!(r#"<X><S xmlns:xsi="{XSI_NAMESPACE}"/></X>"#));
        assert!(matches!(
            cursor.coerce(&mut doc, &TypeKey::new("Square")),
            Err(CursorError::Serialization(_))
        ));
    }

    #[test]
    fn coerce_completes_partial_matches() {
        init();
        let mut doc = Document::parse("<X><A/></X>").unwrap();
        let path = compile("A/S").unwrap();
        let included = IncludedTypeSet::single("Shape").with(IncludedType::new(XmlName::local("Circle"), "Circle"));
        let context = XmlContext::new();
        let mut x = root(&doc);
        let mut cursor = PathCursor::new(&mut x, &path, &included, &context, one()).unwrap();
        assert!(cursor.move_next(&doc).unwrap());
        assert!(!cursor.is_real());

        cursor.coerce(&mut doc, &TypeKey::new("Circle")).unwrap();
        assert!(cursor.is_real());
        assert_eq!(cursor.type_key(), Some(TypeKey::new("Circle")));
        assert_eq!(
            doc.to_xml().unwrap(),
            format!(r#"<X><A><S xmlns:xsi="{XSI_NAMESPACE}" xsi:type="Circle"/></A></X>"#)
        );
    }

    #[test]
    fn make_next_fills_partial_matches() {
        let mut doc = Document::parse("<X><A/></X>").unwrap();
        let path = compile("A/B").unwrap();
        let (included, context) = (IncludedTypeSet::single("B"), XmlContext::new());
        let mut x = root(&doc);
        let mut cursor = PathCursor::new(&mut x, &path, &included, &context, one()).unwrap();
        cursor.make_next(&mut doc, &TypeKey::new("B")).unwrap();
        assert!(cursor.is_real());
        assert_eq!(doc.to_xml().unwrap(), "<X><A><B/></A></X>");
    }

    #[test]
    fn unknown_markers_are_skipped() {
        let text = format!(r#"<X xmlns:xsi="{XSI_NAMESPACE}"><S xsi:type="Unknown"/><S xsi:type="Circle"/><S/></X>"#);
        let doc = Document::parse(&text).unwrap();
        let path = compile("S").unwrap();
        let included = IncludedTypeSet::single("Shape").with(IncludedType::new(XmlName::local("Circle"), "Circle"));
        let context = XmlContext::new();
        let mut x = root(&doc);
        let mut cursor = PathCursor::new(&mut x, &path, &included, &context, many()).unwrap();
        let mut keys = Vec::new();
        while cursor.move_next(&doc).unwrap() {
            keys.push(cursor.type_key().unwrap().to_string());
        }
        assert_eq!(keys, ["Circle", "Shape"]);
    }

    #[test]
    fn bookmarks_survive_iteration() {
        let doc = Document::parse("<X><A>1</A><A>2</A><A>3</A></X>").unwrap();
        let path = compile("A").unwrap();
        let (included, context) = (IncludedTypeSet::single("A"), XmlContext::new());
        let mut x = root(&doc);
        let mut cursor = PathCursor::new(&mut x, &path, &included, &context, many()).unwrap();
        cursor.move_next(&doc).unwrap();
        cursor.move_next(&doc).unwrap();
        let token = cursor.save().unwrap();
        cursor.move_to_end();
        assert!(!cursor.move_next(&doc).unwrap());
        cursor.move_to(&doc, &token).unwrap();
        assert_eq!(cursor.value(&doc), "2");
    }

    #[test]
    fn nested_virtual_cursors_realize_outward() {
        init();
        let mut doc = Document::parse("<X/>").unwrap();
        let path = compile("Item").unwrap();
        let (included, context) = (IncludedTypeSet::single("Item"), XmlContext::new());
        let mut x = root(&doc);
        let mut outer = PathCursor::new(&mut x, &path, &included, &context, one()).unwrap();
        assert!(!outer.move_next(&doc).unwrap());
        {
            let mut inner = PathCursor::new(&mut outer, &path, &included, &context, one()).unwrap();
            assert!(!inner.move_next(&doc).unwrap());
            inner.set_value(&mut doc, "1").unwrap();
        }
        assert!(outer.is_real());
        assert_eq!(doc.to_xml().unwrap(), "<X><Item><Item>1</Item></Item></X>");
    }

    #[test]
    fn rejects_paths_that_cannot_create() {
        let doc = Document::parse("<X/>").unwrap();
        let path = compile("a/*").unwrap();
        let (included, context) = (IncludedTypeSet::single("A"), XmlContext::new());
        let mut x = root(&doc);
        assert!(matches!(
            PathCursor::new(&mut x, &path, &included, &context, one()),
            Err(CursorError::NotCreatable(_))
        ));
    }
}
