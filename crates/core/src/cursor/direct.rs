//! Iterates the element children and attributes of a node, keeping those
//! whose name and marker a `KnownTypeSet` recognizes.

use super::{XmlCursor, require_mutable, rescan_to};
use crate::error::CursorError;
use crate::flags::CursorFlags;
use crate::node::{RealNode, XmlNode};
use xmlview_dom::{Document, NodeId};
use xmlview_types::{KnownType, KnownTypeSet, TypeKey, XmlName};

#[derive(Debug, Clone)]
enum State {
    BeforeFirst,
    /// On a match at `index` in the candidate list.
    On { index: usize, node: RealNode },
    /// The current node was removed; the next search starts at `index`.
    Primed { index: usize },
    AfterLast,
}

pub struct DirectCursor<'p> {
    parent: &'p mut (dyn XmlNode + 'p),
    known_types: &'p KnownTypeSet,
    flags: CursorFlags,
    state: State,
}

impl<'p> DirectCursor<'p> {
    pub fn new(parent: &'p mut (dyn XmlNode + 'p), known_types: &'p KnownTypeSet, flags: CursorFlags) -> Self {
        Self {
            parent,
            known_types,
            flags,
            state: State::BeforeFirst,
        }
    }

    /// Element children first, then attributes, as the flags allow.
    fn candidates(&self, doc: &Document) -> Vec<NodeId> {
        let Some(parent) = self.parent.node_id() else {
            return Vec::new();
        };
        let mut nodes = Vec::new();
        if self.flags.includes_elements() {
            nodes.extend(doc.element_children(parent));
        }
        if self.flags.includes_attributes() && doc.is_element(parent) {
            nodes.extend_from_slice(doc.attributes(parent));
        }
        nodes
    }

    fn recognize(&self, doc: &Document, node: NodeId) -> Option<&'p KnownType> {
        let xsi_type = if doc.is_element(node) {
            doc.xsi_type(node)
        } else {
            XmlName::empty()
        };
        let known_types: &'p KnownTypeSet = self.known_types;
        known_types.try_get(&doc.name(node), &xsi_type)
    }

    fn find_from(&self, doc: &Document, candidates: &[NodeId], start: usize) -> Option<(usize, RealNode)> {
        candidates.iter().enumerate().skip(start).find_map(|(index, &node)| {
            self.recognize(doc, node).map(|known| {
                log::trace!("matched {} as {}", doc.name(node), known.type_key);
                (index, RealNode::new(doc, node, known.type_key.clone()))
            })
        })
    }

    fn current(&self) -> Option<&RealNode> {
        match &self.state {
            State::On { node, .. } => Some(node),
            _ => None,
        }
    }

    fn current_mut(&mut self) -> Result<&mut RealNode, CursorError> {
        match &mut self.state {
            State::On { node, .. } => Ok(node),
            _ => Err(CursorError::invalid("cursor is not on a node")),
        }
    }

    fn creates_attributes(&self) -> bool {
        self.flags.includes_attributes() && !self.flags.includes_elements()
    }

    fn require_known(&self, type_key: &TypeKey) -> Result<&'p KnownType, CursorError> {
        let known_types: &'p KnownTypeSet = self.known_types;
        known_types
            .try_get_by_key(type_key)
            .ok_or_else(|| CursorError::Serialization(format!("no known type for '{}'", type_key)))
    }

    /// Writes the known type's name (and marker) onto an element, clearing
    /// what it held before when the name changes.
    fn apply_element_type(doc: &mut Document, node: NodeId, known: &KnownType, parent_ns: Option<&str>) -> Result<(), CursorError> {
        let name = known.name.with_inherited_namespace(parent_ns);
        if !known.name.matches(doc.local_name(node), doc.namespace_uri(node)) {
            log::debug!("coercing {} to {}", doc.name(node), name);
            doc.remove_children(node);
            for attribute in doc.attributes(node).to_vec() {
                doc.remove(attribute)?;
            }
            doc.bind_element_name(node, None, name.local_name(), name.effective_namespace())?;
        }
        doc.set_xsi_type(node, &known.xsi_type)?;
        Ok(())
    }
}

impl XmlCursor for DirectCursor<'_> {
    fn move_next(&mut self, doc: &Document) -> Result<bool, CursorError> {
        let start = match &self.state {
            State::BeforeFirst => 0,
            State::On { index, node } => {
                if !self.flags.allows_multiple() {
                    self.state = State::AfterLast;
                    return Ok(false);
                }
                let candidates = self.candidates(doc);
                candidates
                    .iter()
                    .position(|&c| c == node.id())
                    .unwrap_or(*index)
                    + 1
            }
            State::Primed { index } => *index,
            State::AfterLast => return Ok(false),
        };

        let candidates = self.candidates(doc);
        let Some((index, node)) = self.find_from(doc, &candidates, start) else {
            self.state = State::AfterLast;
            return Ok(false);
        };
        if !self.flags.allows_multiple() && self.find_from(doc, &candidates, index + 1).is_some() {
            log::trace!("more than one match for a single-valued cursor");
            self.state = State::AfterLast;
            return Ok(false);
        }
        self.state = State::On { index, node };
        Ok(true)
    }

    fn reset(&mut self) {
        self.state = State::BeforeFirst;
    }

    fn move_to_end(&mut self) {
        self.state = State::AfterLast;
    }

    fn create(&mut self, doc: &mut Document, type_key: &TypeKey) -> Result<(), CursorError> {
        require_mutable(self.flags)?;
        let known = self.require_known(type_key)?;
        let creates_attribute = self.creates_attributes();
        if creates_attribute && !known.xsi_type.is_empty() {
            return Err(CursorError::Unsupported("attributes cannot carry an xsi:type".into()));
        }

        let reference = match &self.state {
            State::On { .. } => return Err(CursorError::invalid("cursor is positioned on a node")),
            State::Primed { index } => {
                let candidates = self.candidates(doc);
                candidates.get(*index).copied().filter(|&c| doc.is_element(c))
            }
            State::AfterLast => None,
            State::BeforeFirst => {
                let candidates = self.candidates(doc);
                if self.find_from(doc, &candidates, 0).is_some() {
                    return Err(CursorError::invalid("no insertion point; call move_next first"));
                }
                None
            }
        };

        let parent = self.parent.realize(doc)?;
        if doc.is_element(parent) && doc.is_nil(parent) {
            doc.set_nil(parent, false)?;
        }
        let parent_ns = doc.namespace_uri(parent).map(str::to_string);
        let name = known.name.with_inherited_namespace(parent_ns.as_deref());

        let node = if creates_attribute {
            let ns = name.effective_namespace();
            let prefix = doc.attribute_prefix(parent, None, ns)?;
            doc.set_attribute(parent, prefix.as_deref(), name.local_name(), ns, "")?
        } else {
            let mut writer = match reference {
                Some(reference) => doc.write_children_before(parent, reference)?,
                None => doc.write_children(parent)?,
            };
            writer.start_element(&name, None)?;
            writer.end_element()?;
            let created = writer.finish()?;
            let node = created
                .first()
                .copied()
                .ok_or_else(|| CursorError::invalid("element was not created"))?;
            doc.set_xsi_type(node, &known.xsi_type)?;
            node
        };
        log::debug!(
            "{} {} under {:?}",
            if reference.is_some() { "inserted" } else { "appended" },
            name,
            parent
        );

        let index = self
            .candidates(doc)
            .iter()
            .position(|&c| c == node)
            .unwrap_or(0);
        self.state = State::On {
            index,
            node: RealNode::new(doc, node, known.type_key.clone()),
        };
        Ok(())
    }

    fn coerce(&mut self, doc: &mut Document, type_key: &TypeKey) -> Result<(), CursorError> {
        require_mutable(self.flags)?;
        let known = self.require_known(type_key)?;
        let parent_ns = self
            .parent
            .node_id()
            .and_then(|p| doc.namespace_uri(p))
            .map(str::to_string);
        let current = self.current_mut()?;
        let node = current.id();

        let xsi_type = current.xsi_type(doc);
        if known.is_match(&doc.name(node), &xsi_type) {
            current.set_type_key(known.type_key.clone());
            return Ok(());
        }
        if doc.is_attribute(node) {
            if !known.xsi_type.is_empty() {
                return Err(CursorError::Unsupported("attributes cannot carry an xsi:type".into()));
            }
            let name = known.name.with_inherited_namespace(None);
            let ns = name.effective_namespace();
            let parent = doc.parent(node).ok_or_else(|| CursorError::invalid("attribute is detached"))?;
            let prefix = doc.attribute_prefix(parent, None, ns)?;
            doc.rename(node, prefix.as_deref(), name.local_name(), ns);
        } else {
            Self::apply_element_type(doc, node, known, parent_ns.as_deref())?;
        }
        current.set_type_key(known.type_key.clone());
        Ok(())
    }

    fn remove(&mut self, doc: &mut Document) -> Result<(), CursorError> {
        require_mutable(self.flags)?;
        let State::On { index, node } = &self.state else {
            return Err(CursorError::invalid("cursor is not on a node"));
        };
        let index = *index;
        doc.remove(node.id())?;
        self.state = State::Primed { index };
        Ok(())
    }

    fn move_to(&mut self, doc: &Document, token: &RealNode) -> Result<(), CursorError> {
        if token.document() != doc.id() {
            return Err(CursorError::invalid("bookmark belongs to another document"));
        }
        let candidates = self.candidates(doc);
        let found = candidates
            .iter()
            .position(|&c| c == token.id())
            .and_then(|index| self.recognize(doc, token.id()).map(|known| (index, known)));
        match found {
            Some((index, known)) => {
                self.state = State::On {
                    index,
                    node: RealNode::new(doc, token.id(), known.type_key.clone()),
                };
                Ok(())
            }
            None => rescan_to(self, doc, token),
        }
    }

    fn as_node_mut(&mut self) -> &mut dyn XmlNode {
        self
    }
}

impl XmlNode for DirectCursor<'_> {
    fn name(&self, doc: &Document) -> XmlName {
        self.current().map(|n| n.name(doc)).unwrap_or_default()
    }

    fn xsi_type(&self, doc: &Document) -> XmlName {
        self.current().map(|n| n.xsi_type(doc)).unwrap_or_default()
    }

    fn set_xsi_type(&mut self, doc: &mut Document, xsi_type: &XmlName) -> Result<(), CursorError> {
        self.current_mut()?.set_xsi_type(doc, xsi_type)
    }

    fn is_element(&self, doc: &Document) -> bool {
        match self.current() {
            Some(n) => n.is_element(doc),
            None => !self.creates_attributes(),
        }
    }

    fn is_attribute(&self, doc: &Document) -> bool {
        match self.current() {
            Some(n) => n.is_attribute(doc),
            None => self.creates_attributes(),
        }
    }

    fn is_nil(&self, doc: &Document) -> bool {
        self.current().is_some_and(|n| n.is_nil(doc))
    }

    fn set_nil(&mut self, doc: &mut Document, nil: bool) -> Result<(), CursorError> {
        self.current_mut()?.set_nil(doc, nil)
    }

    fn value(&self, doc: &Document) -> String {
        self.current().map(|n| n.value(doc)).unwrap_or_default()
    }

    fn set_value(&mut self, doc: &mut Document, value: &str) -> Result<(), CursorError> {
        self.current_mut()?.set_value(doc, value)
    }

    fn type_key(&self) -> Option<TypeKey> {
        self.current().and_then(|n| n.type_key())
    }

    fn as_real(&self) -> Option<RealNode> {
        self.current().cloned()
    }

    fn realize(&mut self, doc: &mut Document) -> Result<NodeId, CursorError> {
        match self.current_mut() {
            Ok(node) => node.realize(doc),
            Err(_) => Err(CursorError::NotRealizable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn shapes() -> KnownTypeSet {
        KnownTypeSet::new(KnownType::named("Circle", "Circle"))
            .with(KnownType::named("Square", "Square"))
            .with(KnownType::named("Shape", "Polygon").with_xsi_type(XmlName::local("Polygon")))
    }

    fn parent(doc: &Document) -> RealNode {
        RealNode::new(doc, doc.document_element().unwrap(), "Shapes")
    }

    #[test]
    fn visits_recognized_children_in_order() {
        init();
        let doc = Document::parse("<S><Circle/><Other/><Square/>text<Circle/></S>").unwrap();
        let known = shapes();
        let mut root = parent(&doc);
        let mut cursor = root.select_children(&known, CursorFlags::ELEMENTS | CursorFlags::MULTIPLE);
        let mut seen = Vec::new();
        while cursor.move_next(&doc).unwrap() {
            seen.push(cursor.type_key().unwrap().to_string());
        }
        assert_eq!(seen, ["Circle", "Square", "Circle"]);
        assert!(!cursor.move_next(&doc).unwrap());
    }

    #[test]
    fn single_mode_needs_a_unique_match() {
        let doc = Document::parse("<S><Circle/><Square/></S>").unwrap();
        let known = shapes();
        let mut root = parent(&doc);
        let mut cursor = root.select_children(&known, CursorFlags::ELEMENTS);
        assert!(!cursor.move_next(&doc).unwrap());

        let doc = Document::parse("<S><Other/><Circle/></S>").unwrap();
        let mut root = parent(&doc);
        let mut cursor = root.select_children(&known, CursorFlags::ELEMENTS);
        assert!(cursor.move_next(&doc).unwrap());
        assert_eq!(cursor.name(&doc), XmlName::new("Circle", Some("")));
        assert!(!cursor.move_next(&doc).unwrap());
    }

    #[test]
    fn markers_select_the_type() {
        let ns = "http://www.w3.org/2001/XMLSchema-instance";
        let text = format!(r#"<S xmlns:xsi="{ns}"><Shape xsi:type="Polygon"/><Shape/></S>"#);
        let doc = Document::parse(&text).unwrap();
        let known = shapes();
        let mut root = parent(&doc);
        let mut cursor = root.select_children(&known, CursorFlags::ELEMENTS | CursorFlags::MULTIPLE);
        assert!(cursor.move_next(&doc).unwrap());
        assert_eq!(cursor.type_key(), Some(TypeKey::new("Polygon")));
        assert!(!cursor.move_next(&doc).unwrap());
    }

    #[test]
    fn create_follows_cursor_state() {
        init();
        let mut doc = Document::parse("<S><Circle/><Square/></S>").unwrap();
        let known = shapes();
        let mut root = parent(&doc);
        let flags = CursorFlags::ELEMENTS | CursorFlags::MULTIPLE | CursorFlags::MUTABLE;
        let mut cursor = root.select_children(&known, flags);
        let circle = TypeKey::new("Circle");

        assert!(matches!(cursor.create(&mut doc, &circle), Err(CursorError::InvalidOperation(_))));
        assert!(cursor.move_next(&doc).unwrap());
        assert!(matches!(cursor.create(&mut doc, &circle), Err(CursorError::InvalidOperation(_))));

        cursor.remove(&mut doc).unwrap();
        cursor.create(&mut doc, &TypeKey::new("Polygon")).unwrap();
        assert_eq!(
            doc.to_xml().unwrap(),
            r#"<S><Shape xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:type="Polygon"/><Square/></S>"#
        );

        cursor.move_to_end();
        cursor.create(&mut doc, &circle).unwrap();
        assert!(doc.to_xml().unwrap().ends_with("<Square/><Circle/></S>"));
        assert!(matches!(
            cursor.create(&mut doc, &TypeKey::new("Unknown")),
            Err(CursorError::Serialization(_))
        ));
    }

    #[test]
    fn create_on_empty_parent_appends() {
        let mut doc = Document::parse("<S/>").unwrap();
        let known = shapes();
        let mut root = parent(&doc);
        let mut cursor = root.select_children(&known, CursorFlags::ELEMENTS | CursorFlags::MUTABLE);
        cursor.create(&mut doc, &TypeKey::new("Square")).unwrap();
        assert!(cursor.is_real());
        assert_eq!(doc.to_xml().unwrap(), "<S><Square/></S>");
    }

    #[test]
    fn create_skips_unrecognized_children() {
        let mut doc = Document::parse("<S><Other/></S>").unwrap();
        let known = shapes();
        let mut root = parent(&doc);
        let flags = CursorFlags::ELEMENTS | CursorFlags::MULTIPLE | CursorFlags::MUTABLE;
        let mut cursor = root.select_children(&known, flags);
        cursor.create(&mut doc, &TypeKey::new("Square")).unwrap();
        assert!(cursor.is_real());
        assert_eq!(doc.to_xml().unwrap(), "<S><Other/><Square/></S>");
    }

    #[test]
    fn coerce_renames_in_place() {
        let mut doc = Document::parse("<S><Circle>r</Circle><Square/></S>").unwrap();
        let known = shapes();
        let mut root = parent(&doc);
        let flags = CursorFlags::ELEMENTS | CursorFlags::MULTIPLE | CursorFlags::MUTABLE;
        let mut cursor = root.select_children(&known, flags);
        assert!(cursor.move_next(&doc).unwrap());

        let before = doc.to_xml().unwrap();
        cursor.coerce(&mut doc, &TypeKey::new("Circle")).unwrap();
        assert_eq!(doc.to_xml().unwrap(), before);

        cursor.coerce(&mut doc, &TypeKey::new("Square")).unwrap();
        assert_eq!(doc.to_xml().unwrap(), "<S><Square/><Square/></S>");
        assert_eq!(cursor.type_key(), Some(TypeKey::new("Square")));
    }

    #[test]
    fn bookmarks_restore_position() {
        let doc = Document::parse("<S><Circle>1</Circle><Circle>2</Circle><Circle>3</Circle></S>").unwrap();
        let known = shapes();
        let mut root = parent(&doc);
        let mut cursor = root.select_children(&known, CursorFlags::ELEMENTS | CursorFlags::MULTIPLE);
        cursor.move_next(&doc).unwrap();
        cursor.move_next(&doc).unwrap();
        let token = cursor.save().unwrap();
        while cursor.move_next(&doc).unwrap() {}
        cursor.move_to(&doc, &token).unwrap();
        assert_eq!(cursor.value(&doc), "2");

        let other = Document::parse("<S/>").unwrap();
        let foreign = RealNode::new(&other, other.root(), "Shapes");
        assert!(matches!(cursor.move_to(&doc, &foreign), Err(CursorError::InvalidOperation(_))));
    }

    #[test]
    fn read_only_cursor_rejects_edits() {
        let mut doc = Document::parse("<S><Circle/></S>").unwrap();
        let known = shapes();
        let mut root = parent(&doc);
        let mut cursor = root.select_children(&known, CursorFlags::ELEMENTS);
        assert!(cursor.move_next(&doc).unwrap());
        assert!(matches!(cursor.remove(&mut doc), Err(CursorError::ReadOnly)));
    }
}
