//! Building a `Document` from text with `roxmltree`.

use crate::NodeId;
use crate::document::Document;
use crate::error::DomError;

impl Document {
    /// Parses XML text. Whitespace-only text nodes and processing
    /// instructions are dropped; comments are kept.
    pub fn parse(text: &str) -> Result<Self, DomError> {
        let source = roxmltree::Document::parse(text)?;
        let mut doc = Document::new();
        let root = doc.root();
        for child in source.root().children() {
            doc.import(child, root)?;
        }
        log::trace!("parsed document with {} nodes", doc.nodes.len());
        Ok(doc)
    }

    fn import(&mut self, node: roxmltree::Node<'_, '_>, parent: NodeId) -> Result<(), DomError> {
        if node.is_text() {
            let text = node.text().unwrap_or_default();
            if !text.trim().is_empty() {
                let id = self.create_text(text);
                self.append_child(parent, id)?;
            }
            return Ok(());
        }
        if node.is_comment() {
            let id = self.create_comment(node.text().unwrap_or_default());
            return self.append_child(parent, id);
        }
        if !node.is_element() {
            return Ok(());
        }

        let name = node.tag_name();
        let prefix = element_prefix(node, name.namespace());
        let id = self.create_element(prefix.as_deref(), name.name(), name.namespace());
        self.append_child(parent, id)?;

        let inherited: Vec<_> = node
            .parent_element()
            .map(|p| p.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
            .unwrap_or_default();
        for ns in node.namespaces() {
            let binding = (ns.name(), ns.uri());
            if ns.name() == Some("xml") || inherited.contains(&binding) {
                continue;
            }
            self.declare_namespace(id, ns.name(), ns.uri())?;
        }
        let inherited_default = inherited.iter().find(|(p, _)| p.is_none()).map(|(_, uri)| *uri);
        let own_default = node.lookup_namespace_uri(None);
        if inherited_default.is_some_and(|uri| !uri.is_empty()) && own_default.is_none_or(str::is_empty) {
            self.declare_namespace(id, None, "")?;
        }

        for attribute in node.attributes() {
            let prefix = attribute
                .namespace()
                .and_then(|uri| attribute_prefix(node, uri));
            self.set_attribute(
                id,
                prefix.as_deref(),
                attribute.name(),
                attribute.namespace(),
                attribute.value(),
            )?;
        }

        for child in node.children() {
            self.import(child, id)?;
        }
        Ok(())
    }
}

fn element_prefix(node: roxmltree::Node<'_, '_>, ns: Option<&str>) -> Option<String> {
    let uri = ns?;
    if node.lookup_namespace_uri(None) == Some(uri) {
        return None;
    }
    attribute_prefix(node, uri)
}

fn attribute_prefix(node: roxmltree::Node<'_, '_>, uri: &str) -> Option<String> {
    node.namespaces()
        .filter(|ns| ns.uri() == uri)
        .find_map(|ns| ns.name())
        .map(str::to_string)
}
