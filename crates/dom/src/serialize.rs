//! Writing a `Document` (or one node of it) back to text with `quick-xml`.

use crate::NodeId;
use crate::document::{Document, NodeKind};
use crate::error::DomError;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

impl Document {
    /// The whole document, without an XML declaration.
    pub fn to_xml(&self) -> Result<String, DomError> {
        self.node_xml(self.root())
    }

    /// The markup of one node. An attribute is written as its value.
    pub fn node_xml(&self, id: NodeId) -> Result<String, DomError> {
        if self.is_attribute(id) {
            return Ok(self.value(id).to_string());
        }
        let mut writer = Writer::new(Vec::new());
        self.write_node(&mut writer, id)?;
        String::from_utf8(writer.into_inner()).map_err(|e| DomError::Write(e.to_string()))
    }

    fn write_node(&self, writer: &mut Writer<Vec<u8>>, id: NodeId) -> Result<(), DomError> {
        match self.kind(id) {
            NodeKind::Root => {
                for &child in self.children(id) {
                    self.write_node(writer, child)?;
                }
                Ok(())
            }
            NodeKind::Element => self.write_element(writer, id),
            NodeKind::Text => emit(writer, Event::Text(BytesText::new(self.value(id)))),
            NodeKind::Comment => emit(writer, Event::Comment(BytesText::from_escaped(self.value(id)))),
            NodeKind::Attribute => Err(DomError::InvalidNode(id)),
        }
    }

    fn write_element(&self, writer: &mut Writer<Vec<u8>>, id: NodeId) -> Result<(), DomError> {
        let name = self.qualified_name(id);
        let mut start = BytesStart::new(name.as_str());
        for decl in self.namespaces(id) {
            let key = match &decl.prefix {
                Some(prefix) => format!("xmlns:{}", prefix),
                None => "xmlns".to_string(),
            };
            start.push_attribute((key.as_str(), decl.uri.as_str()));
        }
        for &attribute in self.attributes(id) {
            let key = self.qualified_name(attribute);
            start.push_attribute((key.as_str(), self.value(attribute)));
        }

        if self.children(id).is_empty() {
            return emit(writer, Event::Empty(start));
        }
        emit(writer, Event::Start(start))?;
        for &child in self.children(id) {
            self.write_node(writer, child)?;
        }
        emit(writer, Event::End(BytesEnd::new(name.as_str())))
    }
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), DomError> {
    writer
        .write_event(event)
        .map_err(|e| DomError::Write(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_compact_markup() {
        let text = r#"<X xmlns:p="urn:p"><A id="1">one &amp; two</A><!-- note --><p:B p:k="v"/></X>"#;
        let doc = Document::parse(text).unwrap();
        assert_eq!(doc.to_xml().unwrap(), text);
    }

    #[test]
    fn escapes_attribute_values() {
        let mut doc = Document::parse("<X/>").unwrap();
        let x = doc.document_element().unwrap();
        doc.set_attribute(x, None, "q", None, "a\"b<c").unwrap();
        assert_eq!(doc.to_xml().unwrap(), r#"<X q="a&quot;b&lt;c"/>"#);
    }

    #[test]
    fn attribute_markup_is_its_value() {
        let doc = Document::parse(r#"<X a="1"/>"#).unwrap();
        let x = doc.document_element().unwrap();
        let a = doc.attributes(x)[0];
        assert_eq!(doc.node_xml(a).unwrap(), "1");
    }
}
