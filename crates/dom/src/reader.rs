//! Streaming a subtree as start/text/end events.

use crate::NodeId;
use crate::document::{Document, NodeKind};
use xmlview_types::XmlName;

#[derive(Debug, Clone, PartialEq)]
pub enum SubtreeEvent {
    Start {
        name: XmlName,
        attributes: Vec<(XmlName, String)>,
    },
    Text(String),
    End {
        name: XmlName,
    },
}

enum Frame {
    Enter(NodeId),
    Leave(NodeId),
}

/// Iterator over the events of one node's subtree in document order.
/// Comments are skipped; an attribute yields its value as text.
pub struct SubtreeReader<'d> {
    doc: &'d Document,
    stack: Vec<Frame>,
}

impl Document {
    pub fn read_subtree(&self, id: NodeId) -> SubtreeReader<'_> {
        SubtreeReader {
            doc: self,
            stack: vec![Frame::Enter(id)],
        }
    }
}

impl Iterator for SubtreeReader<'_> {
    type Item = SubtreeEvent;

    fn next(&mut self) -> Option<SubtreeEvent> {
        let doc = self.doc;
        while let Some(frame) = self.stack.pop() {
            let id = match frame {
                Frame::Leave(id) => return Some(SubtreeEvent::End { name: doc.name(id) }),
                Frame::Enter(id) => id,
            };
            match doc.kind(id) {
                NodeKind::Root => {
                    self.stack
                        .extend(doc.children(id).iter().rev().map(|&c| Frame::Enter(c)));
                }
                NodeKind::Element => {
                    self.stack.push(Frame::Leave(id));
                    self.stack
                        .extend(doc.children(id).iter().rev().map(|&c| Frame::Enter(c)));
                    let attributes = doc
                        .attributes(id)
                        .iter()
                        .map(|&a| (doc.name(a), doc.value(a).to_string()))
                        .collect();
                    return Some(SubtreeEvent::Start {
                        name: doc.name(id),
                        attributes,
                    });
                }
                NodeKind::Text | NodeKind::Attribute => {
                    return Some(SubtreeEvent::Text(doc.value(id).to_string()));
                }
                NodeKind::Comment => {}
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yields_events_in_document_order() {
        let doc = Document::parse(r#"<A k="v"><B>b</B><!-- skip --><C/></A>"#).unwrap();
        let a = doc.document_element().unwrap();
        let name = |n: &str| XmlName::new(n, Some(""));
        let events: Vec<_> = doc.read_subtree(a).collect();
        assert_eq!(
            events,
            vec![
                SubtreeEvent::Start {
                    name: name("A"),
                    attributes: vec![(name("k"), "v".into())]
                },
                SubtreeEvent::Start {
                    name: name("B"),
                    attributes: vec![]
                },
                SubtreeEvent::Text("b".into()),
                SubtreeEvent::End { name: name("B") },
                SubtreeEvent::Start {
                    name: name("C"),
                    attributes: vec![]
                },
                SubtreeEvent::End { name: name("C") },
                SubtreeEvent::End { name: name("A") },
            ]
        );
    }
}
