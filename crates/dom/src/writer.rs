//! Scoped writers that buffer markup and apply it to the arena in one go.

use crate::NodeId;
use crate::document::Document;
use crate::error::DomError;
use xmlview_types::XmlName;

#[derive(Debug, Clone)]
struct PendingName {
    prefix: Option<String>,
    local_name: String,
    namespace_uri: Option<String>,
}

impl PendingName {
    fn new(name: &XmlName, prefix: Option<&str>) -> Self {
        Self {
            prefix: prefix.map(str::to_string),
            local_name: name.local_name().to_string(),
            namespace_uri: name.effective_namespace().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone)]
enum WriteOp {
    Start(PendingName),
    Attribute(PendingName, String),
    Text(String),
    End,
}

/// Collects elements, attributes and text for one target node.
///
/// Nothing reaches the document until [`finish`](Self::finish) is called or
/// the writer is dropped. A writer that rejected a call discards everything.
/// Names with an unspecified namespace are written in no namespace.
#[derive(Debug)]
pub struct SubtreeWriter<'d> {
    doc: &'d mut Document,
    target: NodeId,
    before: Option<NodeId>,
    attributes_only: bool,
    ops: Vec<WriteOp>,
    /// One entry per open element: whether content has been written to it.
    open: Vec<bool>,
    failed: bool,
    done: bool,
}

impl Document {
    /// A writer appending children to `parent`.
    pub fn write_children(&mut self, parent: NodeId) -> Result<SubtreeWriter<'_>, DomError> {
        SubtreeWriter::new(self, parent, None, false)
    }

    /// A writer inserting children of `parent` before its child `reference`.
    pub fn write_children_before(
        &mut self,
        parent: NodeId,
        reference: NodeId,
    ) -> Result<SubtreeWriter<'_>, DomError> {
        if self.parent(reference) != Some(parent) || self.is_attribute(reference) {
            return Err(DomError::InvalidNode(reference));
        }
        SubtreeWriter::new(self, parent, Some(reference), false)
    }

    /// A writer that only adds attributes to `element`.
    pub fn write_attributes(&mut self, element: NodeId) -> Result<SubtreeWriter<'_>, DomError> {
        if !self.is_element(element) {
            return Err(DomError::NotAnElement(element));
        }
        SubtreeWriter::new(self, element, None, true)
    }
}

impl<'d> SubtreeWriter<'d> {
    fn new(
        doc: &'d mut Document,
        target: NodeId,
        before: Option<NodeId>,
        attributes_only: bool,
    ) -> Result<Self, DomError> {
        if !doc.contains(target) {
            return Err(DomError::InvalidNode(target));
        }
        if doc.is_attribute(target) {
            return Err(DomError::NotAnElement(target));
        }
        Ok(Self {
            doc,
            target,
            before,
            attributes_only,
            ops: Vec::new(),
            open: Vec::new(),
            failed: false,
            done: false,
        })
    }

    fn reject(&mut self, message: &str) -> Result<(), DomError> {
        self.failed = true;
        Err(DomError::Write(message.to_string()))
    }

    fn mark_content(&mut self) {
        if let Some(has_content) = self.open.last_mut() {
            *has_content = true;
        }
    }

    pub fn start_element(&mut self, name: &XmlName, prefix: Option<&str>) -> Result<(), DomError> {
        if self.attributes_only {
            return self.reject("an attribute writer cannot write elements");
        }
        if name.is_empty() {
            return self.reject("element name is empty");
        }
        self.mark_content();
        self.ops.push(WriteOp::Start(PendingName::new(name, prefix)));
        self.open.push(false);
        Ok(())
    }

    /// Adds an attribute to the open element, or to the target of an
    /// attribute writer.
    pub fn attribute(&mut self, name: &XmlName, prefix: Option<&str>, value: &str) -> Result<(), DomError> {
        if name.is_empty() {
            return self.reject("attribute name is empty");
        }
        match self.open.last() {
            None if !self.attributes_only => return self.reject("attribute outside an element"),
            Some(true) => return self.reject("attribute after element content"),
            _ => {}
        }
        self.ops
            .push(WriteOp::Attribute(PendingName::new(name, prefix), value.to_string()));
        Ok(())
    }

    pub fn text(&mut self, text: &str) -> Result<(), DomError> {
        if self.attributes_only {
            return self.reject("an attribute writer cannot write text");
        }
        if text.is_empty() {
            return Ok(());
        }
        self.mark_content();
        self.ops.push(WriteOp::Text(text.to_string()));
        Ok(())
    }

    pub fn end_element(&mut self) -> Result<(), DomError> {
        if self.open.pop().is_none() {
            return self.reject("no element to end");
        }
        self.ops.push(WriteOp::End);
        Ok(())
    }

    /// Drops the buffered markup without applying it.
    pub fn abandon(mut self) {
        self.failed = true;
    }

    /// Applies the buffered markup and returns the nodes created directly
    /// under the target (elements and text, or attributes).
    pub fn finish(mut self) -> Result<Vec<NodeId>, DomError> {
        self.done = true;
        if self.failed {
            return Err(DomError::Write("writer rejected an earlier call".into()));
        }
        if !self.open.is_empty() {
            return Err(DomError::Write(format!("{} element(s) left open", self.open.len())));
        }
        self.apply()
    }

    fn apply(&mut self) -> Result<Vec<NodeId>, DomError> {
        let ops = std::mem::take(&mut self.ops);
        let mut stack: Vec<NodeId> = Vec::new();
        let mut created = Vec::new();
        for op in ops {
            let parent = stack.last().copied().unwrap_or(self.target);
            match op {
                WriteOp::Start(name) => {
                    let id = self.doc.create_element(None, &name.local_name, None);
                    self.attach(parent, id, stack.is_empty())?;
                    self.doc.bind_element_name(
                        id,
                        name.prefix.as_deref(),
                        &name.local_name,
                        name.namespace_uri.as_deref(),
                    )?;
                    if stack.is_empty() {
                        created.push(id);
                    }
                    stack.push(id);
                }
                WriteOp::Attribute(name, value) => {
                    let ns = name.namespace_uri.as_deref();
                    let prefix = self.doc.attribute_prefix(parent, name.prefix.as_deref(), ns)?;
                    let id = self
                        .doc
                        .set_attribute(parent, prefix.as_deref(), &name.local_name, ns, &value)?;
                    if stack.is_empty() {
                        created.push(id);
                    }
                }
                WriteOp::Text(text) => {
                    let id = self.doc.create_text(&text);
                    self.attach(parent, id, stack.is_empty())?;
                    if stack.is_empty() {
                        created.push(id);
                    }
                }
                WriteOp::End => {
                    stack.pop();
                }
            }
        }
        Ok(created)
    }

    fn attach(&mut self, parent: NodeId, id: NodeId, top_level: bool) -> Result<(), DomError> {
        match self.before {
            Some(reference) if top_level => self.doc.insert_before(parent, id, reference),
            _ => self.doc.append_child(parent, id),
        }
    }
}

impl Drop for SubtreeWriter<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        if self.failed || !self.open.is_empty() {
            log::debug!("discarding {} buffered write(s)", self.ops.len());
            return;
        }
        if let Err(e) = self.apply() {
            log::warn!("subtree writer failed on drop: {}", e);
        }
    }
}
