//! Creating the nodes a compiled path describes.
//!
//! A step is written as one subtree: the step node, then its attribute
//! subnodes (the next step first, then predicate nodes), then its value,
//! then its element subnodes in the same order. The chain is then followed
//! back down from the new top node to its leaf.

use crate::context::XmlContext;
use crate::error::CursorError;
use xmlview_dom::{Document, NodeId, SubtreeWriter};
use xmlview_types::XmlName;
use xmlview_xpath1::{PathNode, Step};

/// Where a new chain goes.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Anchor {
    Append(NodeId),
    Before { parent: NodeId, reference: NodeId },
}

/// Writes the chain starting at `first` and returns the created node of
/// every step from `first` to the last one.
pub(crate) fn materialize(
    doc: &mut Document,
    anchor: Anchor,
    first: &Step,
    context: &XmlContext,
) -> Result<Vec<NodeId>, CursorError> {
    let created = {
        let mut writer = match anchor {
            Anchor::Append(parent) if first.is_attribute => doc.write_attributes(parent)?,
            Anchor::Append(parent) => doc.write_children(parent)?,
            Anchor::Before { parent, reference } => doc.write_children_before(parent, reference)?,
        };
        if let Err(e) = write_node(&mut writer, first, context) {
            writer.abandon();
            return Err(e);
        }
        writer.finish()?
    };

    let top = created
        .first()
        .copied()
        .ok_or_else(|| CursorError::invalid(format!("nothing was written for '{}'", first.source)))?;
    let mut chain = vec![top];
    let mut current = top;
    for step in std::iter::successors(first.next.as_deref(), |s| s.next.as_deref()) {
        let ns = context.resolve_prefix(step.prefix.as_deref())?;
        let found = if step.is_attribute {
            doc.attribute(current, &step.local_name, ns)
        } else {
            doc.element_children(current)
                .find(|&c| doc.local_name(c) == step.local_name && doc.namespace_uri(c) == ns)
        };
        current = found.ok_or_else(|| {
            CursorError::invalid(format!("created node for '{}' was not found", step.source))
        })?;
        chain.push(current);
    }
    log::debug!("materialized '{}' ({} step(s))", first.source, chain.len());
    Ok(chain)
}

fn write_node(writer: &mut SubtreeWriter<'_>, node: &dyn PathNode, context: &XmlContext) -> Result<(), CursorError> {
    let name = XmlName::new(node.local_name(), context.resolve_prefix(node.prefix())?);
    if node.is_attribute() {
        let value = match node.value() {
            Some(v) => context.resolve_value(v)?,
            None => String::new(),
        };
        writer.attribute(&name, node.prefix(), &value)?;
        return Ok(());
    }

    writer.start_element(&name, node.prefix())?;
    if !node.is_simple() {
        write_subnodes(writer, node, context, true)?;
    }
    if let Some(v) = node.value() {
        writer.text(&context.resolve_value(v)?)?;
    }
    if !node.is_simple() {
        write_subnodes(writer, node, context, false)?;
    }
    writer.end_element()?;
    Ok(())
}

fn write_subnodes(
    writer: &mut SubtreeWriter<'_>,
    parent: &dyn PathNode,
    context: &XmlContext,
    attributes: bool,
) -> Result<(), CursorError> {
    if let Some(next) = parent.next_node() {
        if next.is_attribute() == attributes {
            write_node(writer, next, context)?;
        }
    }
    for dep in parent.dependencies() {
        if !dep.is_self_reference() && dep.is_attribute() == attributes {
            write_node(writer, dep, context)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use xmlview_xpath1::compile;

    fn write(source: &str, context: &XmlContext) -> Result<(Document, Vec<NodeId>), CursorError> {
        let mut doc = Document::parse("<X/>")?;
        let x = doc.document_element().unwrap();
        let path = compile(source)?;
        let chain = materialize(&mut doc, Anchor::Append(x), path.first_step().unwrap(), context)?;
        Ok((doc, chain))
    }

    #[test]
    fn writes_predicate_siblings_after_the_chain() {
        let (doc, chain) = write("A[B='b']/C[D[E][F='f'] and G]/@H", &XmlContext::new()).unwrap();
        assert_eq!(
            doc.to_xml().unwrap(),
            r#"<X><A><C H=""><D><E/><F>f</F></D><G/></C><B>b</B></A></X>"#
        );
        assert_eq!(chain.len(), 3);
        assert!(doc.is_attribute(chain[2]));
        assert_eq!(doc.local_name(chain[1]), "C");
    }

    #[test]
    fn writes_self_values_and_variables() {
        let context = XmlContext::new().with_variable(None, "v", "from-var").unwrap();
        let (doc, _) = write("A[.='a'][@k=$v]", &context).unwrap();
        assert_eq!(doc.to_xml().unwrap(), r#"<X><A k="from-var">a</A></X>"#);
    }

    #[test]
    fn prefixed_steps_use_context_namespaces() {
        let context = XmlContext::new().with_namespace("p", "urn:p");
        let (doc, chain) = write("p:A/p:B", &context).unwrap();
        assert_eq!(doc.to_xml().unwrap(), r#"<X><p:A xmlns:p="urn:p"><p:B/></p:A></X>"#);
        assert_eq!(doc.namespace_uri(chain[1]), Some("urn:p"));
    }

    #[test]
    fn unresolved_names_fail() {
        let err = write("A[B=$missing]", &XmlContext::new()).unwrap_err();
        assert!(matches!(err, CursorError::UnknownVariable(_)));
        assert!(matches!(write("q:A", &XmlContext::new()), Err(CursorError::UnknownPrefix(_))));
    }
}
