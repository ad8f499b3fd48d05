//! Running XPath expressions against the arena.

use crate::context::XmlContext;
use crate::error::CursorError;
use xmlview_dom::{Document, DomNode, NodeId};
use xmlview_xpath1::{EvaluationContext, Expression, XPathError, XPathValue, evaluate};

/// The result of evaluating an expression at a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nodes(Vec<NodeId>),
    String(String),
    Number(f64),
    Boolean(bool),
}

pub(crate) fn evaluate_at(
    doc: &Document,
    node: NodeId,
    expression: &Expression,
    context: &XmlContext,
) -> Result<Value, CursorError> {
    let e_ctx = EvaluationContext::new(DomNode::new(doc, node), context);
    Ok(match evaluate(expression, &e_ctx)? {
        XPathValue::NodeSet(nodes) => Value::Nodes(nodes.iter().map(DomNode::id).collect()),
        XPathValue::String(s) => Value::String(s),
        XPathValue::Number(n) => Value::Number(n),
        XPathValue::Boolean(b) => Value::Boolean(b),
    })
}

pub(crate) fn select_at(
    doc: &Document,
    node: NodeId,
    expression: &Expression,
    context: &XmlContext,
) -> Result<Vec<NodeId>, CursorError> {
    match evaluate_at(doc, node, expression, context)? {
        Value::Nodes(nodes) => Ok(nodes),
        other => Err(XPathError::TypeError(format!("expected a node-set, found {:?}", other)).into()),
    }
}
