//! One-shot reads and writes of a path against a whole document.

use crate::XmlViewError;
use xmlview_core::{CursorFlags, RealNode, XmlContext, XmlNode};
use xmlview_dom::Document;
use xmlview_types::{IncludedTypeSet, TypeKey};
use xmlview_xpath1::compile;

fn value_types() -> IncludedTypeSet {
    IncludedTypeSet::single(TypeKey::new("xmlview::Value"))
}

/// The string value of every node `path` selects from the document root,
/// in document order.
pub fn select_values(doc: &Document, path: &str, context: &XmlContext) -> Result<Vec<String>, XmlViewError> {
    let path = compile(path)?;
    let included = value_types();
    let mut root = RealNode::root(doc, "xmlview::Document");
    let mut cursor = root.select(&path, &included, context, CursorFlags::ALL_NODES | CursorFlags::MULTIPLE)?;
    let mut values = Vec::new();
    while cursor.move_next(doc)? {
        values.push(cursor.value(doc));
    }
    Ok(values)
}

/// Writes `value` to the single node `path` selects from the document root,
/// creating it (and whatever leads to it) when it does not exist yet.
pub fn write_value(doc: &mut Document, path: &str, value: &str, context: &XmlContext) -> Result<(), XmlViewError> {
    let path = compile(path)?;
    let included = value_types();
    let mut root = RealNode::root(doc, "xmlview::Document");
    let mut cursor = root.select(&path, &included, context, CursorFlags::ALL_NODES | CursorFlags::MUTABLE)?;
    cursor.move_next(doc)?;
    cursor.set_value(doc, value)?;
    log::debug!("wrote '{}' to {}", value, path);
    Ok(())
}
