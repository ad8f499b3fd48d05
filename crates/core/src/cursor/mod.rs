//! Cursors: stateful iteration over the nodes a parent exposes, plus
//! creation, coercion and removal at the current position.
//!
//! Every cursor moves through the same states:
//!
//! ```text
//! BeforeFirst --move_next--> on a match --move_next--> ... --> AfterLast
//!      ^                                                          |
//!      +--------------------------- reset ------------------------+
//! ```

mod direct;
mod path;
mod readonly;
mod self_cursor;

pub use direct::DirectCursor;
pub use path::PathCursor;
pub use readonly::ReadOnlyCursor;
pub use self_cursor::SelfCursor;

use crate::error::CursorError;
use crate::node::{RealNode, XmlNode};
use xmlview_dom::Document;
use xmlview_types::TypeKey;

pub trait XmlCursor: XmlNode {
    /// Advances to the next match. Without `MULTIPLE`, at most one match is
    /// ever produced.
    fn move_next(&mut self, doc: &Document) -> Result<bool, CursorError>;

    /// Returns to the state before the first match.
    fn reset(&mut self);

    /// Skips every remaining match.
    fn move_to_end(&mut self);

    /// Creates a node of `type_key` at the cursor's insertion point and
    /// moves onto it.
    fn create(&mut self, doc: &mut Document, type_key: &TypeKey) -> Result<(), CursorError>;

    /// Changes the type of the current node in place. A virtual position is
    /// written out first.
    fn coerce(&mut self, doc: &mut Document, type_key: &TypeKey) -> Result<(), CursorError>;

    /// Removes the current node. The next `move_next` continues with the
    /// node that followed it.
    fn remove(&mut self, doc: &mut Document) -> Result<(), CursorError>;

    fn remove_all_next(&mut self, doc: &mut Document) -> Result<(), CursorError> {
        while self.move_next(doc)? {
            self.remove(doc)?;
        }
        Ok(())
    }

    /// A token for the current node, valid until that node is removed.
    fn save(&self) -> Result<RealNode, CursorError> {
        self.as_real()
            .ok_or_else(|| CursorError::invalid("cursor is not on a node"))
    }

    /// Repositions the cursor onto a node saved earlier.
    fn move_to(&mut self, doc: &Document, token: &RealNode) -> Result<(), CursorError>;

    /// Moves to the next node, coercing it to `type_key`, or creates one.
    fn make_next(&mut self, doc: &mut Document, type_key: &TypeKey) -> Result<(), CursorError> {
        if self.move_next(doc)? {
            self.coerce(doc, type_key)
        } else {
            self.create(doc, type_key)
        }
    }

    fn as_node_mut(&mut self) -> &mut dyn XmlNode;
}

pub(crate) fn require_mutable(flags: crate::CursorFlags) -> Result<(), CursorError> {
    if flags.is_mutable() {
        Ok(())
    } else {
        Err(CursorError::ReadOnly)
    }
}

/// Rescans from the start until the cursor stands on `token`.
pub(crate) fn rescan_to<C: XmlCursor + ?Sized>(
    cursor: &mut C,
    doc: &Document,
    token: &RealNode,
) -> Result<(), CursorError> {
    if token.document() != doc.id() {
        return Err(CursorError::invalid("bookmark belongs to another document"));
    }
    cursor.reset();
    while cursor.move_next(doc)? {
        if cursor.node_id() == Some(token.id()) {
            return Ok(());
        }
    }
    Err(CursorError::invalid("cursor cannot move to the given node"))
}
