//! # xmlview-core
//!
//! Typed views over an [`xmlview_dom::Document`].
//!
//! A view reaches its nodes through a cursor:
//! - **node**: the [`XmlNode`] contract shared by real nodes and cursors
//! - **cursor**: direct, path, read-only and self cursors
//! - **materialize**: creation of the nodes a compiled path describes
//! - **behavior** / **metadata**: declarative view configuration
//!
//! Documents are arenas addressed by `NodeId`; nodes and cursors never own
//! the document, which is passed to every call.

pub mod behavior;
pub mod context;
pub mod cursor;
pub mod error;
pub mod eval;
pub mod flags;
mod materialize;
pub mod metadata;
pub mod node;

pub use behavior::{Behavior, BehaviorVisitor};
pub use context::{NamespaceBinding, XmlContext};
pub use cursor::{DirectCursor, PathCursor, ReadOnlyCursor, SelfCursor, XmlCursor};
pub use error::CursorError;
pub use eval::Value;
pub use flags::CursorFlags;
pub use metadata::{ROOT_FLAGS, ViewConfig, XmlMetadata};
pub use node::{RealNode, XmlNode, select_path};
