//! # xmlview
//!
//! Typed views over XML documents. Paths written in a creatable subset of
//! XPath are used both to read nodes and to create the ones that are
//! missing when a view is written.
//!
//! The workspace is split into:
//! - **types**: names, type keys and the known/included type catalogs
//! - **xpath1**: the XPath 1.0 evaluator and the creatable path compiler
//! - **dom**: the arena document with its parser, serializer and writers
//! - **core**: nodes, cursors, lazy materialization and view configuration
//!
//! ```no_run
//! use xmlview::{Document, XmlContext, select_values, write_value};
//!
//! let mut doc = Document::parse("<Order/>")?;
//! let context = XmlContext::new();
//! write_value(&mut doc, "Order/Lines/Line[@no='1']", "pen", &context)?;
//! assert_eq!(select_values(&doc, "Order/Lines/Line", &context)?, ["pen"]);
//! # Ok::<(), xmlview::XmlViewError>(())
//! ```

pub mod error;
pub mod query;

pub use error::XmlViewError;
pub use query::{select_values, write_value};

// Re-export the workspace crates
pub use xmlview_core as core;
pub use xmlview_dom as dom;
pub use xmlview_types as types;
pub use xmlview_xpath1 as xpath;

pub use xmlview_core::{
    Behavior, BehaviorVisitor, CursorError, CursorFlags, DirectCursor, PathCursor, ReadOnlyCursor, RealNode,
    SelfCursor, Value, ViewConfig, XmlContext, XmlCursor, XmlMetadata, XmlNode,
};
pub use xmlview_dom::{Document, NodeId, SubtreeEvent, SubtreeWriter};
pub use xmlview_types::{IncludedType, IncludedTypeSet, KnownType, KnownTypeSet, TypeKey, XmlName};
pub use xmlview_xpath1::{CompiledPath, compile};
