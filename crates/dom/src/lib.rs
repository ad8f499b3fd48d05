//! A mutable XML document stored as an arena of nodes addressed by stable
//! indices, with parsing, serialization and namespace-aware editing.

pub mod document;
pub mod error;
mod namespace;
mod parse;
pub mod reader;
mod serialize;
pub mod source;
pub mod writer;
pub mod xsi;

pub use document::{Document, DocumentId, NamespaceDecl, NodeId, NodeKind};
pub use error::DomError;
pub use reader::{SubtreeEvent, SubtreeReader};
pub use source::DomNode;
pub use writer::SubtreeWriter;
pub use xsi::{XSI_NAMESPACE, XSI_PREFIX};
