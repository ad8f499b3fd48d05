use crate::NodeId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomError {
    #[error("XML parsing error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("XML write error: {0}")]
    Write(String),

    #[error("Node {0:?} cannot be used here")]
    InvalidNode(NodeId),

    #[error("Node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("Node belongs to a different document")]
    ForeignDocument,

    #[error("Namespace prefix '{0}' is not bound")]
    UnboundPrefix(String),
}
