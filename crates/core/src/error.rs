//! Errors raised by nodes and cursors.

use thiserror::Error;
use xmlview_dom::DomError;
use xmlview_xpath1::XPathError;

#[derive(Error, Debug)]
pub enum CursorError {
    /// The operation is not valid in the cursor's current state.
    #[error("Invalid cursor operation: {0}")]
    InvalidOperation(String),

    /// A type is missing from the catalog the cursor was built with.
    #[error("Type is not serializable here: {0}")]
    Serialization(String),

    #[error("Path '{0}' cannot be used to create nodes")]
    NotCreatable(String),

    #[error("Cursor is not in a realizable state")]
    NotRealizable,

    #[error("Cursor is read-only")]
    ReadOnly,

    #[error("Variable '{0}' not found")]
    UnknownVariable(String),

    #[error("Namespace prefix '{0}' is not bound")]
    UnknownPrefix(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Document error: {0}")]
    Dom(#[from] DomError),

    #[error("XPath error: {0}")]
    XPath(#[from] XPathError),
}

impl CursorError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        CursorError::InvalidOperation(message.into())
    }
}
