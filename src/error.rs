use thiserror::Error;
use xmlview_core::CursorError;
use xmlview_dom::DomError;
use xmlview_xpath1::XPathError;

#[derive(Error, Debug)]
pub enum XmlViewError {
    #[error("Cursor error: {0}")]
    Cursor(#[from] CursorError),

    #[error("Document error: {0}")]
    Dom(#[from] DomError),

    #[error("XPath error: {0}")]
    XPath(#[from] XPathError),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
