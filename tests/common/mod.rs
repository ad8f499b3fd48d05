#![allow(dead_code)]

use xmlview::{Document, RealNode};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Asserts that two documents serialize identically once parsed, so
/// insignificant whitespace in the expected markup does not matter.
pub fn assert_xml_eq(actual: &Document, expected: &str) {
    let expected = Document::parse(expected)
        .and_then(|d| d.to_xml())
        .unwrap_or_else(|e| panic!("expected markup is invalid: {}", e));
    let actual = actual.to_xml().unwrap_or_else(|e| panic!("cannot serialize: {}", e));
    assert_eq!(actual, expected);
}

/// The document element as a node of type `type_key`.
pub fn document_element(doc: &Document, type_key: &str) -> RealNode {
    let element = doc
        .document_element()
        .unwrap_or_else(|| panic!("document has no element"));
    RealNode::new(doc, element, type_key)
}
