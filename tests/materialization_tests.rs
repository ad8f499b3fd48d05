mod common;

use common::{TestResult, assert_xml_eq, document_element, init};
use xmlview::{CursorFlags, Document, IncludedTypeSet, PathCursor, TypeKey, XmlContext, XmlCursor, XmlNode, compile};

const MUTABLE_SINGLE: CursorFlags = CursorFlags::ELEMENTS.union(CursorFlags::MUTABLE);

#[test]
fn test_create_writes_every_predicate() -> TestResult {
    init();
    let mut doc = Document::parse("<X/>")?;
    let path = compile("A[B='b']/C[D[E][F='f'] and G]/@H")?;
    let included = IncludedTypeSet::single("H");
    let context = XmlContext::new();
    let mut x = document_element(&doc, "X");
    let mut cursor = PathCursor::new(&mut x, &path, &included, &context, MUTABLE_SINGLE)?;

    cursor.create(&mut doc, &TypeKey::new("H"))?;
    cursor.set_value(&mut doc, "h")?;

    assert_xml_eq(
        &doc,
        r#"<X><A><C H="h"><D><E/><F>f</F></D><G/></C><B>b</B></A></X>"#,
    );
    Ok(())
}

#[test]
fn test_created_nodes_are_found_again() -> TestResult {
    let mut doc = Document::parse("<X/>")?;
    let path = compile("A[B='b']/C[D[E][F='f'] and G]/@H")?;
    let included = IncludedTypeSet::single("H");
    let context = XmlContext::new();
    let mut x = document_element(&doc, "X");
    {
        let mut cursor = PathCursor::new(&mut x, &path, &included, &context, MUTABLE_SINGLE)?;
        cursor.set_value(&mut doc, "h")?;
    }
    let mut cursor = PathCursor::new(&mut x, &path, &included, &context, MUTABLE_SINGLE)?;
    assert!(cursor.move_next(&doc)?);
    assert!(cursor.is_real());
    assert_eq!(cursor.value(&doc), "h");
    Ok(())
}

#[test]
fn test_variables_supply_created_values() -> TestResult {
    let mut doc = Document::parse(r#"<X xmlns:p="urn:p"/>"#)?;
    let path = compile("p:Item[@code=$p:code]/p:Name")?;
    let included = IncludedTypeSet::single("Name");
    let context = XmlContext::new()
        .with_namespace("p", "urn:p")
        .with_variable(Some("p"), "code", "A1")?;
    let mut x = document_element(&doc, "X");
    let mut cursor = PathCursor::new(&mut x, &path, &included, &context, MUTABLE_SINGLE)?;
    assert!(!cursor.move_next(&doc)?);
    cursor.set_value(&mut doc, "Anvil")?;
    assert_xml_eq(
        &doc,
        r#"<X xmlns:p="urn:p"><p:Item code="A1"><p:Name>Anvil</p:Name></p:Item></X>"#,
    );
    Ok(())
}

#[test]
fn test_reading_a_virtual_node_changes_nothing() -> TestResult {
    let doc = Document::parse("<X><A/></X>")?;
    let before = doc.to_xml()?;
    let path = compile("A/B[@k='1']/C")?;
    let included = IncludedTypeSet::single("C");
    let context = XmlContext::new();
    let mut x = document_element(&doc, "X");
    let mut cursor = PathCursor::new(&mut x, &path, &included, &context, MUTABLE_SINGLE)?;

    assert!(cursor.move_next(&doc)?);
    assert!(!cursor.is_real());
    assert_eq!(cursor.value(&doc), "");
    assert!(!cursor.is_nil(&doc));
    assert!(cursor.name(&doc).is_empty());
    assert_eq!(cursor.type_key(), Some(TypeKey::new("C")));
    assert_eq!(cursor.xml(&doc)?, None);
    assert_eq!(doc.to_xml()?, before);
    Ok(())
}

#[test]
fn test_nested_virtual_cursors_materialize_in_order() -> TestResult {
    init();
    let mut doc = Document::parse("<X/>")?;
    let path = compile("Item")?;
    let included = IncludedTypeSet::single("Item");
    let context = XmlContext::new();
    let mut x = document_element(&doc, "X");

    let mut outer = PathCursor::new(&mut x, &path, &included, &context, MUTABLE_SINGLE)?;
    assert!(!outer.move_next(&doc)?);
    let mut middle = PathCursor::new(&mut outer, &path, &included, &context, MUTABLE_SINGLE)?;
    assert!(!middle.move_next(&doc)?);
    let mut inner = PathCursor::new(&mut middle, &path, &included, &context, MUTABLE_SINGLE)?;
    assert!(!inner.move_next(&doc)?);
    assert_eq!(doc.to_xml()?, "<X/>");

    inner.set_value(&mut doc, "1")?;
    assert_xml_eq(&doc, "<X><Item><Item><Item>1</Item></Item></Item></X>");
    Ok(())
}

#[test]
fn test_partial_chains_are_completed_in_place() -> TestResult {
    let mut doc = Document::parse("<X><A><Keep/></A></X>")?;
    let path = compile("A/B/C")?;
    let included = IncludedTypeSet::single("C");
    let context = XmlContext::new();
    let mut x = document_element(&doc, "X");
    let mut cursor = PathCursor::new(&mut x, &path, &included, &context, MUTABLE_SINGLE)?;
    assert!(cursor.move_next(&doc)?);
    cursor.set_nil(&mut doc, true)?;
    assert_xml_eq(
        &doc,
        r#"<X><A><Keep/><B><C xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:nil="true"/></B></A></X>"#,
    );
    assert!(cursor.is_nil(&doc));
    Ok(())
}
