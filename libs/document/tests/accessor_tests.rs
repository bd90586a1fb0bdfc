use fieldmap_document::{
    accessor_for, Document, DocumentAccessor, DocumentError, DocumentFormat, JsonAccessor,
    XmlAccessor,
};
use fieldmap_model::{DiagnosticCode, FieldValue, Value};
use fieldmap_path::PathExpression;
use serde_json::json;
use std::collections::BTreeMap;

fn field(path: &str) -> FieldValue {
    FieldValue::parse(path).expect("valid path")
}

fn path(path: &str) -> PathExpression {
    PathExpression::parse(path).expect("valid path")
}

fn read(accessor: &dyn DocumentAccessor, doc: &Document, p: &str) -> Option<Value> {
    let mut f = field(p);
    accessor.read(doc, &mut f).expect("read");
    f.value
}

// JSON

#[test]
fn test_json_write_then_read_back() {
    let mut accessor = JsonAccessor::new();
    let doc = accessor
        .write_all(
            &[
                field("/customer/first").with_value("Ozzie"),
                field("/customer/last").with_value("Smith"),
                field("/customer/number").with_value(1),
                field("/active").with_value(true),
            ],
            None,
        )
        .unwrap();

    assert_eq!(
        doc,
        Document::Json(json!({
            "customer": { "first": "Ozzie", "last": "Smith", "number": 1 },
            "active": true
        }))
    );
    assert_eq!(read(&accessor, &doc, "/customer/last"), Some(Value::from("Smith")));
    assert_eq!(read(&accessor, &doc, "/customer/missing"), None);
    assert!(accessor.take_issues().is_empty());
}

#[test]
fn test_json_unindexed_writes_append() {
    let mut accessor = JsonAccessor::new();
    let mut doc = None;
    for i in 0..5 {
        doc = Some(
            accessor
                .write(&field("/items<>/id").with_value(i), doc)
                .unwrap(),
        );
    }
    let doc = doc.unwrap();

    let p = path("/items<>/id");
    assert_eq!(accessor.collection_count(&doc, &p, 0).unwrap(), 5);
    assert_eq!(read(&accessor, &doc, "/items<3>/id"), Some(Value::Integer(3)));
}

#[test]
fn test_json_indexed_write_pads_with_null() {
    let mut accessor = JsonAccessor::new();
    let doc = accessor
        .write(&field("/items[4]/id").with_value("last"), None)
        .unwrap();

    let items = doc.as_json().unwrap()["items"].as_array().unwrap().clone();
    assert_eq!(items.len(), 5);
    assert!(items[..4].iter().all(|v| v.is_null()));
    assert_eq!(items[4], json!({ "id": "last" }));
}

#[test]
fn test_json_collection_count_of_nested_segment() {
    let doc = Document::Json(json!({
        "orders": [
            { "lines": [ {}, {}, {} ] },
            { "lines": [ {} ] }
        ]
    }));
    let accessor = JsonAccessor::new();

    assert_eq!(
        accessor
            .collection_count(&doc, &path("/orders<1>/lines<>/sku"), 1)
            .unwrap(),
        1
    );
    assert_eq!(
        accessor
            .collection_count(&doc, &path("/orders<>/lines<>/sku"), 1)
            .unwrap(),
        3
    );
    assert_eq!(
        accessor
            .collection_count(&doc, &path("/orders<>/lines<>/sku"), 0)
            .unwrap(),
        2
    );
    assert_eq!(
        accessor
            .collection_count(&doc, &path("/invoices<>/x"), 0)
            .unwrap(),
        0
    );
}

#[test]
fn test_json_collection_count_with_repeated_names() {
    let doc = Document::Json(json!({
        "item": { "item": [ {}, {}, {} ] }
    }));
    let accessor = JsonAccessor::new();
    let p = path("/item/item<>/code");
    assert_eq!(accessor.collection_count(&doc, &p, 1).unwrap(), 3);
}

#[test]
fn test_json_read_all_resolves_each_field() {
    let doc = Document::Json(json!({
        "customer": { "first": "Ozzie", "age": 42 },
        "tags": [ "a", "b" ]
    }));
    let accessor = JsonAccessor::new();
    let mut fields = [
        field("/customer/first"),
        field("/customer/middle"),
        field("/customer/age"),
        field("/tags[1]"),
    ];
    accessor.read_all(&doc, &mut fields).unwrap();

    assert_eq!(fields[0].value, Some(Value::from("Ozzie")));
    assert_eq!(fields[1].value, None);
    assert_eq!(fields[2].value, Some(Value::Integer(42)));
    assert_eq!(fields[3].value, Some(Value::from("b")));
}

// XML


#[test]
fn test_xml_write_then_read_back() {
    let mut accessor = XmlAccessor::new();
    let doc = accessor
        .write_all(
            &[
                field("/customer/@id").with_value(7),
                field("/customer/name/first").with_value("Ozzie"),
                field("/customer/name/last").with_value("Smith"),
            ],
            None,
        )
        .unwrap();

    let text = doc.to_pretty_string().unwrap();
    assert!(text.contains(r#"<customer id="7">"#));
    assert!(text.contains("<first>Ozzie</first>"));

    let reparsed = Document::parse(DocumentFormat::Xml, &text).unwrap();
    assert_eq!(read(&accessor, &reparsed, "/customer/@id"), Some(Value::from("7")));
    assert_eq!(
        read(&accessor, &reparsed, "/customer/name/last"),
        Some(Value::from("Smith"))
    );
}

#[test]
fn test_xml_unindexed_writes_append() {
    let mut accessor = XmlAccessor::new();
    let mut doc = None;
    for sku in ["a", "b", "c", "d", "e"] {
        doc = Some(
            accessor
                .write(&field("/order/line<>/sku").with_value(sku), doc)
                .unwrap(),
        );
    }
    let doc = doc.unwrap();

    let p = path("/order/line<>/sku");
    assert_eq!(accessor.collection_count(&doc, &p, 1).unwrap(), 5);
    assert_eq!(read(&accessor, &doc, "/order/line<4>/sku"), Some(Value::from("e")));
}

#[test]
fn test_xml_indexed_write_pads_with_empty_elements() {
    let mut accessor = XmlAccessor::new();
    let doc = accessor
        .write(&field("/order/line[4]").with_value("x"), None)
        .unwrap();

    let p = path("/order/line[]");
    assert_eq!(accessor.collection_count(&doc, &p, 1).unwrap(), 5);
    for i in 0..4 {
        assert_eq!(read(&accessor, &doc, &format!("/order/line[{}]", i)), None);
    }
    assert_eq!(read(&accessor, &doc, "/order/line[4]"), Some(Value::from("x")));

    // writing into an existing slot reuses it
    let doc = accessor
        .write(&field("/order/line[2]").with_value("y"), Some(doc))
        .unwrap();
    assert_eq!(accessor.collection_count(&doc, &p, 1).unwrap(), 5);
    assert_eq!(read(&accessor, &doc, "/order/line[2]"), Some(Value::from("y")));
}

#[test]
fn test_xml_read_all_resolves_each_field() {
    let doc = Document::parse(
        DocumentFormat::Xml,
        r#"<order id="9"><line><sku>A</sku></line><line><sku>B</sku></line></order>"#,
    )
    .unwrap();
    let accessor = XmlAccessor::new();
    let mut fields = [
        field("/order/@id"),
        field("/order/line[1]/sku"),
        field("/order/line[2]/sku"),
        field("/order/line/sku"),
    ];
    accessor.read_all(&doc, &mut fields).unwrap();

    assert_eq!(fields[0].value, Some(Value::from("9")));
    assert_eq!(fields[1].value, Some(Value::from("B")));
    assert_eq!(fields[2].value, None);
    assert_eq!(fields[3].value, Some(Value::from("A")));
}

#[test]
fn test_xml_namespace_tolerant_read() {
    let doc = Document::parse(
        DocumentFormat::Xml,
        r#"<p:order xmlns:p="urn:purchase" xmlns:q="urn:other"><p:sku>A</p:sku><q:sku>B</q:sku></p:order>"#,
    )
    .unwrap();
    let accessor = XmlAccessor::new();

    // unprefixed paths match on local name
    assert_eq!(read(&accessor, &doc, "/order/sku"), Some(Value::from("A")));
    // a declared prefix must match the namespace
    assert_eq!(read(&accessor, &doc, "/p:order/q:sku"), Some(Value::from("B")));
    // a prefix unknown to the document falls back to local name
    assert_eq!(read(&accessor, &doc, "/x:order/x:sku"), Some(Value::from("A")));
}

#[test]
fn test_xml_namespace_declared_once_on_root() {
    let namespaces = BTreeMap::from([("p".to_string(), "urn:purchase".to_string())]);
    let mut accessor = accessor_for(DocumentFormat::Xml, &namespaces);
    let doc = accessor
        .write_all(
            &[
                field("/p:order/p:id").with_value(1),
                field("/p:order/p:line<>/p:sku").with_value("a"),
                field("/p:order/p:line<>/p:sku").with_value("b"),
            ],
            None,
        )
        .unwrap();

    assert!(accessor.take_issues().is_empty());
    let text = doc.to_pretty_string().unwrap();
    assert_eq!(text.matches("xmlns:p=").count(), 1);
    assert!(text.contains("<p:sku>b</p:sku>"));
}

#[test]
fn test_xml_attribute_update_in_place() {
    let mut accessor = XmlAccessor::new();
    let doc = accessor
        .write(&field("/order/@status").with_value("open"), None)
        .unwrap();
    let doc = accessor
        .write(&field("/order/@status").with_value("closed"), Some(doc))
        .unwrap();

    let xml = doc.as_xml().unwrap();
    let root = xml.root().unwrap();
    assert_eq!(xml.element(root).attributes.len(), 1);
    assert_eq!(read(&accessor, &doc, "/order/@status"), Some(Value::from("closed")));
}

#[test]
fn test_accessor_rejects_other_format() {
    let json = Document::Json(json!({ "a": 1 }));
    let mut xml_accessor = XmlAccessor::new();
    assert!(xml_accessor.write(&field("/a"), Some(json.clone())).is_err());

    let mut f = field("/a");
    assert!(xml_accessor.read(&json, &mut f).is_err());
    assert!(xml_accessor
        .collection_count(&json, &path("/a<>"), 0)
        .is_err());
    assert_eq!(
        xml_accessor.take_issues().iter().filter(|d| d.code == DiagnosticCode::Placement).count(),
        0
    );
}

#[test]
fn test_read_all_rejects_other_format() {
    let json = Document::Json(json!({ "a": 1 }));
    let xml = Document::parse(DocumentFormat::Xml, "<a>1</a>").unwrap();
    let mut fields = [field("/a"), field("/b")];

    assert!(matches!(
        XmlAccessor::new().read_all(&json, &mut fields),
        Err(DocumentError::InvalidArgument(_))
    ));
    assert!(matches!(
        JsonAccessor::new().read_all(&xml, &mut fields),
        Err(DocumentError::InvalidArgument(_))
    ));
    assert!(fields.iter().all(|f| f.value.is_none()));
}
