//! Unit tests for the path expression parser

use fieldmap_path::{CollectionKind, PathError, PathExpression};

/// Helper to parse a path and unwrap it
fn parse(path: &str) -> PathExpression {
    PathExpression::parse(path).unwrap_or_else(|e| panic!("failed to parse {}: {}", path, e))
}

fn parse_err(path: &str) -> PathError {
    match PathExpression::parse(path) {
        Ok(p) => panic!("expected {} to be rejected, got {:?}", path, p),
        Err(e) => e,
    }
}

#[test]
fn test_parse_simple_elements() {
    let path = parse("/order/address/street");
    let names: Vec<_> = path.segments().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["order", "address", "street"]);
    assert!(path.segments().all(|s| !s.is_collection() && !s.attribute));
}

#[test]
fn test_parse_collection_markers() {
    let path = parse("/a[]/b<>/c{}");
    let kinds: Vec<_> = path.segments().map(|s| s.collection).collect();
    assert_eq!(
        kinds,
        vec![
            CollectionKind::Array,
            CollectionKind::List,
            CollectionKind::Map
        ]
    );
    assert!(path.segments().all(|s| s.index.is_none()));
}

#[test]
fn test_parse_collection_indexes() {
    let path = parse("/a[0]/b<12>/c{3}");
    let indexes: Vec<_> = path.segments().map(|s| s.index).collect();
    assert_eq!(indexes, vec![Some(0), Some(12), Some(3)]);
}

#[test]
fn test_parse_namespace_prefix() {
    let path = parse("/tns:orders/tns:order<>/id");
    let first = path.first_segment().unwrap();
    assert_eq!(first.prefix.as_deref(), Some("tns"));
    assert_eq!(first.name, "orders");
    assert_eq!(path.last_segment().unwrap().prefix, None);
}

#[test]
fn test_parse_attribute() {
    let path = parse("/order/@id");
    let last = path.last_segment().unwrap();
    assert!(last.attribute);
    assert_eq!(last.name, "id");
    assert!(path.is_attribute());
}

#[test]
fn test_attribute_namespace_orderings_are_equivalent() {
    let a = parse("/order/ns:@id");
    let b = parse("/order/@ns:id");
    assert_eq!(a, b);

    let last = a.last_segment().unwrap();
    assert!(last.attribute);
    assert_eq!(last.prefix.as_deref(), Some("ns"));
    assert_eq!(last.name, "id");
}

#[test]
fn test_display_is_canonical() {
    assert_eq!(parse("/order/ns:@id").to_string(), "/order/@ns:id");
    assert_eq!(parse("/a<>/b[4]").to_string(), "/a<>/b[4]");
}

#[test]
fn test_reject_missing_leading_separator() {
    parse_err("order/id");
    parse_err("");
}

#[test]
fn test_reject_empty_segments() {
    parse_err("/order//id");
    parse_err("/order/");
}

#[test]
fn test_reject_unbalanced_brackets() {
    parse_err("/items[");
    parse_err("/items[2");
    parse_err("/items]");
    parse_err("/items<2]");
    parse_err("/items{/x");
}

#[test]
fn test_reject_non_numeric_index() {
    let err = parse_err("/items[abc]");
    assert!(err.to_string().contains("non-negative integer"));
    parse_err("/items[-1]");
    parse_err("/prices{usd}");
}

#[test]
fn test_reject_attribute_not_last() {
    let err = parse_err("/order/@id/name");
    assert!(err.to_string().contains("must be the last segment"));
}

#[test]
fn test_reject_attribute_collection() {
    parse_err("/order/@ids[]");
}

#[test]
fn test_reject_bad_attribute_markers() {
    parse_err("/order/@ns:@id");
    parse_err("/order/id@x");
    parse_err("/order/:id");
    parse_err("/order/a:b:c");
}
