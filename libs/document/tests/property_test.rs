//! Property-based tests using QuickCheck

use fieldmap_document::{Document, DocumentAccessor, DocumentFormat, JsonAccessor, XmlAccessor};
use fieldmap_model::{FieldValue, Value};
use quickcheck::{QuickCheck, TestResult};

const KEYS: &[&str] = &["name", "code", "city", "note"];

fn fields(picks: &[(u8, String)]) -> Vec<FieldValue> {
    picks
        .iter()
        .map(|(key, value)| {
            let key = KEYS[*key as usize % KEYS.len()];
            FieldValue::parse(&format!("/root/{}", key))
                .expect("valid path")
                .with_value(value.clone())
        })
        .collect()
}

/// Last write per key wins; read returns it.
fn check(accessor: &mut dyn DocumentAccessor, format: DocumentFormat, picks: &[(u8, String)]) -> TestResult {
    let written = fields(picks);
    let doc = match accessor.write_all(&written, None) {
        Ok(doc) => doc,
        Err(e) => return TestResult::error(e.to_string()),
    };
    // serialize and parse again so the check covers the text form too
    let text = match doc.to_pretty_string() {
        Ok(text) => text,
        Err(e) => return TestResult::error(e.to_string()),
    };
    let doc = match Document::parse(format, &text) {
        Ok(doc) => doc,
        Err(e) => return TestResult::error(e.to_string()),
    };

    for field in &written {
        let expected = written
            .iter()
            .rev()
            .find(|f| f.path == field.path)
            .and_then(|f| f.value.clone())
            .filter(|v| !v.to_string().trim().is_empty() || format == DocumentFormat::Json);
        let mut read = FieldValue::new(field.path.clone());
        if let Err(e) = accessor.read(&doc, &mut read) {
            return TestResult::error(e.to_string());
        }
        if read.value != expected {
            return TestResult::failed();
        }
    }
    TestResult::passed()
}

/// Property: JSON leaves read back as written
#[test]
fn prop_json_write_read() {
    fn prop(picks: Vec<(u8, String)>) -> TestResult {
        if picks.is_empty() {
            return TestResult::discard();
        }
        check(&mut JsonAccessor::new(), DocumentFormat::Json, &picks)
    }
    QuickCheck::new()
        .tests(200)
        .quickcheck(prop as fn(Vec<(u8, String)>) -> TestResult);
}

/// Property: XML element text reads back as written
#[test]
fn prop_xml_write_read() {
    fn prop(picks: Vec<(u8, String)>) -> TestResult {
        if picks.is_empty() {
            return TestResult::discard();
        }
        // XML 1.0 cannot carry most control characters, and parsing
        // normalizes line endings
        if picks
            .iter()
            .any(|(_, s)| s.chars().any(|c| c.is_control() || c == '\u{FFFE}' || c == '\u{FFFF}'))
        {
            return TestResult::discard();
        }
        check(&mut XmlAccessor::new(), DocumentFormat::Xml, &picks)
    }
    QuickCheck::new()
        .tests(200)
        .quickcheck(prop as fn(Vec<(u8, String)>) -> TestResult);
}

#[test]
fn test_unresolved_value_reads_none() {
    let doc = Document::parse(DocumentFormat::Json, r#"{ "root": { "name": null } }"#).unwrap();
    let mut f = FieldValue::parse("/root/name").unwrap();
    JsonAccessor::new().read(&doc, &mut f).unwrap();
    assert_eq!(f.value, None::<Value>);
}
