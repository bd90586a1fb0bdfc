//! Property-based tests using QuickCheck

use fieldmap_path::PathExpression;
use quickcheck::{QuickCheck, TestResult};

const NAMES: &[&str] = &["order", "item", "address", "sku", "x", "line_2"];
const MARKERS: &[(&str, &str)] = &[("", ""), ("[", "]"), ("<", ">"), ("{", "}")];

/// Build a well-formed path from arbitrary selectors.
fn build_path(picks: &[(u8, u8, Option<u8>)]) -> String {
    let mut out = String::new();
    for (name, marker, index) in picks {
        let name = NAMES[*name as usize % NAMES.len()];
        let (open, close) = MARKERS[*marker as usize % MARKERS.len()];
        out.push('/');
        out.push_str(name);
        if !open.is_empty() {
            out.push_str(open);
            if let Some(i) = index {
                out.push_str(&i.to_string());
            }
            out.push_str(close);
        }
    }
    out
}

/// Property: rendering a parsed path yields the same string, and parsing it
/// again yields the same expression
#[test]
fn prop_display_round_trip() {
    fn prop(picks: Vec<(u8, u8, Option<u8>)>) -> TestResult {
        if picks.is_empty() {
            return TestResult::discard();
        }
        let input = build_path(&picks);
        let parsed = match PathExpression::parse(&input) {
            Ok(p) => p,
            Err(e) => return TestResult::error(e.to_string()),
        };
        let rendered = parsed.to_string();
        let reparsed = PathExpression::parse(&rendered).unwrap();
        TestResult::from_bool(rendered == input && reparsed == parsed)
    }

    QuickCheck::new()
        .tests(200)
        .quickcheck(prop as fn(Vec<(u8, u8, Option<u8>)>) -> TestResult);
}

/// Property: collection index substitution leaves no unindexed collection
#[test]
fn prop_collection_index_closes_every_collection() {
    fn prop(picks: Vec<(u8, u8, Option<u8>)>, index: u8) -> TestResult {
        if picks.is_empty() {
            return TestResult::discard();
        }
        let parsed = PathExpression::parse(&build_path(&picks)).unwrap();
        let substituted = parsed.with_collection_index(index as usize);
        TestResult::from_bool(
            substituted.len() == parsed.len()
                && substituted.first_unindexed_collection().is_none(),
        )
    }

    QuickCheck::new()
        .tests(200)
        .quickcheck(prop as fn(Vec<(u8, u8, Option<u8>)>, u8) -> TestResult);
}
