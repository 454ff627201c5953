//! Tests for the query module

use super::*;
use crate::error::{Error, ErrorKind};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::BTreeMap;
use test_case::test_case;

fn unencodable_key() -> BTreeMap<(u8, u8), u8> {
    let mut map = BTreeMap::new();
    map.insert((1, 2), 3);
    map
}

// ============================================================================
// ViewName Tests
// ============================================================================

#[test]
fn test_view_name_segments() {
    assert_eq!(
        ViewName::design("music", "by_artist").segments(),
        vec!["_design", "music", "_view", "by_artist"]
    );
    assert_eq!(ViewName::AllDocs.segments(), vec!["_all_docs"]);
    assert_eq!(ViewName::DesignDocs.segments(), vec!["_design_docs"]);
    assert_eq!(
        ViewName::ad_hoc("function(doc) { emit(doc._id, null); }").segments(),
        vec!["_temp_view"]
    );
}

#[test]
fn test_view_name_display() {
    assert_eq!(
        ViewName::design("music", "by_artist").to_string(),
        "_design/music/_view/by_artist"
    );
    assert_eq!(ViewName::AllDocs.to_string(), "_all_docs");
    assert!(ViewName::ad_hoc("function(doc) {}").is_ad_hoc());
    assert!(!ViewName::AllDocs.is_ad_hoc());
}

#[test]
fn test_view_name_deserialize() {
    let view: ViewName =
        serde_json::from_value(json!({"type": "design", "design_doc": "app", "view": "v"}))
            .unwrap();
    assert_eq!(view, ViewName::design("app", "v"));

    let view: ViewName = serde_json::from_value(json!({"type": "all_docs"})).unwrap();
    assert_eq!(view, ViewName::AllDocs);
}

// ============================================================================
// Compilation Tests
// ============================================================================

#[test]
fn test_compile_limit_and_default_reduce() {
    let compiled = ViewQuery::design("app", "v")
        .with_limit(10)
        .compile()
        .unwrap();
    assert_eq!(compiled.as_str(), "limit=10&reduce=false");
}

#[test]
fn test_compile_all_fields_in_fixed_order() {
    // Set in scrambled order to prove the output order is fixed
    let query = ViewQuery::design("app", "v")
        .with_update_seq(true)
        .with_inclusive_end(false)
        .with_include_docs(true)
        .with_group_level(2)
        .with_group(true)
        .with_skip(5)
        .with_descending(true)
        .with_stale(Staleness::UpdateAfter)
        .with_limit(20)
        .with_end_key_doc_id("zzz")
        .with_end_key(&json!(["b", 2]))
        .with_start_key_doc_id("aaa")
        .with_start_key(&json!(["a", 1]))
        .with_key(&7);

    let compiled = query.compile().unwrap();
    let names: Vec<String> = compiled.params().into_iter().map(|(k, _)| k).collect();
    assert_eq!(
        names,
        vec![
            "key",
            "startkey",
            "startkey_docid",
            "endkey",
            "endkey_docid",
            "limit",
            "stale",
            "descending",
            "skip",
            "group",
            "group_level",
            "reduce",
            "include_docs",
            "inclusive_end",
            "update_seq",
        ]
    );
    assert_eq!(
        compiled.as_str(),
        "key=7&startkey=%5B%22a%22%2C1%5D&startkey_docid=aaa&endkey=%5B%22b%22%2C2%5D\
         &endkey_docid=zzz&limit=20&stale=update_after&descending=true&skip=5&group=true\
         &group_level=2&reduce=false&include_docs=true&inclusive_end=false&update_seq=true"
    );
}

#[test]
fn test_compile_string_key_is_json_encoded() {
    let compiled = ViewQuery::design("app", "v")
        .with_start_key("foo")
        .compile()
        .unwrap();
    assert_eq!(compiled.as_str(), "startkey=%22foo%22&reduce=false");
    assert_eq!(compiled.get("startkey"), Some("\"foo\"".to_string()));
}

#[test_case(json!(42), "42" ; "number")]
#[test_case(json!("abc"), "%22abc%22" ; "string")]
#[test_case(json!(null), "null" ; "null")]
#[test_case(json!([1, 2]), "%5B1%2C2%5D" ; "array")]
#[test_case(json!({"a": true}), "%7B%22a%22%3Atrue%7D" ; "object")]
fn test_compile_end_key_encoding(key: serde_json::Value, expected: &str) {
    let compiled = ViewQuery::all_docs()
        .with_reduce(false)
        .with_end_key_json(key)
        .compile()
        .unwrap();
    assert_eq!(compiled.as_str(), format!("endkey={expected}&reduce=false"));
}

#[test_case(Staleness::AllowStale, "stale=ok" ; "allow stale")]
#[test_case(Staleness::UpdateAfter, "stale=update_after" ; "update after")]
fn test_compile_staleness(stale: Staleness, expected: &str) {
    let compiled = ViewQuery::all_docs().with_stale(stale).compile().unwrap();
    assert_eq!(compiled.as_str(), format!("{expected}&reduce=false"));
}

#[test]
fn test_compile_doc_id_is_escaped() {
    let compiled = ViewQuery::all_docs()
        .with_start_key("a")
        .with_start_key_doc_id("doc with space&amp")
        .compile()
        .unwrap();
    assert_eq!(
        compiled.get("startkey_docid"),
        Some("doc with space&amp".to_string())
    );
    assert!(!compiled.as_str().contains(' '));
}

#[test]
fn test_compile_minimal_query_has_no_separator() {
    let compiled = ViewQuery::all_docs().compile().unwrap();
    assert_eq!(compiled.as_str(), "reduce=false");
    assert!(!compiled.as_str().ends_with('&'));
}

#[test]
fn test_compile_unencodable_start_key_fails() {
    let query = ViewQuery::design("app", "v")
        .with_limit(10)
        .with_start_key(&unencodable_key());

    let err = query.compile().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Compilation);
    match err {
        Error::QueryCompilation { field, .. } => assert_eq!(field, "startkey"),
        other => panic!("Expected QueryCompilation, got {other:?}"),
    }
    assert!(query.start_key().is_none());
}

#[test]
fn test_compile_unencodable_key_and_end_key_fail() {
    let err = ViewQuery::all_docs()
        .with_key(&unencodable_key())
        .compile()
        .unwrap_err();
    assert!(matches!(err, Error::QueryCompilation { ref field, .. } if field == "key"));

    let err = ViewQuery::all_docs()
        .with_end_key(&unencodable_key())
        .compile()
        .unwrap_err();
    assert!(matches!(err, Error::QueryCompilation { ref field, .. } if field == "endkey"));
}

#[test_case("key", f64::NAN ; "key nan")]
#[test_case("key", f64::INFINITY ; "key positive infinity")]
#[test_case("key", f64::NEG_INFINITY ; "key negative infinity")]
#[test_case("startkey", f64::NAN ; "startkey nan")]
#[test_case("startkey", f64::INFINITY ; "startkey positive infinity")]
#[test_case("startkey", f64::NEG_INFINITY ; "startkey negative infinity")]
#[test_case("endkey", f64::NAN ; "endkey nan")]
#[test_case("endkey", f64::INFINITY ; "endkey positive infinity")]
#[test_case("endkey", f64::NEG_INFINITY ; "endkey negative infinity")]
fn test_compile_non_finite_key_fails(field: &str, number: f64) {
    let query = ViewQuery::all_docs();
    let query = match field {
        "key" => query.with_key(&number),
        "startkey" => query.with_start_key(&number),
        _ => query.with_end_key(&number),
    };

    let err = query.compile().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Compilation);
    assert!(matches!(err, Error::QueryCompilation { field: ref f, .. } if f == field));
}

#[test]
fn test_compile_non_finite_number_nested_in_key_fails() {
    let err = ViewQuery::all_docs()
        .with_start_key(&("artist", vec![Some(1.5_f32), Some(f32::NAN)]))
        .compile()
        .unwrap_err();
    assert!(matches!(err, Error::QueryCompilation { ref field, .. } if field == "startkey"));

    let mut map = BTreeMap::new();
    map.insert("score", f64::INFINITY);
    let err = ViewQuery::all_docs()
        .with_end_key(&map)
        .compile()
        .unwrap_err();
    assert!(matches!(err, Error::QueryCompilation { ref field, .. } if field == "endkey"));

    let compiled = ViewQuery::all_docs()
        .with_start_key(&("artist", 1.5_f64, None::<f64>))
        .compile()
        .unwrap();
    assert_eq!(
        compiled.get("startkey"),
        Some("[\"artist\",1.5,null]".to_string())
    );
}

#[test]
fn test_compile_rejects_doc_id_on_reduced_query() {
    let err = ViewQuery::design("app", "counts")
        .with_reduce(true)
        .with_start_key("a")
        .with_start_key_doc_id("doc1")
        .compile()
        .unwrap_err();
    assert!(matches!(err, Error::InvalidQuery { .. }));
    assert!(err.is_usage());
}

// ============================================================================
// Clone Tests
// ============================================================================

#[test]
fn test_clone_is_independent() {
    let original = ViewQuery::design("app", "v").with_start_key("a").with_limit(5);
    let advanced = original
        .clone()
        .with_start_key("z")
        .with_start_key_doc_id("doc9")
        .with_limit(11);

    assert_eq!(original.start_key(), Some(&json!("a")));
    assert_eq!(original.start_key_doc_id(), None);
    assert_eq!(original.limit(), Some(5));

    assert_eq!(advanced.start_key(), Some(&json!("z")));
    assert_eq!(advanced.start_key_doc_id(), Some("doc9"));
    assert_eq!(advanced.limit(), Some(11));
}

#[test]
fn test_accessors() {
    let query = ViewQuery::design("app", "v")
        .with_reduce(true)
        .with_group(true)
        .with_skip(3)
        .without_skip();
    assert!(query.is_reduced());
    assert_eq!(query.group(), Some(true));
    assert_eq!(query.skip(), None);
    assert_eq!(query.view(), &ViewName::design("app", "v"));
}
