//! Integration tests for trailhead-router
//!
//! Cover registration, override-by-order lookup, parameter extraction and
//! route removal through the public API only.

use pretty_assertions::assert_eq;
use regex::Regex;
use rstest::rstest;
use trailhead_router::*;

fn table_with(routes: &[(Verb, &str, u32)]) -> RouteTable<u32> {
    let mut table = RouteTable::new();
    for (verb, spec, id) in routes {
        table.register(*verb, *spec, *id).unwrap();
    }
    table
}

#[test]
fn test_register_returns_compiled_route() {
    let mut table = RouteTable::new();
    let route = table.register(Verb::Get, "/hello/:name", ()).unwrap();
    assert_eq!(route.verb(), Verb::Get);
    assert_eq!(route.param_names(), ["name".to_string()]);
    assert_eq!(route.pattern().source(), "/hello/:name");
}

#[rstest]
#[case("get")]
#[case("Post")]
#[case("PUT")]
#[case("delete")]
fn test_register_str_accepts_any_case(#[case] verb: &str) {
    let mut table = RouteTable::new();
    let route = table.register_str(verb, "/", ()).unwrap();
    assert_eq!(route.verb().as_str(), verb.to_uppercase());
}

#[rstest]
#[case("PATCH")]
#[case("HEAD")]
#[case("options")]
fn test_register_str_rejects_unknown_verbs(#[case] verb: &str) {
    let mut table = RouteTable::new();
    let err = table.register_str(verb, "/", ()).unwrap_err();
    assert!(matches!(err, RouterError::InvalidVerb(ref v) if v == verb));
    assert!(table.is_empty());
}

#[test]
fn test_last_registered_match_wins() {
    let table = table_with(&[
        (Verb::Get, "/posts/:id", 1),
        (Verb::Get, "/posts/new", 2),
        (Verb::Get, "/posts/:slug", 3),
    ]);

    let found = table.lookup(Verb::Get, "/posts/new").unwrap();
    assert_eq!(*found.route.handler(), 3);
    assert_eq!(found.params().get_str("slug"), Some("new"));
}

#[test]
fn test_reregistering_identical_pattern_shadows() {
    let table = table_with(&[(Verb::Get, "/", 1), (Verb::Get, "/", 2)]);
    assert_eq!(*table.lookup(Verb::Get, "/").unwrap().route.handler(), 2);
    assert_eq!(table.routes(Verb::Get).len(), 2);
}

#[test]
fn test_earlier_route_still_serves_non_overlapping_paths() {
    let table = table_with(&[(Verb::Get, "/a", 1), (Verb::Get, "/b", 2)]);
    assert_eq!(*table.lookup(Verb::Get, "/a").unwrap().route.handler(), 1);
}

#[test]
fn test_lookup_is_per_verb() {
    let table = table_with(&[(Verb::Post, "/items", 1)]);
    assert!(table.lookup(Verb::Get, "/items").is_none());
    assert!(table.lookup(Verb::Post, "/items").is_some());
}

#[test]
fn test_lookup_str_unknown_verb_finds_nothing() {
    let table = table_with(&[(Verb::Get, "/items", 1)]);
    assert!(table.lookup_str("PATCH", "/items").is_none());
    assert!(table.lookup_str("get", "/items").is_some());
}

#[test]
fn test_named_params_are_unescaped() {
    let table = table_with(&[(Verb::Get, "/hello/:name", 1)]);
    let params = table.lookup(Verb::Get, "/hello/big%20world").unwrap().params();
    assert_eq!(params.get_str("name"), Some("big world"));
}

#[test]
fn test_query_string_is_tolerated() {
    let table = table_with(&[(Verb::Get, "/:id", 1)]);
    let params = table.lookup(Verb::Get, "/5?id=9").unwrap().params();
    assert_eq!(params.get_str("id"), Some("5"));
    assert_eq!(params.len(), 1);
}

#[test]
fn test_raw_wildcard_yields_single_splat_string() {
    let mut table = RouteTable::new();
    table.register(Verb::Get, Regex::new(r"/(.*)").unwrap(), ()).unwrap();

    let params = table.lookup(Verb::Get, "/test/with/slashes").unwrap().params();
    assert_eq!(params.splat(), Some(&ParamValue::One("test/with/slashes".to_string())));
}

#[test]
fn test_raw_multi_capture_yields_splat_list() {
    let mut table = RouteTable::new();
    table
        .register(Verb::Get, Regex::new(r"^/say/([^/]+)/to/([^/]+)$").unwrap(), ())
        .unwrap();

    let params = table.lookup(Verb::Get, "/say/hello/to/world").unwrap().params();
    assert_eq!(
        params.splat(),
        Some(&ParamValue::Many(vec!["hello".to_string(), "world".to_string()]))
    );
}

#[test]
fn test_clear_removes_all_routes_for_verb() {
    let mut table = table_with(&[
        (Verb::Get, "/a", 1),
        (Verb::Get, "/b", 2),
        (Verb::Post, "/a", 3),
    ]);

    assert_eq!(table.clear(Verb::Get), 2);
    assert!(table.lookup(Verb::Get, "/a").is_none());
    assert!(table.lookup(Verb::Post, "/a").is_some());
    assert_eq!(table.clear(Verb::Delete), 0);
}

#[test]
fn test_remove_by_source_unshadows_earlier_route() {
    let mut table = table_with(&[(Verb::Get, "/x/:id", 1), (Verb::Get, "/x/:key", 2)]);

    assert_eq!(table.remove(Verb::Get, "/x/:key"), 1);
    assert_eq!(*table.lookup(Verb::Get, "/x/7").unwrap().route.handler(), 1);
    assert_eq!(table.len(), 1);
}

#[test]
fn test_debug_lists_patterns_by_verb() {
    let table = table_with(&[(Verb::Get, "/a", 1)]);
    let rendered = format!("{:?}", table);
    assert!(rendered.contains("Get"));
    assert!(rendered.contains("/a"));
}
