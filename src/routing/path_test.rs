use super::*;

fn params(pairs: &[(&str, &str)]) -> Params {
    pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
}

// =============================================================
// Parsing
// =============================================================

#[test]
fn parse_root_has_no_segments() {
    let p = PathPattern::parse("/").unwrap();
    assert!(p.segments().is_empty());
    assert_eq!(p.as_str(), "/");
}

#[test]
fn parse_canonicalizes_slashes() {
    let p = PathPattern::parse("//orders/:id/").unwrap();
    assert_eq!(p.as_str(), "/orders/:id");
    assert_eq!(p.segments(), &[Segment::Static("orders".into()), Segment::Param("id".into())]);
}

#[test]
fn parse_requires_leading_slash() {
    assert!(matches!(PathPattern::parse("orders"), Err(RouteError::InvalidPattern { .. })));
    assert!(PathPattern::parse_relative("orders").is_ok());
}

#[test]
fn parse_rejects_bad_param_names() {
    assert!(PathPattern::parse("/orders/:").is_err());
    assert!(PathPattern::parse("/orders/:order-id").is_err());
}

#[test]
fn parse_rejects_catch_all_before_end() {
    assert!(PathPattern::parse("/*rest/orders").is_err());
}

#[test]
fn parse_rejects_duplicate_params() {
    assert!(PathPattern::parse("/a/:id/b/:id").is_err());
}

#[test]
fn parse_rejects_query_in_pattern() {
    assert!(PathPattern::parse("/orders?tab=open").is_err());
}

#[test]
fn unnamed_catch_all_is_called_path() {
    let p = PathPattern::parse("/docs/*").unwrap();
    assert_eq!(p.as_str(), "/docs/*path");
}

#[test]
fn join_appends_child_segments() {
    let parent = PathPattern::parse("/orders").unwrap();
    let child = PathPattern::parse_relative(":id/edit").unwrap();
    assert_eq!(parent.join(&child).unwrap().as_str(), "/orders/:id/edit");

    let index = PathPattern::parse_relative("").unwrap();
    assert_eq!(parent.join(&index).unwrap().as_str(), "/orders");
}

#[test]
fn join_rejects_children_under_catch_all() {
    let parent = PathPattern::parse("/files/*rest").unwrap();
    let child = PathPattern::parse_relative("edit").unwrap();
    assert!(parent.join(&child).is_err());
}

// =============================================================
// Matching
// =============================================================

#[test]
fn static_pattern_matches_exactly() {
    let p = PathPattern::parse("/create-order").unwrap();
    assert_eq!(p.matches(&["create-order"]), Some(Params::new()));
    assert_eq!(p.matches(&["create-order", "x"]), None);
    assert_eq!(p.matches(&[]), None);
}

#[test]
fn param_pattern_captures_segment() {
    let p = PathPattern::parse("/orders/:id").unwrap();
    assert_eq!(p.matches(&["orders", "o-42"]), Some(params(&[("id", "o-42")])));
    assert_eq!(p.matches(&["orders"]), None);
}

#[test]
fn catch_all_matches_zero_or_more() {
    let p = PathPattern::parse("/docs/*rest").unwrap();
    assert_eq!(p.matches(&["docs"]), Some(params(&[("rest", "")])));
    assert_eq!(p.matches(&["docs", "a", "b"]), Some(params(&[("rest", "a/b")])));
    assert_eq!(p.matches(&["other"]), None);
}

#[test]
fn root_matches_only_empty_location() {
    let p = PathPattern::parse("/").unwrap();
    assert_eq!(p.matches(&[]), Some(Params::new()));
    assert_eq!(p.matches(&["feed"]), None);
}

// =============================================================
// Specificity
// =============================================================

#[test]
fn static_beats_param() {
    let fixed = PathPattern::parse("/orders/new").unwrap();
    let param = PathPattern::parse("/orders/:id").unwrap();
    assert!(fixed.specificity() > param.specificity());
}

#[test]
fn earlier_static_beats_later_static() {
    let a = PathPattern::parse("/orders/:id").unwrap();
    let b = PathPattern::parse("/:section/new").unwrap();
    assert!(a.specificity() > b.specificity());
}

#[test]
fn exact_beats_catch_all() {
    let exact = PathPattern::parse("/:a/:b/:c").unwrap();
    let catch_all = PathPattern::parse("/orders/*rest").unwrap();
    assert!(exact.specificity() > catch_all.specificity());
}

#[test]
fn longer_catch_all_prefix_wins() {
    let long = PathPattern::parse("/docs/api/*rest").unwrap();
    let short = PathPattern::parse("/docs/*rest").unwrap();
    assert!(long.specificity() > short.specificity());
}

// =============================================================
// Building
// =============================================================

#[test]
fn build_substitutes_params() {
    let p = PathPattern::parse("/orders/:id/edit").unwrap();
    assert_eq!(p.build(&params(&[("id", "o-7")])).unwrap(), "/orders/o-7/edit");
}

#[test]
fn build_missing_param_fails() {
    let p = PathPattern::parse("/orders/:id").unwrap();
    assert_eq!(
        p.build(&Params::new()),
        Err(RouteError::MissingParam { pattern: "/orders/:id".into(), param: "id".into() })
    );
}

#[test]
fn build_rejects_param_with_slash() {
    let p = PathPattern::parse("/orders/:id").unwrap();
    assert!(p.build(&params(&[("id", "a/b")])).is_err());
}

#[test]
fn build_root_and_empty_catch_all() {
    assert_eq!(PathPattern::parse("/").unwrap().build(&Params::new()).unwrap(), "/");
    let p = PathPattern::parse("/docs/*rest").unwrap();
    assert_eq!(p.build(&Params::new()).unwrap(), "/docs");
    assert_eq!(p.build(&params(&[("rest", "a/b")])).unwrap(), "/docs/a/b");
}

// =============================================================
// Location splitting
// =============================================================

#[test]
fn split_location_separates_query_and_fragment() {
    let split = split_location("/orders/42/?tab=items#notes");
    assert_eq!(split.segments, vec!["orders", "42"]);
    assert_eq!(split.query, Some("tab=items"));
    assert_eq!(split.fragment, Some("notes"));
    assert_eq!(split.path(), "/orders/42");
}

#[test]
fn split_location_root_and_empty_parts() {
    let split = split_location("/?#");
    assert!(split.segments.is_empty());
    assert_eq!(split.query, None);
    assert_eq!(split.fragment, None);
    assert_eq!(split.path(), "/");
    assert_eq!(split_location("").path(), "/");
}
