use super::*;

fn view(name: &str) -> LazyView {
    LazyView::ready(name)
}

fn sample_router() -> Router {
    Router::builder()
        .route(Route::new("/", view("Home")).named("home"))
        .route(Route::new("/sign-in", view("SignIn")).named("sign-in"))
        .route(Route::new("/create-order", view("CreateOrder")).requires_auth())
        .route(
            Route::group("/orders")
                .requires_auth()
                .child(Route::new("", view("OrderList")).named("orders"))
                .child(Route::new("new", view("NewOrder")))
                .child(Route::new(":id", view("OrderDetail")).named("order"))
                .child(Route::new(":id/edit", view("EditOrder")).named("edit-order")),
        )
        .route(Route::new("/products/:id", view("ProductDetail")))
        .route(Route::redirect("/home", "/"))
        .fallback(view("NotFound"))
        .build()
        .unwrap()
}

#[test]
fn resolves_static_route() {
    let m = sample_router().resolve("/sign-in").unwrap();
    assert_eq!(m.record.pattern.as_str(), "/sign-in");
    assert_eq!(m.name(), Some("sign-in"));
    assert!(!m.not_found);
    assert!(!m.requires_auth());
}

#[test]
fn root_route_is_public() {
    let m = sample_router().resolve("/").unwrap();
    assert_eq!(m.record.view.as_ref().map(LazyView::name), Some("Home"));
    assert!(!m.requires_auth());
}

#[test]
fn own_flag_requires_auth() {
    assert!(sample_router().resolve("/create-order").unwrap().requires_auth());
}

#[test]
fn child_inherits_requires_auth_from_group() {
    let m = sample_router().resolve("/orders/o-42/edit").unwrap();
    assert_eq!(m.params.get("id").map(String::as_str), Some("o-42"));
    assert_eq!(m.chain.len(), 2);
    assert!(!m.record.meta.requires_auth, "flag lives on the parent");
    assert!(m.requires_auth());
}

#[test]
fn index_child_matches_group_path() {
    let m = sample_router().resolve("/orders/").unwrap();
    assert_eq!(m.name(), Some("orders"));
    assert_eq!(m.path, "/orders");
    assert!(m.requires_auth());
}

#[test]
fn static_child_beats_param_child() {
    let m = sample_router().resolve("/orders/new").unwrap();
    assert_eq!(m.record.view.as_ref().map(LazyView::name), Some("NewOrder"));
    assert!(m.params.is_empty());
}

#[test]
fn query_is_kept_separately() {
    let m = sample_router().resolve("/products/p-1?ref=feed#top").unwrap();
    assert_eq!(m.path, "/products/p-1");
    assert_eq!(m.query.as_deref(), Some("ref=feed"));
    assert_eq!(m.full_path(), "/products/p-1?ref=feed");
}

#[test]
fn unmatched_location_uses_fallback() {
    let m = sample_router().resolve("/no/such/page").unwrap();
    assert!(m.not_found);
    assert_eq!(m.params.get("path").map(String::as_str), Some("no/such/page"));
    assert!(!m.requires_auth());
}

#[test]
fn unmatched_location_without_fallback_is_none() {
    let router = Router::builder().route(Route::new("/", view("Home"))).build().unwrap();
    assert!(router.resolve("/missing").is_none());
}

#[test]
fn redirect_route_is_matchable() {
    let m = sample_router().resolve("/home").unwrap();
    assert_eq!(m.record.redirect.as_deref(), Some("/"));
}

#[test]
fn same_shape_conflicts_and_longer_prefix_wins() {
    let router = Router::builder()
        .route(Route::new("/:a/x", view("First")))
        .route(Route::new("/:b/x/", view("Second")).named("second"))
        .build();
    assert!(matches!(router, Err(RouteError::DuplicatePath(_))));

    let router = Router::builder()
        .route(Route::new("/docs/*rest", view("Docs")))
        .route(Route::new("/*all", view("Everything")))
        .build()
        .unwrap();
    let m = router.resolve("/docs/intro").unwrap();
    assert_eq!(m.record.view.as_ref().map(LazyView::name), Some("Docs"));
}

#[test]
fn href_builds_named_paths() {
    let router = sample_router();
    let mut params = Params::new();
    params.insert("id".into(), "o-9".into());
    assert_eq!(router.href("edit-order", &params).unwrap(), "/orders/o-9/edit");
    assert_eq!(router.href("home", &Params::new()).unwrap(), "/");
    assert_eq!(router.href("missing", &Params::new()), Err(RouteError::UnknownName("missing".into())));
}

#[test]
fn build_rejects_duplicate_names() {
    let result = Router::builder()
        .route(Route::new("/a", view("A")).named("dup"))
        .route(Route::new("/b", view("B")).named("dup"))
        .build();
    assert!(matches!(result, Err(RouteError::DuplicateName(name)) if name == "dup"));
}

#[test]
fn build_rejects_empty_route() {
    let result = Router::builder().route(Route::group("/nothing")).build();
    assert!(matches!(result, Err(RouteError::EmptyRoute(path)) if path == "/nothing"));
}

#[test]
fn build_rejects_relative_top_level_path() {
    let result = Router::builder().route(Route::new("orders", view("Orders"))).build();
    assert!(matches!(result, Err(RouteError::InvalidPattern { .. })));
}

#[test]
fn build_rejects_parent_and_index_child_with_views() {
    let result = Router::builder()
        .route(Route::new("/orders", view("Orders")).child(Route::new("", view("OrderIndex"))))
        .build();
    assert!(matches!(result, Err(RouteError::DuplicatePath(path)) if path == "/orders"));
}

#[test]
fn records_lists_matchable_routes_in_order() {
    let router = sample_router();
    let paths: Vec<&str> = router.records().map(|r| r.pattern.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "/",
            "/sign-in",
            "/create-order",
            "/orders",
            "/orders/new",
            "/orders/:id",
            "/orders/:id/edit",
            "/products/:id",
            "/home"
        ]
    );
}
