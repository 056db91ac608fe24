use tokio::sync::broadcast::error::TryRecvError;

use super::*;
use crate::identity::{AuthChannel, Identity};
use crate::routing::{Params, View};

fn app_with(channel: &AuthChannel) -> App {
    App::with_provider(Arc::new(channel.clone())).unwrap()
}

fn params(pairs: &[(&str, &str)]) -> Params {
    pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
}

// =============================================================================
// ROUTE TABLE
// =============================================================================

#[test]
fn route_table_builds() {
    let router = routes().unwrap();
    assert_eq!(router.records().count(), 11);
}

#[test]
fn protection_follows_table() {
    let router = routes().unwrap();
    for (path, protected) in [
        ("/", false),
        ("/register", false),
        ("/sign-in", false),
        ("/feed", false),
        ("/create-order", true),
        ("/orders", true),
        ("/orders/o-1", true),
        ("/orders/o-1/edit", true),
        ("/products", false),
        ("/products/p-1", false),
        ("/no/such/page", false),
    ] {
        let matched = router.resolve(path).unwrap();
        assert_eq!(matched.requires_auth(), protected, "{path}");
    }
}

#[test]
fn named_routes_build_hrefs() {
    let router = routes().unwrap();
    assert_eq!(router.href("orders", &Params::new()).unwrap(), "/orders");
    assert_eq!(router.href("edit-order", &params(&[("id", "o-7")])).unwrap(), "/orders/o-7/edit");
    assert_eq!(router.href("product", &params(&[("id", "p-2")])).unwrap(), "/products/p-2");
    assert!(matches!(router.href("order", &Params::new()), Err(RouteError::MissingParam { .. })));
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[tokio::test]
async fn signed_out_user_is_sent_to_sign_in() {
    let channel = AuthChannel::resolved(None);
    let app = app_with(&channel);
    let mut denials = app.denials.subscribe();

    let location = app.navigator.navigate("/create-order").await.unwrap();
    assert_eq!(location.path, paths::SIGN_IN);
    assert_eq!(location.view, Some(View::new("SignIn")));
    assert_eq!(denials.try_recv().unwrap().attempted, "/create-order");

    let location = app.navigator.navigate("/orders/o-1/edit").await.unwrap();
    assert_eq!(location.path, paths::SIGN_IN);
    assert_eq!(denials.try_recv().unwrap().attempted, "/orders/o-1/edit");

    let location = app.navigator.navigate("/").await.unwrap();
    assert_eq!(location.view, Some(View::new("Home")));
    assert!(matches!(denials.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn signed_in_user_reaches_orders() {
    let channel = AuthChannel::resolved(Some(Identity::new("u1")));
    let app = app_with(&channel);

    let location = app.navigator.navigate("/create-order").await.unwrap();
    assert_eq!(location.view, Some(View::new("CreateOrder")));

    let location = app.navigator.navigate("/orders/").await.unwrap();
    assert_eq!(location.name.as_deref(), Some("orders"));
    assert_eq!(location.view, Some(View::new("OrderList")));

    let location = app.navigator.navigate("/orders/o-9/edit").await.unwrap();
    assert_eq!(location.view, Some(View::new("EditOrder")));
    assert_eq!(location.params, params(&[("id", "o-9")]));
}

#[tokio::test]
async fn sign_out_then_protected_route_redirects() {
    let channel = AuthChannel::resolved(Some(Identity::new("u1")));
    let app = app_with(&channel);
    app.navigator.navigate("/orders").await.unwrap();

    channel.sign_out();
    let location = app.navigator.navigate("/orders").await.unwrap();
    assert_eq!(location.path, paths::SIGN_IN);
    assert_eq!(location.redirected_from.as_deref(), Some("/orders"));
}

#[tokio::test]
async fn home_alias_and_unknown_paths() {
    let app = app_with(&AuthChannel::resolved(None));

    let location = app.navigator.navigate(paths::HOME_ALIAS).await.unwrap();
    assert_eq!(location.path, paths::HOME);

    let location = app.navigator.navigate("/definitely/missing?x=1").await.unwrap();
    assert!(location.not_found);
    assert_eq!(location.view, Some(View::new("NotFound")));
    assert_eq!(location.full_path, "/definitely/missing?x=1");
}

#[tokio::test]
async fn bootstrap_without_stored_session_is_signed_out() {
    let config = AppConfig::from_json(
        r#"{"apiKey":"k","authDomain":"d.example.com","projectId":"p","appId":"a",
            "identityToolkitUrl":"http://127.0.0.1:9","secureTokenUrl":"http://127.0.0.1:9"}"#,
    )
    .unwrap();
    let app = App::bootstrap(&config).unwrap();
    assert!(app.identity_client().is_some());

    let location = app.navigator.navigate("/create-order").await.unwrap();
    assert_eq!(location.path, paths::SIGN_IN);
    assert_eq!(app.identity_client().unwrap().channel().current(), None);
}
