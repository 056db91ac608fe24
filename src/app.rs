//! Application wiring: route table and startup.
//!
//! SYSTEM CONTEXT
//! ==============
//! `bootstrap` is the single startup routine. It takes the loaded
//! `AppConfig`, builds the identity client and the router, registers the
//! auth guard, and starts restoring the persisted session in the background.
//! Navigations issued before the restore finishes simply wait in the guard.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::sync::Arc;

use crate::config::{AppConfig, ConfigError};
use crate::guard::{AuthGuard, SIGN_IN_PATH};
use crate::identity::{IdentityError, IdentityProvider, RestIdentityProvider, SessionStore};
use crate::navigator::Navigator;
use crate::notify::DenialNotifier;
use crate::routing::{LazyView, Route, RouteError, Router};

/// Location paths of the route table.
pub mod paths {
    pub const HOME: &str = "/";
    pub const REGISTER: &str = "/register";
    pub const SIGN_IN: &str = super::SIGN_IN_PATH;
    pub const FEED: &str = "/feed";
    pub const CREATE_ORDER: &str = "/create-order";
    pub const ORDERS: &str = "/orders";
    pub const PRODUCTS: &str = "/products";
    pub const HOME_ALIAS: &str = "/home";
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

// =============================================================================
// ROUTES
// =============================================================================

/// The application route table.
pub fn routes() -> Result<Router, RouteError> {
    Router::builder()
        .route(Route::new(paths::HOME, LazyView::ready("Home")).named("home").title("Home"))
        .route(Route::new(paths::REGISTER, LazyView::ready("Register")).named("register").title("Register"))
        .route(Route::new(paths::SIGN_IN, LazyView::ready("SignIn")).named("sign-in").title("Sign in"))
        .route(Route::new(paths::FEED, LazyView::ready("Feed")).named("feed").title("Feed"))
        .route(
            Route::new(paths::CREATE_ORDER, LazyView::ready("CreateOrder"))
                .named("create-order")
                .title("New order")
                .requires_auth(),
        )
        .route(
            Route::group(paths::ORDERS)
                .requires_auth()
                .child(Route::new("", LazyView::ready("OrderList")).named("orders").title("Orders"))
                .child(Route::new(":id", LazyView::ready("OrderDetail")).named("order").title("Order"))
                .child(Route::new(":id/edit", LazyView::ready("EditOrder")).named("edit-order").title("Edit order")),
        )
        .route(Route::new(paths::PRODUCTS, LazyView::ready("ProductList")).named("products").title("Products"))
        .route(Route::new("/products/:id", LazyView::ready("ProductDetail")).named("product").title("Product"))
        .route(Route::redirect(paths::HOME_ALIAS, paths::HOME))
        .fallback(LazyView::ready("NotFound"))
        .build()
}

// =============================================================================
// APP
// =============================================================================

pub struct App {
    pub navigator: Arc<Navigator>,
    pub identity: Arc<dyn IdentityProvider>,
    pub denials: DenialNotifier,
    client: Option<Arc<RestIdentityProvider>>,
}

impl App {
    /// Wire the route table and auth guard around an existing provider.
    pub fn with_provider(identity: Arc<dyn IdentityProvider>) -> Result<Self, AppError> {
        let denials = DenialNotifier::default();
        let guard = AuthGuard::new(Arc::clone(&identity), denials.clone());
        let navigator = Navigator::new(Arc::new(routes()?)).with_guard(Arc::new(guard));
        Ok(Self { navigator: Arc::new(navigator), identity, denials, client: None })
    }

    /// Build the app against the hosted identity service and start
    /// restoring the persisted session.
    pub fn bootstrap(config: &AppConfig) -> Result<Self, AppError> {
        let session = SessionStore::from_path(config.session_path.as_deref());
        let client = Arc::new(RestIdentityProvider::new(config, session)?);

        let mut app = Self::with_provider(Arc::clone(&client) as Arc<dyn IdentityProvider>)?;
        app.client = Some(Arc::clone(&client));

        tokio::spawn(async move {
            let _ = client.restore().await;
        });
        tracing::info!(project = %config.project_id, "app bootstrapped");
        Ok(app)
    }

    /// The hosted identity client, when the app was bootstrapped from config.
    #[must_use]
    pub fn identity_client(&self) -> Option<&Arc<RestIdentityProvider>> {
        self.client.as_ref()
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("navigator", &self.navigator)
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}
