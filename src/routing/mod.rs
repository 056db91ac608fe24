//! Client-side routing: path patterns, route records, lazy views, and the
//! navigation value passed through the guard chain.
//!
//! SYSTEM CONTEXT
//! ==============
//! The `Router` only answers "which route is this location?". Deciding
//! whether a navigation may commit belongs to guards, and committing belongs
//! to the `Navigator`.

pub mod navigation;
pub mod path;
pub mod route;
pub mod router;
pub mod view;

pub use navigation::{Decision, GuardError, GuardFuture, Navigation, NavigationGuard};
pub use path::{Params, PathPattern};
pub use route::{Route, RouteMeta, RouteRecord};
pub use router::{RouteMatch, Router, RouterBuilder};
pub use view::{LazyView, View, ViewError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("route '{0}' has no view, redirect, or children")]
    EmptyRoute(String),
    #[error("duplicate route path '{0}'")]
    DuplicatePath(String),
    #[error("duplicate route name '{0}'")]
    DuplicateName(String),
    #[error("no route named '{0}'")]
    UnknownName(String),
    #[error("route '{pattern}' needs parameter '{param}'")]
    MissingParam { pattern: String, param: String },
}
