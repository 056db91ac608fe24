//! Route declarations and their compiled records.

use super::path::PathPattern;
use super::view::LazyView;

/// Per-route access metadata. Children inherit a parent's `requires_auth`
/// through the matched chain rather than by copying.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub title: Option<String>,
}

/// Declarative route definition, as written in the route table.
///
/// Top-level paths are absolute (`/orders`); child paths are relative
/// (`:id`, `:id/edit`, or `""` for the index child).
#[derive(Debug, Clone)]
pub struct Route {
    pub(crate) path: String,
    pub(crate) name: Option<String>,
    pub(crate) view: Option<LazyView>,
    pub(crate) redirect: Option<String>,
    pub(crate) meta: RouteMeta,
    pub(crate) children: Vec<Route>,
}

impl Route {
    #[must_use]
    pub fn new(path: &str, view: LazyView) -> Self {
        Self { view: Some(view), ..Self::group(path) }
    }

    /// A route that only groups children and contributes metadata.
    #[must_use]
    pub fn group(path: &str) -> Self {
        Self {
            path: path.to_owned(),
            name: None,
            view: None,
            redirect: None,
            meta: RouteMeta::default(),
            children: Vec::new(),
        }
    }

    /// A route that sends the navigation elsewhere before any guard runs.
    #[must_use]
    pub fn redirect(path: &str, target: &str) -> Self {
        Self { redirect: Some(target.to_owned()), ..Self::group(path) }
    }

    #[must_use]
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_owned());
        self
    }

    #[must_use]
    pub fn requires_auth(mut self) -> Self {
        self.meta.requires_auth = true;
        self
    }

    #[must_use]
    pub fn title(mut self, title: &str) -> Self {
        self.meta.title = Some(title.to_owned());
        self
    }

    #[must_use]
    pub fn child(mut self, child: Route) -> Self {
        self.children.push(child);
        self
    }
}

/// A compiled route: absolute pattern, immutable after the router is built.
#[derive(Debug)]
pub struct RouteRecord {
    pub pattern: PathPattern,
    pub name: Option<String>,
    pub view: Option<LazyView>,
    pub redirect: Option<String>,
    pub meta: RouteMeta,
}

impl RouteRecord {
    /// Records with something to show or somewhere to go can be matched.
    #[must_use]
    pub fn is_matchable(&self) -> bool {
        self.view.is_some() || self.redirect.is_some()
    }
}
