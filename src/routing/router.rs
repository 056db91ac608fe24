//! Route table compilation and location resolution.
//!
//! DESIGN
//! ======
//! Routes are flattened at build time into entries, one per matchable record,
//! each carrying its full ancestor chain. Resolution is a linear scan keeping
//! the most specific match; ties go to the earlier registration. The table is
//! small and built once, so no trie.

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;

use std::collections::HashMap;
use std::sync::Arc;

use super::RouteError;
use super::path::{Params, PathPattern, Segment, Specificity, split_location};
use super::route::{Route, RouteMeta, RouteRecord};
use super::view::LazyView;

// =============================================================================
// MATCH
// =============================================================================

/// The result of resolving one location against the table.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// Normalized path (leading slash, no empty segments).
    pub path: String,
    pub query: Option<String>,
    pub params: Params,
    /// Matched leaf record.
    pub record: Arc<RouteRecord>,
    /// Outermost ancestor first, leaf last.
    pub chain: Vec<Arc<RouteRecord>>,
    /// Set when only the fallback matched.
    pub not_found: bool,
}

impl RouteMatch {
    /// True when the leaf or any ancestor requires a signed-in identity.
    #[must_use]
    pub fn requires_auth(&self) -> bool {
        self.chain.iter().any(|record| record.meta.requires_auth)
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.record.name.as_deref()
    }

    #[must_use]
    pub fn full_path(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{query}", self.path),
            None => self.path.clone(),
        }
    }
}

// =============================================================================
// ROUTER
// =============================================================================

struct Entry {
    chain: Vec<Arc<RouteRecord>>,
    specificity: Specificity,
}

impl Entry {
    fn leaf(&self) -> &Arc<RouteRecord> {
        // Entries are only created from a non-empty chain.
        &self.chain[self.chain.len() - 1]
    }
}

pub struct Router {
    entries: Vec<Entry>,
    names: HashMap<String, Arc<RouteRecord>>,
    fallback: Option<Arc<RouteRecord>>,
}

impl Router {
    #[must_use]
    pub fn builder() -> RouterBuilder {
        RouterBuilder::default()
    }

    /// Find the most specific route for `location`, or the fallback.
    ///
    /// Returns `None` only when nothing matches and no fallback is set.
    #[must_use]
    pub fn resolve(&self, location: &str) -> Option<RouteMatch> {
        let split = split_location(location);
        let mut best: Option<(&Entry, Params)> = None;
        for entry in &self.entries {
            let Some(params) = entry.leaf().pattern.matches(&split.segments) else {
                continue;
            };
            if best.as_ref().is_none_or(|(current, _)| entry.specificity > current.specificity) {
                best = Some((entry, params));
            }
        }

        let query = split.query.map(str::to_owned);
        if let Some((entry, params)) = best {
            return Some(RouteMatch {
                path: split.path(),
                query,
                params,
                record: Arc::clone(entry.leaf()),
                chain: entry.chain.clone(),
                not_found: false,
            });
        }

        let fallback = self.fallback.as_ref()?;
        let params = fallback.pattern.matches(&split.segments).unwrap_or_default();
        Some(RouteMatch {
            path: split.path(),
            query,
            params,
            record: Arc::clone(fallback),
            chain: vec![Arc::clone(fallback)],
            not_found: true,
        })
    }

    /// Build the path for a named route.
    pub fn href(&self, name: &str, params: &Params) -> Result<String, RouteError> {
        let record = self.names.get(name).ok_or_else(|| RouteError::UnknownName(name.to_owned()))?;
        record.pattern.build(params)
    }

    /// Matchable records in registration order.
    pub fn records(&self) -> impl Iterator<Item = &Arc<RouteRecord>> {
        self.entries.iter().map(Entry::leaf)
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.records().map(|r| r.pattern.as_str()).collect::<Vec<_>>())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

// =============================================================================
// BUILDER
// =============================================================================

#[derive(Default)]
pub struct RouterBuilder {
    routes: Vec<Route>,
    fallback: Option<LazyView>,
}

impl RouterBuilder {
    #[must_use]
    pub fn route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    /// View shown when no route matches.
    #[must_use]
    pub fn fallback(mut self, view: LazyView) -> Self {
        self.fallback = Some(view);
        self
    }

    pub fn build(self) -> Result<Router, RouteError> {
        let mut router = Router { entries: Vec::new(), names: HashMap::new(), fallback: None };
        for route in self.routes {
            compile(route, None, &[], &mut router)?;
        }
        if let Some(view) = self.fallback {
            router.fallback = Some(Arc::new(RouteRecord {
                pattern: PathPattern::parse("/*path")?,
                name: None,
                view: Some(view),
                redirect: None,
                meta: RouteMeta::default(),
            }));
        }
        tracing::debug!(routes = router.entries.len(), "router built");
        Ok(router)
    }
}

fn compile(
    route: Route,
    parent: Option<&PathPattern>,
    ancestors: &[Arc<RouteRecord>],
    router: &mut Router,
) -> Result<(), RouteError> {
    let pattern = match parent {
        None => PathPattern::parse(&route.path)?,
        Some(parent) => parent.join(&PathPattern::parse_relative(&route.path)?)?,
    };
    if route.view.is_none() && route.redirect.is_none() && route.children.is_empty() {
        return Err(RouteError::EmptyRoute(pattern.to_string()));
    }

    let record = Arc::new(RouteRecord {
        pattern: pattern.clone(),
        name: route.name,
        view: route.view,
        redirect: route.redirect,
        meta: route.meta,
    });

    if let Some(name) = &record.name {
        if router.names.contains_key(name) {
            return Err(RouteError::DuplicateName(name.clone()));
        }
        router.names.insert(name.clone(), Arc::clone(&record));
    }

    let mut chain = ancestors.to_vec();
    chain.push(Arc::clone(&record));

    if record.is_matchable() {
        if router.entries.iter().any(|e| same_shape(&e.leaf().pattern, &pattern)) {
            return Err(RouteError::DuplicatePath(pattern.to_string()));
        }
        router.entries.push(Entry { chain: chain.clone(), specificity: pattern.specificity() });
    }

    for child in route.children {
        compile(child, Some(&pattern), &chain, router)?;
    }
    Ok(())
}

/// Two patterns that differ only in parameter names match the same locations.
fn same_shape(a: &PathPattern, b: &PathPattern) -> bool {
    a.segments().len() == b.segments().len()
        && a.segments().iter().zip(b.segments()).all(|pair| match pair {
            (Segment::Static(x), Segment::Static(y)) => x == y,
            (Segment::Param(_), Segment::Param(_)) | (Segment::CatchAll(_), Segment::CatchAll(_)) => true,
            _ => false,
        })
}
