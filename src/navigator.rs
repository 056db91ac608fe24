//! Navigation driver: resolve, guard, load, commit.
//!
//! DESIGN
//! ======
//! Each call to `navigate` is an independent attempt; attempts are neither
//! queued nor coalesced, and guard checks already running are never
//! cancelled. Every attempt takes a ticket when it starts. At commit time an
//! attempt older than the last committed one is reported as `Superseded`
//! instead of overwriting the later location. A newer attempt that fails
//! commits nothing, so it never displaces an older one.
//!
//! Static route redirects are followed before guards run. Guard redirects
//! start a fresh `Navigation` from the same current location. Both count
//! toward `MAX_REDIRECTS`.

#[cfg(test)]
#[path = "navigator_test.rs"]
mod navigator_test;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;

use crate::error::ErrorCode;
use crate::routing::{Decision, GuardError, Navigation, NavigationGuard, Params, RouteMatch, Router, View, ViewError};

pub const MAX_REDIRECTS: usize = 8;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("no route matches '{0}'")]
    NotFound(String),
    #[error("navigation aborted by guard '{guard}'")]
    Aborted { guard: &'static str },
    #[error(transparent)]
    Guard(#[from] GuardError),
    #[error("too many redirects while navigating to '{0}'")]
    RedirectLoop(String),
    #[error(transparent)]
    View(#[from] ViewError),
    #[error("navigation to '{0}' was superseded by a newer navigation")]
    Superseded(String),
}

impl ErrorCode for NavigationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_NAV_NOT_FOUND",
            Self::Aborted { .. } => "E_NAV_ABORTED",
            Self::Guard(err) => err.error_code(),
            Self::RedirectLoop(_) => "E_NAV_REDIRECT_LOOP",
            Self::View(_) => "E_NAV_VIEW_LOAD",
            Self::Superseded(_) => "E_NAV_SUPERSEDED",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Guard(err) => err.retryable(),
            Self::View(_) => true,
            _ => false,
        }
    }
}

// =============================================================================
// LOCATION
// =============================================================================

/// A committed navigation: what is on screen now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub full_path: String,
    pub name: Option<String>,
    pub params: Params,
    pub view: Option<View>,
    /// The location originally requested, when redirects were followed.
    pub redirected_from: Option<String>,
    pub not_found: bool,
}

// =============================================================================
// NAVIGATOR
// =============================================================================

/// The route on screen and the ticket of the attempt that put it there.
#[derive(Default)]
struct Committed {
    ticket: u64,
    route: Option<RouteMatch>,
}

pub struct Navigator {
    router: Arc<Router>,
    guards: Vec<Arc<dyn NavigationGuard>>,
    current: watch::Sender<Option<Location>>,
    committed: Mutex<Committed>,
    ticket: AtomicU64,
}

impl Navigator {
    #[must_use]
    pub fn new(router: Arc<Router>) -> Self {
        let (current, _rx) = watch::channel(None);
        Self {
            router,
            guards: Vec::new(),
            current,
            committed: Mutex::new(Committed::default()),
            ticket: AtomicU64::new(0),
        }
    }

    /// Register a guard. Guards run in registration order before every
    /// navigation.
    #[must_use]
    pub fn with_guard(mut self, guard: Arc<dyn NavigationGuard>) -> Self {
        self.guards.push(guard);
        self
    }

    #[must_use]
    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    #[must_use]
    pub fn current(&self) -> Option<Location> {
        self.current.borrow().clone()
    }

    /// Watch committed locations.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Location>> {
        self.current.subscribe()
    }

    pub async fn navigate(&self, target: &str) -> Result<Location, NavigationError> {
        let ticket = self.ticket.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self.run(target, ticket).await;
        match &result {
            Ok(location) => tracing::info!(
                path = %location.full_path,
                redirected_from = ?location.redirected_from,
                not_found = location.not_found,
                "navigation committed"
            ),
            Err(err) => tracing::warn!(to = target, code = err.error_code(), error = %err, "navigation failed"),
        }
        result
    }

    async fn run(&self, target: &str, ticket: u64) -> Result<Location, NavigationError> {
        let from = self.current_match();
        let mut next = target.to_owned();
        let mut redirects = 0usize;

        let to = 'attempt: loop {
            let to = self.router.resolve(&next).ok_or_else(|| NavigationError::NotFound(next.clone()))?;

            if let Some(redirect) = &to.record.redirect {
                next = follow(redirect, &mut redirects, target)?;
                continue;
            }

            let navigation = Navigation::new(to, from.clone());
            for guard in &self.guards {
                match guard.check(&navigation).await? {
                    Decision::Proceed => {}
                    Decision::Redirect(redirect) => {
                        tracing::debug!(navigation = %navigation.id, guard = guard.name(), to = %redirect, "guard redirect");
                        next = follow(&redirect, &mut redirects, target)?;
                        continue 'attempt;
                    }
                    Decision::Abort => return Err(NavigationError::Aborted { guard: guard.name() }),
                }
            }
            break navigation.to;
        };

        let view = match &to.record.view {
            Some(lazy) => Some(lazy.load().await?),
            None => None,
        };

        let location = Location {
            path: to.path.clone(),
            full_path: to.full_path(),
            name: to.name().map(str::to_owned),
            params: to.params.clone(),
            view,
            redirected_from: (redirects > 0).then(|| target.to_owned()),
            not_found: to.not_found,
        };

        let mut committed = self.committed.lock().unwrap_or_else(PoisonError::into_inner);
        if committed.ticket > ticket {
            return Err(NavigationError::Superseded(target.to_owned()));
        }
        committed.ticket = ticket;
        committed.route = Some(to);
        self.current.send_replace(Some(location.clone()));
        Ok(location)
    }

    fn current_match(&self) -> Option<RouteMatch> {
        self.committed.lock().unwrap_or_else(PoisonError::into_inner).route.clone()
    }
}

fn follow(redirect: &str, redirects: &mut usize, target: &str) -> Result<String, NavigationError> {
    *redirects += 1;
    if *redirects > MAX_REDIRECTS {
        return Err(NavigationError::RedirectLoop(target.to_owned()));
    }
    Ok(redirect.to_owned())
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("router", &self.router)
            .field("guards", &self.guards.iter().map(|g| g.name()).collect::<Vec<_>>())
            .field("current", &self.current.borrow().as_ref().map(|l| l.full_path.clone()))
            .finish_non_exhaustive()
    }
}
