//! Navigation attempts and the guard interface.

use std::future::Future;
use std::pin::Pin;

use uuid::Uuid;

use super::router::RouteMatch;
use crate::error::ErrorCode;
use crate::identity::IdentityError;

/// One attempt to move from the current route to another.
#[derive(Debug, Clone)]
pub struct Navigation {
    pub id: Uuid,
    pub to: RouteMatch,
    pub from: Option<RouteMatch>,
}

impl Navigation {
    #[must_use]
    pub fn new(to: RouteMatch, from: Option<RouteMatch>) -> Self {
        Self { id: Uuid::new_v4(), to, from }
    }
}

/// What a guard wants done with a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    /// Abandon this navigation and start a new one to the given location.
    Redirect(String),
    /// Stay on the current route.
    Abort,
}

/// A guard that could not reach a decision. The navigation is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    #[error("identity check failed: {0}")]
    Identity(#[from] IdentityError),
}

impl ErrorCode for GuardError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Identity(err) => err.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Identity(err) => err.retryable(),
        }
    }
}

pub type GuardFuture<'a> = Pin<Box<dyn Future<Output = Result<Decision, GuardError>> + Send + 'a>>;

/// Interceptor run before a navigation commits.
pub trait NavigationGuard: Send + Sync {
    /// Short label for logs.
    fn name(&self) -> &'static str;

    fn check<'a>(&'a self, navigation: &'a Navigation) -> GuardFuture<'a>;
}
