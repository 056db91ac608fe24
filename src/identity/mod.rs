//! Identity provider capability surface.
//!
//! SYSTEM CONTEXT
//! ==============
//! The signed-in user is owned by an external identity service. This crate
//! only observes it: providers accept callback observers and hand back a
//! [`Subscription`] that releases the observer. Route guards consume the
//! one-shot form, [`current_identity`], which turns the first report into an
//! awaitable value.
//!
//! DESIGN
//! ======
//! The subscription is a drop guard. `current_identity` keeps it in scope for
//! the whole await, so the observer is released after the first report and
//! also when the caller drops the future early.

pub mod channel;
pub mod rest;
pub mod session;


use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

pub use channel::{AuthChannel, AuthPhase};
pub use rest::RestIdentityProvider;
pub use session::{SessionStore, StoredSession};

use crate::error::ErrorCode;

// =============================================================================
// IDENTITY
// =============================================================================

/// A signed-in user record as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
}

impl Identity {
    #[must_use]
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into(), email: None, display_name: None, email_verified: false }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// The identity service could not be reached.
    #[error("identity request failed: {0}")]
    Transport(String),

    /// The identity service answered with a non-success status.
    #[error("identity service error: status {status}: {message}")]
    Provider { status: u16, message: String },

    /// A response body did not have the expected shape.
    #[error("identity response parse failed: {0}")]
    Parse(String),

    /// The persisted session could not be read or written.
    #[error("session storage failed: {0}")]
    Session(String),

    /// The provider released the observer without ever reporting.
    #[error("identity provider released the observer before reporting")]
    ObserverDropped,

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ErrorCode for IdentityError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "E_IDENTITY_TRANSPORT",
            Self::Provider { .. } => "E_IDENTITY_PROVIDER",
            Self::Parse(_) => "E_IDENTITY_PARSE",
            Self::Session(_) => "E_IDENTITY_SESSION",
            Self::ObserverDropped => "E_IDENTITY_OBSERVER_DROPPED",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Provider { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// OBSERVATION
// =============================================================================

/// What a provider reports to its observers: the current identity, `None`
/// when signed out, or the failure that prevented resolving it.
pub type IdentityReport = Result<Option<Identity>, IdentityError>;

/// Callback invoked with each identity report.
pub type Observer = Arc<dyn Fn(&IdentityReport) + Send + Sync>;

/// An identity source that can be observed.
pub trait IdentityProvider: Send + Sync {
    /// Register `observer`.
    ///
    /// The observer is called with the current report as soon as the provider
    /// knows it (possibly before this returns) and again on every change,
    /// until the returned subscription is released.
    fn observe(&self, observer: Observer) -> Subscription;
}

/// Handle for a registered observer. Releases it exactly once, either via
/// [`Subscription::unsubscribe`] or on drop.
#[must_use = "dropping a subscription releases its observer immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self { release: Some(Box::new(release)) }
    }

    pub fn unsubscribe(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_once();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("active", &self.release.is_some()).finish()
    }
}

/// Wait for the provider's next report, then release the observer.
///
/// This is a one-shot observation, not a subscription: later changes are not
/// seen. There is no timeout; an unresponsive provider keeps the caller
/// suspended until the future is dropped.
pub async fn current_identity<P>(provider: &P) -> IdentityReport
where
    P: IdentityProvider + ?Sized,
{
    let (tx, rx) = oneshot::channel();
    let slot = Mutex::new(Some(tx));
    let subscription = provider.observe(Arc::new(move |report: &IdentityReport| {
        let sender = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(sender) = sender {
            let _ = sender.send(report.clone());
        }
    }));

    let report = rx.await.unwrap_or(Err(IdentityError::ObserverDropped));
    subscription.unsubscribe();
    report
}
