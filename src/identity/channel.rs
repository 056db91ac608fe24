//! In-process auth-state channel.
//!
//! Holds the last known identity report and the set of live observers. The
//! REST provider publishes into one of these; tests and offline runs drive
//! it directly.

#[cfg(test)]
#[path = "channel_test.rs"]
mod channel_test;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use super::{Identity, IdentityError, IdentityProvider, IdentityReport, Observer, Subscription};

/// Where the channel is in resolving the current identity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthPhase {
    /// No report yet (e.g. persisted session still being checked).
    #[default]
    Initializing,
    Resolved(Option<Identity>),
    Failed(IdentityError),
}

impl AuthPhase {
    fn report(&self) -> Option<IdentityReport> {
        match self {
            Self::Initializing => None,
            Self::Resolved(identity) => Some(Ok(identity.clone())),
            Self::Failed(err) => Some(Err(err.clone())),
        }
    }
}

#[derive(Default)]
struct ChannelInner {
    phase: AuthPhase,
    observers: HashMap<u64, Observer>,
    next_id: u64,
}

#[derive(Clone, Default)]
pub struct AuthChannel {
    inner: Arc<Mutex<ChannelInner>>,
}

impl AuthChannel {
    /// A channel that has not resolved yet; observers wait for the first publish.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A channel that already knows the current identity.
    #[must_use]
    pub fn resolved(identity: Option<Identity>) -> Self {
        let channel = Self::new();
        channel.lock().phase = AuthPhase::Resolved(identity);
        channel
    }

    #[must_use]
    pub fn phase(&self) -> AuthPhase {
        self.lock().phase.clone()
    }

    /// The signed-in identity, if the channel has resolved one.
    #[must_use]
    pub fn current(&self) -> Option<Identity> {
        match &self.lock().phase {
            AuthPhase::Resolved(identity) => identity.clone(),
            AuthPhase::Initializing | AuthPhase::Failed(_) => None,
        }
    }

    /// Number of observers currently registered.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.lock().observers.len()
    }

    /// Record `report` as the current state and deliver it to every observer.
    ///
    /// Observers run after the lock is released, so they may register or
    /// release subscriptions themselves.
    pub fn publish(&self, report: IdentityReport) {
        let observers: Vec<Observer> = {
            let mut inner = self.lock();
            inner.phase = match &report {
                Ok(identity) => AuthPhase::Resolved(identity.clone()),
                Err(err) => AuthPhase::Failed(err.clone()),
            };
            inner.observers.values().cloned().collect()
        };
        match &report {
            Ok(Some(identity)) => tracing::debug!(uid = %identity.uid, observers = observers.len(), "identity published"),
            Ok(None) => tracing::debug!(observers = observers.len(), "signed-out state published"),
            Err(err) => tracing::warn!(error = %err, observers = observers.len(), "identity failure published"),
        }
        for observer in observers {
            observer(&report);
        }
    }

    pub fn sign_in(&self, identity: Identity) {
        self.publish(Ok(Some(identity)));
    }

    pub fn sign_out(&self) {
        self.publish(Ok(None));
    }

    pub fn fail(&self, err: IdentityError) {
        self.publish(Err(err));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ChannelInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl IdentityProvider for AuthChannel {
    fn observe(&self, observer: Observer) -> Subscription {
        let (id, immediate) = {
            let mut inner = self.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.observers.insert(id, Arc::clone(&observer));
            tracing::debug!(observer = id, active = inner.observers.len(), "identity observer registered");
            (id, inner.phase.report())
        };

        if let Some(report) = immediate {
            observer(&report);
        }

        let weak = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
                inner.observers.remove(&id);
                tracing::debug!(observer = id, active = inner.observers.len(), "identity observer released");
            }
        })
    }
}

impl std::fmt::Debug for AuthChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("AuthChannel")
            .field("phase", &inner.phase)
            .field("observers", &inner.observers.len())
            .finish()
    }
}
