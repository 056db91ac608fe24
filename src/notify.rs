//! Access-denied notifications for the UI layer.
//!
//! SYSTEM CONTEXT
//! ==============
//! When the auth guard turns a signed-out user away it emits a `DenialEvent`
//! before returning its redirect. The UI subscribes and shows an in-page
//! message; emitting never blocks the guard.

#[cfg(test)]
#[path = "notify_test.rs"]
mod notify_test;

use tokio::sync::broadcast;
use uuid::Uuid;

const DEFAULT_CAPACITY: usize = 16;

pub const SIGN_IN_REQUIRED_MESSAGE: &str = "You must be signed in to view this page.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenialEvent {
    pub navigation: Uuid,
    /// Full path the user tried to reach.
    pub attempted: String,
    pub redirect_to: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct DenialNotifier {
    tx: broadcast::Sender<DenialEvent>,
}

impl DenialNotifier {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DenialEvent> {
        self.tx.subscribe()
    }

    /// Publish `event` to current subscribers. Having none is fine.
    pub fn notify(&self, event: DenialEvent) {
        tracing::info!(
            navigation = %event.navigation,
            attempted = %event.attempted,
            redirect_to = %event.redirect_to,
            "access denied"
        );
        let _ = self.tx.send(event);
    }
}

impl Default for DenialNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
