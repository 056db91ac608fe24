//! Authentication guard for protected routes.
//!
//! SYSTEM CONTEXT
//! ==============
//! Runs before every navigation. Public routes pass straight through without
//! touching the identity provider. Protected routes (the leaf or any ancestor
//! sets `requires_auth`) wait for one identity report:
//!
//! - signed in: proceed
//! - signed out: emit a `DenialEvent`, then redirect to the sign-in route
//! - provider failure: reject, so the navigation aborts at its caller
//!
//! No retries and no timeout. Each check owns its own observer, released as
//! soon as the report arrives or the check is dropped.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use std::sync::Arc;

use crate::error::ErrorCode;
use crate::identity::{self, IdentityProvider};
use crate::notify::{DenialEvent, DenialNotifier, SIGN_IN_REQUIRED_MESSAGE};
use crate::routing::{Decision, GuardError, GuardFuture, Navigation, NavigationGuard};

pub const SIGN_IN_PATH: &str = "/sign-in";

pub struct AuthGuard {
    provider: Arc<dyn IdentityProvider>,
    notifier: DenialNotifier,
    sign_in_path: String,
}

impl AuthGuard {
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>, notifier: DenialNotifier) -> Self {
        Self { provider, notifier, sign_in_path: SIGN_IN_PATH.to_owned() }
    }

    #[must_use]
    pub fn with_sign_in_path(mut self, path: &str) -> Self {
        self.sign_in_path = path.to_owned();
        self
    }

    pub async fn check_access(&self, navigation: &Navigation) -> Result<Decision, GuardError> {
        if !navigation.to.requires_auth() {
            return Ok(Decision::Proceed);
        }

        tracing::debug!(navigation = %navigation.id, to = %navigation.to.path, "resolving identity");
        let report = identity::current_identity(self.provider.as_ref()).await;

        match report {
            Ok(Some(user)) => {
                tracing::debug!(navigation = %navigation.id, uid = %user.uid, "access granted");
                Ok(Decision::Proceed)
            }
            Ok(None) => {
                self.notifier.notify(DenialEvent {
                    navigation: navigation.id,
                    attempted: navigation.to.full_path(),
                    redirect_to: self.sign_in_path.clone(),
                    message: SIGN_IN_REQUIRED_MESSAGE.to_owned(),
                });
                Ok(Decision::Redirect(self.sign_in_path.clone()))
            }
            Err(err) => {
                tracing::warn!(
                    navigation = %navigation.id,
                    to = %navigation.to.path,
                    code = err.error_code(),
                    error = %err,
                    "identity check failed"
                );
                Err(GuardError::Identity(err))
            }
        }
    }
}

impl NavigationGuard for AuthGuard {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn check<'a>(&'a self, navigation: &'a Navigation) -> GuardFuture<'a> {
        Box::pin(self.check_access(navigation))
    }
}

impl std::fmt::Debug for AuthGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGuard").field("sign_in_path", &self.sign_in_path).finish_non_exhaustive()
    }
}
