//! REST client for the hosted identity service.
//!
//! Thin HTTP wrapper over the identity toolkit (`accounts:signUp`,
//! `accounts:signInWithPassword`, `accounts:lookup`) and the secure-token
//! refresh endpoint. Every state change is published into an [`AuthChannel`],
//! which is what route guards observe. Response parsing is pure for
//! testability.
//!
//! SESSION LIFECYCLE
//! =================
//! `restore` runs once at startup: no stored session means signed out; a
//! stored token is looked up, refreshed once if expired, and dropped if the
//! service rejects it. Transport and 5xx failures are published as failures
//! and leave the stored session untouched.
//!
//! Sign-in and sign-out bump a session generation. A restore still in flight
//! when the generation moves drops its result: it neither writes the session
//! nor publishes.

#[cfg(test)]
#[path = "rest_test.rs"]
mod rest_test;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{AuthChannel, Identity, IdentityError, IdentityProvider, IdentityReport, Observer, Subscription};
use super::session::{SessionStore, StoredSession};
use crate::config::AppConfig;

const REQUEST_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// CLIENT
// =============================================================================

pub struct RestIdentityProvider {
    http: reqwest::Client,
    api_key: String,
    identity_toolkit_url: String,
    secure_token_url: String,
    session: SessionStore,
    channel: AuthChannel,
    /// Bumped by every sign-in and sign-out. Held while the session is
    /// written and the result published.
    generation: Mutex<u64>,
}

impl RestIdentityProvider {
    pub fn new(config: &AppConfig, session: SessionStore) -> Result<Self, IdentityError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| IdentityError::HttpClientBuild(e.to_string()))?;
        Ok(Self::with_http(http, config, session))
    }

    pub(crate) fn with_http(http: reqwest::Client, config: &AppConfig, session: SessionStore) -> Self {
        Self {
            http,
            api_key: config.api_key.clone(),
            identity_toolkit_url: config.identity_toolkit_url.clone(),
            secure_token_url: config.secure_token_url.clone(),
            session,
            channel: AuthChannel::new(),
            generation: Mutex::new(0),
        }
    }

    /// The channel this provider publishes into.
    #[must_use]
    pub fn channel(&self) -> &AuthChannel {
        &self.channel
    }

    /// Resolve the persisted session and publish the result.
    ///
    /// If a sign-in or sign-out lands while the restore is in flight, the
    /// restore's result is discarded and the current identity is returned.
    pub async fn restore(&self) -> IdentityReport {
        let generation = *self.generation.lock().await;
        let report = self.resolve_stored(generation).await;

        let current = self.generation.lock().await;
        if *current != generation {
            tracing::debug!(started = generation, now = *current, "session changed during restore, result dropped");
            return Ok(self.channel.current());
        }
        match &report {
            Ok(Some(identity)) => tracing::info!(uid = %identity.uid, "session restored"),
            Ok(None) => tracing::info!("no active session"),
            Err(err) => tracing::warn!(error = %err, "session restore failed"),
        }
        self.channel.publish(report.clone());
        report
    }

    /// Create an account and sign it in.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, IdentityError> {
        let url = format!("{}/accounts:signUp", self.identity_toolkit_url);
        self.authenticate(&url, email, password).await
    }

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Identity, IdentityError> {
        let url = format!("{}/accounts:signInWithPassword", self.identity_toolkit_url);
        self.authenticate(&url, email, password).await
    }

    pub async fn sign_out(&self) -> Result<(), IdentityError> {
        let mut generation = self.generation.lock().await;
        *generation += 1;
        self.session.clear().await?;
        tracing::info!("signed out");
        self.channel.sign_out();
        Ok(())
    }

    async fn authenticate(&self, url: &str, email: &str, password: &str) -> Result<Identity, IdentityError> {
        let body = PasswordRequest { email, password, return_secure_token: true };
        let text = self.post_json(url, &body).await?;
        let (identity, stored) = parse_auth_response(&text)?;
        let mut generation = self.generation.lock().await;
        *generation += 1;
        self.session.save(&stored).await?;
        tracing::info!(uid = %identity.uid, "signed in");
        self.channel.sign_in(identity.clone());
        Ok(identity)
    }

    async fn resolve_stored(&self, generation: u64) -> IdentityReport {
        let Some(stored) = self.session.load().await? else {
            return Ok(None);
        };

        let lookup = match self.lookup(&stored.id_token).await {
            Err(err) if is_expired_token(&err) => {
                tracing::debug!(uid = %stored.uid, "id token expired, refreshing");
                match self.refresh(&stored.refresh_token).await {
                    Ok(fresh) => {
                        self.save_if_current(generation, &fresh).await?;
                        self.lookup(&fresh.id_token).await
                    }
                    Err(err) => Err(err),
                }
            }
            other => other,
        };

        match lookup {
            Ok(Some(identity)) => Ok(Some(identity)),
            Ok(None) => {
                self.clear_if_current(generation).await?;
                Ok(None)
            }
            Err(err) if is_rejected(&err) => {
                tracing::info!(error = %err, "stored session rejected");
                self.clear_if_current(generation).await?;
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    async fn save_if_current(&self, generation: u64, session: &StoredSession) -> Result<(), IdentityError> {
        let current = self.generation.lock().await;
        if *current == generation {
            self.session.save(session).await?;
        }
        Ok(())
    }

    async fn clear_if_current(&self, generation: u64) -> Result<(), IdentityError> {
        let current = self.generation.lock().await;
        if *current == generation {
            self.session.clear().await?;
        }
        Ok(())
    }

    async fn lookup(&self, id_token: &str) -> Result<Option<Identity>, IdentityError> {
        let url = format!("{}/accounts:lookup", self.identity_toolkit_url);
        let text = self.post_json(&url, &LookupRequest { id_token }).await?;
        parse_lookup_response(&text)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<StoredSession, IdentityError> {
        let url = format!("{}/token", self.secure_token_url);
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .form(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token)])
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;
        let text = read_body(response).await?;
        parse_refresh_response(&text)
    }

    async fn post_json<B: Serialize>(&self, url: &str, body: &B) -> Result<String, IdentityError> {
        let response = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;
        read_body(response).await
    }
}

impl IdentityProvider for RestIdentityProvider {
    fn observe(&self, observer: Observer) -> Subscription {
        self.channel.observe(observer)
    }
}

impl std::fmt::Debug for RestIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestIdentityProvider")
            .field("identity_toolkit_url", &self.identity_toolkit_url)
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

async fn read_body(response: reqwest::Response) -> Result<String, IdentityError> {
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| IdentityError::Transport(e.to_string()))?;
    if !(200..300).contains(&status) {
        return Err(parse_error_response(status, &text));
    }
    Ok(text)
}

fn is_expired_token(err: &IdentityError) -> bool {
    matches!(err, IdentityError::Provider { status: 400, message } if message == "TOKEN_EXPIRED" || message == "INVALID_ID_TOKEN")
}

/// A 4xx from the service means the stored credentials are no longer valid.
fn is_rejected(err: &IdentityError) -> bool {
    matches!(err, IdentityError::Provider { status: 400..=499, .. })
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    local_id: String,
    id_token: String,
    refresh_token: String,
    email: Option<String>,
    display_name: Option<String>,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    #[serde(default)]
    email_verified: bool,
}

/// The secure-token endpoint answers in `snake_case`.
#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    user_id: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_auth_response(json: &str) -> Result<(Identity, StoredSession), IdentityError> {
    let resp: AuthResponse = serde_json::from_str(json).map_err(|e| IdentityError::Parse(e.to_string()))?;
    let identity = Identity {
        uid: resp.local_id.clone(),
        email: resp.email.filter(|e| !e.is_empty()),
        display_name: resp.display_name.filter(|n| !n.is_empty()),
        email_verified: false,
    };
    let stored = StoredSession { uid: resp.local_id, id_token: resp.id_token, refresh_token: resp.refresh_token };
    Ok((identity, stored))
}

fn parse_lookup_response(json: &str) -> Result<Option<Identity>, IdentityError> {
    let resp: LookupResponse = serde_json::from_str(json).map_err(|e| IdentityError::Parse(e.to_string()))?;
    Ok(resp.users.into_iter().next().map(|user| Identity {
        uid: user.local_id,
        email: user.email,
        display_name: user.display_name,
        email_verified: user.email_verified,
    }))
}

fn parse_refresh_response(json: &str) -> Result<StoredSession, IdentityError> {
    let resp: RefreshResponse = serde_json::from_str(json).map_err(|e| IdentityError::Parse(e.to_string()))?;
    Ok(StoredSession { uid: resp.user_id, id_token: resp.id_token, refresh_token: resp.refresh_token })
}

/// Map an error body to `IdentityError::Provider`.
///
/// The service reports codes like `TOO_MANY_ATTEMPTS_TRY_LATER : detail`;
/// only the code before ` : ` is kept. Non-JSON bodies are kept verbatim.
fn parse_error_response(status: u16, body: &str) -> IdentityError {
    let message = serde_json::from_str::<ErrorEnvelope>(body).map_or_else(
        |_| body.trim().to_owned(),
        |envelope| {
            envelope
                .error
                .message
                .split(" : ")
                .next()
                .unwrap_or_default()
                .trim()
                .to_owned()
        },
    );
    IdentityError::Provider { status, message }
}
