//! Persisted sign-in session.
//!
//! Keeps the identity tokens across restarts so the provider can restore the
//! signed-in user without asking for credentials again.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use super::IdentityError;

/// Tokens for one signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub uid: String,
    pub id_token: String,
    pub refresh_token: String,
}

#[derive(Debug)]
enum Backing {
    File(PathBuf),
    Memory(Mutex<Option<StoredSession>>),
}

#[derive(Debug)]
pub struct SessionStore {
    backing: Backing,
}

impl SessionStore {
    /// Persist as JSON at `path`. Parent directories are created on save.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self { backing: Backing::File(path.into()) }
    }

    /// Keep the session for the lifetime of the process only.
    #[must_use]
    pub fn memory() -> Self {
        Self { backing: Backing::Memory(Mutex::new(None)) }
    }

    #[must_use]
    pub fn from_path(path: Option<&Path>) -> Self {
        path.map_or_else(Self::memory, Self::file)
    }

    /// The stored session, or `None` when nobody is signed in.
    pub async fn load(&self) -> Result<Option<StoredSession>, IdentityError> {
        match &self.backing {
            Backing::Memory(slot) => Ok(slot.lock().unwrap_or_else(PoisonError::into_inner).clone()),
            Backing::File(path) => match tokio::fs::read_to_string(path).await {
                Ok(raw) => serde_json::from_str(&raw)
                    .map(Some)
                    .map_err(|e| IdentityError::Session(format!("{}: {e}", path.display()))),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(IdentityError::Session(format!("{}: {e}", path.display()))),
            },
        }
    }

    pub async fn save(&self, session: &StoredSession) -> Result<(), IdentityError> {
        match &self.backing {
            Backing::Memory(slot) => {
                *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
                Ok(())
            }
            Backing::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(|e| IdentityError::Session(format!("{}: {e}", parent.display())))?;
                }
                let body = serde_json::to_vec_pretty(session).map_err(|e| IdentityError::Session(e.to_string()))?;
                tokio::fs::write(path, body)
                    .await
                    .map_err(|e| IdentityError::Session(format!("{}: {e}", path.display())))
            }
        }
    }

    /// Forget the stored session. Clearing an empty store is not an error.
    pub async fn clear(&self) -> Result<(), IdentityError> {
        match &self.backing {
            Backing::Memory(slot) => {
                slot.lock().unwrap_or_else(PoisonError::into_inner).take();
                Ok(())
            }
            Backing::File(path) => match tokio::fs::remove_file(path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(IdentityError::Session(format!("{}: {e}", path.display()))),
            },
        }
    }
}
