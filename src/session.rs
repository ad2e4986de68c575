//! Durable authentication session.
//!
//! Holds the signed-in user, both tokens, and the locale preference, and
//! rewrites `<state_dir>/session.json` on every change so the session
//! survives process restarts. Tokens are stored opaquely: there is no
//! expiry tracking and the refresh token is never exercised here.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use bantin_api_types::User;

use crate::cache::lock;
use crate::domain::types::Locale;

pub const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub current_user: Option<User>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Stored locale preference; `None` until the user picks one.
    #[serde(default)]
    pub locale: Option<Locale>,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to prepare state directory {path}: {source}")]
    StateDir {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to read session state from {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to write session state to {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("session state does not serialize: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// File-backed session store shared across all resource handles.
pub struct SessionStore {
    path: PathBuf,
    state: RwLock<SessionState>,
}

impl SessionStore {
    /// Open the store, loading prior state when the file exists. A corrupt
    /// state file is abandoned and replaced on the next write rather than
    /// locking the user out of their own tool.
    pub fn open(state_dir: &Path) -> Result<Self, SessionError> {
        fs::create_dir_all(state_dir).map_err(|source| SessionError::StateDir {
            path: state_dir.display().to_string(),
            source,
        })?;
        let path = state_dir.join(SESSION_FILE);

        let state = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|source| SessionError::Read {
                path: path.display().to_string(),
                source,
            })?;
            match serde_json::from_str(&raw) {
                Ok(state) => state,
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "Session state is not valid JSON, starting signed out"
                    );
                    SessionState::default()
                }
            }
        } else {
            SessionState::default()
        };

        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    pub fn current_user(&self) -> Option<User> {
        lock::read(&self.state, "session.current_user")
            .current_user
            .clone()
    }

    /// Id of the signed-in user, if any.
    pub fn current_user_id(&self) -> Option<Uuid> {
        lock::read(&self.state, "session.current_user_id")
            .current_user
            .as_ref()
            .map(|user| user.id)
    }

    pub fn access_token(&self) -> Option<String> {
        lock::read(&self.state, "session.access_token")
            .access_token
            .clone()
    }

    pub fn locale(&self) -> Option<Locale> {
        lock::read(&self.state, "session.locale").locale
    }

    /// Snapshot of the whole state, for display surfaces.
    pub fn snapshot(&self) -> SessionState {
        lock::read(&self.state, "session.snapshot").clone()
    }

    /// Replace the session user (login, self-edit). `None` signs out the
    /// user without touching the tokens.
    pub fn set_current_user(&self, user: Option<User>) -> Result<(), SessionError> {
        self.mutate("session.set_current_user", |state| {
            state.current_user = user;
        })
    }

    /// Record a successful login: both tokens plus the session user.
    pub fn store_login(
        &self,
        access_token: String,
        refresh_token: Option<String>,
        user: User,
    ) -> Result<(), SessionError> {
        info!(user_id = %user.id, "Storing login session");
        self.mutate("session.store_login", |state| {
            state.access_token = Some(access_token);
            state.refresh_token = refresh_token;
            state.current_user = Some(user);
        })
    }

    /// Clear the user and both tokens. The locale preference survives.
    pub fn logout(&self) -> Result<(), SessionError> {
        info!("Clearing login session");
        self.mutate("session.logout", |state| {
            state.current_user = None;
            state.access_token = None;
            state.refresh_token = None;
        })
    }

    pub fn set_locale(&self, locale: Locale) -> Result<(), SessionError> {
        self.mutate("session.set_locale", |state| {
            state.locale = Some(locale);
        })
    }

    fn mutate(
        &self,
        op: &'static str,
        apply: impl FnOnce(&mut SessionState),
    ) -> Result<(), SessionError> {
        let mut state = lock::write(&self.state, op);
        apply(&mut state);
        self.persist(&state)
    }

    fn persist(&self, state: &SessionState) -> Result<(), SessionError> {
        let json = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, json).map_err(|source| SessionError::Write {
            path: self.path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::entities::fixtures::{actor_id, sample_user};

    use super::*;

    #[test]
    fn login_state_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::open(dir.path()).expect("open");

        store
            .store_login("a.b.c".into(), Some("d.e.f".into()), sample_user(actor_id()))
            .expect("store login");

        let reopened = SessionStore::open(dir.path()).expect("reopen");
        assert_eq!(reopened.access_token().as_deref(), Some("a.b.c"));
        assert_eq!(reopened.current_user_id(), Some(actor_id()));
    }

    #[test]
    fn logout_clears_user_and_tokens_but_keeps_locale() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::open(dir.path()).expect("open");

        store.set_locale(Locale::En).expect("locale");
        store
            .store_login("a.b.c".into(), None, sample_user(actor_id()))
            .expect("store login");
        store.logout().expect("logout");

        assert!(store.current_user().is_none());
        assert!(store.access_token().is_none());
        assert_eq!(store.locale(), Some(Locale::En));

        let reopened = SessionStore::open(dir.path()).expect("reopen");
        assert!(reopened.current_user().is_none());
        assert_eq!(reopened.locale(), Some(Locale::En));
    }

    #[test]
    fn corrupt_state_file_starts_signed_out() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(SESSION_FILE), "{not json").expect("write");

        let store = SessionStore::open(dir.path()).expect("open");
        assert!(store.current_user().is_none());
    }
}
