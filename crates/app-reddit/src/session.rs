use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
    time::{SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Treat tokens as expired slightly early so an in-flight request
/// doesn't race the actual expiry.
const EXPIRY_SLACK_SECS: u64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    /// Unix timestamp (seconds) the token stops being valid at
    pub expires_at: u64,
}

impl Session {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(now_unix())
    }

    #[must_use]
    pub fn is_expired_at(&self, now: u64) -> bool {
        now + EXPIRY_SLACK_SECS >= self.expires_at
    }
}

#[must_use]
pub fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |x| x.as_secs())
}

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session store serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Cross-run persistence for the authenticated session.
///
/// Explicit and injectable so callers decide where (or whether) sessions
/// survive between runs.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<Session>, SessionStoreError>;

    fn store(&self, session: &Session) -> Result<(), SessionStoreError>;

    fn invalidate(&self) -> Result<(), SessionStoreError>;
}

/// JSON file-backed store. The default for the CLI.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new<T>(path: T) -> Self
    where
        T: Into<PathBuf>,
    {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, SessionStoreError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.path)?;

        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                // A corrupt artifact is the same as no artifact
                warn!(path = ?self.path, "Discarding unreadable session file: {e}");
                Ok(None)
            }
        }
    }

    fn store(&self, session: &Session) -> Result<(), SessionStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.path, serde_json::to_string_pretty(session)?)?;
        debug!(path = ?self.path, "Stored session");

        Ok(())
    }

    fn invalidate(&self) -> Result<(), SessionStoreError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            debug!(path = ?self.path, "Invalidated stored session");
        }

        Ok(())
    }
}

/// In-memory store. Sessions live for the duration of the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, SessionStoreError> {
        Ok(self.inner.lock().map_or(None, |x| x.clone()))
    }

    fn store(&self, session: &Session) -> Result<(), SessionStoreError> {
        if let Ok(mut inner) = self.inner.lock() {
            *inner = Some(session.clone());
        }

        Ok(())
    }

    fn invalidate(&self) -> Result<(), SessionStoreError> {
        if let Ok(mut inner) = self.inner.lock() {
            *inner = None;
        }

        Ok(())
    }
}
