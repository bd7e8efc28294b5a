//! # Session
//!
//! Holds the bearer credential for the duration of a console session.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Session Lifecycle                               │
//! │                                                                         │
//! │   open()  ──► restores the persisted token, if any                      │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │   start(token) ──► token kept in memory (+ written to the token file)   │
//! │     │                                                                   │
//! │     │  every request: HttpGateway reads token() for the bearer header   │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │   end() ◄── logout, or any 401 answered by the API                      │
//! │             token dropped (+ token file removed)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The session is created once at start-up and shared with the gateway by
//! `Arc`. There is no global token.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use tracing::{debug, info, warn};

use crate::config::SessionSettings;
use crate::error::{ClientError, ClientResult};

/// The authenticated console session.
#[derive(Debug)]
pub struct Session {
    token: RwLock<Option<String>>,
    /// Token file, when the session survives restarts.
    storage: Option<PathBuf>,
}

impl Session {
    /// A session that forgets its token on exit.
    pub fn in_memory() -> Self {
        Session {
            token: RwLock::new(None),
            storage: None,
        }
    }

    /// A session persisted to `path`, restoring the token stored there.
    pub fn persistent(path: impl Into<PathBuf>) -> ClientResult<Self> {
        let path = path.into();
        let token = read_token(&path)?;
        if token.is_some() {
            info!(?path, "Restored session token");
        }
        Ok(Session {
            token: RwLock::new(token),
            storage: Some(path),
        })
    }

    /// Opens the session described by the configuration.
    pub fn open(settings: &SessionSettings) -> ClientResult<Self> {
        if !settings.persist_token {
            return Ok(Self::in_memory());
        }
        match settings.token_path() {
            Some(path) => Self::persistent(path),
            None => {
                warn!("No data directory available, session will not persist");
                Ok(Self::in_memory())
            }
        }
    }

    /// Begins a session with `token`.
    pub fn start(&self, token: impl Into<String>) -> ClientResult<()> {
        let token = token.into();
        if let Some(path) = &self.storage {
            write_token(path, &token)?;
        }
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
        debug!("Session started");
        Ok(())
    }

    /// Ends the session. Safe to call when no session is active.
    pub fn end(&self) {
        let had_token = self
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some();

        if let Some(path) = &self.storage {
            if let Err(e) = fs::remove_file(path) {
                if e.kind() != ErrorKind::NotFound {
                    warn!(?path, error = %e, "Failed to remove session token file");
                }
            }
        }

        if had_token {
            info!("Session ended");
        }
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

fn read_token(path: &Path) -> ClientResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(contents) => {
            let token = contents.trim();
            Ok((!token.is_empty()).then(|| token.to_string()))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ClientError::SessionStorage(e.to_string())),
    }
}

fn write_token(path: &Path, token: &str) -> ClientResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ClientError::SessionStorage(e.to_string()))?;
    }
    fs::write(path, token).map_err(|e| ClientError::SessionStorage(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_lifecycle() {
        let session = Session::in_memory();
        assert!(!session.is_authenticated());

        session.start("abc").unwrap();
        assert_eq!(session.token().as_deref(), Some("abc"));

        session.end();
        assert!(!session.is_authenticated());
        // Ending twice is harmless
        session.end();
    }

    #[test]
    fn test_persistent_session_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.token");

        let session = Session::persistent(&path).unwrap();
        assert!(!session.is_authenticated());
        session.start("tok-1").unwrap();

        let reopened = Session::persistent(&path).unwrap();
        assert_eq!(reopened.token().as_deref(), Some("tok-1"));

        reopened.end();
        assert!(!path.exists());
        assert!(!Session::persistent(&path).unwrap().is_authenticated());
    }

    #[test]
    fn test_blank_token_file_is_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.token");
        std::fs::write(&path, "  \n").unwrap();

        assert!(!Session::persistent(&path).unwrap().is_authenticated());
    }

    #[test]
    fn test_open_without_persistence() {
        let settings = SessionSettings {
            persist_token: false,
            token_path: None,
        };
        let session = Session::open(&settings).unwrap();
        session.start("x").unwrap();
        assert!(session.is_authenticated());
    }
}
