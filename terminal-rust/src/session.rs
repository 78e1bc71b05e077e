use crate::TerminalError;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Key of the flag that skips the login screen on return visits.
pub const AUTH_FLAG_KEY: &str = "fintech_auth";

/// Boolean flags persisted as one file per key. Not a security boundary.
#[derive(Debug, Clone)]
pub struct FlagStore {
    dir: PathBuf,
}

impl FlagStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// A missing key reads as `false`.
    pub async fn get(&self, key: &str) -> Result<bool, TerminalError> {
        match tokio::fs::read_to_string(self.path(key)).await {
            Ok(value) => Ok(value.trim() == "true"),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(false),
            Err(error) => Err(error.into()),
        }
    }

    pub async fn set(&self, key: &str, value: bool) -> Result<(), TerminalError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.path(key), if value { "true" } else { "false" }).await?;
        Ok(())
    }

    pub async fn remove(&self, key: &str) -> Result<(), TerminalError> {
        match tokio::fs::remove_file(self.path(key)).await {
            Err(error) if error.kind() != ErrorKind::NotFound => Err(error.into()),
            _ => Ok(()),
        }
    }
}

/// Per-session flags the caller owns and passes to each submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionContext {
    pub authenticated: bool,
    /// Cleared when the provider rejects the credential. While false the
    /// console offers the key configuration action.
    pub credential_valid: bool,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self {
            authenticated: false,
            credential_valid: true,
        }
    }
}

impl SessionContext {
    pub async fn restore(store: &FlagStore) -> Result<Self, TerminalError> {
        let authenticated = store.get(AUTH_FLAG_KEY).await?;
        debug!(authenticated, "restored session flag");
        Ok(Self {
            authenticated,
            ..Self::default()
        })
    }

    pub async fn login(&mut self, store: &FlagStore) -> Result<(), TerminalError> {
        store.set(AUTH_FLAG_KEY, true).await?;
        self.authenticated = true;
        Ok(())
    }

    pub async fn logout(&mut self, store: &FlagStore) -> Result<(), TerminalError> {
        store.remove(AUTH_FLAG_KEY).await?;
        self.authenticated = false;
        Ok(())
    }

    /// The user picked a new key.
    pub fn configure_key(&mut self) {
        self.credential_valid = true;
    }

    pub fn needs_key(&self) -> bool {
        !self.credential_valid
    }
}
