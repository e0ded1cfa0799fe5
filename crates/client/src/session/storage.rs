//! Credential persistence backends.
//!
//! The persisted state is a small JSON document with fixed keys
//! (`access_token`, `refresh_token`) plus a timestamp, surviving process
//! restarts. Absence of either token is a valid state meaning "logged out".
//! A corrupt document is treated as absent, never an error.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Token pair as written to persistent storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedTokens {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// When the access token was last written.
    #[serde(default)]
    pub obtained_at: Option<DateTime<Utc>>,
}

impl PersistedTokens {
    /// Token pair stamped with the current time.
    #[must_use]
    pub fn now(access_token: Option<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token,
            refresh_token,
            obtained_at: Some(Utc::now()),
        }
    }
}

/// Storage backend for the persisted token pair.
///
/// Both tokens are always written together: implementations replace the
/// whole document, never one key at a time.
pub trait TokenStorage: Send + Sync {
    /// Read the persisted tokens. Corrupt or missing state reads as `None`.
    fn read(&self) -> Option<PersistedTokens>;

    /// Replace the persisted tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be written.
    fn write(&self, tokens: &PersistedTokens) -> io::Result<()>;

    /// Remove the persisted tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if existing state cannot be removed.
    fn clear(&self) -> io::Result<()>;
}

/// File-backed token storage.
///
/// Writes go through a sibling temp file and a rename, so a crash mid-write
/// can never leave a half-written document behind.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Create storage backed by the given path.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TokenStorage for FileStorage {
    fn read(&self) -> Option<PersistedTokens> {
        let bytes = fs::read(&self.path).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(tokens) => Some(tokens),
            Err(error) => {
                tracing::warn!(%error, path = %self.path.display(), "corrupt token file, treating as logged out");
                None
            }
        }
    }

    fn write(&self, tokens: &PersistedTokens) -> io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(tokens)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// In-memory token storage, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: Mutex<Option<PersistedTokens>>,
}

impl MemoryStorage {
    /// Create empty in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage pre-seeded with a token pair.
    #[must_use]
    pub fn seeded(tokens: PersistedTokens) -> Self {
        Self {
            inner: Mutex::new(Some(tokens)),
        }
    }
}

impl TokenStorage for MemoryStorage {
    fn read(&self) -> Option<PersistedTokens> {
        self.inner.lock().map_or(None, |guard| guard.clone())
    }

    fn write(&self, tokens: &PersistedTokens) -> io::Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::other("storage lock poisoned"))?;
        *guard = Some(tokens.clone());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::other("storage lock poisoned"))?;
        *guard = None;
        Ok(())
    }
}
