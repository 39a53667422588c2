//! Credential store: the single expiring slot that holds the bearer token.
//!
//! Reads are synchronous so the request pipeline can consult the slot at send
//! time. None of the [`CredentialStore`] operations fail: storage problems are
//! logged and read back as "no token".

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{BearerToken, Clock, SystemClock};

const TOKEN_FILE: &str = "token.json";

/// Storage contract for the one active token.
pub trait CredentialStore: Send + Sync {
    /// Store `token` for at most `ttl`, replacing whatever was there.
    fn set(&self, token: BearerToken, ttl: Duration);

    /// Current token, or `None` when nothing is stored or it has expired.
    fn get(&self) -> Option<BearerToken>;

    /// Remove the token. Idempotent.
    fn clear(&self);

    fn has_token(&self) -> bool {
        self.get().is_some()
    }
}

impl<S: CredentialStore + ?Sized> CredentialStore for Arc<S> {
    fn set(&self, token: BearerToken, ttl: Duration) {
        (**self).set(token, ttl)
    }

    fn get(&self) -> Option<BearerToken> {
        (**self).get()
    }

    fn clear(&self) {
        (**self).clear()
    }
}

/// What actually sits in the slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    pub token: BearerToken,
    pub expires_at: DateTime<Utc>,
}

/// Longest lifetime a credential is given, whatever the caller asks for.
pub const MAX_TTL_DAYS: i64 = 365 * 100;

impl StoredCredential {
    /// Slot contents for `token` stored at `now` for `ttl`.
    ///
    /// `None` when `ttl` is not positive. Oversized TTLs are clamped to
    /// [`MAX_TTL_DAYS`] and the addition never overflows.
    pub fn expiring(token: BearerToken, now: DateTime<Utc>, ttl: Duration) -> Option<Self> {
        if ttl <= Duration::zero() {
            return None;
        }
        let expires_at = now
            .checked_add_signed(ttl.min(Duration::days(MAX_TTL_DAYS)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Some(Self { token, expires_at })
    }

    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not determine a data directory for this platform")]
    NoDataDir,

    #[error("storage io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not serialize credential: {0}")]
    Serialize(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory slot
// ─────────────────────────────────────────────────────────────────────────────

/// Process-local store. Lost when the process exits.
#[derive(Debug)]
pub struct MemoryCredentialStore {
    slot: RwLock<Option<StoredCredential>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            slot: RwLock::new(None),
            clock,
        }
    }

    fn read_slot(&self) -> RwLockReadGuard<'_, Option<StoredCredential>> {
        self.slot.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write_slot(&self) -> RwLockWriteGuard<'_, Option<StoredCredential>> {
        self.slot.write().unwrap_or_else(|p| p.into_inner())
    }
}

impl Default for MemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn set(&self, token: BearerToken, ttl: Duration) {
        if token.is_blank() {
            self.clear();
            return;
        }
        *self.write_slot() = StoredCredential::expiring(token, self.clock.now(), ttl);
    }

    fn get(&self) -> Option<BearerToken> {
        let now = self.clock.now();
        {
            let slot = self.read_slot();
            match slot.as_ref() {
                None => return None,
                Some(stored) if stored.is_live(now) => return Some(stored.token.clone()),
                Some(_) => {}
            }
        }

        // Expired: evict on read.
        let mut slot = self.write_slot();
        if slot.as_ref().is_some_and(|s| !s.is_live(now)) {
            *slot = None;
        }
        None
    }

    fn clear(&self) {
        *self.write_slot() = None;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File-backed slot
// ─────────────────────────────────────────────────────────────────────────────

/// Store that survives restarts: a single JSON file in the app data directory.
///
/// The file is rewritten whole on every `set` (temp file + rename) and is
/// deleted when the token expires, is cleared, or cannot be parsed.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    clock: Arc<dyn Clock>,
}

impl FileCredentialStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::open_with_clock(dir, Arc::new(SystemClock))
    }

    pub fn open_with_clock(
        dir: impl AsRef<Path>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StorageError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|source| StorageError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(TOKEN_FILE);
        tracing::debug!(path = %path.display(), "credential file store opened");
        Ok(Self { path, clock })
    }

    /// `<platform local data dir>/liftlog`.
    pub fn default_dir() -> Result<PathBuf, StorageError> {
        dirs::data_local_dir()
            .map(|d| d.join("liftlog"))
            .ok_or(StorageError::NoDataDir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, stored: &StoredCredential) -> Result<(), StorageError> {
        let json = serde_json::to_vec(stored).map_err(|e| StorageError::Serialize(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        let io_err = |source| StorageError::Io {
            path: tmp.clone(),
            source,
        };

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&tmp).map_err(io_err)?;
        file.write_all(&json).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        drop(file);

        std::fs::rename(&tmp, &self.path).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn read(&self) -> Option<StoredCredential> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to read credential file"
                );
                return None;
            }
        };

        match serde_json::from_slice::<StoredCredential>(&raw) {
            Ok(stored) => Some(stored),
            Err(e) => {
                tracing::warn!(error = %e, "credential file is corrupt; discarding");
                self.remove_file();
                None
            }
        }
    }

    fn remove_file(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to remove credential file"
                );
            }
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn set(&self, token: BearerToken, ttl: Duration) {
        if token.is_blank() {
            self.clear();
            return;
        }
        let Some(stored) = StoredCredential::expiring(token, self.clock.now(), ttl) else {
            self.clear();
            return;
        };
        if let Err(e) = self.write(&stored) {
            tracing::warn!(error = %e, "failed to persist credential");
        }
    }

    fn get(&self) -> Option<BearerToken> {
        let stored = self.read()?;
        if stored.is_live(self.clock.now()) {
            Some(stored.token)
        } else {
            tracing::debug!("stored credential expired; removing");
            self.remove_file();
            None
        }
    }

    fn clear(&self) {
        self.remove_file();
    }
}
