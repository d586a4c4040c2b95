use std::{
    collections::HashMap,
    fs, io,
    path::PathBuf,
    sync::{Mutex, MutexGuard, PoisonError},
};

use shared::domain::User;
use thiserror::Error;
use tracing::warn;

/// Well-known vault keys. The token is stored as an opaque string, the
/// identity as a serialized `User` record.
pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("failed to access session vault: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode session identity: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Keyed persistence boundary for session state. Pure read/write; no retry
/// logic lives here.
pub trait SessionVault: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, VaultError>;
    fn write(&self, key: &str, value: &str) -> Result<(), VaultError>;
    fn remove(&self, key: &str) -> Result<(), VaultError>;
}

/// One file per key under a directory; the directory is created on first
/// write.
pub struct FileVault {
    dir: PathBuf,
}

impl FileVault {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl SessionVault for FileVault {
    fn read(&self, key: &str) -> Result<Option<String>, VaultError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), VaultError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), VaultError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-memory vault for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryVault {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryVault {
    // Entries are plain strings, so a panic mid-write cannot leave them in
    // a half-updated state; a poisoned lock is safe to keep using.
    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionVault for MemoryVault {
    fn read(&self, key: &str) -> Result<Option<String>, VaultError> {
        Ok(self.entries().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), VaultError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), VaultError> {
        self.entries().remove(key);
        Ok(())
    }
}

/// The authenticated identity plus bearer token, threaded explicitly
/// through every remote call. There is no ambient global session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: User,
    pub token: String,
}

/// Holds the current session in memory and mirrors it into a vault so a
/// later process start can resume without re-authenticating.
pub struct SessionStore<V: SessionVault> {
    vault: V,
    current: Option<Session>,
}

impl<V: SessionVault> SessionStore<V> {
    pub fn new(vault: V) -> Self {
        Self {
            vault,
            current: None,
        }
    }

    /// Rebuilds the session from persisted state. Missing keys mean no
    /// session. An identity payload that no longer parses is purged so the
    /// next start is clean; that case never raises to the caller.
    pub fn restore(&mut self) -> Option<Session> {
        let token = self.read_or_none(TOKEN_KEY)?;
        let raw_user = self.read_or_none(USER_KEY)?;
        match serde_json::from_str::<User>(&raw_user) {
            Ok(user) => {
                let session = Session { user, token };
                self.current = Some(session.clone());
                Some(session)
            }
            Err(err) => {
                warn!("session: purging unparseable stored identity: {err}");
                self.purge();
                None
            }
        }
    }

    /// Stores identity and token, both in memory and persistently.
    pub fn establish(&mut self, user: User, token: String) -> Result<Session, VaultError> {
        let identity = serde_json::to_string(&user)?;
        self.vault.write(TOKEN_KEY, &token)?;
        self.vault.write(USER_KEY, &identity)?;
        let session = Session { user, token };
        self.current = Some(session.clone());
        Ok(session)
    }

    /// Drops the session from memory and persistence.
    pub fn clear(&mut self) {
        self.current = None;
        self.purge();
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    fn read_or_none(&self, key: &str) -> Option<String> {
        match self.vault.read(key) {
            Ok(value) => value,
            Err(err) => {
                warn!("session: vault read failed for {key}: {err}");
                None
            }
        }
    }

    fn purge(&mut self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(err) = self.vault.remove(key) {
                warn!("session: vault remove failed for {key}: {err}");
            }
        }
    }
}

/// Default vault directory under the platform config dir.
pub fn default_vault_dir(app_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(app_name))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
