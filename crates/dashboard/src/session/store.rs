//! Durable session storage.
//!
//! The persisted session is two entries - an opaque token and the cached
//! user profile - written together and cleared together. A record with one
//! entry missing, or a profile that fails to parse, loads as `Corrupted`
//! so the manager can purge it and fall back to the logged-out state.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::models::User;

/// File holding the opaque token.
const TOKEN_FILE: &str = "auth-token";
/// File holding the serialized user profile.
const PROFILE_FILE: &str = "user-data.json";

/// Errors raised by a session store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Stored data is present but unusable; the caller should purge it.
    #[error("corrupted session data: {0}")]
    Corrupted(String),

    /// Underlying storage failed.
    #[error("session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The profile could not be serialized.
    #[error("session profile encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result of loading the durable session record.
#[derive(Debug)]
pub enum LoadedSession {
    /// Both entries present and parsable.
    Active { token: SecretString, user: User },
    /// No session stored.
    Missing,
}

/// Durable key-value storage for the session record.
///
/// Single-writer discipline: only the session manager calls `save` and
/// `clear`.
pub trait SessionStore: Send + Sync {
    /// Load the stored session, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupted`] when data is present but
    /// unusable; the caller is expected to `clear` and continue as
    /// logged-out.
    fn load(&self) -> Result<LoadedSession, StoreError>;

    /// Persist both session entries.
    ///
    /// # Errors
    ///
    /// Returns an error if either entry cannot be written.
    fn save(&self, token: &SecretString, user: &User) -> Result<(), StoreError>;

    /// Remove both session entries. Clearing an absent session is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails for a reason other than the
    /// entries already being absent.
    fn clear(&self) -> Result<(), StoreError>;
}

// =============================================================================
// FileStore
// =============================================================================

/// Session store backed by two files under the session directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first
    /// save.
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }

    fn profile_path(&self) -> PathBuf {
        self.dir.join(PROFILE_FILE)
    }
}

impl SessionStore for FileStore {
    fn load(&self) -> Result<LoadedSession, StoreError> {
        let token = read_optional(&self.token_path())?;
        let profile = read_optional(&self.profile_path())?;

        match (token, profile) {
            (Some(token), Some(profile)) => {
                let token = token.trim().to_string();
                if token.is_empty() {
                    return Err(StoreError::Corrupted("empty token entry".to_string()));
                }
                let user: User = serde_json::from_str(&profile)
                    .map_err(|e| StoreError::Corrupted(e.to_string()))?;
                Ok(LoadedSession::Active {
                    token: SecretString::from(token),
                    user,
                })
            }
            (None, None) => Ok(LoadedSession::Missing),
            // One entry without the other violates the both-or-neither
            // invariant; report it as corrupted so it gets purged.
            _ => Err(StoreError::Corrupted(
                "session entries out of sync".to_string(),
            )),
        }
    }

    fn save(&self, token: &SecretString, user: &User) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.token_path(), token.expose_secret())?;
        let profile = serde_json::to_string(user)?;
        std::fs::write(self.profile_path(), profile)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        remove_if_present(&self.token_path())?;
        remove_if_present(&self.profile_path())?;
        Ok(())
    }
}

fn read_optional(path: &std::path::Path) -> Result<Option<String>, StoreError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::Io(e)),
    }
}

fn remove_if_present(path: &std::path::Path) -> Result<(), StoreError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StoreError::Io(e)),
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-memory session store for tests.
///
/// Holds raw entry strings so tests can inject corrupted profiles.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<Option<(String, String)>>,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with raw entries, parsable or not.
    #[must_use]
    pub fn with_raw(token: &str, profile: &str) -> Self {
        Self {
            entries: Mutex::new(Some((token.to_string(), profile.to_string()))),
        }
    }

    /// Whether any entries are currently stored.
    ///
    /// # Panics
    ///
    /// Panics if the interior lock is poisoned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().expect("store lock poisoned").is_none()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<LoadedSession, StoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Corrupted("store lock poisoned".to_string()))?;
        match entries.as_ref() {
            Some((token, profile)) => {
                let user: User = serde_json::from_str(profile)
                    .map_err(|e| StoreError::Corrupted(e.to_string()))?;
                Ok(LoadedSession::Active {
                    token: SecretString::from(token.clone()),
                    user,
                })
            }
            None => Ok(LoadedSession::Missing),
        }
    }

    fn save(&self, token: &SecretString, user: &User) -> Result<(), StoreError> {
        let profile = serde_json::to_string(user)?;
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Corrupted("store lock poisoned".to_string()))?;
        *entries = Some((token.expose_secret().to_string(), profile));
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Corrupted("store lock poisoned".to_string()))?;
        *entries = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comanda_core::{Role, UserId};

    fn user() -> User {
        User {
            id: UserId::new(1),
            name: "Admin".to_string(),
            email: "admin@example.com".to_string(),
            role: Role::Admin,
        }
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().to_path_buf());

        assert!(matches!(store.load(), Ok(LoadedSession::Missing)));

        store
            .save(&SecretString::from("tok-123"), &user())
            .expect("save");
        match store.load().expect("load") {
            LoadedSession::Active { token, user: loaded } => {
                assert_eq!(token.expose_secret(), "tok-123");
                assert_eq!(loaded, user());
            }
            LoadedSession::Missing => panic!("expected an active session"),
        }

        store.clear().expect("clear");
        assert!(matches!(store.load(), Ok(LoadedSession::Missing)));
    }

    #[test]
    fn test_file_store_clear_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().to_path_buf());
        store.clear().expect("clearing nothing succeeds");
        store.clear().expect("and again");
    }

    #[test]
    fn test_file_store_corrupted_profile() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().to_path_buf());
        std::fs::write(dir.path().join(TOKEN_FILE), "tok").expect("write token");
        std::fs::write(dir.path().join(PROFILE_FILE), "{not json").expect("write profile");

        assert!(matches!(store.load(), Err(StoreError::Corrupted(_))));
    }

    #[test]
    fn test_file_store_lone_entry_is_corrupted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().to_path_buf());
        std::fs::write(dir.path().join(TOKEN_FILE), "tok").expect("write token");

        assert!(matches!(store.load(), Err(StoreError::Corrupted(_))));
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        store
            .save(&SecretString::from("tok"), &user())
            .expect("save");
        assert!(!store.is_empty());
        assert!(matches!(store.load(), Ok(LoadedSession::Active { .. })));
        store.clear().expect("clear");
        assert!(store.is_empty());
    }

    #[test]
    fn test_memory_store_corrupted_profile() {
        let store = MemoryStore::with_raw("tok", "][");
        assert!(matches!(store.load(), Err(StoreError::Corrupted(_))));
    }
}
