//! Persistent credential slot.
//!
//! The session credential survives restarts in exactly one persistence
//! slot. Storage trouble is never fatal: an unreadable or unwritable
//! slot degrades to the signed-out state, which callers must treat as
//! normal. The trait seam keeps the persistence choice swappable and
//! lets tests run against an in-memory slot.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use pawprint_core::ApiKey;

/// One persistence slot for the opaque session credential.
pub trait CredentialStore: Send + Sync {
    /// Persist the key, replacing any previous value. Best-effort.
    fn save(&self, key: &ApiKey);

    /// Read the stored key, if any. Absent on any storage failure.
    fn load(&self) -> Option<ApiKey>;

    /// Remove the stored key. Best-effort.
    fn clear(&self);
}

/// File-backed credential slot.
///
/// Stores the bare opaque string in a single file, created with
/// owner-only permissions on Unix.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Create a store backed by the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialStore for FileCredentialStore {
    fn save(&self, key: &ApiKey) {
        if let Some(parent) = self.path.parent()
            && let Err(error) = fs::create_dir_all(parent)
        {
            tracing::warn!(path = %self.path.display(), %error, "cannot create credential directory");
            return;
        }

        if let Err(error) = fs::write(&self.path, key.expose()) {
            tracing::warn!(path = %self.path.display(), %error, "cannot persist credential");
            return;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600));
        }
    }

    fn load(&self) -> Option<ApiKey> {
        match fs::read_to_string(&self.path) {
            // Empty or whitespace-only content parses as absent.
            Ok(contents) => ApiKey::parse(&contents).ok(),
            Err(error) if error.kind() == ErrorKind::NotFound => None,
            Err(error) => {
                tracing::warn!(
                    path = %self.path.display(),
                    %error,
                    "credential slot unreadable, treating as signed out"
                );
                None
            }
        }
    }

    fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(error) if error.kind() == ErrorKind::NotFound => {}
            Err(error) => {
                tracing::warn!(path = %self.path.display(), %error, "cannot clear credential slot");
            }
        }
    }
}

/// In-memory credential slot for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<ApiKey>>,
}

impl MemoryCredentialStore {
    /// Create an empty in-memory slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<ApiKey>> {
        self.slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn save(&self, key: &ApiKey) {
        *self.lock() = Some(key.clone());
    }

    fn load(&self) -> Option<ApiKey> {
        self.lock().clone()
    }

    fn clear(&self) {
        *self.lock() = None;
    }
}
