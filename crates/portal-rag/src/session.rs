//! Session lifecycle and per-session storage layout
//!
//! Every ingestion request runs inside a session: an opaque id plus two
//! exclusively-owned directories, one for staged uploads and one for the
//! persisted vector index. Paths are a pure function of the base directories
//! and the session id, so a later process can reattach with `resolve`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::error::{Error, Result};

/// Handle to a session's identity and storage locations
#[derive(Debug, Clone)]
pub struct SessionHandle {
    /// Opaque session id (timestamp prefix + random suffix)
    pub id: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Directory holding staged copies of uploaded files
    pub staging_dir: PathBuf,
    /// Directory holding the persisted vector index
    pub index_dir: PathBuf,
}

impl SessionHandle {
    /// Whether this session's storage exists on disk
    pub fn exists(&self) -> bool {
        self.staging_dir.is_dir()
    }
}

/// Allocates session ids and owns the base storage directories
#[derive(Debug, Clone)]
pub struct SessionManager {
    data_dir: PathBuf,
    index_dir: PathBuf,
}

impl SessionManager {
    /// Create a manager over the configured base directories
    pub fn new(storage: &StorageConfig) -> Result<Self> {
        for dir in [&storage.data_dir, &storage.index_dir] {
            fs::create_dir_all(dir).map_err(|e| Error::storage(dir.clone(), e))?;
        }

        Ok(Self {
            data_dir: storage.data_dir.clone(),
            index_dir: storage.index_dir.clone(),
        })
    }

    /// Allocate a fresh session with isolated storage
    ///
    /// The id combines a UTC timestamp with 32 bits of random suffix, so
    /// collisions across concurrent users are negligible while ids stay
    /// sortable by creation time.
    pub fn create_session(&self) -> Result<SessionHandle> {
        let created_at = Utc::now();
        let suffix = Uuid::new_v4().simple().to_string();
        let id = format!(
            "session_{}_{}",
            created_at.format("%Y%m%d_%H%M%S"),
            &suffix[..8]
        );

        let handle = self.paths_for(&id, created_at);

        for dir in [&handle.staging_dir, &handle.index_dir] {
            fs::create_dir_all(dir).map_err(|e| Error::storage(dir.clone(), e))?;
        }

        tracing::info!(
            session_id = %handle.id,
            staging_dir = %handle.staging_dir.display(),
            index_dir = %handle.index_dir.display(),
            "Session created"
        );

        Ok(handle)
    }

    /// Recompute the handle for an existing session id
    ///
    /// Does not create anything; a handle for an id that was never created
    /// simply reports `exists() == false`.
    pub fn resolve(&self, session_id: &str) -> SessionHandle {
        self.paths_for(session_id, Utc::now())
    }

    fn paths_for(&self, id: &str, created_at: DateTime<Utc>) -> SessionHandle {
        SessionHandle {
            id: id.to_string(),
            created_at,
            staging_dir: self.data_dir.join(id),
            index_dir: self.index_dir.join(id),
        }
    }

    /// Base directory for staged uploads
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Base directory for persisted indexes
    pub fn index_dir(&self) -> &Path {
        &self.index_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(tmp: &tempfile::TempDir) -> SessionManager {
        let storage = StorageConfig {
            data_dir: tmp.path().join("data"),
            index_dir: tmp.path().join("index"),
        };
        SessionManager::new(&storage).unwrap()
    }

    #[test]
    fn test_create_session_makes_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let mgr = manager(&tmp);

        let session = mgr.create_session().unwrap();
        assert!(session.staging_dir.is_dir());
        assert!(session.index_dir.is_dir());
        assert!(session.id.starts_with("session_"));
        assert!(session.exists());
    }

    #[test]
    fn test_session_ids_are_unique() {
        let tmp = tempfile::tempdir().unwrap();
        let mgr = manager(&tmp);

        let a = mgr.create_session().unwrap();
        let b = mgr.create_session().unwrap();
        assert_ne!(a.id, b.id);
        assert_ne!(a.staging_dir, b.staging_dir);
    }

    #[test]
    fn test_resolve_recomputes_same_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let mgr = manager(&tmp);

        let created = mgr.create_session().unwrap();
        let resolved = mgr.resolve(&created.id);
        assert_eq!(resolved.staging_dir, created.staging_dir);
        assert_eq!(resolved.index_dir, created.index_dir);
        assert!(resolved.exists());
    }

    #[test]
    fn test_resolve_unknown_session_does_not_exist() {
        let tmp = tempfile::tempdir().unwrap();
        let mgr = manager(&tmp);

        let handle = mgr.resolve("session_19990101_000000_deadbeef");
        assert!(!handle.exists());
    }
}
