//! Storage of recorded API snapshots.

use super::error::GateError;
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs;
use std::io::ErrorKind;
use trellis_common::{ApiSnapshot, ModuleId};

/// Extension of snapshot files.
pub const SNAPSHOT_EXTENSION: &str = "api.json";

/// Loads and records API snapshots.
#[cfg_attr(test, mockall::automock)]
pub trait SnapshotStore {
    /// Load the recorded snapshot of `module`, if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] if a recorded snapshot cannot be read.
    fn load(&self, module: &ModuleId) -> Result<Option<ApiSnapshot>, GateError>;

    /// Record `snapshot`, replacing any previous one for the same module.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] if the snapshot cannot be written.
    fn save(&self, snapshot: &ApiSnapshot) -> Result<(), GateError>;
}

/// Snapshot store keeping one pretty-printed JSON file per module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsSnapshotStore {
    root: Utf8PathBuf,
}

impl FsSnapshotStore {
    /// Create a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the snapshots.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Path of the snapshot for `module`.
    #[must_use]
    pub fn path_for(&self, module: &ModuleId) -> Utf8PathBuf {
        self.root.join(format!("{module}.{SNAPSHOT_EXTENSION}"))
    }
}

impl SnapshotStore for FsSnapshotStore {
    fn load(&self, module: &ModuleId) -> Result<Option<ApiSnapshot>, GateError> {
        let path = self.path_for(module);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no snapshot recorded at {path}");
                return Ok(None);
            }
            Err(source) => return Err(GateError::SnapshotIo { path, source }),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| GateError::SnapshotFormat { path, source })
    }

    fn save(&self, snapshot: &ApiSnapshot) -> Result<(), GateError> {
        let path = self.path_for(&snapshot.module);
        let json = serde_json::to_string_pretty(snapshot).map_err(|source| {
            GateError::SnapshotFormat {
                path: path.clone(),
                source,
            }
        })?;
        fs::create_dir_all(&self.root).map_err(|source| GateError::SnapshotIo {
            path: self.root.clone(),
            source,
        })?;
        fs::write(&path, json + "\n").map_err(|source| GateError::SnapshotIo { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;
    use trellis_common::ApiSymbol;

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().expect("temp dir creation succeeds")
    }

    fn store(dir: &TempDir) -> FsSnapshotStore {
        let root = Utf8PathBuf::from_path_buf(dir.path().join("api")).expect("utf-8 path");
        FsSnapshotStore::new(root)
    }

    fn module() -> ModuleId {
        ModuleId::new("api").expect("valid id")
    }

    #[rstest]
    fn missing_snapshot_loads_as_none(temp_dir: TempDir) {
        assert_eq!(store(&temp_dir).load(&module()).expect("readable"), None);
    }

    #[rstest]
    fn saved_snapshot_is_loaded_back(temp_dir: TempDir) {
        let store = store(&temp_dir);
        let snapshot = ApiSnapshot::new(
            module(),
            vec![ApiSymbol::new("api", "foo", "fun foo(): Unit")],
        );
        store.save(&snapshot).expect("written");

        assert!(store.path_for(&module()).as_str().ends_with("api/api.api.json"));
        assert_eq!(store.load(&module()).expect("readable"), Some(snapshot));
    }

    #[rstest]
    fn malformed_snapshot_is_an_error(temp_dir: TempDir) {
        let store = store(&temp_dir);
        fs::create_dir_all(store.root()).expect("mkdir");
        fs::write(store.path_for(&module()), "{ not json").expect("write");

        let err = store.load(&module()).expect_err("malformed");
        assert!(matches!(err, GateError::SnapshotFormat { .. }));
    }
}
