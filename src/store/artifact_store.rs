//! On-disk handoff of content artifacts between the two stages.
//!
//! One JSON file per council area under the store directory, named from
//! the area slug. Keys are unique by construction, so paths never
//! collide and no locking is needed beyond per-path create/delete
//! atomicity.

use crate::core::areas::slugify;
use crate::core::artifact::ContentArtifact;
use crate::core::error::{StoreError, StoreResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Content-addressed (by area name) transient artifact storage.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Open a store rooted at `dir`, creating the directory if absent.
    pub fn new(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Directory holding the artifact files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Deterministic backing path for a key.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", slugify(key)))
    }

    /// Persist an artifact under `key`, overwriting any previous file.
    ///
    /// Overwrite keeps reruns after a partial failure cheap: stage 1 can
    /// simply run again over the full work list.
    pub fn put(&self, key: &str, artifact: &ContentArtifact) -> StoreResult<PathBuf> {
        let path = self.path_for(key);
        let payload = serde_json::to_vec(artifact).map_err(|source| StoreError::Payload {
            key: key.to_string(),
            source,
        })?;
        fs::write(&path, payload).map_err(|source| StoreError::Io {
            key: key.to_string(),
            source,
        })?;
        log::debug!("stored artifact for '{}' at {}", key, path.display());
        Ok(path)
    }

    /// Check whether an artifact exists for `key`.
    pub fn exists(&self, key: &str) -> bool {
        self.path_for(key).exists()
    }

    /// Read the artifact for `key` and remove its backing file.
    ///
    /// The file is removed immediately after a successful read, before
    /// the payload is decoded, so it is gone even if the caller's
    /// subsequent processing fails. Absent artifacts fail with
    /// [`StoreError::MissingArtifact`].
    pub fn get_and_delete(&self, key: &str) -> StoreResult<ContentArtifact> {
        let path = self.path_for(key);
        let payload = match fs::read(&path) {
            Ok(payload) => payload,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::MissingArtifact {
                    key: key.to_string(),
                    path,
                });
            }
            Err(source) => {
                return Err(StoreError::Io {
                    key: key.to_string(),
                    source,
                });
            }
        };

        fs::remove_file(&path).map_err(|source| StoreError::Io {
            key: key.to_string(),
            source,
        })?;
        log::debug!("consumed artifact for '{}' from {}", key, path.display());

        serde_json::from_slice(&payload).map_err(|source| StoreError::Payload {
            key: key.to_string(),
            source,
        })
    }
}
