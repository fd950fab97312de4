//! Disk-backed matrix cache
//!
//! One JSON blob per (region, mode) key, addressed by a deterministic path
//! under `<data_dir>/matrices/`. The cache exclusively owns that directory:
//! entries are created or overwritten wholesale via `put` and never deleted
//! (retention is out of scope). `put` writes to a temp file in the same
//! directory and renames it into place, so readers observe either the old or
//! the new artifact, never a partial write.

use super::{codec, MatrixArtifact};
use crate::region::CacheKey;
use crate::{Result, TransportFramesError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Disk-backed cache of accessibility matrices
#[derive(Debug, Clone)]
pub struct MatrixCache {
    dir: PathBuf,
}

impl MatrixCache {
    /// Open the cache under the given data directory, creating the matrices
    /// folder if needed and logging which entries already exist.
    pub fn new(data_dir: &Path) -> Result<Self> {
        let dir = data_dir.join("matrices");
        fs::create_dir_all(&dir)?;

        let cache = Self { dir };
        let existing = cache.scan_existing()?;
        tracing::info!(
            path = %cache.dir.display(),
            entries = existing.len(),
            "Opened matrix cache"
        );
        for name in existing {
            tracing::debug!(entry = %name, "Cached matrix present on startup");
        }

        Ok(cache)
    }

    /// Deterministic blob path for a cache key
    pub fn path_for(&self, key: CacheKey) -> PathBuf {
        self.dir
            .join(format!("{}_{}_matrix.json", key.region_id, key.mode))
    }

    /// Pure existence check, no decode
    pub fn exists(&self, key: CacheKey) -> bool {
        self.path_for(key).exists()
    }

    /// Read and decode the cached artifact for a key. Side-effect free.
    ///
    /// A missing entry is `NotFound` with the caller-facing message; a
    /// present-but-unreadable blob surfaces as a codec or I/O error so the
    /// boundary can distinguish "not yet computed" from "corrupt".
    pub fn get(&self, key: CacheKey) -> Result<MatrixArtifact> {
        let path = self.path_for(key);
        if !path.exists() {
            return Err(TransportFramesError::NotFound(format!(
                "{} matrix not found for region {}",
                key.mode, key.region_id
            )));
        }
        let bytes = fs::read(&path)?;
        codec::decode(&bytes)
    }

    /// Atomically replace the entry for a key
    ///
    /// The artifact is encoded to a temp file in the cache directory and
    /// renamed over the target path. Repeating a put with the same artifact
    /// rewrites an identical blob.
    pub fn put(&self, key: CacheKey, artifact: &MatrixArtifact) -> Result<()> {
        let bytes = codec::encode(artifact)?;
        let path = self.path_for(key);

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&bytes)?;
        tmp.flush()?;
        tmp.persist(&path).map_err(|e| e.error)?;

        tracing::info!(
            key = %key,
            points = artifact.index.len(),
            path = %path.display(),
            "Matrix artifact written"
        );
        Ok(())
    }

    /// File names of entries already on disk
    fn scan_existing(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with("_matrix.json") {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::sample_artifact;
    use crate::region::TransportMode;
    use tempfile::TempDir;

    fn drive_key() -> CacheKey {
        CacheKey::new(1, TransportMode::Drive)
    }

    #[test]
    fn test_get_on_cold_key_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let cache = MatrixCache::new(temp_dir.path()).unwrap();

        assert!(!cache.exists(drive_key()));
        let err = cache.get(drive_key()).unwrap_err();
        assert!(matches!(err, TransportFramesError::NotFound(_)));
        assert_eq!(err.to_string(), "drive matrix not found for region 1");
    }

    #[test]
    fn test_put_then_get_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let cache = MatrixCache::new(temp_dir.path()).unwrap();

        let artifact = sample_artifact();
        cache.put(drive_key(), &artifact).unwrap();

        assert!(cache.exists(drive_key()));
        assert_eq!(cache.get(drive_key()).unwrap(), artifact);

        // Modes occupy distinct namespaces
        assert!(!cache.exists(CacheKey::new(1, TransportMode::Intermodal)));
    }

    #[test]
    fn test_put_replaces_wholesale() {
        let temp_dir = TempDir::new().unwrap();
        let cache = MatrixCache::new(temp_dir.path()).unwrap();

        cache.put(drive_key(), &sample_artifact()).unwrap();

        let mut updated = sample_artifact();
        updated.values[0][1] = 20.0;
        cache.put(drive_key(), &updated).unwrap();

        assert_eq!(cache.get(drive_key()).unwrap(), updated);
    }

    #[test]
    fn test_repeated_put_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let cache = MatrixCache::new(temp_dir.path()).unwrap();

        let artifact = sample_artifact();
        cache.put(drive_key(), &artifact).unwrap();
        cache.put(drive_key(), &artifact).unwrap();
        assert_eq!(cache.get(drive_key()).unwrap(), artifact);
    }

    #[test]
    fn test_deterministic_path() {
        let temp_dir = TempDir::new().unwrap();
        let cache = MatrixCache::new(temp_dir.path()).unwrap();

        let path = cache.path_for(CacheKey::new(7, TransportMode::Intermodal));
        assert!(path.ends_with("matrices/7_intermodal_matrix.json"));
    }

    #[test]
    fn test_corrupt_blob_is_codec_error_not_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let cache = MatrixCache::new(temp_dir.path()).unwrap();

        fs::write(cache.path_for(drive_key()), b"not a matrix").unwrap();
        let err = cache.get(drive_key()).unwrap_err();
        assert!(matches!(err, TransportFramesError::Codec(_)));
    }

    #[test]
    fn test_startup_scan_sees_existing_entries() {
        let temp_dir = TempDir::new().unwrap();
        {
            let cache = MatrixCache::new(temp_dir.path()).unwrap();
            cache.put(drive_key(), &sample_artifact()).unwrap();
        }
        // Re-opening over the same directory picks the entry up
        let reopened = MatrixCache::new(temp_dir.path()).unwrap();
        assert!(reopened.exists(drive_key()));
    }
}
