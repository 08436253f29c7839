//! The on-disk cache file.
//!
//! The file is a flat JSON object mapping absolute source paths to the hex
//! content hash recorded at their last successful compile:
//!
//! ```json
//! {
//!   "/work/Shaders/Cube_ps.hlsl": "5d41402abc4b2a76b9719d911017c592"
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shadebake_common::ContentHash;

use crate::error::CacheError;

/// Contents of a cache file.
///
/// Entries are kept in a `BTreeMap` so identical contents always serialize
/// to identical bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheFile {
    /// Source path to content hash.
    pub entries: BTreeMap<PathBuf, ContentHash>,
}

impl CacheFile {
    /// Loads a cache file.
    ///
    /// A missing file yields an empty cache (first run). A file that exists
    /// but does not parse is reported as [`CacheError::ManifestParse`].
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(CacheError::Io {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };
        serde_json::from_str(&content).map_err(|e| CacheError::ManifestParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Writes the cache file, replacing any previous one.
    ///
    /// The JSON is written to a sibling `.tmp` file first and then renamed
    /// over `path`, so an interrupted write leaves the old cache intact.
    /// Creates the parent directory if needed.
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CacheError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;

        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);
        std::fs::write(&tmp_path, json).map_err(|e| CacheError::Io {
            path: tmp_path.clone(),
            source: e,
        })?;
        std::fs::rename(&tmp_path, path).map_err(|e| CacheError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheFile::load(&dir.path().join("shader_cache.json")).unwrap();
        assert!(cache.entries.is_empty());
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shader_cache.json");
        let mut cache = CacheFile::default();
        cache.entries.insert(
            PathBuf::from("/work/Shaders/Cube_vs.hlsl"),
            ContentHash::from_bytes(b"vs"),
        );
        cache.save(&path).unwrap();

        let loaded = CacheFile::load(&path).unwrap();
        assert_eq!(loaded, cache);
        assert!(!dir.path().join("shader_cache.json.tmp").exists());
    }

    #[test]
    fn file_is_flat_string_map() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shader_cache.json");
        let hash = ContentHash::from_bytes(b"ps");
        let mut cache = CacheFile::default();
        cache
            .entries
            .insert(PathBuf::from("/work/Shaders/Cube_ps.hlsl"), hash);
        cache.save(&path).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            raw["/work/Shaders/Cube_ps.hlsl"],
            serde_json::Value::String(hash.to_string())
        );
    }

    #[test]
    fn identical_contents_produce_identical_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.json");
        let second = dir.path().join("second.json");

        let mut a = CacheFile::default();
        a.entries.insert(PathBuf::from("/b.hlsl"), ContentHash::from_bytes(b"b"));
        a.entries.insert(PathBuf::from("/a.hlsl"), ContentHash::from_bytes(b"a"));
        let mut b = CacheFile::default();
        b.entries.insert(PathBuf::from("/a.hlsl"), ContentHash::from_bytes(b"a"));
        b.entries.insert(PathBuf::from("/b.hlsl"), ContentHash::from_bytes(b"b"));

        a.save(&first).unwrap();
        b.save(&second).unwrap();
        assert_eq!(
            std::fs::read(&first).unwrap(),
            std::fs::read(&second).unwrap()
        );
    }

    #[test]
    fn corrupt_json_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shader_cache.json");
        std::fs::write(&path, "not valid json {{{").unwrap();
        let err = CacheFile::load(&path).unwrap_err();
        assert!(matches!(err, CacheError::ManifestParse { .. }));
    }

    #[test]
    fn wrong_shape_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shader_cache.json");
        std::fs::write(&path, r#"["/a.hlsl"]"#).unwrap();
        assert!(matches!(
            CacheFile::load(&path),
            Err(CacheError::ManifestParse { .. })
        ));

        std::fs::write(&path, r#"{ "/a.hlsl": "not-a-hash" }"#).unwrap();
        assert!(matches!(
            CacheFile::load(&path),
            Err(CacheError::ManifestParse { .. })
        ));
    }

    #[test]
    fn save_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("build").join("cache").join("shader_cache.json");
        CacheFile::default().save(&nested).unwrap();
        assert!(nested.exists());
    }
}
