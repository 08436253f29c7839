//! Mapping shader sources to their compiled output objects.
//!
//! An object lives at the source's path relative to the input root, rebased
//! under the output root, with its extension replaced. `Shaders/fx/Blur_ps.hlsl`
//! compiles to `out/fx/Blur_ps.cso` for input root `Shaders` and output root
//! `out`.

use std::path::{Path, PathBuf};

use crate::error::CacheError;

/// Input/output directory pair plus the object extension.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    input_root: PathBuf,
    output_root: PathBuf,
    object_extension: String,
}

impl OutputLayout {
    /// Creates a layout. `input_root` should be canonical so it can be
    /// compared against cache keys.
    pub fn new(
        input_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        object_extension: impl Into<String>,
    ) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
            object_extension: object_extension.into(),
        }
    }

    /// The (canonical) input root.
    pub fn input_root(&self) -> &Path {
        &self.input_root
    }

    /// The output root.
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Absolute path of a source given its path relative to the input root.
    ///
    /// This is the key used in the build cache.
    pub fn source_path(&self, relative: &Path) -> PathBuf {
        self.input_root.join(relative)
    }

    /// Object path for a source given its path relative to the input root.
    pub fn artifact_path(&self, relative: &Path) -> PathBuf {
        self.output_root
            .join(relative)
            .with_extension(&self.object_extension)
    }

    /// Object path for an absolute source path.
    ///
    /// Returns `None` when the source does not live under the input root,
    /// e.g. a cache entry recorded by a run with a different `--input`.
    pub fn artifact_for_source(&self, source: &Path) -> Option<PathBuf> {
        let relative = source.strip_prefix(&self.input_root).ok()?;
        Some(self.artifact_path(relative))
    }
}

/// Deletes an output object.
///
/// Returns `Ok(true)` if a file was removed and `Ok(false)` if there was
/// nothing to remove.
pub fn remove_artifact(path: &Path) -> Result<bool, CacheError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(CacheError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
