//! The build cache consulted and updated during a run.
//!
//! `BuildCache` owns two maps. `incoming` is what the previous run persisted;
//! every lookup removes its entry, so after all profiles are processed it
//! holds exactly the sources this run never visited. `outgoing` collects the
//! entries confirmed this run (skip hits and successful compiles) and is the
//! only thing written back.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use shadebake_common::ContentHash;

use crate::artifact::{remove_artifact, OutputLayout};
use crate::error::CacheError;
use crate::manifest::CacheFile;

/// Incremental build cache for one run.
#[derive(Debug, Default)]
pub struct BuildCache {
    /// Cache file location. `None` means caching is disabled for this run.
    cache_path: Option<PathBuf>,

    /// Entries from the previous run not yet visited.
    incoming: HashMap<PathBuf, ContentHash>,

    /// Entries confirmed valid this run.
    outgoing: BTreeMap<PathBuf, ContentHash>,
}

impl BuildCache {
    /// A cache that remembers nothing and persists nothing.
    ///
    /// Every source is treated as changed.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Loads the cache for a run.
    ///
    /// With no `cache_path` caching is disabled. A configured path that does
    /// not exist yet starts from an empty cache. A file that fails to parse
    /// is an error.
    pub fn load(cache_path: Option<&Path>) -> Result<Self, CacheError> {
        let Some(path) = cache_path else {
            return Ok(Self::disabled());
        };
        let file = CacheFile::load(path)?;
        tracing::debug!(
            path = %path.display(),
            entries = file.entries.len(),
            "loaded build cache"
        );
        Ok(Self {
            cache_path: Some(path.to_path_buf()),
            incoming: file.entries.into_iter().collect(),
            outgoing: BTreeMap::new(),
        })
    }

    /// Returns `true` if this run persists its cache.
    pub fn is_enabled(&self) -> bool {
        self.cache_path.is_some()
    }

    /// Consumes the previous entry for `source` and decides whether it can be
    /// skipped.
    ///
    /// Returns `true` only if the previous run recorded exactly `hash` for
    /// `source` and `artifact` still exists on disk. The entry is removed
    /// from the previous-run set either way; the caller is responsible for
    /// calling [`record`](Self::record) on a skip.
    pub fn should_skip(&mut self, source: &Path, hash: ContentHash, artifact: &Path) -> bool {
        match self.incoming.remove(source) {
            Some(previous) if previous == hash => {
                let present = artifact.exists();
                if !present {
                    tracing::debug!(
                        artifact = %artifact.display(),
                        "output missing, recompiling unchanged source"
                    );
                }
                present
            }
            _ => false,
        }
    }

    /// Records `source` as successfully built with `hash`.
    ///
    /// A later call for the same source replaces the earlier hash.
    pub fn record(&mut self, source: PathBuf, hash: ContentHash) {
        self.outgoing.insert(source, hash);
    }

    /// Drops any entry recorded for `source` during this run.
    pub fn forget(&mut self, source: &Path) {
        self.outgoing.remove(source);
    }

    /// Returns `true` if `source` was already recorded during this run.
    pub fn is_recorded(&self, source: &Path) -> bool {
        self.outgoing.contains_key(source)
    }

    /// Entries confirmed this run, in path order.
    pub fn confirmed(&self) -> &BTreeMap<PathBuf, ContentHash> {
        &self.outgoing
    }

    /// Previous-run entries not visited so far.
    pub fn unvisited(&self) -> impl Iterator<Item = &Path> {
        self.incoming.keys().map(PathBuf::as_path)
    }

    /// Deletes compiled objects whose sources no longer exist.
    ///
    /// Walks every entry left in the previous-run set. Sources that are gone
    /// have their object removed from `layout`'s output root; sources that
    /// still exist but were not visited keep their object. An object that
    /// cannot be deleted keeps its entry in the confirmed set so the next run
    /// tries again. The previous-run set is empty afterwards. Returns the
    /// objects actually deleted, in path order.
    pub fn prune_orphans(&mut self, layout: &OutputLayout) -> Vec<PathBuf> {
        let mut leftovers: Vec<(PathBuf, ContentHash)> = self.incoming.drain().collect();
        leftovers.sort_by(|a, b| a.0.cmp(&b.0));

        let mut removed = Vec::new();
        for (source, hash) in leftovers {
            if source.exists() {
                tracing::debug!(
                    source = %source.display(),
                    "source exists but matched no profile, leaving its output"
                );
                continue;
            }
            let Some(artifact) = layout.artifact_for_source(&source) else {
                tracing::debug!(
                    source = %source.display(),
                    input = %layout.input_root().display(),
                    "stale cache entry outside the input root"
                );
                continue;
            };
            match remove_artifact(&artifact) {
                Ok(true) => {
                    tracing::info!(artifact = %artifact.display(), "removed orphaned output");
                    removed.push(artifact);
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(
                        source = %source.display(),
                        "{e}, keeping cache entry to retry next run"
                    );
                    self.outgoing.insert(source, hash);
                }
            }
        }
        removed
    }

    /// Writes the confirmed entries to the cache file.
    ///
    /// Does nothing when caching is disabled.
    pub fn persist(&self) -> Result<(), CacheError> {
        let Some(path) = &self.cache_path else {
            return Ok(());
        };
        let file = CacheFile {
            entries: self.outgoing.clone(),
        };
        file.save(path)?;
        tracing::debug!(
            path = %path.display(),
            entries = file.entries.len(),
            "saved build cache"
        );
        Ok(())
    }
}
