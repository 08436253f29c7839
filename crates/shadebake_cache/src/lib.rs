//! Incremental build cache for compiled shader objects.
//!
//! The cache maps absolute source paths to the content hash they had when
//! they last compiled successfully. A run drains the previous mapping while
//! it visits sources and builds a fresh one from confirmed entries; whatever
//! is left undrained at the end names sources that may have been deleted,
//! whose compiled objects are then pruned.

#![warn(missing_docs)]

pub mod artifact;
pub mod cache;
pub mod error;
pub mod hasher;
pub mod manifest;

pub use artifact::OutputLayout;
pub use cache::BuildCache;
pub use error::CacheError;
pub use hasher::SourceHasher;
pub use manifest::CacheFile;
