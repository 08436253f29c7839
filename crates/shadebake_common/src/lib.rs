//! Shared foundational types used across the shadebake workspace.
//!
//! Currently this is the content fingerprint used to decide whether a shader
//! source changed since its last successful compile.
//! The fingerprint is XXH3-128; caches holding MD5 digests load but miss
//! once (see [`ContentHash`]).

#![warn(missing_docs)]

pub mod hash;

pub use hash::{ContentHash, ParseHashError};
