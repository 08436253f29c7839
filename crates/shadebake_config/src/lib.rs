//! Loading and validation of shadebake settings and the shader profile catalog.
//!
//! Settings come from three layers: command-line overrides, an optional
//! `shadebake.toml` file, and the `WINDOWS_SDK_ROOT` environment variable.
//! [`resolve_settings`] merges them into a single [`BuildSettings`]. The
//! profile catalog is a JSON list of [`Profile`] entries.

#![warn(missing_docs)]

pub mod catalog;
pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use catalog::{load_catalog, load_catalog_from_str, ProfileCatalog, DEFAULT_CATALOG};
pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str};
pub use resolve::{resolve_settings, SettingsOverrides, SDK_ROOT_ENV};
pub use types::*;
