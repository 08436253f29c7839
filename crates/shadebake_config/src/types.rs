//! Configuration types deserialized from `shadebake.toml` and the profile catalog.

use serde::Deserialize;
use std::path::PathBuf;

/// Name of the settings file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "shadebake.toml";

/// Name of the profile catalog looked up next to the executable.
pub const CATALOG_FILE_NAME: &str = "shader_profiles.json";

/// Compiler executable expected inside the SDK root.
pub const DEFAULT_COMPILER: &str = "fxc.exe";

/// Extension given to compiled shader objects.
pub const DEFAULT_OBJECT_EXTENSION: &str = "cso";

/// The top-level settings file parsed from `shadebake.toml`.
///
/// Every key is optional; command-line flags take precedence over anything
/// set here.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BakeConfig {
    /// Input/output/SDK/cache locations.
    #[serde(default)]
    pub paths: PathsConfig,
    /// Compiler invocation settings.
    #[serde(default)]
    pub compiler: CompilerConfig,
}

/// The `[paths]` section of `shadebake.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Root directory containing shader sources.
    pub input: Option<PathBuf>,
    /// Root directory receiving compiled objects.
    pub output: Option<PathBuf>,
    /// Directory containing the compiler executable.
    pub sdk: Option<PathBuf>,
    /// Location of the build cache file. Absent disables caching.
    pub cache: Option<PathBuf>,
    /// Location of the profile catalog.
    pub profiles: Option<PathBuf>,
}

/// The `[compiler]` section of `shadebake.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompilerConfig {
    /// Executable name inside the SDK root (default `fxc.exe`).
    pub executable: Option<String>,
    /// Extension for compiled objects, without the dot (default `cso`).
    pub object_extension: Option<String>,
    /// Leave whatever the compiler wrote in place when a compile fails.
    #[serde(default)]
    pub keep_failed_outputs: bool,
}

/// A named compiler target plus the file pattern it applies to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    /// Target string passed verbatim to the compiler (e.g. `ps_5_0`).
    #[serde(rename = "profile_name")]
    pub name: String,
    /// Glob matched recursively under the input root (e.g. `*_ps.hlsl`).
    pub source_pattern: String,
}

/// Where the profile catalog is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// A JSON catalog file on disk.
    File(PathBuf),
    /// The catalog compiled into the binary.
    BuiltIn,
}

/// Fully resolved settings for a single build run.
#[derive(Debug, Clone)]
pub struct BuildSettings {
    /// Root directory containing shader sources.
    pub input: PathBuf,
    /// Root directory receiving compiled objects.
    pub output: PathBuf,
    /// Directory containing the compiler executable.
    pub sdk_root: PathBuf,
    /// Build cache file. `None` disables persistent caching.
    pub cache_path: Option<PathBuf>,
    /// Where to read the profile catalog from.
    pub catalog: CatalogSource,
    /// Executable name inside `sdk_root`.
    pub compiler: String,
    /// Extension for compiled objects, without the dot.
    pub object_extension: String,
    /// Leave failed outputs on disk instead of removing them.
    pub keep_failed_outputs: bool,
}

impl BuildSettings {
    /// Full path of the compiler executable.
    pub fn compiler_path(&self) -> PathBuf {
        self.sdk_root.join(&self.compiler)
    }
}
