//! Merging command-line overrides, the settings file and the environment.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::types::{
    BakeConfig, BuildSettings, CatalogSource, CATALOG_FILE_NAME, DEFAULT_COMPILER,
    DEFAULT_OBJECT_EXTENSION,
};

/// Environment variable consulted for the SDK root when no flag or setting names one.
pub const SDK_ROOT_ENV: &str = "WINDOWS_SDK_ROOT";

/// Values supplied on the command line. These win over every other layer.
#[derive(Debug, Default, Clone)]
pub struct SettingsOverrides {
    /// `--input`
    pub input: Option<PathBuf>,
    /// `--output`
    pub output: Option<PathBuf>,
    /// `--sdk`
    pub sdk: Option<PathBuf>,
    /// `--cachePath`
    pub cache_path: Option<PathBuf>,
    /// `--profiles`
    pub profiles: Option<PathBuf>,
    /// `--keep-failed-outputs`
    pub keep_failed_outputs: bool,
}

/// Resolves the settings for a build run.
///
/// Precedence is command line, then `config`, then `env_sdk_root` (for the
/// SDK root only). The catalog falls back to `shader_profiles.json` inside
/// `exe_dir` when it exists there, and to the built-in catalog otherwise.
pub fn resolve_settings(
    overrides: SettingsOverrides,
    config: &BakeConfig,
    env_sdk_root: Option<PathBuf>,
    exe_dir: Option<&Path>,
) -> Result<BuildSettings, ConfigError> {
    let paths = &config.paths;

    let input = overrides
        .input
        .or_else(|| paths.input.clone())
        .ok_or_else(|| ConfigError::MissingField("input (--input)".to_string()))?;
    let output = overrides
        .output
        .or_else(|| paths.output.clone())
        .ok_or_else(|| ConfigError::MissingField("output (--output)".to_string()))?;
    let sdk_root = overrides
        .sdk
        .or_else(|| paths.sdk.clone())
        .or(env_sdk_root)
        .ok_or_else(|| {
            ConfigError::MissingField(format!("SDK root (--sdk or ${SDK_ROOT_ENV})"))
        })?;
    let cache_path = overrides.cache_path.or_else(|| paths.cache.clone());

    let catalog = match overrides.profiles.or_else(|| paths.profiles.clone()) {
        Some(path) => CatalogSource::File(path),
        None => exe_dir
            .map(|dir| dir.join(CATALOG_FILE_NAME))
            .filter(|candidate| candidate.is_file())
            .map_or(CatalogSource::BuiltIn, CatalogSource::File),
    };

    Ok(BuildSettings {
        input,
        output,
        sdk_root,
        cache_path,
        catalog,
        compiler: config
            .compiler
            .executable
            .clone()
            .unwrap_or_else(|| DEFAULT_COMPILER.to_string()),
        object_extension: config
            .compiler
            .object_extension
            .clone()
            .unwrap_or_else(|| DEFAULT_OBJECT_EXTENSION.to_string()),
        keep_failed_outputs: overrides.keep_failed_outputs || config.compiler.keep_failed_outputs,
    })
}
