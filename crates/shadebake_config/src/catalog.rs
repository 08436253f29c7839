//! The shader profile catalog.
//!
//! The catalog is a JSON array of `{ "profile_name", "source_pattern" }`
//! objects. Profiles are kept in file order, which is the order they are
//! built and reported in.

use std::path::Path;

use globset::Glob;

use crate::error::ConfigError;
use crate::types::{CatalogSource, Profile};

/// Catalog used when no catalog file is configured or found.
pub const DEFAULT_CATALOG: &str = r#"[
    { "profile_name": "vs_5_1", "source_pattern": "*_vs.hlsl" },
    { "profile_name": "hs_5_1", "source_pattern": "*_hs.hlsl" },
    { "profile_name": "ds_5_1", "source_pattern": "*_ds.hlsl" },
    { "profile_name": "gs_5_1", "source_pattern": "*_gs.hlsl" },
    { "profile_name": "ps_5_1", "source_pattern": "*_ps.hlsl" },
    { "profile_name": "cs_5_1", "source_pattern": "*_cs.hlsl" }
]"#;

/// An ordered, validated list of shader profiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileCatalog {
    profiles: Vec<Profile>,
}

impl ProfileCatalog {
    /// Builds a catalog from already-constructed profiles, validating each one.
    pub fn new(profiles: Vec<Profile>) -> Result<Self, ConfigError> {
        for (index, profile) in profiles.iter().enumerate() {
            validate_profile(index, profile)?;
        }
        Ok(Self { profiles })
    }

    /// Loads the catalog described by `source`.
    pub fn from_source(source: &CatalogSource) -> Result<Self, ConfigError> {
        match source {
            CatalogSource::File(path) => load_catalog(path),
            CatalogSource::BuiltIn => load_catalog_from_str(DEFAULT_CATALOG),
        }
    }

    /// Returns the profiles in catalog order.
    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    /// Returns the number of profiles.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Returns `true` if the catalog has no profiles.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Reads and validates a catalog file.
pub fn load_catalog(path: &Path) -> Result<ProfileCatalog, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    load_catalog_from_str(&content)
}

/// Parses and validates a catalog from a JSON string.
pub fn load_catalog_from_str(content: &str) -> Result<ProfileCatalog, ConfigError> {
    let profiles: Vec<Profile> =
        serde_json::from_str(content).map_err(|e| ConfigError::Parse {
            what: "profile catalog".to_string(),
            reason: e.to_string(),
        })?;
    ProfileCatalog::new(profiles)
}

fn validate_profile(index: usize, profile: &Profile) -> Result<(), ConfigError> {
    if profile.name.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "profile #{index} has an empty profile_name"
        )));
    }
    if profile.source_pattern.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "profile '{}' has an empty source_pattern",
            profile.name
        )));
    }
    Glob::new(&profile.source_pattern).map_err(|e| {
        ConfigError::Validation(format!(
            "profile '{}' has an invalid source_pattern: {e}",
            profile.name
        ))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_is_valid() {
        let catalog = load_catalog_from_str(DEFAULT_CATALOG).unwrap();
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog.profiles()[0].name, "vs_5_1");
        assert_eq!(catalog.profiles()[4].source_pattern, "*_ps.hlsl");
    }

    #[test]
    fn preserves_file_order() {
        let json = r#"[
            { "profile_name": "ps_5_0", "source_pattern": "*.ps.hlsl" },
            { "profile_name": "vs_5_0", "source_pattern": "*.vs.hlsl" }
        ]"#;
        let catalog = load_catalog_from_str(json).unwrap();
        let names: Vec<_> = catalog.profiles().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["ps_5_0", "vs_5_0"]);
    }

    #[test]
    fn empty_catalog_is_allowed() {
        let catalog = load_catalog_from_str("[]").unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn malformed_json_errors() {
        let err = load_catalog_from_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_field_errors() {
        let err = load_catalog_from_str(r#"[{ "profile_name": "ps_5_0" }]"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn unknown_field_errors() {
        let json = r#"[{ "profile_name": "ps_5_0", "source_pattern": "*.hlsl", "entry": "main" }]"#;
        let err = load_catalog_from_str(json).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn empty_name_rejected() {
        let json = r#"[{ "profile_name": "", "source_pattern": "*.hlsl" }]"#;
        let err = load_catalog_from_str(json).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn invalid_glob_rejected() {
        let json = r#"[{ "profile_name": "ps_5_0", "source_pattern": "[*.hlsl" }]"#;
        let err = load_catalog_from_str(json).unwrap_err();
        assert!(err.to_string().contains("invalid source_pattern"));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shader_profiles.json");
        std::fs::write(
            &path,
            r#"[{ "profile_name": "cs_5_0", "source_pattern": "*.compute.hlsl" }]"#,
        )
        .unwrap();
        let catalog = ProfileCatalog::from_source(&CatalogSource::File(path)).unwrap();
        assert_eq!(catalog.profiles()[0].name, "cs_5_0");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_catalog(Path::new("/nonexistent/shader_profiles.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn built_in_source() {
        let catalog = ProfileCatalog::from_source(&CatalogSource::BuiltIn).unwrap();
        assert!(!catalog.is_empty());
    }
}
