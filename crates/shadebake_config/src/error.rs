//! Error types for configuration and catalog loading.

use std::path::PathBuf;

/// Errors that can occur while loading settings or the profile catalog.
///
/// All of these are fatal preconditions: they are reported before any
/// output or cache file is touched.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading a configuration file.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The TOML or JSON content could not be parsed.
    #[error("failed to parse {what}: {reason}")]
    Parse {
        /// Which document failed to parse (e.g. "shadebake.toml").
        what: String,
        /// Description of the parse failure.
        reason: String,
    },

    /// A required setting was not supplied by any layer.
    #[error("missing required setting: {0}")]
    MissingField(String),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_missing_field() {
        let err = ConfigError::MissingField("input".to_string());
        assert_eq!(format!("{err}"), "missing required setting: input");
    }

    #[test]
    fn display_parse_error() {
        let err = ConfigError::Parse {
            what: "profile catalog".to_string(),
            reason: "expected `[` at line 1".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "failed to parse profile catalog: expected `[` at line 1"
        );
    }

    #[test]
    fn display_validation_error() {
        let err = ConfigError::Validation("profile #0 has an empty name".to_string());
        assert_eq!(
            format!("{err}"),
            "validation error: profile #0 has an empty name"
        );
    }

    #[test]
    fn display_io_error() {
        let err = ConfigError::Io {
            path: PathBuf::from("shader_profiles.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        };
        let display = format!("{err}");
        assert!(display.starts_with("failed to read shader_profiles.json:"));
    }
}
