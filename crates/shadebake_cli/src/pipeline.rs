//! Shared pipeline helpers: settings loading, precondition checks and
//! source discovery.
//!
//! Everything here runs before the first file is written, so any error it
//! returns aborts the run with no partial work.

use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use shadebake_config::{
    BakeConfig, BuildSettings, Profile, ProfileCatalog, SettingsOverrides, CONFIG_FILE_NAME,
    SDK_ROOT_ENV,
};
use walkdir::WalkDir;

use crate::Cli;

/// The sources a single profile will build, relative to the input root.
#[derive(Debug, Clone)]
pub struct ProfileSources {
    /// The profile to compile with.
    pub profile: Profile,
    /// Matching sources relative to the input root, sorted.
    pub sources: Vec<PathBuf>,
}

/// Loads the settings file named by `--config`, or `shadebake.toml` in the
/// current directory when present.
pub fn load_bake_config(explicit: Option<&Path>) -> Result<BakeConfig, Box<dyn std::error::Error>> {
    if let Some(path) = explicit {
        return Ok(shadebake_config::load_config(path)?);
    }
    let local = Path::new(CONFIG_FILE_NAME);
    if local.is_file() {
        tracing::debug!("using {CONFIG_FILE_NAME} from the working directory");
        return Ok(shadebake_config::load_config(local)?);
    }
    Ok(BakeConfig::default())
}

/// Resolves settings from the command line, the settings file and the environment.
pub fn resolve_build_settings(cli: &Cli) -> Result<BuildSettings, Box<dyn std::error::Error>> {
    let config = load_bake_config(cli.config.as_deref())?;
    let overrides = SettingsOverrides {
        input: cli.input.clone(),
        output: cli.output.clone(),
        sdk: cli.sdk.clone(),
        cache_path: cli.cache_path.clone(),
        profiles: cli.profiles.clone(),
        keep_failed_outputs: cli.keep_failed_outputs,
    };
    let env_sdk = std::env::var_os(SDK_ROOT_ENV).map(PathBuf::from);
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    Ok(shadebake_config::resolve_settings(
        overrides,
        &config,
        env_sdk,
        exe_dir.as_deref(),
    )?)
}

/// Checks the filesystem preconditions for a run.
///
/// The input must be a directory, the output must not be an existing file,
/// the SDK root must be a directory and it must contain the compiler.
pub fn check_preconditions(settings: &BuildSettings) -> Result<(), Box<dyn std::error::Error>> {
    if !settings.input.is_dir() {
        return Err(format!(
            "input path \"{}\" is not a valid directory",
            settings.input.display()
        )
        .into());
    }
    if settings.output.is_file() {
        return Err(format!(
            "output path \"{}\" already exists as a file",
            settings.output.display()
        )
        .into());
    }
    if !settings.sdk_root.is_dir() {
        return Err(format!(
            "sdk path \"{}\" is not a valid directory",
            settings.sdk_root.display()
        )
        .into());
    }
    if !settings.compiler_path().is_file() {
        return Err(format!(
            "sdk path \"{}\" does not contain the shader compiler ({})",
            settings.sdk_root.display(),
            settings.compiler
        )
        .into());
    }
    Ok(())
}

/// Resolves the input root that cache keys are built from.
///
/// The root is canonicalized so every spelling of the same directory yields
/// the same keys. Call after [`check_preconditions`] has confirmed it exists.
pub fn canonical_input_root(input: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    std::fs::canonicalize(input).map_err(|e| {
        format!("cannot resolve input path \"{}\": {e}", input.display()).into()
    })
}

/// Builds the matcher for a profile's pattern.
///
/// The pattern is matched anywhere below the input root, and `*` does not
/// cross directory separators.
pub fn pattern_matcher(pattern: &str) -> Result<GlobMatcher, globset::Error> {
    Ok(GlobBuilder::new(&format!("**/{pattern}"))
        .literal_separator(true)
        .build()?
        .compile_matcher())
}

/// Discovers the sources under `input_root` matching `pattern`.
///
/// Returns paths relative to `input_root`, sorted so that repeated runs
/// over the same tree visit files in the same order.
pub fn discover_sources(
    input_root: &Path,
    pattern: &str,
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let matcher = pattern_matcher(pattern)?;
    let mut sources = Vec::new();
    for entry in WalkDir::new(input_root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(input_root)?;
        if matcher.is_match(relative) {
            sources.push(relative.to_path_buf());
        }
    }
    sources.sort();
    Ok(sources)
}

/// Discovers sources for every profile, in catalog order.
pub fn plan_profiles(
    input_root: &Path,
    catalog: &ProfileCatalog,
) -> Result<Vec<ProfileSources>, Box<dyn std::error::Error>> {
    catalog
        .profiles()
        .iter()
        .map(|profile| -> Result<ProfileSources, Box<dyn std::error::Error>> {
            Ok(ProfileSources {
                profile: profile.clone(),
                sources: discover_sources(input_root, &profile.source_pattern)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shadebake_config::{load_catalog_from_str, CatalogSource};

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, relative).unwrap();
    }

    fn settings(root: &Path) -> BuildSettings {
        BuildSettings {
            input: root.join("Shaders"),
            output: root.join("out"),
            sdk_root: root.join("sdk"),
            cache_path: None,
            catalog: CatalogSource::BuiltIn,
            compiler: "fxc.exe".to_string(),
            object_extension: "cso".to_string(),
            keep_failed_outputs: false,
        }
    }

    fn valid_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("Shaders")).unwrap();
        touch(dir.path(), "sdk/fxc.exe");
        dir
    }

    #[test]
    fn pattern_matches_at_any_depth() {
        let m = pattern_matcher("*_ps.hlsl").unwrap();
        assert!(m.is_match("Cube_ps.hlsl"));
        assert!(m.is_match("post/fx/Blur_ps.hlsl"));
        assert!(!m.is_match("Cube_vs.hlsl"));
        assert!(!m.is_match("Cube_ps.hlsli"));
    }

    #[test]
    fn discover_is_sorted_and_relative() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "z_ps.hlsl");
        touch(dir.path(), "a_ps.hlsl");
        touch(dir.path(), "post/m_ps.hlsl");
        touch(dir.path(), "post/m_vs.hlsl");
        touch(dir.path(), "common.hlsli");

        let found = discover_sources(dir.path(), "*_ps.hlsl").unwrap();
        assert_eq!(
            found,
            vec![
                PathBuf::from("a_ps.hlsl"),
                PathBuf::from("post/m_ps.hlsl"),
                PathBuf::from("z_ps.hlsl"),
            ]
        );
    }

    #[test]
    fn discover_ignores_directories_matching_pattern() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("weird_ps.hlsl")).unwrap();
        touch(dir.path(), "weird_ps.hlsl/inner_ps.hlsl");

        let found = discover_sources(dir.path(), "*_ps.hlsl").unwrap();
        assert_eq!(found, vec![PathBuf::from("weird_ps.hlsl/inner_ps.hlsl")]);
    }

    #[test]
    fn plan_follows_catalog_order() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "Cube_vs.hlsl");
        touch(dir.path(), "Cube_ps.hlsl");
        let catalog = load_catalog_from_str(
            r#"[
                { "profile_name": "ps_5_0", "source_pattern": "*_ps.hlsl" },
                { "profile_name": "vs_5_0", "source_pattern": "*_vs.hlsl" }
            ]"#,
        )
        .unwrap();

        let plan = plan_profiles(dir.path(), &catalog).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].profile.name, "ps_5_0");
        assert_eq!(plan[0].sources, vec![PathBuf::from("Cube_ps.hlsl")]);
        assert_eq!(plan[1].sources, vec![PathBuf::from("Cube_vs.hlsl")]);
    }

    #[test]
    fn input_root_spellings_resolve_to_one_path() {
        let dir = valid_tree();
        std::fs::create_dir_all(dir.path().join("x")).unwrap();

        let direct = canonical_input_root(&dir.path().join("Shaders")).unwrap();
        let roundabout = canonical_input_root(&dir.path().join("x/../Shaders/.")).unwrap();
        assert_eq!(direct, roundabout);
        assert!(direct.is_absolute());
        assert!(!direct.components().any(|c| matches!(
            c,
            std::path::Component::ParentDir | std::path::Component::CurDir
        )));
    }

    #[test]
    fn missing_input_root_cannot_be_resolved() {
        let dir = tempfile::tempdir().unwrap();
        let err = canonical_input_root(&dir.path().join("nope")).unwrap_err();
        assert!(err.to_string().starts_with("cannot resolve input path"));
    }

    #[test]
    fn preconditions_pass_for_valid_tree() {
        let dir = valid_tree();
        check_preconditions(&settings(dir.path())).unwrap();
    }

    #[test]
    fn missing_input_dir_fails() {
        let dir = valid_tree();
        std::fs::remove_dir(dir.path().join("Shaders")).unwrap();
        let err = check_preconditions(&settings(dir.path())).unwrap_err();
        assert!(err.to_string().contains("is not a valid directory"));
    }

    #[test]
    fn output_that_is_a_file_fails() {
        let dir = valid_tree();
        touch(dir.path(), "out");
        let err = check_preconditions(&settings(dir.path())).unwrap_err();
        assert!(err.to_string().contains("already exists as a file"));
    }

    #[test]
    fn missing_compiler_fails() {
        let dir = valid_tree();
        std::fs::remove_file(dir.path().join("sdk").join("fxc.exe")).unwrap();
        let err = check_preconditions(&settings(dir.path())).unwrap_err();
        assert!(err.to_string().contains("does not contain the shader compiler"));
    }

    #[test]
    fn missing_sdk_dir_fails() {
        let dir = valid_tree();
        std::fs::remove_dir_all(dir.path().join("sdk")).unwrap();
        let err = check_preconditions(&settings(dir.path())).unwrap_err();
        assert!(err.to_string().starts_with("sdk path"));
    }

    #[test]
    fn explicit_config_must_exist() {
        assert!(load_bake_config(Some(Path::new("/nonexistent/shadebake.toml"))).is_err());
    }
}
