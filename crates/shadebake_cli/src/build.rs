//! `shadebake` build run: compile changed shaders, prune orphans, save the cache.
//!
//! Orchestrates one run:
//! 1. Resolve settings and check preconditions
//! 2. Load the profile catalog and the build cache
//! 3. Discover sources for every profile
//! 4. Create the output directory
//! 5. For each profile and source, skip it or compile it
//! 6. Delete objects of sources that disappeared
//! 7. Persist the build cache

use std::path::Path;

use shadebake_cache::artifact::remove_artifact;
use shadebake_cache::{BuildCache, CacheError, OutputLayout, SourceHasher};
use shadebake_config::{Profile, ProfileCatalog};

use crate::compiler::{CompileOutcome, FxcCompiler, ShaderCompiler};
use crate::pipeline::{
    canonical_input_root, check_preconditions, plan_profiles, resolve_build_settings,
    ProfileSources,
};
use crate::Cli;

/// Behavior switches for [`build_shaders`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Suppress progress lines. Failure diagnostics are still printed.
    pub quiet: bool,
    /// Leave whatever a failing compile wrote instead of deleting it.
    pub keep_failed_outputs: bool,
}

/// What happened during a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Sources compiled successfully.
    pub compiled: usize,
    /// Sources skipped because their hash and object were unchanged.
    pub skipped: usize,
    /// Sources whose compile failed.
    pub failed: usize,
    /// Objects deleted because their source disappeared.
    pub pruned: usize,
}

impl BuildReport {
    /// Number of compiler invocations performed.
    pub fn invocations(&self) -> usize {
        self.compiled + self.failed
    }
}

/// Final state of one source in one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileStatus {
    SkipHit,
    Compiled,
    Failed,
}

/// Runs a build from command-line arguments.
///
/// Returns exit code 0 if every source compiled or was skipped, 1 if any
/// compile failed. Precondition and cache errors are returned as `Err`
/// before anything is written.
pub fn run(cli: &Cli) -> Result<i32, Box<dyn std::error::Error>> {
    // Step 1: Settings and preconditions
    let settings = resolve_build_settings(cli)?;
    check_preconditions(&settings)?;

    // Step 2: Catalog and cache
    let catalog = ProfileCatalog::from_source(&settings.catalog)?;
    if catalog.is_empty() {
        tracing::warn!("profile catalog is empty, nothing to build");
    }
    let mut cache = BuildCache::load(settings.cache_path.as_deref())?;

    // Step 3: Discover sources
    let input_root = canonical_input_root(&settings.input)?;
    let plan = plan_profiles(&input_root, &catalog)?;

    // Step 4: Output directory
    std::fs::create_dir_all(&settings.output)?;
    let layout = OutputLayout::new(
        input_root,
        settings.output.clone(),
        settings.object_extension.clone(),
    );

    // Steps 5-7
    let compiler = FxcCompiler::new(settings.compiler_path());
    let options = BuildOptions {
        quiet: cli.quiet,
        keep_failed_outputs: settings.keep_failed_outputs,
    };
    let report = build_shaders(&plan, &layout, &mut cache, &compiler, options)?;

    if !cli.quiet {
        println!(
            "{} compiled, {} up to date, {} failed, {} removed",
            report.compiled, report.skipped, report.failed, report.pruned
        );
    }
    Ok(if report.failed == 0 { 0 } else { 1 })
}

/// Builds every planned source, then prunes orphans and persists the cache.
///
/// Per-source failures are reported and counted but never abort the batch.
/// Only a failure to write the cache file is returned as an error.
pub fn build_shaders(
    plan: &[ProfileSources],
    layout: &OutputLayout,
    cache: &mut BuildCache,
    compiler: &dyn ShaderCompiler,
    options: BuildOptions,
) -> Result<BuildReport, CacheError> {
    let mut report = BuildReport::default();

    for entry in plan {
        if !options.quiet {
            println!("{}", entry.profile.name);
        }
        for relative in &entry.sources {
            match build_source(&entry.profile, relative, layout, cache, compiler, options) {
                FileStatus::SkipHit => report.skipped += 1,
                FileStatus::Compiled => report.compiled += 1,
                FileStatus::Failed => report.failed += 1,
            }
        }
    }

    report.pruned = cache.prune_orphans(layout).len();
    cache.persist()?;
    tracing::debug!(
        invocations = report.invocations(),
        skipped = report.skipped,
        "build finished"
    );
    Ok(report)
}

/// Skips or compiles a single source and updates the cache accordingly.
fn build_source(
    profile: &Profile,
    relative: &Path,
    layout: &OutputLayout,
    cache: &mut BuildCache,
    compiler: &dyn ShaderCompiler,
    options: BuildOptions,
) -> FileStatus {
    let source = layout.source_path(relative);
    let artifact = layout.artifact_path(relative);

    let hash = match SourceHasher::hash_file(&source) {
        Ok(hash) => hash,
        Err(e) => {
            println!("{e}");
            cache.forget(&source);
            return FileStatus::Failed;
        }
    };

    if cache.is_recorded(&source) {
        tracing::warn!(
            source = %source.display(),
            profile = %profile.name,
            "source matches more than one profile, rebuilding for this one"
        );
    }

    if cache.should_skip(&source, hash, &artifact) {
        tracing::debug!(source = %relative.display(), "up to date");
        cache.record(source, hash);
        return FileStatus::SkipHit;
    }

    if let Some(parent) = artifact.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            println!("failed to create {}: {e}", parent.display());
            cache.forget(&source);
            return FileStatus::Failed;
        }
    }

    if !options.quiet {
        println!("- {} -> {}", source.display(), artifact.display());
    }

    let outcome = compiler
        .compile(profile, &source, &artifact)
        .unwrap_or_else(|e| CompileOutcome::Failed {
            command: format!("{} ({})", profile.name, source.display()),
            stdout: String::new(),
            stderr: format!("failed to run compiler: {e}"),
        });

    match outcome {
        CompileOutcome::Succeeded => {
            cache.record(source, hash);
            FileStatus::Compiled
        }
        CompileOutcome::Failed {
            command,
            stdout,
            stderr,
        } => {
            println!("{command}");
            println!("{stdout}");
            println!("{stderr}");
            cache.forget(&source);
            if !options.keep_failed_outputs {
                match remove_artifact(&artifact) {
                    Ok(true) => tracing::debug!(
                        artifact = %artifact.display(),
                        "removed output of failed compile"
                    ),
                    Ok(false) => {}
                    Err(e) => tracing::warn!("{e}"),
                }
            }
            FileStatus::Failed
        }
    }
}
