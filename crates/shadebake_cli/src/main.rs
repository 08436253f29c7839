//! shadebake — incremental shader compilation.
//!
//! Compiles every shader source matched by the profile catalog with the
//! DirectX effect compiler, skipping sources whose content hash and compiled
//! object are unchanged since the last successful build, and deleting
//! objects whose sources were removed.

#![warn(missing_docs)]

mod build;
mod compiler;
mod logging;
mod pipeline;

use std::path::PathBuf;
use std::process;

use clap::Parser;

/// shadebake — compile changed shaders, skip the rest.
#[derive(Parser, Debug)]
#[command(name = "shadebake", version, about = "Incremental HLSL shader compiler driver")]
pub struct Cli {
    /// Root directory containing shader sources.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Root directory for compiled objects (created if absent).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory containing the shader compiler. Defaults to `$WINDOWS_SDK_ROOT`.
    #[arg(long)]
    pub sdk: Option<PathBuf>,

    /// Build cache file. Without it every shader is rebuilt and nothing is cached.
    #[arg(long = "cachePath", visible_alias = "cache-path")]
    pub cache_path: Option<PathBuf>,

    /// Profile catalog (JSON list of `profile_name`/`source_pattern` objects).
    #[arg(long)]
    pub profiles: Option<PathBuf>,

    /// Path to a `shadebake.toml` settings file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Leave whatever a failing compile wrote instead of deleting it.
    #[arg(long)]
    pub keep_failed_outputs: bool,

    /// Suppress all output except errors and compiler diagnostics.
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long)]
    pub verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    match build::run(&cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
