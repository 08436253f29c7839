//! Invoking the external shader compiler.
//!
//! The compiler is treated as a black box that turns one source into one
//! object for a given profile. Anything written to its error stream counts
//! as a failure, regardless of exit status.

use std::path::{Path, PathBuf};
use std::process::Command;

use shadebake_config::Profile;

/// Result of compiling a single source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    /// The compiler reported nothing on its error stream.
    Succeeded,
    /// The compiler wrote diagnostics to its error stream.
    Failed {
        /// The command line that was run, for the user to reproduce.
        command: String,
        /// Everything the compiler printed to stdout.
        stdout: String,
        /// Everything the compiler printed to stderr.
        stderr: String,
    },
}

impl CompileOutcome {
    /// Classifies captured compiler output.
    pub fn from_streams(command: String, stdout: &[u8], stderr: &[u8]) -> Self {
        if stderr.is_empty() {
            Self::Succeeded
        } else {
            Self::Failed {
                command,
                stdout: String::from_utf8_lossy(stdout).into_owned(),
                stderr: String::from_utf8_lossy(stderr).into_owned(),
            }
        }
    }

    /// Returns `true` for [`CompileOutcome::Succeeded`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// Something that can compile one shader source for one profile.
pub trait ShaderCompiler {
    /// Compiles `input` for `profile`, writing the object to `output`.
    ///
    /// `Err` means the compiler could not be run at all.
    fn compile(
        &self,
        profile: &Profile,
        input: &Path,
        output: &Path,
    ) -> std::io::Result<CompileOutcome>;
}

/// The DirectX effect compiler (`fxc.exe`) or a command-line compatible tool.
#[derive(Debug, Clone)]
pub struct FxcCompiler {
    executable: PathBuf,
}

impl FxcCompiler {
    /// Creates a driver for the compiler at `executable`.
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Renders the command line used for `input` → `output`.
    pub fn command_line(&self, profile: &Profile, input: &Path, output: &Path) -> String {
        format!(
            "\"{}\" -T {} -Fo \"{}\" \"{}\"",
            self.executable.display(),
            profile.name,
            output.display(),
            input.display()
        )
    }
}

impl ShaderCompiler for FxcCompiler {
    fn compile(
        &self,
        profile: &Profile,
        input: &Path,
        output: &Path,
    ) -> std::io::Result<CompileOutcome> {
        let command = self.command_line(profile, input, output);
        tracing::debug!(%command, "running compiler");

        let result = Command::new(&self.executable)
            .arg("-T")
            .arg(&profile.name)
            .arg("-Fo")
            .arg(output)
            .arg(input)
            .output()?;

        if !result.status.success() && result.stderr.is_empty() {
            tracing::warn!(
                status = %result.status,
                "compiler exited unsuccessfully without diagnostics"
            );
        }
        let outcome = CompileOutcome::from_streams(command, &result.stdout, &result.stderr);
        tracing::debug!(
            input = %input.display(),
            success = outcome.is_success(),
            "compiler finished"
        );
        Ok(outcome)
    }
}
