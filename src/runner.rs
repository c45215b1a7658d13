//! Process spawning boundary.
//!
//! Every external program the launcher touches (extractors, interpreters,
//! the package's own binaries) goes through a [`ProcessRunner`], which
//! keeps the dispatch logic testable without those programs installed.

use crate::error::{LaunchError, LaunchResult};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// A single blocking program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program name (looked up on `PATH`) or path to a binary.
    pub program: OsString,
    /// Arguments, passed verbatim.
    pub args: Vec<OsString>,
    /// Directory the program runs in.
    pub working_dir: PathBuf,
}

impl Invocation {
    pub fn new(program: impl Into<OsString>, working_dir: &Path) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: working_dir.to_path_buf(),
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Program name as text, for messages.
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

/// Runs external programs to completion.
pub trait ProcessRunner {
    /// Runs `invocation` and waits for it to exit.
    ///
    /// # Errors
    ///
    /// Fails if the program cannot be started or exits unsuccessfully.
    fn run(&self, invocation: &Invocation) -> LaunchResult<()>;
}

/// Spawns real processes, inheriting stdio and environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> LaunchResult<()> {
        tracing::debug!(
            program = %invocation.program_name(),
            args = ?invocation.args,
            cwd = %invocation.working_dir.display(),
            "spawning"
        );

        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .status()
            .map_err(|e| LaunchError::Spawn {
                program: invocation.program_name(),
                source: e,
            })?;

        if !status.success() {
            return Err(LaunchError::ExitStatus {
                program: invocation.program_name(),
                status,
            });
        }

        Ok(())
    }
}
