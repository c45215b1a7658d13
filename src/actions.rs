//! Leaf launch strategies.
//!
//! One function per [`Strategy`]. Each runs with the target's containing
//! directory as working directory. Extraction is destructive: the archive is
//! removed afterwards, even when the extractor reported an error.

use crate::config::{Programs, ShellScriptMode};
use crate::error::LaunchResult;
use crate::runner::{Invocation, ProcessRunner};
use crate::strategy::Strategy;
use std::fs;
use std::path::Path;

/// Everything a strategy needs besides the target path.
pub struct ActionContext<'a> {
    pub runner: &'a dyn ProcessRunner,
    pub programs: &'a Programs,
    pub shell_scripts: ShellScriptMode,
}

/// Runs `strategy` against `path`.
///
/// For extraction strategies this only unpacks; re-dispatching the
/// extracted tree is the dispatcher's job.
pub fn execute(strategy: Strategy, path: &Path, ctx: &ActionContext<'_>) -> LaunchResult<()> {
    match strategy {
        Strategy::ExtractZip => extract_zip(path, ctx),
        Strategy::ExtractRar => extract_rar(path, ctx),
        Strategy::Java => run_jar(path, ctx),
        Strategy::Windows => run_windows(path, ctx),
        Strategy::Love => run_love(path, ctx),
        Strategy::Shell => run_shell_script(path, ctx),
        Strategy::Native => run_native(path, ctx),
        Strategy::Nothing => do_nothing(path),
    }
}

/// Directory an action runs in and extracts into.
pub fn containing_dir(path: &Path) -> &Path {
    path.parent().unwrap_or(path)
}

pub fn extract_zip(path: &Path, ctx: &ActionContext<'_>) -> LaunchResult<()> {
    let dir = containing_dir(path);
    let invocation = Invocation::new(&ctx.programs.unzip, dir)
        .arg("-o")
        .arg("-d")
        .arg(dir)
        .arg(path);
    let result = ctx.runner.run(&invocation);
    remove_archive(path);
    result
}

pub fn extract_rar(path: &Path, ctx: &ActionContext<'_>) -> LaunchResult<()> {
    let invocation = Invocation::new(&ctx.programs.unrar, containing_dir(path))
        .arg("x")
        .arg("-o+")
        .arg(path);
    let result = ctx.runner.run(&invocation);
    remove_archive(path);
    result
}

pub fn run_jar(path: &Path, ctx: &ActionContext<'_>) -> LaunchResult<()> {
    ctx.runner.run(
        &Invocation::new(&ctx.programs.java, containing_dir(path))
            .arg("-jar")
            .arg(path),
    )
}

pub fn run_windows(path: &Path, ctx: &ActionContext<'_>) -> LaunchResult<()> {
    ctx.runner
        .run(&Invocation::new(&ctx.programs.wine, containing_dir(path)).arg(path))
}

pub fn run_love(path: &Path, ctx: &ActionContext<'_>) -> LaunchResult<()> {
    ctx.runner
        .run(&Invocation::new(&ctx.programs.love, containing_dir(path)).arg(path))
}

/// Runs a `.sh` file.
///
/// In [`ShellScriptMode::Framework`] (the default) the script is handed to
/// the LÖVE runner, matching how the launcher has always behaved. That
/// routing is almost certainly unintended; set `shell_scripts = "shell"` to
/// run scripts with a real shell instead.
pub fn run_shell_script(path: &Path, ctx: &ActionContext<'_>) -> LaunchResult<()> {
    match ctx.shell_scripts {
        ShellScriptMode::Framework => run_love(path, ctx),
        ShellScriptMode::Shell => ctx
            .runner
            .run(&Invocation::new(&ctx.programs.shell, containing_dir(path)).arg(path)),
    }
}

/// Marks `path` executable and runs it with no arguments.
pub fn run_native(path: &Path, ctx: &ActionContext<'_>) -> LaunchResult<()> {
    if let Err(e) = make_executable(path) {
        tracing::warn!(path = %path.display(), error = %e, "could not mark file executable");
    }
    ctx.runner
        .run(&Invocation::new(path.as_os_str(), containing_dir(path)))
}

pub fn do_nothing(path: &Path) -> LaunchResult<()> {
    tracing::debug!(path = %path.display(), "nothing to launch");
    Ok(())
}

/// Best-effort removal of an extracted archive.
fn remove_archive(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        tracing::warn!(path = %path.display(), error = %e, "could not remove archive");
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
