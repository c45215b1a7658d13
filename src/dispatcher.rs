//! Scan, rank, execute, and recurse into extracted archives.
//!
//! A dispatch call moves through `Scanning → Ranking → Executing` and ends in
//! one of `Recursing` (an archive was unpacked; dispatch again on its
//! directory), `Done`, or `Failed`.
//!
//! The top-ranked candidate is treated as authoritative: if it fails, the
//! call fails without trying the runner-up. That policy is deliberate.
//! Fall-through to lower-ranked candidates is available as an explicit
//! opt-in ([`Dispatcher::with_fallthrough`]).

use crate::action_catalog::ActionCatalog;
use crate::actions::{self, ActionContext};
use crate::config::{DispatchSettings, LaunchConfig, Programs, ShellScriptMode};
use crate::error::{LaunchError, LaunchResult};
use crate::mime_sniffer::MimeSniffer;
use crate::output::OutputFormatter;
use crate::runner::ProcessRunner;
use crate::scanner::TreeScanner;
use crate::strategy::CandidateAction;
use std::path::Path;

/// Drives launch selection for a package tree.
pub struct Dispatcher<S, R> {
    catalog: ActionCatalog<S>,
    runner: R,
    programs: Programs,
    shell_scripts: ShellScriptMode,
    fallthrough: bool,
    max_depth: usize,
}

impl<S: MimeSniffer, R: ProcessRunner> Dispatcher<S, R> {
    /// Creates a dispatcher with default programs and dispatch settings.
    pub fn new(catalog: ActionCatalog<S>, runner: R) -> Self {
        let settings = DispatchSettings::default();
        Self {
            catalog,
            runner,
            programs: Programs::default(),
            shell_scripts: settings.shell_scripts,
            fallthrough: settings.fallthrough,
            max_depth: settings.max_depth,
        }
    }

    /// Creates a dispatcher configured from `config`.
    pub fn from_config(catalog: ActionCatalog<S>, runner: R, config: &LaunchConfig) -> Self {
        Self {
            catalog,
            runner,
            programs: config.programs.clone(),
            shell_scripts: config.dispatch.shell_scripts,
            fallthrough: config.dispatch.fallthrough,
            max_depth: config.dispatch.max_depth,
        }
    }

    /// Try lower-ranked candidates when the chosen one fails.
    pub fn with_fallthrough(mut self, fallthrough: bool) -> Self {
        self.fallthrough = fallthrough;
        self
    }

    /// Limit on re-dispatches after extraction.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The runner actions are executed with.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Scans `root` and ranks its candidates, best first, without running anything.
    ///
    /// The sort is stable: equal scores keep scan order.
    pub fn plan(&self, root: &Path) -> LaunchResult<Vec<CandidateAction>> {
        let mut candidates = TreeScanner::new(&self.catalog).scan(root)?;
        candidates.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(candidates)
    }

    /// Launches the package at `root`.
    ///
    /// Returns the candidate attempted at each level, outermost first; a
    /// level contributes more than one entry only in fall-through mode.
    ///
    /// # Errors
    ///
    /// Propagates scan failures, the chosen action's failure, and
    /// `LaunchError::RecursionLimit` when archives nest too deep.
    pub fn run(&self, root: &Path) -> LaunchResult<Vec<CandidateAction>> {
        let mut attempted = Vec::new();
        self.dispatch(root, 0, &mut attempted)?;
        Ok(attempted)
    }

    fn dispatch(
        &self,
        root: &Path,
        level: usize,
        attempted: &mut Vec<CandidateAction>,
    ) -> LaunchResult<()> {
        if level > self.max_depth {
            return Err(LaunchError::RecursionLimit {
                path: root.to_path_buf(),
                limit: self.max_depth,
            });
        }

        let ranked = self.plan(root)?;
        let ctx = ActionContext {
            runner: &self.runner,
            programs: &self.programs,
            shell_scripts: self.shell_scripts,
        };

        let mut last_error = None;
        for candidate in ranked {
            OutputFormatter::decision(&candidate);
            attempted.push(candidate.clone());

            match actions::execute(candidate.strategy, &candidate.path, &ctx) {
                Ok(()) if candidate.strategy.is_extraction() => {
                    let extracted = actions::containing_dir(&candidate.path);
                    return self.dispatch(extracted, level + 1, attempted);
                }
                Ok(()) => return Ok(()),
                Err(e) if self.fallthrough => {
                    tracing::warn!(
                        path = %candidate.path.display(),
                        error = %e,
                        "candidate failed, trying the next one"
                    );
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        // Only reachable in fall-through mode.
        last_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mime_sniffer::EXECUTABLE_MIME;
    use crate::runner::Invocation;
    use crate::strategy::Strategy;
    use std::cell::RefCell;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Treats files containing the ELF magic as executables.
    struct MagicSniffer;

    impl MimeSniffer for MagicSniffer {
        fn sniff(&self, path: &Path) -> Option<String> {
            let data = fs::read(path).ok()?;
            data.starts_with(b"\x7fELF")
                .then(|| EXECUTABLE_MIME.to_string())
        }
    }

    /// Records invocations; programs listed in `failing` fail.
    #[derive(Default)]
    struct RecordingRunner {
        calls: RefCell<Vec<Invocation>>,
        failing: Vec<String>,
    }

    impl ProcessRunner for RecordingRunner {
        fn run(&self, invocation: &Invocation) -> LaunchResult<()> {
            self.calls.borrow_mut().push(invocation.clone());
            if self.failing.contains(&invocation.program_name()) {
                return Err(LaunchError::Spawn {
                    program: invocation.program_name(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
                });
            }
            Ok(())
        }
    }

    fn dispatcher(runner: RecordingRunner) -> Dispatcher<MagicSniffer, RecordingRunner> {
        Dispatcher::new(ActionCatalog::new(MagicSniffer), runner)
    }

    fn write(root: &Path, rel: &str, content: &[u8]) -> PathBuf {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create directories");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    #[test]
    fn test_plan_orders_by_score_then_scan_order() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        write(root, "a.txt", b"a");
        write(root, "b.jpg", b"b");
        write(root, "game.exe", b"MZ");
        write(root, "z.jar", b"jar");

        let plan = dispatcher(RecordingRunner::default()).plan(root).unwrap();
        let names: Vec<_> = plan.iter().map(|c| (c.score, c.name())).collect();
        assert_eq!(
            names,
            vec![
                (30, "java"),
                (20, "windows"),
                (0, "nothing"),
                (0, "nothing"),
                (0, "nothing"),
            ]
        );
        // Ties keep scan order: root, a.txt, b.jpg, ...
        assert_eq!(plan[2].path, root);
        assert_eq!(plan[3].path, root.join("a.txt"));
        assert_eq!(plan[4].path, root.join("b.jpg"));
    }

    #[test]
    fn test_only_unmatched_files_does_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        write(root, "notes.txt", b"notes");
        write(root, "cover.jpg", b"jpg");

        let d = dispatcher(RecordingRunner::default());
        let attempted = d.run(root).expect("Dispatch failed");

        assert_eq!(attempted.len(), 1);
        assert_eq!(attempted[0].strategy, Strategy::Nothing);
        assert_eq!(attempted[0].score, 0);
        assert_eq!(attempted[0].path, root);
        assert!(d.runner().calls.borrow().is_empty());
    }

    #[test]
    fn test_deep_native_beats_root_exe() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        write(root, "setup.exe", b"MZ");
        let native = write(root, "a/b/game", b"\x7fELF");

        let plan = dispatcher(RecordingRunner::default()).plan(root).unwrap();
        assert_eq!(plan[0].strategy, Strategy::Native);
        assert_eq!(plan[0].score, 38);
        assert_eq!(plan[0].path, native);
        assert_eq!(plan[1].strategy, Strategy::Windows);
        assert_eq!(plan[1].score, 20);
        assert!(plan[0].score > plan[1].score);
    }

    #[test]
    fn test_failure_does_not_try_runner_up() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        write(root, "game.jar", b"jar");
        write(root, "game.love", b"love");
        write(root, "game.exe", b"MZ");

        let d = dispatcher(RecordingRunner {
            failing: vec!["java".to_string()],
            ..Default::default()
        });
        let result = d.run(root);

        assert!(matches!(result, Err(LaunchError::Spawn { ref program, .. }) if program == "java"));
        let calls = d.runner().calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "java");
    }

    #[test]
    fn test_fallthrough_tries_next_candidate() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        write(root, "game.jar", b"jar");
        write(root, "game.exe", b"MZ");

        let d = dispatcher(RecordingRunner {
            failing: vec!["java".to_string()],
            ..Default::default()
        })
        .with_fallthrough(true);
        let attempted = d.run(root).expect("Dispatch failed");

        let strategies: Vec<_> = attempted.iter().map(|c| c.strategy).collect();
        assert_eq!(strategies, vec![Strategy::Java, Strategy::Windows]);
    }

    #[test]
    fn test_fallthrough_reports_last_failure_when_all_fail() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file = write(temp_dir.path(), "game.exe", b"MZ");

        let d = dispatcher(RecordingRunner {
            failing: vec!["wine".to_string()],
            ..Default::default()
        })
        .with_fallthrough(true);

        // Scanning a single file yields a single candidate.
        assert!(matches!(
            d.run(&file),
            Err(LaunchError::Spawn { ref program, .. }) if program == "wine"
        ));
    }

    #[test]
    fn test_scan_failure_propagates() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let d = dispatcher(RecordingRunner::default());

        let result = d.run(&temp_dir.path().join("missing"));
        assert!(matches!(result, Err(LaunchError::Scan { .. })));
        assert!(d.runner().calls.borrow().is_empty());
    }

    #[test]
    fn test_recursion_limit() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        write(root, "game.zip", b"PK");

        // Extraction succeeds, so level 1 is entered and refused.
        let d = dispatcher(RecordingRunner::default()).with_max_depth(0);
        let result = d.run(root);

        assert!(matches!(result, Err(LaunchError::RecursionLimit { limit: 0, .. })));
        assert!(!root.join("game.zip").exists());
    }
}
