/// Launch strategies and the scored candidates built from them.
///
/// Every entry in a scanned package tree becomes exactly one
/// [`CandidateAction`]; the dispatcher ranks them by score and runs the best.
///
/// # Examples
///
/// ```
/// use runany::strategy::Strategy;
///
/// assert_eq!(Strategy::Native.name(), "native");
/// assert_eq!(Strategy::Native.default_weight(), 40);
/// assert!(Strategy::ExtractZip.is_extraction());
/// ```
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

/// One of the fixed ways a file can be launched or unpacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Unpack a ZIP archive next to itself, then dispatch again.
    ExtractZip,
    /// Unpack a RAR archive next to itself, then dispatch again.
    ExtractRar,
    /// Run a `.jar` through the JVM.
    Java,
    /// Run a `.love` file through the LÖVE framework runner.
    Love,
    /// Run a `.sh` script (see `ShellScriptMode` for where it goes).
    Shell,
    /// Run a `.exe` through the Windows compatibility layer.
    Windows,
    /// Mark an ELF executable runnable and start it directly.
    Native,
    /// No way to launch this entry.
    Nothing,
}

impl Strategy {
    /// All strategies, in the order extensions are checked.
    pub const ALL: [Strategy; 8] = [
        Strategy::ExtractZip,
        Strategy::ExtractRar,
        Strategy::Java,
        Strategy::Windows,
        Strategy::Love,
        Strategy::Shell,
        Strategy::Native,
        Strategy::Nothing,
    ];

    /// Short label printed in decision lines and used as config key.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::ExtractZip => "unzip",
            Strategy::ExtractRar => "unrar",
            Strategy::Java => "java",
            Strategy::Love => "love",
            Strategy::Shell => "shell",
            Strategy::Windows => "windows",
            Strategy::Native => "native",
            Strategy::Nothing => "nothing",
        }
    }

    /// Base weight before the depth penalty.
    ///
    /// These numbers are a tuned policy: a native binary two levels down
    /// still beats a `.exe` at the root, and any real strategy beats
    /// "nothing" at the same depth.
    pub fn default_weight(&self) -> i64 {
        match self {
            Strategy::Native => 40,
            Strategy::Java | Strategy::Love | Strategy::Shell => 30,
            Strategy::Windows => 20,
            Strategy::ExtractZip | Strategy::ExtractRar => 10,
            Strategy::Nothing => 0,
        }
    }

    /// True for strategies that unpack and then re-dispatch.
    pub fn is_extraction(&self) -> bool {
        matches!(self, Strategy::ExtractZip | Strategy::ExtractRar)
    }

    /// Looks a strategy up by its [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|strategy| strategy.name() == name)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Strategy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// A scored proposal for launching one entry of the package tree.
///
/// Candidates are snapshots of the tree at scan time and are thrown away
/// after one dispatch cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateAction {
    /// What to do with the entry.
    pub strategy: Strategy,
    /// Base weight minus depth; higher wins.
    pub score: i64,
    /// Absolute path of the entry.
    pub path: PathBuf,
    /// Path separators between the scan root and the entry.
    pub depth: usize,
}

impl CandidateAction {
    /// Builds a candidate, applying the depth penalty to `weight`.
    pub fn new(strategy: Strategy, weight: i64, path: PathBuf, depth: usize) -> Self {
        let penalty = i64::try_from(depth).unwrap_or(i64::MAX);
        Self {
            strategy,
            score: weight.saturating_sub(penalty),
            path,
            depth,
        }
    }

    /// Strategy label, as printed in decision lines.
    pub fn name(&self) -> &'static str {
        self.strategy.name()
    }
}

/// Renders the decision line: `<score>: <strategy>: <path>`.
impl fmt::Display for CandidateAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.score, self.name(), self.path.display())
    }
}
