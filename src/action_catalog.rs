/// Classification of package entries into scored launch candidates.
///
/// The catalog looks at the file extension first: the text after the last
/// `.` of the file name, so `.zip` is a ZIP archive and `game.` has an empty
/// extension. Only when the extension is missing or generic (`.bin`, `.x86`, `.x86_64`) does it ask a
/// [`MimeSniffer`] whether the file is a native executable.
///
/// # Examples
///
/// ```
/// use runany::action_catalog::ActionCatalog;
/// use runany::mime_sniffer::ContentSniffer;
/// use runany::strategy::Strategy;
/// use std::path::Path;
///
/// let catalog = ActionCatalog::new(ContentSniffer);
/// let root = Path::new("/games/pkg");
/// let candidate = catalog.classify(root, Path::new("/games/pkg/data/game.jar"), false);
/// assert_eq!(candidate.strategy, Strategy::Java);
/// assert_eq!(candidate.score, 29);
/// ```
use crate::config::{CompiledFilters, ConfigError, LaunchConfig};
use crate::mime_sniffer::{EXECUTABLE_MIME, MimeSniffer};
use crate::strategy::{CandidateAction, Strategy};
use std::collections::HashMap;
use std::path::{Component, Path};

/// Extensions that say nothing about the content and warrant sniffing.
const AMBIGUOUS_EXTENSIONS: [&str; 3] = ["x86", "x86_64", "bin"];

/// Maps package entries to candidate actions.
pub struct ActionCatalog<S> {
    sniffer: S,
    weights: HashMap<Strategy, i64>,
    filters: CompiledFilters,
}

impl<S: MimeSniffer> ActionCatalog<S> {
    /// Creates a catalog with the stock weights and no filters.
    pub fn new(sniffer: S) -> Self {
        Self {
            sniffer,
            weights: Strategy::ALL
                .iter()
                .map(|strategy| (*strategy, strategy.default_weight()))
                .collect(),
            filters: CompiledFilters::default(),
        }
    }

    /// Creates a catalog with weights and filters taken from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if `[weights]` names an unknown strategy or a filter
    /// pattern does not compile.
    pub fn from_config(sniffer: S, config: &LaunchConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            sniffer,
            weights: config.weight_table()?,
            filters: config.compile_filters()?,
        })
    }

    /// Overrides the base weight of one strategy.
    pub fn set_weight(&mut self, strategy: Strategy, weight: i64) {
        self.weights.insert(strategy, weight);
    }

    /// Base weight currently used for `strategy`.
    pub fn weight(&self, strategy: Strategy) -> i64 {
        self.weights
            .get(&strategy)
            .copied()
            .unwrap_or_else(|| strategy.default_weight())
    }

    /// Classifies one entry found under `root`.
    ///
    /// Never fails: directories, filtered entries, unrecognized files and
    /// files whose sniffing fails all become a "nothing" candidate.
    pub fn classify(&self, root: &Path, path: &Path, is_dir: bool) -> CandidateAction {
        let relative = path.strip_prefix(root).unwrap_or(path);
        let depth = depth_of(relative);

        let strategy = if is_dir || !self.filters.allows(relative) {
            Strategy::Nothing
        } else {
            self.strategy_for(path)
        };

        CandidateAction::new(strategy, self.weight(strategy), path.to_path_buf(), depth)
    }

    /// Picks the strategy for a regular file.
    pub fn strategy_for(&self, path: &Path) -> Strategy {
        match file_extension(path).as_deref() {
            Some("zip") => Strategy::ExtractZip,
            Some("rar") => Strategy::ExtractRar,
            Some("jar") => Strategy::Java,
            Some("exe") => Strategy::Windows,
            Some("love") => Strategy::Love,
            Some("sh") => Strategy::Shell,
            None if self.is_native_executable(path) => Strategy::Native,
            Some(ext) if AMBIGUOUS_EXTENSIONS.contains(&ext) && self.is_native_executable(path) => {
                Strategy::Native
            }
            _ => Strategy::Nothing,
        }
    }

    fn is_native_executable(&self, path: &Path) -> bool {
        let mime = self.sniffer.sniff(path);
        tracing::debug!(path = %path.display(), mime = ?mime, "sniffed");
        mime.as_deref() == Some(EXECUTABLE_MIME)
    }
}

/// Lowercased text after the last `.` of the file name.
///
/// Unlike [`Path::extension`], a leading dot counts (`.love` has extension
/// `love`) and a trailing dot gives `Some("")` rather than `None`.
pub fn file_extension(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    name.rfind('.').map(|dot| name[dot + 1..].to_lowercase())
}

/// Number of path separators in a root-relative path.
///
/// The root itself and its direct children are at depth 0.
pub fn depth_of(relative: &Path) -> usize {
    relative
        .components()
        .filter(|component| matches!(component, Component::Normal(_)))
        .count()
        .saturating_sub(1)
}
