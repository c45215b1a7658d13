//! Recursive enumeration of a package tree into launch candidates.

use crate::action_catalog::ActionCatalog;
use crate::error::{LaunchError, LaunchResult};
use crate::mime_sniffer::MimeSniffer;
use crate::strategy::CandidateAction;
use std::path::Path;
use walkdir::WalkDir;

/// Walks a directory tree and classifies every entry.
pub struct TreeScanner<'a, S> {
    catalog: &'a ActionCatalog<S>,
}

impl<'a, S: MimeSniffer> TreeScanner<'a, S> {
    pub fn new(catalog: &'a ActionCatalog<S>) -> Self {
        Self { catalog }
    }

    /// Produces one candidate per entry under `root`, the root included.
    ///
    /// Entries are visited in lexical order, parents before children, so the
    /// result is reproducible for ties. Symlinks are not followed.
    ///
    /// # Errors
    ///
    /// Returns `LaunchError::Scan` on the first entry that cannot be read;
    /// nothing is returned for the part of the tree already walked.
    pub fn scan(&self, root: &Path) -> LaunchResult<Vec<CandidateAction>> {
        let mut candidates = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| LaunchError::Scan {
                path: e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf()),
                source: e,
            })?;

            candidates.push(self.catalog.classify(
                root,
                entry.path(),
                entry.file_type().is_dir(),
            ));
        }

        tracing::debug!(root = %root.display(), entries = candidates.len(), "scan complete");
        Ok(candidates)
    }
}
