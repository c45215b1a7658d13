//! Content-type sniffing for files whose extension says nothing.
//!
//! Only extension-less or generically named files (`.bin`, `.x86`, ...) are
//! sniffed, to tell native executables apart from data blobs. A sniffer
//! never fails: anything that goes wrong degrades to "unknown" (`None`).

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::process::Command;

/// Media type reported for ELF executables.
pub const EXECUTABLE_MIME: &str = "application/x-executable";

/// Number of leading bytes [`ContentSniffer`] reads from a file.
const MAGIC_PREFIX_LEN: u64 = 8192;

/// Asks something for the media type of a file.
pub trait MimeSniffer {
    /// Returns the bare `type/subtype`, or `None` if it cannot be determined.
    fn sniff(&self, path: &Path) -> Option<String>;
}

impl<T: MimeSniffer + ?Sized> MimeSniffer for Box<T> {
    fn sniff(&self, path: &Path) -> Option<String> {
        (**self).sniff(path)
    }
}

/// Parses a structured media-type string, keeping only `type/subtype`.
///
/// Parameters such as `charset=binary` are discarded and the result is
/// lowercased. Malformed input yields `None`.
///
/// # Examples
///
/// ```
/// use runany::mime_sniffer::parse_media_type;
///
/// assert_eq!(
///     parse_media_type("application/x-executable; charset=binary"),
///     Some("application/x-executable".to_string())
/// );
/// assert_eq!(parse_media_type("cannot open `x'"), None);
/// ```
pub fn parse_media_type(raw: &str) -> Option<String> {
    let essence = raw.split(';').next()?.trim();
    let (kind, subtype) = essence.split_once('/')?;
    let (kind, subtype) = (kind.trim(), subtype.trim());

    if !is_token(kind) || !is_token(subtype) {
        return None;
    }

    Some(format!("{}/{}", kind, subtype).to_lowercase())
}

/// RFC 2045 token: non-empty, printable ASCII, no separators.
fn is_token(s: &str) -> bool {
    const SEPARATORS: &str = "()<>@,;:\\\"/[]?= ";
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_graphic() && !SEPARATORS.contains(c))
}

/// Sniffs by running the `file` utility (`file --brief --mime <path>`).
#[derive(Debug, Clone)]
pub struct FileCommandSniffer {
    program: String,
}

impl FileCommandSniffer {
    /// Uses `program` in place of `file`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for FileCommandSniffer {
    fn default() -> Self {
        Self::new("file")
    }
}

impl MimeSniffer for FileCommandSniffer {
    fn sniff(&self, path: &Path) -> Option<String> {
        let output = match Command::new(&self.program)
            .arg("--brief")
            .arg("--mime")
            .arg(path)
            .output()
        {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!(program = %self.program, error = %e, "mime sniffer unavailable");
                return None;
            }
        };

        if !output.status.success() {
            tracing::debug!(
                program = %self.program,
                path = %path.display(),
                status = %output.status,
                "mime sniffer failed"
            );
            return None;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_media_type(stdout.trim())
    }
}

/// Sniffs in-process from the file's magic bytes using `infer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentSniffer;

impl MimeSniffer for ContentSniffer {
    fn sniff(&self, path: &Path) -> Option<String> {
        let mut prefix = Vec::new();
        let read = File::open(path)
            .and_then(|file| file.take(MAGIC_PREFIX_LEN).read_to_end(&mut prefix));
        if let Err(e) = read {
            tracing::debug!(path = %path.display(), error = %e, "could not read file for sniffing");
            return None;
        }

        infer::get(&prefix).and_then(|kind| parse_media_type(kind.mime_type()))
    }
}

/// Which sniffer implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SnifferKind {
    /// Shell out to the `file` utility.
    #[default]
    File,
    /// Match magic bytes in-process.
    Content,
}

/// Builds the sniffer selected by `kind`; `file_program` names the `file` binary.
pub fn build_sniffer(kind: SnifferKind, file_program: &str) -> Box<dyn MimeSniffer> {
    match kind {
        SnifferKind::File => Box::new(FileCommandSniffer::new(file_program)),
        SnifferKind::Content => Box::new(ContentSniffer),
    }
}
