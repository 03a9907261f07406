//! File classification for the execution dispatcher.
//!
//! Inputs are classified once, by case-sensitive suffix, into a closed
//! set of kinds that the shell matches exhaustively. Anything the shell
//! does not recognize is carried as [`FileKind::Unrecognized`] and
//! skipped without touching the file.

use std::path::Path;

/// What an input file is, decided purely by its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// A `.js` test script that enqueues unit tests when loaded.
    ScriptTest,
    /// A `.abc` bytecode module executed directly.
    RawBytecode,
    /// A `.swf` packaged container handed to the playback driver.
    PackagedContainer,
    /// Anything else. Never read, never an error.
    Unrecognized,
}

impl FileKind {
    /// Classifies `path` by suffix. Matching is case-sensitive, so
    /// `MOVIE.SWF` is [`FileKind::Unrecognized`].
    pub fn classify(path: &Path) -> FileKind {
        let name = path.to_string_lossy();
        if name.ends_with(".js") {
            FileKind::ScriptTest
        } else if name.ends_with(".abc") {
            FileKind::RawBytecode
        } else if name.ends_with(".swf") {
            FileKind::PackagedContainer
        } else {
            FileKind::Unrecognized
        }
    }
}

/// Whether any of `files` needs the global library catalog.
///
/// Containers commonly reference library symbols, so the catalog is
/// loaded whenever a container is queued, even without `--global-library`.
/// A run with no containers can skip the catalog entirely.
pub fn requires_global_library<P: AsRef<Path>>(files: &[P]) -> bool {
    files
        .iter()
        .any(|file| FileKind::classify(file.as_ref()) == FileKind::PackagedContainer)
}
