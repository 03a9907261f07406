//! Synchronous load observer protocol.
//!
//! Consumers watch a container load through [`LoadListener`] instead of
//! re-parsing the bytes themselves. All callbacks fire on the calling
//! thread before [`FileLoader::load_bytes`] returns.

use crate::error::ContainerError;
use crate::file::ContainerFile;

/// How far a load has progressed, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    /// Bytes consumed so far.
    pub bytes_loaded: usize,
    /// Total size of the container.
    pub bytes_total: usize,
}

/// Receiver for load events.
///
/// Every method has a no-op default, so listeners implement only the
/// events they care about. For a well-formed container the loader calls,
/// in order: [`on_open`], [`on_symbols_discovered`] (only when the
/// container binds symbols), [`on_image_bytes`] once per image,
/// [`on_progress`], then [`on_complete`]. For a malformed container the
/// only call is [`on_error`], exactly once.
///
/// [`on_open`]: LoadListener::on_open
/// [`on_symbols_discovered`]: LoadListener::on_symbols_discovered
/// [`on_image_bytes`]: LoadListener::on_image_bytes
/// [`on_progress`]: LoadListener::on_progress
/// [`on_complete`]: LoadListener::on_complete
/// [`on_error`]: LoadListener::on_error
pub trait LoadListener {
    /// The container parsed; its contents are available.
    fn on_open(&mut self, _file: &ContainerFile) {}

    /// Load progress advanced.
    fn on_progress(&mut self, _progress: LoadProgress) {}

    /// The container failed to parse. No other callback fires.
    fn on_error(&mut self, _error: &ContainerError) {}

    /// The load finished; no further callbacks follow.
    fn on_complete(&mut self) {}

    /// The container binds character ids to symbol names.
    fn on_symbols_discovered(&mut self, _symbols: &[crate::tags::SymbolEntry]) {}

    /// An image asset was extracted.
    fn on_image_bytes(&mut self, _character_id: u16, _bytes: &[u8]) {}
}

/// Feeds container bytes to a [`LoadListener`].
pub struct FileLoader<'a, L: LoadListener> {
    listener: &'a mut L,
}

impl<'a, L: LoadListener> FileLoader<'a, L> {
    /// Wraps a listener for one or more loads.
    pub fn new(listener: &'a mut L) -> FileLoader<'a, L> {
        FileLoader { listener }
    }

    /// Parses `bytes` and replays the load to the listener.
    ///
    /// On failure the parse error is both reported through
    /// [`LoadListener::on_error`] and returned, so callers that ignore
    /// the listener still see it.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<(), ContainerError> {
        let file = match ContainerFile::parse(bytes) {
            Ok(file) => file,
            Err(error) => {
                self.listener.on_error(&error);
                return Err(error);
            }
        };
        self.listener.on_open(&file);
        if !file.symbols().is_empty() {
            self.listener.on_symbols_discovered(file.symbols());
        }
        for image in file.images() {
            self.listener.on_image_bytes(image.character_id, &image.data);
        }
        self.listener.on_progress(LoadProgress {
            bytes_loaded: bytes.len(),
            bytes_total: bytes.len(),
        });
        self.listener.on_complete();
        Ok(())
    }
}
