//! Presentation state mirrored out of loaded containers.
//!
//! One state instance lives for the whole shell session and is shared
//! between the orchestrator and the player; the shell resets it before
//! each playback so movies never see each other's leftovers.

use std::collections::HashMap;

/// The root timeline of one loaded movie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRoot {
    /// Name the movie was loaded under.
    pub movie_name: String,
    /// Frames per second from the container header.
    pub frame_rate: u16,
    /// Frame count declared by the container header.
    pub frame_count: u16,
    /// Frame the playhead sits on, zero based.
    pub current_frame: usize,
    /// Total ticks processed, counting loops.
    pub frames_played: u64,
}

/// Text measurement answered by the host on the synchronous update path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextMetrics {
    /// Measured text width.
    pub text_width: i32,
    /// Measured text height.
    pub text_height: i32,
    /// Horizontal offset of the first glyph.
    pub offset_x: i32,
    /// Number of laid-out lines.
    pub line_count: i32,
}

/// Everything the presentation layer knows about loaded movies.
#[derive(Debug, Default)]
pub struct PresentationState {
    display_roots: Vec<DisplayRoot>,
    clip_registry: HashMap<u16, String>,
    decoded_image_count: usize,
    last_text_metrics: Option<TextMetrics>,
}

impl PresentationState {
    /// An empty presentation.
    pub fn new() -> PresentationState {
        PresentationState::default()
    }

    /// Drops all roots, bindings, and counters.
    pub fn reset(&mut self) {
        self.display_roots.clear();
        self.clip_registry.clear();
        self.decoded_image_count = 0;
        self.last_text_metrics = None;
    }

    /// Roots of every movie loaded since the last reset.
    pub fn display_roots(&self) -> &[DisplayRoot] {
        &self.display_roots
    }

    /// Character ids bound to symbol names by `SymbolClass` tags.
    pub fn clip_registry(&self) -> &HashMap<u16, String> {
        &self.clip_registry
    }

    /// Number of image assets decoded since the last reset.
    pub fn decoded_image_count(&self) -> usize {
        self.decoded_image_count
    }

    /// The metrics most recently answered by the host, if any.
    pub fn last_text_metrics(&self) -> Option<TextMetrics> {
        self.last_text_metrics
    }

    /// Adds a root and returns its index for later frame advances.
    pub(crate) fn add_root(&mut self, root: DisplayRoot) -> usize {
        self.display_roots.push(root);
        self.display_roots.len() - 1
    }

    pub(crate) fn root_mut(&mut self, index: usize) -> Option<&mut DisplayRoot> {
        self.display_roots.get_mut(index)
    }

    pub(crate) fn bind_clip(&mut self, character_id: u16, symbol: &str) {
        self.clip_registry.insert(character_id, symbol.to_string());
    }

    pub(crate) fn note_decoded_image(&mut self) {
        self.decoded_image_count += 1;
    }

    pub(crate) fn set_text_metrics(&mut self, metrics: TextMetrics) {
        self.last_text_metrics = Some(metrics);
    }
}
