//! Headless playback of packaged containers.
//!
//! The [`Player`] loads a container, executes its bytecode blocks in the
//! VM's application namespace, mirrors symbols and assets into a
//! [`PresentationState`], and schedules a frame tick on the shell's
//! micro-task queue. A host plugs in through [`PlayerEventSink`]: update
//! flushes, host commands, and frame notifications all cross that trait.
//!
//! There is no rendering and no wall clock here. Frames advance only
//! when the queue advances virtual time, which is what makes playback
//! runs reproducible.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod player;
mod presentation;

pub use error::PlayerError;
pub use player::{Player, PlayerEventSink};
pub use presentation::{DisplayRoot, PresentationState, TextMetrics};
