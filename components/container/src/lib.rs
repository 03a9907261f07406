//! Playback container parsing for the Vermeil shell.
//!
//! A playback container is a small binary archive that bundles bytecode
//! modules, symbol bindings, image assets and a frame timeline into a
//! single file. This crate parses the tag stream into a [`ContainerFile`],
//! builds containers for fixtures via [`ContainerBuilder`], and drives
//! load observers through the [`FileLoader`] protocol.
//!
//! # Example
//!
//! ```
//! use container::{ContainerBuilder, ContainerFile};
//!
//! let bytes = ContainerBuilder::new()
//!     .frame_rate(30)
//!     .host_command("trace", "hello")
//!     .show_frame()
//!     .build();
//! let file = ContainerFile::parse(&bytes).unwrap();
//! assert_eq!(file.frame_rate(), 30);
//! assert_eq!(file.frames().len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod builder;
mod error;
mod file;
mod loader;
mod tags;

pub use builder::ContainerBuilder;
pub use error::ContainerError;
pub use file::{ContainerFile, CONTAINER_SIGNATURE, CONTAINER_VERSION};
pub use loader::{FileLoader, LoadListener, LoadProgress};
pub use tags::{BytecodeBlock, Frame, HostCommand, ImageEntry, SymbolEntry, TagCode};
