//! Core types shared across the Vermeil runtime.
//!
//! This crate provides the foundational types for a bytecode virtual-machine
//! harness, including the little-endian data buffer used by every wire format
//! and the error type produced by the virtual machine.
//!
//! # Overview
//!
//! - [`DataBuffer`] - Growable little-endian byte buffer with a read/write cursor
//! - [`BufferError`] - Out-of-bounds and encoding failures while reading
//! - [`VmError`] - Virtual-machine errors with a load-chain stack
//! - [`VmErrorKind`] - Stages at which a module can fail
//!
//! # Examples
//!
//! ```
//! use core_types::{DataBuffer, VmError, VmErrorKind};
//!
//! let mut buffer = DataBuffer::new();
//! buffer.write_u32(42);
//! buffer.set_position(0);
//! assert_eq!(buffer.read_u32().unwrap(), 42);
//!
//! let error = VmError::link("unresolvable symbol flash.display.Sprite");
//! assert_eq!(error.kind, VmErrorKind::Link);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod data_buffer;
mod error;

pub use data_buffer::{BufferError, DataBuffer};
pub use error::{VmError, VmErrorKind};
