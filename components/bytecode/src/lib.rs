//! Bytecode module container format.
//!
//! A bytecode module is the unit the virtual machine loads and executes: an
//! origin tag, the fully-qualified symbols the module defines, the symbols it
//! references, and an opaque instruction body. This crate parses, encodes,
//! verifies and disassembles the container; instruction semantics belong to
//! the virtual machine.
//!
//! # Example
//!
//! ```
//! use bytecode::BytecodeModule;
//!
//! let module = BytecodeModule::new(
//!     "builtin.abc",
//!     vec!["host.Object".to_string()],
//!     vec![],
//!     vec![0x01, 0x02],
//! );
//!
//! let bytes = module.to_bytes();
//! let parsed = BytecodeModule::parse(&bytes, "builtin.abc").unwrap();
//! assert_eq!(parsed.defs(), ["host.Object"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod module;

pub use error::ModuleError;
pub use module::{BytecodeModule, MODULE_MAGIC, MODULE_VERSION};
