//! The bytecode virtual machine the shell drives.
//!
//! A [`VmInstance`] hosts two namespaces: the system namespace holds the
//! builtin and library modules, the application namespace holds user
//! code and falls back to the system namespace for lookups. Symbol
//! references resolve against namespace definitions, registered native
//! bindings, and finally the global [`LibraryCatalog`], which loads
//! defining chunks lazily on first use.
//!
//! # Example
//!
//! ```
//! use bytecode::BytecodeModule;
//! use vm::{ExecutionMode, Namespace, VmInstance};
//!
//! let mut vm = VmInstance::new(ExecutionMode::Compile, ExecutionMode::Compile);
//! let module = BytecodeModule::new("demo", vec!["demo.Main".to_string()], vec![], vec![]);
//! vm.execute_in(Namespace::Application, &module).unwrap();
//! assert_eq!(vm.definition_of(Namespace::Application, "demo.Main"), Some("demo"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod catalog;
mod instance;
mod natives;

pub use catalog::{CatalogError, CatalogRow, DefList, LibraryCatalog};
pub use instance::{ExecutionMode, Namespace, VmInstance};
pub use natives::{link_natives, NativeRegistry};
