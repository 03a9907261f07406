//! Command-line execution harness for the Vermeil virtual machine.
//!
//! The shell accepts raw bytecode modules (`.abc`), packaged playback
//! containers (`.swf`), and test scripts (`.js`), bootstraps a virtual
//! machine with the right base libraries, and drives execution under a
//! deterministic scheduling policy. It orchestrates; the machine, the
//! container parser, and the player live in their own crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bootstrap;
pub mod cli;
pub mod dispatch;
pub mod driver;
pub mod error;
pub mod extractor;
pub mod playback;
pub mod script;
pub mod shell;
pub mod test_runner;
pub mod writer;

pub use bootstrap::{bootstrap, BootstrapOptions, GlobalLibraryPaths};
pub use cli::Cli;
pub use dispatch::{requires_global_library, FileKind};
pub use driver::{run, run_with_writer};
pub use error::{ShellError, ShellResult};
pub use extractor::extract_bytecode;
pub use script::{load_script, parse_script};
pub use shell::Shell;
pub use test_runner::PendingTest;
pub use writer::ShellWriter;
