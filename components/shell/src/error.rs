//! The shell's aggregate error type.

use std::path::PathBuf;

use bytecode::ModuleError;
use container::ContainerError;
use core_types::VmError;
use player::PlayerError;
use thiserror::Error;
use vm::CatalogError;

/// Any failure the shell can hit while driving a run.
///
/// Component errors convert in via `From`, so `?` works across crate
/// boundaries. File reads carry the path, since the component errors
/// only know about bytes.
#[derive(Debug, Error)]
pub enum ShellError {
    /// A file could not be read.
    #[error("failed to read '{path}': {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A bytecode module failed to parse or verify.
    #[error("{0}")]
    Module(#[from] ModuleError),

    /// A packaged container failed to parse.
    #[error("{0}")]
    Container(#[from] ContainerError),

    /// The virtual machine rejected a module.
    #[error("{0}")]
    Vm(#[from] VmError),

    /// Playback of a container failed.
    #[error("{0}")]
    Player(#[from] PlayerError),

    /// The global library catalog failed to build.
    #[error("{0}")]
    Catalog(#[from] CatalogError),

    /// A test script contained a line the directive grammar rejects.
    #[error("{path}:{line}: {message}")]
    Script {
        /// Script the bad directive came from.
        path: PathBuf,
        /// One-based line number of the directive.
        line: usize,
        /// What was wrong with it.
        message: String,
    },

    /// An `expect-error` test saw its module execute successfully.
    #[error("module '{path}' executed successfully but an error was expected")]
    UnexpectedSuccess {
        /// Module the expectation named.
        path: PathBuf,
    },

    /// An operation needed a virtual machine before one was bootstrapped.
    #[error("no virtual machine: bootstrap must run first")]
    NotBootstrapped,
}

impl ShellError {
    /// Wraps an I/O failure with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> ShellError {
        ShellError::Io {
            path: path.into(),
            source,
        }
    }

    /// The error stack to print under the message, innermost first.
    ///
    /// Only virtual-machine errors carry a load chain; everything else
    /// renders as its message alone.
    pub fn stack(&self) -> &[String] {
        match self {
            ShellError::Vm(error) => &error.stack,
            ShellError::Player(PlayerError::Vm(error)) => &error.stack,
            _ => &[],
        }
    }
}

/// Result alias used throughout the shell crate.
pub type ShellResult<T> = Result<T, ShellError>;
