//! Error type for container playback.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use bytecode::ModuleError;
use container::ContainerError;
use core_types::VmError;

/// Errors raised while loading or playing a container.
#[derive(Debug)]
pub enum PlayerError {
    /// The container file could not be read.
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        error: io::Error,
    },
    /// The container byte stream did not parse.
    Container(ContainerError),
    /// A bytecode block inside the container did not parse as a module.
    Module {
        /// Origin tag of the offending block.
        block: String,
        /// The parse failure.
        error: ModuleError,
    },
    /// A bytecode block failed to verify, link, or execute.
    Vm(VmError),
}

impl fmt::Display for PlayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerError::Io { path, error } => {
                write!(f, "failed to read '{}': {}", path.display(), error)
            }
            PlayerError::Container(error) => write!(f, "container error: {}", error),
            PlayerError::Module { block, error } => {
                write!(f, "bytecode block '{}' did not parse: {}", block, error)
            }
            PlayerError::Vm(error) => write!(f, "{}", error),
        }
    }
}

impl Error for PlayerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PlayerError::Io { error, .. } => Some(error),
            PlayerError::Container(error) => Some(error),
            PlayerError::Module { error, .. } => Some(error),
            PlayerError::Vm(error) => Some(error),
        }
    }
}

impl From<ContainerError> for PlayerError {
    fn from(error: ContainerError) -> PlayerError {
        PlayerError::Container(error)
    }
}

impl From<VmError> for PlayerError {
    fn from(error: VmError) -> PlayerError {
        PlayerError::Vm(error)
    }
}
