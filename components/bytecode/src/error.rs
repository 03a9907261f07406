//! Error type for bytecode module parsing and verification.

use core_types::BufferError;
use std::fmt;

/// Failure while parsing or verifying a bytecode module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleError {
    /// Buffer is smaller than the fixed header
    TooShort {
        /// Actual buffer length
        length: usize,
    },
    /// Header magic did not match
    BadMagic {
        /// The four bytes found where the magic should be
        found: [u8; 4],
    },
    /// Format version is not supported
    UnsupportedVersion {
        /// The version byte found in the header
        found: u8,
    },
    /// A section ended before its declared contents
    Truncated {
        /// Which section was being read
        section: &'static str,
    },
    /// A symbol name was not valid UTF-8
    InvalidString {
        /// Which section was being read
        section: &'static str,
        /// Decoder detail
        detail: String,
    },
    /// Bytes remained after the body section
    TrailingBytes {
        /// Number of unread bytes
        count: usize,
    },
    /// The same symbol is defined twice in one module
    DuplicateDefinition {
        /// The duplicated symbol name
        name: String,
    },
    /// A definition or reference name is empty
    EmptySymbolName,
}

impl ModuleError {
    /// Map a buffer read failure into a section-tagged module error.
    pub(crate) fn in_section(section: &'static str) -> impl FnOnce(BufferError) -> ModuleError {
        move |error| match error {
            BufferError::InvalidUtf8(detail) => ModuleError::InvalidString { section, detail },
            _ => ModuleError::Truncated { section },
        }
    }
}

impl fmt::Display for ModuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleError::TooShort { length } => {
                write!(f, "module too short: {} byte(s)", length)
            }
            ModuleError::BadMagic { found } => {
                write!(f, "bad module magic: {:02x?}", found)
            }
            ModuleError::UnsupportedVersion { found } => {
                write!(f, "unsupported module version: {}", found)
            }
            ModuleError::Truncated { section } => {
                write!(f, "truncated {} section", section)
            }
            ModuleError::InvalidString { section, detail } => {
                write!(f, "invalid string in {} section: {}", section, detail)
            }
            ModuleError::TrailingBytes { count } => {
                write!(f, "{} trailing byte(s) after module body", count)
            }
            ModuleError::DuplicateDefinition { name } => {
                write!(f, "duplicate definition: {}", name)
            }
            ModuleError::EmptySymbolName => write!(f, "empty symbol name"),
        }
    }
}

impl std::error::Error for ModuleError {}
