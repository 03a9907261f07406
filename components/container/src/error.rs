//! Error type for container parsing.

use std::error::Error;
use std::fmt;

/// Errors produced while parsing a playback container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerError {
    /// The buffer is smaller than the fixed container header.
    TooShort {
        /// Number of bytes actually present.
        length: usize,
    },
    /// The first three bytes are not the container signature.
    BadSignature {
        /// The bytes found where the signature should be.
        found: [u8; 3],
    },
    /// The container version byte is not one this parser understands.
    UnsupportedVersion {
        /// The version byte found in the header.
        found: u8,
    },
    /// The length declared in the header does not match the buffer.
    DeclaredLengthMismatch {
        /// Length recorded in the header.
        declared: u32,
        /// Length of the buffer handed to the parser.
        actual: usize,
    },
    /// A tag record ran past the end of the buffer.
    TruncatedTag {
        /// Byte offset of the tag record that could not be read whole.
        offset: usize,
    },
    /// A tag body was present but its contents did not decode.
    InvalidTagBody {
        /// Tag code of the offending record.
        code: u16,
        /// What went wrong inside the body.
        detail: String,
    },
}

impl fmt::Display for ContainerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerError::TooShort { length } => {
                write!(f, "container too short: {} byte(s)", length)
            }
            ContainerError::BadSignature { found } => {
                write!(
                    f,
                    "bad container signature: {:02x} {:02x} {:02x}",
                    found[0], found[1], found[2]
                )
            }
            ContainerError::UnsupportedVersion { found } => {
                write!(f, "unsupported container version {}", found)
            }
            ContainerError::DeclaredLengthMismatch { declared, actual } => {
                write!(
                    f,
                    "declared length {} does not match buffer length {}",
                    declared, actual
                )
            }
            ContainerError::TruncatedTag { offset } => {
                write!(f, "truncated tag record at offset {}", offset)
            }
            ContainerError::InvalidTagBody { code, detail } => {
                write!(f, "invalid body for tag {}: {}", code, detail)
            }
        }
    }
}

impl Error for ContainerError {}
