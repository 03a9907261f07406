//! Little-endian data buffer with a read/write cursor.
//!
//! Every wire format in the workspace (bytecode modules, packaged containers,
//! player update deltas) is little-endian, so the buffer only exposes
//! little-endian accessors.

use std::fmt;

/// Error produced when reading past the end of a buffer or decoding
/// malformed string data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// A read needed more bytes than the buffer still holds
    UnexpectedEof {
        /// Number of bytes the read required
        needed: usize,
        /// Number of bytes left after the cursor
        remaining: usize,
    },
    /// String bytes were not valid UTF-8
    InvalidUtf8(String),
    /// A NUL-terminated string ran to the end of the buffer without a NUL
    UnterminatedString,
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::UnexpectedEof { needed, remaining } => {
                write!(
                    f,
                    "unexpected end of buffer: needed {} byte(s), {} remaining",
                    needed, remaining
                )
            }
            BufferError::InvalidUtf8(detail) => write!(f, "invalid UTF-8: {}", detail),
            BufferError::UnterminatedString => write!(f, "unterminated string"),
        }
    }
}

impl std::error::Error for BufferError {}

/// A growable byte buffer with a cursor, read and written in little-endian
/// order.
///
/// Writes happen at the cursor and grow the buffer when they pass the end;
/// reads happen at the cursor and fail with [`BufferError::UnexpectedEof`]
/// instead of panicking. The usual pattern is to write a message, rewind with
/// [`DataBuffer::set_position`], and hand the buffer to the consumer.
///
/// # Examples
///
/// ```
/// use core_types::DataBuffer;
///
/// let mut buffer = DataBuffer::new();
/// buffer.write_u16(24);
/// buffer.write_string("stage");
/// buffer.set_position(0);
///
/// assert_eq!(buffer.read_u16().unwrap(), 24);
/// assert_eq!(buffer.read_string().unwrap(), "stage");
/// ```
#[derive(Debug, Clone, Default)]
pub struct DataBuffer {
    bytes: Vec<u8>,
    position: usize,
}

impl DataBuffer {
    /// Create an empty buffer with the cursor at zero.
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            position: 0,
        }
    }

    /// Create a buffer over existing bytes with the cursor at zero.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes, position: 0 }
    }

    /// Total number of bytes in the buffer.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the buffer holds no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Move the cursor. Positions past the end are clamped to the end.
    pub fn set_position(&mut self, position: usize) {
        self.position = position.min(self.bytes.len());
    }

    /// Number of bytes between the cursor and the end.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    /// Borrow the full contents, ignoring the cursor.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the buffer and return its contents.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Write raw bytes at the cursor, growing the buffer as needed.
    pub fn write_bytes(&mut self, data: &[u8]) {
        let end = self.position + data.len();
        if end > self.bytes.len() {
            self.bytes.resize(end, 0);
        }
        self.bytes[self.position..end].copy_from_slice(data);
        self.position = end;
    }

    /// Write one byte.
    pub fn write_u8(&mut self, value: u8) {
        self.write_bytes(&[value]);
    }

    /// Write a little-endian u16.
    pub fn write_u16(&mut self, value: u16) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Write a little-endian u32.
    pub fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Write a little-endian i32.
    pub fn write_i32(&mut self, value: i32) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Write a length-prefixed UTF-8 string (u32 byte count, then bytes).
    pub fn write_string(&mut self, value: &str) {
        self.write_u32(value.len() as u32);
        self.write_bytes(value.as_bytes());
    }

    /// Write a NUL-terminated UTF-8 string.
    pub fn write_cstring(&mut self, value: &str) {
        self.write_bytes(value.as_bytes());
        self.write_u8(0);
    }

    fn take(&mut self, count: usize) -> Result<&[u8], BufferError> {
        if count > self.remaining() {
            return Err(BufferError::UnexpectedEof {
                needed: count,
                remaining: self.remaining(),
            });
        }
        let start = self.position;
        self.position += count;
        Ok(&self.bytes[start..self.position])
    }

    /// Read one byte at the cursor.
    pub fn read_u8(&mut self) -> Result<u8, BufferError> {
        let bytes = self.take(1)?;
        Ok(bytes[0])
    }

    /// Read a little-endian u16 at the cursor.
    pub fn read_u16(&mut self) -> Result<u16, BufferError> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Read a little-endian u32 at the cursor.
    pub fn read_u32(&mut self) -> Result<u32, BufferError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a little-endian i32 at the cursor.
    pub fn read_i32(&mut self) -> Result<i32, BufferError> {
        let bytes = self.take(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read `count` raw bytes at the cursor.
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>, BufferError> {
        Ok(self.take(count)?.to_vec())
    }

    /// Read a length-prefixed UTF-8 string (u32 byte count, then bytes).
    pub fn read_string(&mut self) -> Result<String, BufferError> {
        let length = self.read_u32()? as usize;
        let bytes = self.take(length)?.to_vec();
        String::from_utf8(bytes).map_err(|e| BufferError::InvalidUtf8(e.to_string()))
    }

    /// Read a NUL-terminated UTF-8 string, consuming the terminator.
    pub fn read_cstring(&mut self) -> Result<String, BufferError> {
        let end = self.bytes[self.position..]
            .iter()
            .position(|&b| b == 0)
            .ok_or(BufferError::UnterminatedString)?;
        let bytes = self.bytes[self.position..self.position + end].to_vec();
        self.position += end + 1;
        String::from_utf8(bytes).map_err(|e| BufferError::InvalidUtf8(e.to_string()))
    }
}
