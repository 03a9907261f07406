//! Parsed representation of a playback container.

use core_types::{BufferError, DataBuffer};

use crate::error::ContainerError;
use crate::tags::{BytecodeBlock, Frame, HostCommand, ImageEntry, SymbolEntry, TagCode};

/// First three bytes of every playback container.
pub const CONTAINER_SIGNATURE: &[u8; 3] = b"VPC";

/// Container format version this parser accepts.
pub const CONTAINER_VERSION: u8 = 1;

/// Fixed header: signature, version, declared length, frame rate, frame count.
const HEADER_LENGTH: usize = 12;

/// A fully parsed playback container.
///
/// The tag stream is consumed up front: bytecode blocks, symbol bindings
/// and image assets are collected in stream order, and `HostCommand`
/// records are grouped into the [`Frame`] closed by the next `ShowFrame`.
/// Commands after the last `ShowFrame` never run and are dropped.
#[derive(Debug, Clone)]
pub struct ContainerFile {
    version: u8,
    frame_rate: u16,
    frame_count: u16,
    bytecode_blocks: Vec<BytecodeBlock>,
    symbols: Vec<SymbolEntry>,
    images: Vec<ImageEntry>,
    frames: Vec<Frame>,
}

impl ContainerFile {
    /// Parses a complete container from `bytes`.
    ///
    /// The declared length in the header must match the buffer length
    /// exactly. Tags with unknown codes are skipped using the length in
    /// their record header; an `End` tag stops the scan early.
    pub fn parse(bytes: &[u8]) -> Result<ContainerFile, ContainerError> {
        if bytes.len() < HEADER_LENGTH {
            return Err(ContainerError::TooShort {
                length: bytes.len(),
            });
        }
        if &bytes[0..3] != CONTAINER_SIGNATURE {
            return Err(ContainerError::BadSignature {
                found: [bytes[0], bytes[1], bytes[2]],
            });
        }
        let version = bytes[3];
        if version != CONTAINER_VERSION {
            return Err(ContainerError::UnsupportedVersion { found: version });
        }
        let declared = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if declared as usize != bytes.len() {
            return Err(ContainerError::DeclaredLengthMismatch {
                declared,
                actual: bytes.len(),
            });
        }
        let frame_rate = u16::from_le_bytes([bytes[8], bytes[9]]);
        let frame_count = u16::from_le_bytes([bytes[10], bytes[11]]);

        let mut file = ContainerFile {
            version,
            frame_rate,
            frame_count,
            bytecode_blocks: Vec::new(),
            symbols: Vec::new(),
            images: Vec::new(),
            frames: Vec::new(),
        };
        let mut pending_commands: Vec<HostCommand> = Vec::new();

        let mut buffer = DataBuffer::from_bytes(bytes.to_vec());
        buffer.set_position(HEADER_LENGTH);
        while buffer.remaining() > 0 {
            let offset = buffer.position();
            let truncated = |_: BufferError| ContainerError::TruncatedTag { offset };
            let code_and_length = buffer.read_u16().map_err(truncated)?;
            let code = code_and_length >> 6;
            let mut length = (code_and_length & 0x3f) as usize;
            if length == 0x3f {
                length = buffer.read_u32().map_err(truncated)? as usize;
            }
            let body = buffer.read_bytes(length).map_err(truncated)?;
            match TagCode::from_u16(code) {
                Some(TagCode::End) => break,
                Some(TagCode::ShowFrame) => file.frames.push(Frame {
                    commands: std::mem::take(&mut pending_commands),
                }),
                Some(TagCode::DefineImage) => file.images.push(parse_image(body)?),
                Some(TagCode::DoBytecode) => file.bytecode_blocks.push(BytecodeBlock {
                    name: None,
                    flags: 0,
                    data: body,
                }),
                Some(TagCode::SymbolClass) => parse_symbols(&body, &mut file.symbols)?,
                Some(TagCode::DoBytecodeNamed) => {
                    file.bytecode_blocks.push(parse_named_bytecode(body)?)
                }
                Some(TagCode::HostCommand) => pending_commands.push(parse_host_command(&body)?),
                None => {}
            }
        }
        Ok(file)
    }

    /// Container format version from the header.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Frames per second declared in the header.
    pub fn frame_rate(&self) -> u16 {
        self.frame_rate
    }

    /// Frame count declared in the header.
    ///
    /// This is the producer's claim; [`ContainerFile::frames`] holds the
    /// frames the tag stream actually closed.
    pub fn frame_count(&self) -> u16 {
        self.frame_count
    }

    /// Bytecode blocks in stream order.
    pub fn bytecode_blocks(&self) -> &[BytecodeBlock] {
        &self.bytecode_blocks
    }

    /// Symbol bindings from every `SymbolClass` tag, in stream order.
    pub fn symbols(&self) -> &[SymbolEntry] {
        &self.symbols
    }

    /// Image assets in stream order.
    pub fn images(&self) -> &[ImageEntry] {
        &self.images
    }

    /// Timeline frames closed by `ShowFrame` tags.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}

fn invalid(code: TagCode, error: BufferError) -> ContainerError {
    ContainerError::InvalidTagBody {
        code: code.as_u16(),
        detail: error.to_string(),
    }
}

fn parse_image(body: Vec<u8>) -> Result<ImageEntry, ContainerError> {
    let mut buffer = DataBuffer::from_bytes(body);
    let character_id = buffer
        .read_u16()
        .map_err(|e| invalid(TagCode::DefineImage, e))?;
    let remaining = buffer.remaining();
    let data = buffer
        .read_bytes(remaining)
        .map_err(|e| invalid(TagCode::DefineImage, e))?;
    Ok(ImageEntry { character_id, data })
}

fn parse_symbols(body: &[u8], out: &mut Vec<SymbolEntry>) -> Result<(), ContainerError> {
    let mut buffer = DataBuffer::from_bytes(body.to_vec());
    let count = buffer
        .read_u16()
        .map_err(|e| invalid(TagCode::SymbolClass, e))?;
    for _ in 0..count {
        let character_id = buffer
            .read_u16()
            .map_err(|e| invalid(TagCode::SymbolClass, e))?;
        let name = buffer
            .read_cstring()
            .map_err(|e| invalid(TagCode::SymbolClass, e))?;
        out.push(SymbolEntry { character_id, name });
    }
    Ok(())
}

fn parse_named_bytecode(body: Vec<u8>) -> Result<BytecodeBlock, ContainerError> {
    let mut buffer = DataBuffer::from_bytes(body);
    let flags = buffer
        .read_u32()
        .map_err(|e| invalid(TagCode::DoBytecodeNamed, e))?;
    let name = buffer
        .read_cstring()
        .map_err(|e| invalid(TagCode::DoBytecodeNamed, e))?;
    let remaining = buffer.remaining();
    let data = buffer
        .read_bytes(remaining)
        .map_err(|e| invalid(TagCode::DoBytecodeNamed, e))?;
    Ok(BytecodeBlock {
        name: Some(name),
        flags,
        data,
    })
}

fn parse_host_command(body: &[u8]) -> Result<HostCommand, ContainerError> {
    let mut buffer = DataBuffer::from_bytes(body.to_vec());
    let command = buffer
        .read_cstring()
        .map_err(|e| invalid(TagCode::HostCommand, e))?;
    let args = buffer
        .read_cstring()
        .map_err(|e| invalid(TagCode::HostCommand, e))?;
    Ok(HostCommand { command, args })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ContainerBuilder;

    /// A well-formed header for a container of `total` bytes.
    fn header(total: u32, frame_rate: u16, frame_count: u16) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(CONTAINER_SIGNATURE);
        bytes.push(CONTAINER_VERSION);
        bytes.extend_from_slice(&total.to_le_bytes());
        bytes.extend_from_slice(&frame_rate.to_le_bytes());
        bytes.extend_from_slice(&frame_count.to_le_bytes());
        bytes
    }

    #[test]
    fn rejects_buffers_shorter_than_the_header() {
        let result = ContainerFile::parse(b"VPC");
        assert_eq!(result.unwrap_err(), ContainerError::TooShort { length: 3 });
    }

    #[test]
    fn rejects_a_bad_signature() {
        let mut bytes = header(14, 24, 0);
        bytes[0] = b'X';
        bytes.extend_from_slice(&0u16.to_le_bytes());
        let result = ContainerFile::parse(&bytes);
        assert_eq!(
            result.unwrap_err(),
            ContainerError::BadSignature {
                found: [b'X', b'P', b'C'],
            }
        );
    }

    #[test]
    fn rejects_an_unsupported_version() {
        let mut bytes = header(14, 24, 0);
        bytes[3] = 9;
        bytes.extend_from_slice(&0u16.to_le_bytes());
        let result = ContainerFile::parse(&bytes);
        assert_eq!(
            result.unwrap_err(),
            ContainerError::UnsupportedVersion { found: 9 }
        );
    }

    #[test]
    fn rejects_a_length_that_disagrees_with_the_buffer() {
        let mut bytes = header(99, 24, 0);
        bytes.extend_from_slice(&0u16.to_le_bytes());
        let result = ContainerFile::parse(&bytes);
        assert_eq!(
            result.unwrap_err(),
            ContainerError::DeclaredLengthMismatch {
                declared: 99,
                actual: 14,
            }
        );
    }

    #[test]
    fn parses_a_minimal_container() {
        let mut bytes = header(14, 24, 0);
        bytes.extend_from_slice(&0u16.to_le_bytes());
        let file = ContainerFile::parse(&bytes).unwrap();
        assert_eq!(file.version(), CONTAINER_VERSION);
        assert_eq!(file.frame_rate(), 24);
        assert_eq!(file.frame_count(), 0);
        assert!(file.bytecode_blocks().is_empty());
        assert!(file.symbols().is_empty());
        assert!(file.images().is_empty());
        assert!(file.frames().is_empty());
    }

    #[test]
    fn reports_the_offset_of_a_truncated_tag() {
        // Header plus a lone byte where a tag record header should be.
        let mut bytes = header(13, 24, 0);
        bytes.push(0xAA);
        let result = ContainerFile::parse(&bytes);
        assert_eq!(
            result.unwrap_err(),
            ContainerError::TruncatedTag { offset: 12 }
        );
    }

    #[test]
    fn reports_a_tag_body_running_past_the_end() {
        // ShowFrame record claiming a 5-byte body with nothing behind it.
        let mut bytes = header(14, 24, 1);
        let code_and_length: u16 = (1 << 6) | 5;
        bytes.extend_from_slice(&code_and_length.to_le_bytes());
        let result = ContainerFile::parse(&bytes);
        assert_eq!(
            result.unwrap_err(),
            ContainerError::TruncatedTag { offset: 12 }
        );
    }

    #[test]
    fn groups_host_commands_into_the_frame_that_shows_them() {
        let bytes = ContainerBuilder::new()
            .host_command("trace", "first")
            .show_frame()
            .show_frame()
            .host_command("quit", "")
            .show_frame()
            .build();
        let file = ContainerFile::parse(&bytes).unwrap();
        assert_eq!(file.frames().len(), 3);
        assert_eq!(file.frames()[0].commands.len(), 1);
        assert_eq!(file.frames()[0].commands[0].command, "trace");
        assert_eq!(file.frames()[0].commands[0].args, "first");
        assert!(file.frames()[1].commands.is_empty());
        assert_eq!(file.frames()[2].commands[0].command, "quit");
    }

    #[test]
    fn drops_host_commands_after_the_last_show_frame() {
        let bytes = ContainerBuilder::new()
            .show_frame()
            .host_command("trace", "never shown")
            .build();
        let file = ContainerFile::parse(&bytes).unwrap();
        assert_eq!(file.frames().len(), 1);
        assert!(file.frames()[0].commands.is_empty());
    }

    #[test]
    fn skips_tags_with_unknown_codes() {
        let bytes = ContainerBuilder::new()
            .raw_tag(37, &[1, 2, 3, 4])
            .host_command("trace", "after unknown")
            .show_frame()
            .build();
        let file = ContainerFile::parse(&bytes).unwrap();
        assert_eq!(file.frames().len(), 1);
        assert_eq!(file.frames()[0].commands[0].args, "after unknown");
    }

    #[test]
    fn collects_blocks_symbols_and_images() {
        let bytes = ContainerBuilder::new()
            .bytecode(&[0xDE, 0xAD])
            .named_bytecode(1, "frame1", &[0xBE, 0xEF])
            .symbols(&[(0, "demos.Main"), (7, "demos.Helper")])
            .image(7, &[0xFF, 0xD8, 0xFF])
            .build();
        let file = ContainerFile::parse(&bytes).unwrap();

        assert_eq!(file.bytecode_blocks().len(), 2);
        assert_eq!(file.bytecode_blocks()[0].name, None);
        assert_eq!(file.bytecode_blocks()[0].data, vec![0xDE, 0xAD]);
        assert_eq!(file.bytecode_blocks()[1].name.as_deref(), Some("frame1"));
        assert_eq!(file.bytecode_blocks()[1].flags, 1);
        assert_eq!(file.bytecode_blocks()[1].data, vec![0xBE, 0xEF]);

        assert_eq!(file.symbols().len(), 2);
        assert_eq!(file.symbols()[0].character_id, 0);
        assert_eq!(file.symbols()[0].name, "demos.Main");
        assert_eq!(file.symbols()[1].character_id, 7);

        assert_eq!(file.images().len(), 1);
        assert_eq!(file.images()[0].character_id, 7);
        assert_eq!(file.images()[0].data, vec![0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn reads_long_form_tag_lengths() {
        let payload = vec![0x5A; 200];
        let bytes = ContainerBuilder::new().bytecode(&payload).build();
        let file = ContainerFile::parse(&bytes).unwrap();
        assert_eq!(file.bytecode_blocks()[0].data, payload);
    }

    #[test]
    fn stops_scanning_at_an_end_tag() {
        // Bytes after End would be a truncated record if scanned.
        let mut bytes = ContainerBuilder::new().show_frame().build();
        bytes.push(0xAA);
        let total = bytes.len() as u32;
        bytes[4..8].copy_from_slice(&total.to_le_bytes());
        let file = ContainerFile::parse(&bytes).unwrap();
        assert_eq!(file.frames().len(), 1);
    }

    #[test]
    fn rejects_a_symbol_table_with_a_missing_terminator() {
        // One entry whose name never reaches a NUL byte.
        let mut body = Vec::new();
        body.extend_from_slice(&1u16.to_le_bytes());
        body.extend_from_slice(&3u16.to_le_bytes());
        body.extend_from_slice(b"abc");
        let bytes = ContainerBuilder::new()
            .raw_tag(TagCode::SymbolClass.as_u16(), &body)
            .build();
        let result = ContainerFile::parse(&bytes);
        match result.unwrap_err() {
            ContainerError::InvalidTagBody { code, .. } => {
                assert_eq!(code, TagCode::SymbolClass.as_u16());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
