//! Programmatic construction of playback containers.
//!
//! The shell's test fixtures build containers in memory instead of
//! checking binary files into the tree, so the builder mirrors the
//! parser: whatever it emits, [`ContainerFile::parse`] accepts.
//!
//! [`ContainerFile::parse`]: crate::ContainerFile::parse

use core_types::DataBuffer;

use crate::file::{CONTAINER_SIGNATURE, CONTAINER_VERSION};
use crate::tags::TagCode;

/// Builds a playback container byte stream tag by tag.
#[derive(Debug, Clone)]
pub struct ContainerBuilder {
    frame_rate: u16,
    frame_count: u16,
    tags: Vec<u8>,
}

impl ContainerBuilder {
    /// Creates an empty builder with a frame rate of 24.
    pub fn new() -> ContainerBuilder {
        ContainerBuilder {
            frame_rate: 24,
            frame_count: 0,
            tags: Vec::new(),
        }
    }

    /// Sets the frame rate recorded in the header.
    pub fn frame_rate(mut self, frame_rate: u16) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    /// Appends a `ShowFrame` tag and bumps the declared frame count.
    pub fn show_frame(mut self) -> Self {
        self.frame_count += 1;
        self.push_tag(TagCode::ShowFrame.as_u16(), &[]);
        self
    }

    /// Appends an anonymous bytecode block.
    pub fn bytecode(mut self, data: &[u8]) -> Self {
        self.push_tag(TagCode::DoBytecode.as_u16(), data);
        self
    }

    /// Appends a named bytecode block with load flags.
    pub fn named_bytecode(mut self, flags: u32, name: &str, data: &[u8]) -> Self {
        let mut body = DataBuffer::new();
        body.write_u32(flags);
        body.write_cstring(name);
        body.write_bytes(data);
        self.push_tag(TagCode::DoBytecodeNamed.as_u16(), body.bytes());
        self
    }

    /// Appends a `SymbolClass` tag binding character ids to names.
    pub fn symbols(mut self, entries: &[(u16, &str)]) -> Self {
        let mut body = DataBuffer::new();
        body.write_u16(entries.len() as u16);
        for (character_id, name) in entries {
            body.write_u16(*character_id);
            body.write_cstring(name);
        }
        self.push_tag(TagCode::SymbolClass.as_u16(), body.bytes());
        self
    }

    /// Appends an image asset.
    pub fn image(mut self, character_id: u16, data: &[u8]) -> Self {
        let mut body = DataBuffer::new();
        body.write_u16(character_id);
        body.write_bytes(data);
        self.push_tag(TagCode::DefineImage.as_u16(), body.bytes());
        self
    }

    /// Appends a host command for the current frame.
    pub fn host_command(mut self, command: &str, args: &str) -> Self {
        let mut body = DataBuffer::new();
        body.write_cstring(command);
        body.write_cstring(args);
        self.push_tag(TagCode::HostCommand.as_u16(), body.bytes());
        self
    }

    /// Appends a tag with an arbitrary code and body.
    pub fn raw_tag(mut self, code: u16, body: &[u8]) -> Self {
        self.push_tag(code, body);
        self
    }

    /// Serializes the container: header, tags, and a closing `End` tag.
    ///
    /// The declared length field is patched in after the stream is
    /// complete, so the output always satisfies the parser's length
    /// check.
    pub fn build(self) -> Vec<u8> {
        let mut buffer = DataBuffer::new();
        buffer.write_bytes(CONTAINER_SIGNATURE);
        buffer.write_u8(CONTAINER_VERSION);
        buffer.write_u32(0);
        buffer.write_u16(self.frame_rate);
        buffer.write_u16(self.frame_count);
        buffer.write_bytes(&self.tags);
        buffer.write_u16(TagCode::End.as_u16() << 6);
        let total = buffer.len() as u32;
        buffer.set_position(4);
        buffer.write_u32(total);
        buffer.into_bytes()
    }

    /// Encodes one tag record, switching to the long form when the body
    /// does not fit the six-bit length field.
    fn push_tag(&mut self, code: u16, body: &[u8]) {
        let mut record = DataBuffer::new();
        if body.len() < 0x3f {
            record.write_u16(code << 6 | body.len() as u16);
        } else {
            record.write_u16(code << 6 | 0x3f);
            record.write_u32(body.len() as u32);
        }
        record.write_bytes(body);
        self.tags.extend_from_slice(record.bytes());
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        ContainerBuilder::new()
    }
}
