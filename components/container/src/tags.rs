//! Tag codes and the records extracted from them.

/// Tag codes understood by the container parser.
///
/// Codes outside this set are skipped over using the length in the
/// record header, so newer containers stay loadable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagCode {
    /// Terminates the tag stream.
    End,
    /// Closes the current frame.
    ShowFrame,
    /// Declares an image asset with a character id.
    DefineImage,
    /// Carries an anonymous bytecode module.
    DoBytecode,
    /// Binds character ids to symbol names.
    SymbolClass,
    /// Carries a named bytecode module with load flags.
    DoBytecodeNamed,
    /// Records a command for the host environment.
    HostCommand,
}

impl TagCode {
    /// Decodes a tag code from the wire value, or `None` for codes this
    /// parser does not know.
    pub fn from_u16(code: u16) -> Option<TagCode> {
        match code {
            0 => Some(TagCode::End),
            1 => Some(TagCode::ShowFrame),
            21 => Some(TagCode::DefineImage),
            72 => Some(TagCode::DoBytecode),
            76 => Some(TagCode::SymbolClass),
            82 => Some(TagCode::DoBytecodeNamed),
            88 => Some(TagCode::HostCommand),
            _ => None,
        }
    }

    /// The wire value for this tag code.
    pub fn as_u16(self) -> u16 {
        match self {
            TagCode::End => 0,
            TagCode::ShowFrame => 1,
            TagCode::DefineImage => 21,
            TagCode::DoBytecode => 72,
            TagCode::SymbolClass => 76,
            TagCode::DoBytecodeNamed => 82,
            TagCode::HostCommand => 88,
        }
    }
}

/// A bytecode module carried by a `DoBytecode` or `DoBytecodeNamed` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BytecodeBlock {
    /// Name from a `DoBytecodeNamed` tag, `None` for anonymous blocks.
    pub name: Option<String>,
    /// Load flags from a `DoBytecodeNamed` tag, zero for anonymous blocks.
    pub flags: u32,
    /// The serialized module bytes.
    pub data: Vec<u8>,
}

/// A character id bound to a symbol name by a `SymbolClass` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    /// Character id the symbol is bound to.
    pub character_id: u16,
    /// Fully qualified symbol name.
    pub name: String,
}

/// An image asset declared by a `DefineImage` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    /// Character id of the image.
    pub character_id: u16,
    /// Raw encoded image bytes.
    pub data: Vec<u8>,
}

/// A command addressed to the host environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCommand {
    /// Command name, for example `quit` or `trace`.
    pub command: String,
    /// Argument string, empty when the command takes none.
    pub args: String,
}

/// One timeline frame: the host commands recorded before its `ShowFrame`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    /// Host commands to run when the frame is processed.
    pub commands: Vec<HostCommand>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_codes_round_trip_through_wire_values() {
        let codes = [
            TagCode::End,
            TagCode::ShowFrame,
            TagCode::DefineImage,
            TagCode::DoBytecode,
            TagCode::SymbolClass,
            TagCode::DoBytecodeNamed,
            TagCode::HostCommand,
        ];
        for code in codes {
            assert_eq!(TagCode::from_u16(code.as_u16()), Some(code));
        }
    }

    #[test]
    fn unknown_wire_values_decode_to_none() {
        assert_eq!(TagCode::from_u16(2), None);
        assert_eq!(TagCode::from_u16(255), None);
    }
}
