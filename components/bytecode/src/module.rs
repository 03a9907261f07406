//! Bytecode module - parsed representation of one bytecode container.

use crate::error::ModuleError;
use core_types::DataBuffer;
use std::collections::HashSet;

/// Magic bytes at the start of every bytecode module.
pub const MODULE_MAGIC: &[u8; 4] = b"VMBC";
/// Current module format version.
pub const MODULE_VERSION: u8 = 1;

/// A parsed bytecode module.
///
/// Layout on the wire (all integers little-endian):
///
/// ```text
/// 0..4   magic b"VMBC"
/// 4      format version
/// 5..    u32 definition count, then that many length-prefixed names
///        u32 reference count, then that many length-prefixed names
///        u32 body length, then that many opaque instruction bytes
/// ```
///
/// The `name` is the origin tag supplied by whoever requested the parse: a
/// file name, a container tag such as `TAG0`, or a library chunk name. A
/// module is never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BytecodeModule {
    name: String,
    defs: Vec<String>,
    refs: Vec<String>,
    body: Vec<u8>,
}

impl BytecodeModule {
    /// Assemble a module from its parts.
    pub fn new(
        name: impl Into<String>,
        defs: Vec<String>,
        refs: Vec<String>,
        body: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            defs,
            refs,
            body,
        }
    }

    /// Parse a module from raw bytes, tagging it with `name`.
    pub fn parse(bytes: &[u8], name: &str) -> Result<Self, ModuleError> {
        if bytes.len() < 5 {
            return Err(ModuleError::TooShort {
                length: bytes.len(),
            });
        }
        if &bytes[0..4] != MODULE_MAGIC {
            return Err(ModuleError::BadMagic {
                found: [bytes[0], bytes[1], bytes[2], bytes[3]],
            });
        }
        if bytes[4] != MODULE_VERSION {
            return Err(ModuleError::UnsupportedVersion { found: bytes[4] });
        }

        let mut buffer = DataBuffer::from_bytes(bytes[5..].to_vec());
        let defs = read_name_list(&mut buffer, "definition")?;
        let refs = read_name_list(&mut buffer, "reference")?;

        let body_length = buffer
            .read_u32()
            .map_err(ModuleError::in_section("body"))? as usize;
        let body = buffer
            .read_bytes(body_length)
            .map_err(ModuleError::in_section("body"))?;

        if buffer.remaining() != 0 {
            return Err(ModuleError::TrailingBytes {
                count: buffer.remaining(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            defs,
            refs,
            body,
        })
    }

    /// Encode the module back into its wire format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = DataBuffer::new();
        buffer.write_bytes(MODULE_MAGIC);
        buffer.write_u8(MODULE_VERSION);
        buffer.write_u32(self.defs.len() as u32);
        for name in &self.defs {
            buffer.write_string(name);
        }
        buffer.write_u32(self.refs.len() as u32);
        for name in &self.refs {
            buffer.write_string(name);
        }
        buffer.write_u32(self.body.len() as u32);
        buffer.write_bytes(&self.body);
        buffer.into_bytes()
    }

    /// Structural verification: no duplicate definitions, no empty names.
    ///
    /// This is the ahead-of-run check the virtual machine applies in compile
    /// mode before a module is linked.
    pub fn verify(&self) -> Result<(), ModuleError> {
        let mut seen = HashSet::new();
        for name in &self.defs {
            if name.is_empty() {
                return Err(ModuleError::EmptySymbolName);
            }
            if !seen.insert(name.as_str()) {
                return Err(ModuleError::DuplicateDefinition { name: name.clone() });
            }
        }
        for name in &self.refs {
            if name.is_empty() {
                return Err(ModuleError::EmptySymbolName);
            }
        }
        Ok(())
    }

    /// Render a human-readable listing of the module.
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "module {} ({} def(s), {} ref(s), {} body byte(s))\n",
            self.name,
            self.defs.len(),
            self.refs.len(),
            self.body.len()
        ));
        for name in &self.defs {
            out.push_str(&format!("  def {}\n", name));
        }
        for name in &self.refs {
            out.push_str(&format!("  ref {}\n", name));
        }
        for (row, chunk) in self.body.chunks(16).enumerate() {
            let hex: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
            out.push_str(&format!("  {:04x}: {}\n", row * 16, hex.join(" ")));
        }
        out
    }

    /// The origin tag this module was parsed under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully-qualified symbols this module defines.
    pub fn defs(&self) -> &[String] {
        &self.defs
    }

    /// Fully-qualified symbols this module references.
    pub fn refs(&self) -> &[String] {
        &self.refs
    }

    /// The opaque instruction body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

fn read_name_list(
    buffer: &mut DataBuffer,
    section: &'static str,
) -> Result<Vec<String>, ModuleError> {
    let count = buffer
        .read_u32()
        .map_err(ModuleError::in_section(section))? as usize;
    let mut names = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        names.push(
            buffer
                .read_string()
                .map_err(ModuleError::in_section(section))?,
        );
    }
    Ok(names)
}
