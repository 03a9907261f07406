//! The global library catalog.
//!
//! The library ships as two co-located files: a binary blob of
//! concatenated bytecode chunks and a JSON catalog describing where each
//! chunk sits in the blob and which symbols it defines. The catalog is
//! what makes lazy loading possible: the VM slices a chunk out of the
//! blob only when one of its symbols is first referenced.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

use serde::Deserialize;

/// Errors building or querying a [`LibraryCatalog`].
#[derive(Debug)]
pub enum CatalogError {
    /// The catalog JSON did not deserialize.
    Json(serde_json::Error),
    /// A chunk's offset and length fall outside the blob.
    ChunkOutOfBounds {
        /// Script whose row is out of range.
        script: String,
        /// Offset recorded in the catalog row.
        offset: usize,
        /// Length recorded in the catalog row.
        length: usize,
        /// Size of the blob the row points into.
        available: usize,
    },
    /// No catalog row carries this script name.
    UnknownScript {
        /// The name that was looked up.
        name: String,
    },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Json(error) => write!(f, "invalid catalog JSON: {}", error),
            CatalogError::ChunkOutOfBounds {
                script,
                offset,
                length,
                available,
            } => write!(
                f,
                "chunk '{}' at offset {} with length {} exceeds blob of {} byte(s)",
                script, offset, length, available
            ),
            CatalogError::UnknownScript { name } => {
                write!(f, "no catalog entry for script '{}'", name)
            }
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CatalogError::Json(error) => Some(error),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(error: serde_json::Error) -> CatalogError {
        CatalogError::Json(error)
    }
}

/// The `defs` field of a catalog row: one symbol or a list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DefList {
    /// A row defining a single symbol.
    One(String),
    /// A row defining several symbols.
    Many(Vec<String>),
}

impl DefList {
    /// The defined symbols as a slice, whatever the JSON shape was.
    pub fn names(&self) -> &[String] {
        match self {
            DefList::One(name) => std::slice::from_ref(name),
            DefList::Many(names) => names,
        }
    }
}

/// One row of the catalog JSON array.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogRow {
    /// Script name, unique key into the blob.
    pub name: String,
    /// Symbols the script defines.
    pub defs: DefList,
    /// Byte offset of the chunk inside the blob.
    pub offset: u32,
    /// Byte length of the chunk.
    pub length: u32,
}

#[derive(Debug, Clone, Copy)]
struct ChunkLocation {
    offset: usize,
    length: usize,
}

/// An indexed global library: blob plus symbol and script maps.
///
/// Symbol collisions across rows keep the last writer, matching the
/// original catalog semantics; the overwritten symbols are retained in
/// [`LibraryCatalog::duplicate_definitions`] so the shell can warn
/// about them.
#[derive(Debug, Clone, Default)]
pub struct LibraryCatalog {
    chunks: Vec<u8>,
    scripts_by_name: HashMap<String, ChunkLocation>,
    symbol_to_script: HashMap<String, String>,
    duplicate_definitions: Vec<String>,
}

impl LibraryCatalog {
    /// Parses the catalog JSON and indexes it over `chunks`.
    ///
    /// Row bounds are not validated here; a bad row surfaces as
    /// [`CatalogError::ChunkOutOfBounds`] when its chunk is first
    /// requested.
    pub fn from_json(catalog_json: &str, chunks: Vec<u8>) -> Result<LibraryCatalog, CatalogError> {
        let rows: Vec<CatalogRow> = serde_json::from_str(catalog_json)?;
        let mut catalog = LibraryCatalog {
            chunks,
            scripts_by_name: HashMap::new(),
            symbol_to_script: HashMap::new(),
            duplicate_definitions: Vec::new(),
        };
        for row in rows {
            catalog.scripts_by_name.insert(
                row.name.clone(),
                ChunkLocation {
                    offset: row.offset as usize,
                    length: row.length as usize,
                },
            );
            for def in row.defs.names() {
                if let Some(previous) = catalog
                    .symbol_to_script
                    .insert(def.clone(), row.name.clone())
                {
                    if previous != row.name {
                        catalog.duplicate_definitions.push(def.clone());
                    }
                }
            }
        }
        Ok(catalog)
    }

    /// The script that defines `symbol`, if the catalog knows one.
    pub fn script_for_symbol(&self, symbol: &str) -> Option<&str> {
        self.symbol_to_script.get(symbol).map(String::as_str)
    }

    /// The chunk bytes for `script`, sliced out of the blob.
    pub fn chunk_bytes(&self, script: &str) -> Result<&[u8], CatalogError> {
        let location =
            self.scripts_by_name
                .get(script)
                .ok_or_else(|| CatalogError::UnknownScript {
                    name: script.to_string(),
                })?;
        let end = location.offset.checked_add(location.length);
        match end {
            Some(end) if end <= self.chunks.len() => {
                Ok(&self.chunks[location.offset..end])
            }
            _ => Err(CatalogError::ChunkOutOfBounds {
                script: script.to_string(),
                offset: location.offset,
                length: location.length,
                available: self.chunks.len(),
            }),
        }
    }

    /// Number of scripts in the catalog.
    pub fn script_count(&self) -> usize {
        self.scripts_by_name.len()
    }

    /// Number of symbols the catalog can resolve.
    pub fn symbol_count(&self) -> usize {
        self.symbol_to_script.len()
    }

    /// Symbols whose rows were overwritten by a later row.
    pub fn duplicate_definitions(&self) -> &[String] {
        &self.duplicate_definitions
    }
}
