//! Part database for runtime loading and lookup
//!
//! This module provides the `PartDatabase` type for loading part definitions
//! from RON files at runtime.

use alloc::{format, string::String, vec::Vec};
use std::fs;
use std::io;
use std::path::Path;

use super::types::{Memory, Part};

/// Error type for part database operations
#[derive(Debug)]
pub enum PartDbError {
    /// I/O error reading files
    Io(io::Error),
    /// RON parsing error
    Parse(ron::error::SpannedError),
    /// Validation error
    Validation(String),
}

impl From<io::Error> for PartDbError {
    fn from(e: io::Error) -> Self {
        PartDbError::Io(e)
    }
}

impl From<ron::error::SpannedError> for PartDbError {
    fn from(e: ron::error::SpannedError) -> Self {
        PartDbError::Parse(e)
    }
}

impl std::fmt::Display for PartDbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartDbError::Io(e) => write!(f, "I/O error: {}", e),
            PartDbError::Parse(e) => write!(f, "Parse error: {}", e),
            PartDbError::Validation(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for PartDbError {}

// ============================================================================
// RON deserialization types (intermediate format)
// ============================================================================

/// Size specification with human-readable units (for RON parsing)
#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub enum Size {
    /// Size in bytes
    B(u32),
    /// Size in kibibytes (1024 bytes)
    KiB(u32),
}

impl Size {
    /// Convert to bytes
    pub fn to_bytes(self) -> u32 {
        match self {
            Size::B(n) => n,
            Size::KiB(n) => n * 1024,
        }
    }
}

/// Memory definition in RON format
#[derive(Debug, Clone, serde::Deserialize)]
struct MemoryDef {
    name: String,
    size: Size,
    #[serde(default = "default_page_size")]
    page_size: u32,
    #[serde(default)]
    readonly: bool,
}

fn default_page_size() -> u32 {
    1
}

/// Single part definition in RON format
#[derive(Debug, Clone, serde::Deserialize)]
struct PartDef {
    id: String,
    desc: String,
    signature: Vec<u8>,
    memories: Vec<MemoryDef>,
}

/// Family definition containing multiple parts
#[derive(Debug, Clone, serde::Deserialize)]
struct FamilyDef {
    family: String,
    parts: Vec<PartDef>,
}

impl PartDef {
    fn into_part(self, family: &str) -> Result<Part, PartDbError> {
        let signature: [u8; 3] = self.signature.as_slice().try_into().map_err(|_| {
            PartDbError::Validation(format!(
                "part {}: signature must have 3 bytes, got {}",
                self.id,
                self.signature.len()
            ))
        })?;

        let mut memories: Vec<Memory> = Vec::with_capacity(self.memories.len());
        for def in self.memories {
            let size = def.size.to_bytes();
            if size == 0 || def.page_size == 0 {
                return Err(PartDbError::Validation(format!(
                    "part {}: memory {} has zero size",
                    self.id, def.name
                )));
            }
            if memories.iter().any(|m| m.name == def.name) {
                return Err(PartDbError::Validation(format!(
                    "part {}: duplicate memory {}",
                    self.id, def.name
                )));
            }
            memories.push(Memory {
                name: def.name,
                size,
                page_size: def.page_size,
                readonly: def.readonly,
            });
        }

        Ok(Part {
            family: String::from(family),
            id: self.id,
            desc: self.desc,
            signature,
            memories,
        })
    }
}

// ============================================================================
// Part database
// ============================================================================

/// Runtime part database
///
/// Holds a collection of part definitions that can be loaded from RON files.
#[derive(Debug, Clone, Default)]
pub struct PartDatabase {
    parts: Vec<Part>,
}

impl PartDatabase {
    /// Create an empty part database
    pub fn new() -> Self {
        Self { parts: Vec::new() }
    }

    /// Load part definitions from a single RON file
    pub fn load_file(&mut self, path: &Path) -> Result<usize, PartDbError> {
        let content = fs::read_to_string(path)?;
        self.load_ron(&content)
    }

    /// Load part definitions from a RON string
    ///
    /// Nothing is added if any part in the string fails validation.
    pub fn load_ron(&mut self, content: &str) -> Result<usize, PartDbError> {
        let family_def: FamilyDef = ron::from_str(content)?;

        let parts = family_def
            .parts
            .into_iter()
            .map(|def| def.into_part(&family_def.family))
            .collect::<Result<Vec<_>, _>>()?;

        let count = parts.len();
        self.parts.extend(parts);
        Ok(count)
    }

    /// Load all RON files from a directory
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, PartDbError> {
        let mut total = 0;

        let mut paths: Vec<_> = fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<_, _>>()?;
        paths.sort();

        for path in paths {
            if path.extension().is_some_and(|ext| ext == "ron") {
                total += self.load_file(&path)?;
            }
        }

        Ok(total)
    }

    /// Get all parts in the database
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Get the number of parts in the database
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Check if the database is empty
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Find a part by id or description (case-insensitive, exact)
    pub fn find(&self, name: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.matches_name(name))
    }

    /// Find a part by its signature bytes
    pub fn find_by_signature(&self, signature: [u8; 3]) -> Option<&Part> {
        self.parts.iter().find(|p| p.signature == signature)
    }

    /// Iterate over all parts
    pub fn iter(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter()
    }
}
