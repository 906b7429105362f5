//! Part type definitions

use alloc::{string::String, vec::Vec};
use core::fmt;

/// A named, sized memory region of a part (flash, eeprom, fuses, ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    /// Memory type name as typed at the console (e.g. "flash")
    pub name: String,
    /// Size in bytes; no access may reach past it
    pub size: u32,
    /// Page size in bytes (1 for byte-addressed memories)
    pub page_size: u32,
    /// Whether the memory can only be read (signature, calibration)
    pub readonly: bool,
}

impl Memory {
    /// Create a writable, byte-addressed memory
    pub fn new(name: impl Into<String>, size: u32) -> Self {
        Self {
            name: name.into(),
            size,
            page_size: 1,
            readonly: false,
        }
    }

    /// Set the page size
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Mark the memory read-only
    pub fn read_only(mut self) -> Self {
        self.readonly = true;
        self
    }

    /// Check that `len` bytes starting at `addr` fit inside this memory
    pub fn contains(&self, addr: u32, len: u32) -> bool {
        (addr as u64) + (len as u64) <= self.size as u64
    }
}

/// A device the programmer talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Family the part was loaded from (e.g. "ATmega")
    pub family: String,
    /// Short id used on the command line (e.g. "m328p")
    pub id: String,
    /// Human-readable description (e.g. "ATmega328P")
    pub desc: String,
    /// Expected device signature bytes
    pub signature: [u8; 3],
    /// Memories in definition order
    pub memories: Vec<Memory>,
}

impl Part {
    /// Create a part without memories
    pub fn new(id: impl Into<String>, desc: impl Into<String>, signature: [u8; 3]) -> Self {
        Self {
            family: String::new(),
            id: id.into(),
            desc: desc.into(),
            signature,
            memories: Vec::new(),
        }
    }

    /// Add a memory
    pub fn with_memory(mut self, memory: Memory) -> Self {
        self.memories.push(memory);
        self
    }

    /// Find a memory by its exact name
    pub fn memory(&self, name: &str) -> Option<&Memory> {
        self.memories.iter().find(|m| m.name == name)
    }

    /// Find a memory by name or unambiguous name prefix
    ///
    /// An exact name always wins; otherwise the prefix must match exactly
    /// one memory.
    pub fn locate_memory(&self, name: &str) -> Option<&Memory> {
        if let Some(mem) = self.memory(name) {
            return Some(mem);
        }

        let mut matches = self.memories.iter().filter(|m| m.name.starts_with(name));
        match (matches.next(), matches.next()) {
            (Some(mem), None) => Some(mem),
            _ => None,
        }
    }

    /// Check whether `name` matches this part's id or description
    pub fn matches_name(&self, name: &str) -> bool {
        self.id.eq_ignore_ascii_case(name) || self.desc.eq_ignore_ascii_case(name)
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "AVR Part                      : {}", self.desc)?;
        writeln!(f, "Part id                       : {}", self.id)?;
        writeln!(
            f,
            "Signature                     : 0x{:02x}{:02x}{:02x}",
            self.signature[0], self.signature[1], self.signature[2]
        )?;
        writeln!(f)?;
        writeln!(f, "  Memory Type        Size  Page Size  Access")?;
        writeln!(f, "  -----------  ----------  ---------  ------")?;
        for mem in &self.memories {
            writeln!(
                f,
                "  {:<11}  {:>10}  {:>9}  {}",
                mem.name,
                mem.size,
                mem.page_size,
                if mem.readonly { "r" } else { "rw" }
            )?;
        }
        Ok(())
    }
}
