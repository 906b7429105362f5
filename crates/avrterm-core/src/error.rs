//! Error types for avrterm-core
//!
//! This module provides a no_std compatible error type returned by every
//! programmer primitive.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Operation is not supported by the programmer or on this memory type
    NotSupported,

    // Byte access errors
    /// Reading a memory cell failed
    ReadFailed,
    /// Writing a memory cell failed
    WriteFailed,
    /// Address is beyond the end of the memory
    AddressOutOfBounds,

    // Programmer errors
    /// A raw command or transfer was not accepted
    CommandFailed,
    /// The programmer refused a pin or parameter setting
    Rejected,
    /// Programmer is not ready (not initialized or busy)
    ProgrammerNotReady,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSupported => write!(f, "operation not supported"),
            Self::ReadFailed => write!(f, "read operation failed"),
            Self::WriteFailed => write!(f, "write operation failed"),
            Self::AddressOutOfBounds => write!(f, "address out of bounds"),
            Self::CommandFailed => write!(f, "command failed"),
            Self::Rejected => write!(f, "setting rejected by programmer"),
            Self::ProgrammerNotReady => write!(f, "programmer not ready"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
