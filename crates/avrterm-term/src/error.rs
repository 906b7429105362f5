//! Error types for the console

use avrterm_core::Error;
use thiserror::Error;

/// Errors a console command can end with
///
/// None of these end the console; the loop reports them and prompts again.
#[derive(Error, Debug)]
pub enum TermError {
    /// Wrong argument count; the message is the usage text
    #[error("{0}")]
    Usage(String),

    /// An argument could not be parsed
    #[error("can't parse {what} \"{input}\"")]
    Parse {
        /// What the argument was supposed to be
        what: &'static str,
        /// The argument as typed
        input: String,
    },

    /// The part has no memory of that name
    #[error("\"{memory}\" memory type not defined for part \"{part}\"")]
    UnknownMemory {
        /// Memory name as typed
        memory: String,
        /// Part description
        part: String,
    },

    /// A start address lies outside the memory
    #[error("address 0x{addr:05x} is out of range for {memory} memory")]
    AddressOutOfRange {
        /// Requested address
        addr: u64,
        /// Memory name
        memory: String,
    },

    /// Address plus length runs past the end of the memory
    #[error("selected address and # bytes exceed range for {memory} memory")]
    RangeExceeded {
        /// Memory name
        memory: String,
    },

    /// The programmer lacks an optional capability
    #[error("the {programmer} programmer {what}")]
    Unsupported {
        /// Programmer name
        programmer: String,
        /// What it cannot do
        what: &'static str,
    },

    /// The programmer refused a setting
    #[error("failed to {what} ({source})")]
    Rejected {
        /// The setting that was refused
        what: &'static str,
        /// Error from the programmer
        source: Error,
    },

    /// A device operation failed
    #[error("{what}: {source}")]
    Device {
        /// Operation and location
        what: String,
        /// Error from the programmer
        source: Error,
    },

    /// Some bytes of a write did not verify
    #[error("{failed} of {total} bytes failed to write or verify")]
    Verify {
        /// Number of failing bytes
        failed: usize,
        /// Number of bytes written
        total: usize,
    },

    /// The command abbreviation matches more than one command
    #[error("command \"{0}\" is ambiguous")]
    Ambiguous(String),

    /// No command matches
    #[error("invalid command \"{0}\"")]
    UnknownCommand(String),

    /// A buffer could not be allocated
    #[error("out of memory allocating {what}")]
    OutOfMemory {
        /// What the buffer was for
        what: &'static str,
    },

    /// I/O error writing output or reading a script
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Line editor failure
    #[error("line editor error: {0}")]
    Readline(String),
}

impl TermError {
    /// Legacy status code: `-2` missing capability, `-3` rejected setting,
    /// `-1` for everything else
    pub fn code(&self) -> i32 {
        match self {
            TermError::Unsupported { .. } => -2,
            TermError::Rejected { .. } => -3,
            _ => -1,
        }
    }

    pub(crate) fn parse(what: &'static str, input: &str) -> Self {
        TermError::Parse {
            what,
            input: input.to_string(),
        }
    }
}
