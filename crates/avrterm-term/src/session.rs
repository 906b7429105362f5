//! Console session state

use std::io::{self, Write};

use avrterm_core::part::{Memory, Part};
use avrterm_core::programmer::{Programmer, ProgrammerFeatures};

use crate::command::{self, Flow};
use crate::error::TermError;
use crate::progress::{NoProgress, Progress};
use crate::token::{is_space, tokenize};

/// Bytes shown by `dump` when no length is given
pub const DEFAULT_DUMP_LEN: u32 = 256;

/// Where a bare `dump <memory>` continues
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpCursor {
    /// Memory of the previous dump
    pub memory: Option<String>,
    /// Next address to show
    pub addr: u32,
}

/// One console talking to one part through one programmer
pub struct Session<'a> {
    pub(crate) pgm: &'a mut dyn Programmer,
    pub(crate) part: &'a Part,
    pub(crate) out: &'a mut dyn Write,
    pub(crate) progress: Box<dyn Progress + 'a>,
    pub(crate) cursor: DumpCursor,
    pub(crate) spi_mode: bool,
    pub(crate) verbosity: u8,
}

impl<'a> Session<'a> {
    /// Create a session writing command output to `out`
    pub fn new(pgm: &'a mut dyn Programmer, part: &'a Part, out: &'a mut dyn Write) -> Self {
        Self {
            pgm,
            part,
            out,
            progress: Box::new(NoProgress),
            cursor: DumpCursor::default(),
            spi_mode: false,
            verbosity: 0,
        }
    }

    /// Use `progress` for read and write progress
    pub fn with_progress(mut self, progress: Box<dyn Progress + 'a>) -> Self {
        self.progress = progress;
        self
    }

    /// Start with verbosity `level` (as set by the command line)
    pub fn with_verbosity(mut self, level: u8) -> Self {
        self.verbosity = level;
        self
    }

    /// The part this session talks to
    pub fn part(&self) -> &'a Part {
        self.part
    }

    /// Whether `send` uses raw SPI transfers
    pub fn spi_mode(&self) -> bool {
        self.spi_mode
    }

    /// Current verbosity level
    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }

    /// Where the next bare `dump` continues
    pub fn cursor(&self) -> &DumpCursor {
        &self.cursor
    }

    /// Run one input line
    ///
    /// Blank lines and `#` comments do nothing. Other lines are echoed and
    /// dispatched.
    pub fn execute(&mut self, line: &str) -> Result<Flow, TermError> {
        let start = line
            .bytes()
            .position(|b| !is_space(b))
            .unwrap_or(line.len());
        let line = &line[start..];
        if line.is_empty() || line.starts_with('#') {
            return Ok(Flow::Continue);
        }

        let args = tokenize(line);
        write!(self.out, ">>> ")?;
        for arg in &args {
            write!(self.out, "{} ", arg)?;
        }
        writeln!(self.out)?;

        let argv: Vec<&str> = args.iter().map(String::as_str).collect();
        self.dispatch(&argv)
    }

    /// Run an already tokenized command
    pub fn dispatch(&mut self, args: &[&str]) -> Result<Flow, TermError> {
        let Some(name) = args.first() else {
            return Ok(Flow::Continue);
        };
        let cmd = command::lookup(name)?;
        log::trace!("running {} for {:?}", cmd.name, args);
        (cmd.handler)(self, args)
    }

    /// Flush command output
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Find a memory of the part by name or unique prefix
    pub(crate) fn memory(&self, name: &str) -> Result<&'a Memory, TermError> {
        let part: &'a Part = self.part;
        part.locate_memory(name)
            .ok_or_else(|| TermError::UnknownMemory {
                memory: name.to_string(),
                part: part.desc.clone(),
            })
    }

    pub(crate) fn unsupported(&self, what: &'static str) -> TermError {
        TermError::Unsupported {
            programmer: self.pgm.name().to_string(),
            what,
        }
    }

    /// Drive the error LED if the programmer has one
    pub(crate) fn err_led(&mut self, on: bool) {
        if self.pgm.features().contains(ProgrammerFeatures::ERR_LED) {
            self.pgm.err_led(on);
        }
    }

    /// Change the verbosity and the log level with it
    pub(crate) fn set_verbosity(&mut self, level: u8) {
        self.verbosity = level;
        log::set_max_level(match level {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        });
    }
}
