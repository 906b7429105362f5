//! Mode switching and console housekeeping commands

use std::io::Write;

use avrterm_core::programmer::{Pin, ProgrammerFeatures};

use crate::command::{Flow, COMMANDS};
use crate::error::TermError;
use crate::number::scan_uint;
use crate::session::Session;

fn require_pins(s: &Session<'_>) -> Result<(), TermError> {
    if s.pgm.features().contains(ProgrammerFeatures::SET_PIN) {
        Ok(())
    } else {
        Err(s.unsupported("does not support direct SPI mode"))
    }
}

/// Hold the target in reset and switch `send` to raw SPI transfers
pub(crate) fn spi(s: &mut Session<'_>, _args: &[&str]) -> Result<Flow, TermError> {
    require_pins(s)?;
    s.pgm.set_pin(Pin::Reset, true).map_err(|e| TermError::Device {
        what: "can't drive RESET high".to_string(),
        source: e,
    })?;
    s.spi_mode = true;
    Ok(Flow::Continue)
}

/// Release reset and re-enter programming mode
pub(crate) fn pgm(s: &mut Session<'_>, _args: &[&str]) -> Result<Flow, TermError> {
    require_pins(s)?;
    s.pgm.set_pin(Pin::Reset, false).map_err(|e| TermError::Device {
        what: "can't drive RESET low".to_string(),
        source: e,
    })?;
    s.spi_mode = false;
    s.pgm.initialize(s.part).map_err(|e| TermError::Device {
        what: "initialization failed".to_string(),
        source: e,
    })?;
    Ok(Flow::Continue)
}

/// Leave the console, returning to programming mode first if needed
pub(crate) fn quit(s: &mut Session<'_>, args: &[&str]) -> Result<Flow, TermError> {
    if s.spi_mode {
        if let Err(e) = pgm(s, args) {
            log::warn!("could not leave SPI mode: {}", e);
        }
    }
    Ok(Flow::Quit)
}

/// Show or change the verbosity level
pub(crate) fn verbose(s: &mut Session<'_>, args: &[&str]) -> Result<Flow, TermError> {
    match args.len() {
        1 => {
            writeln!(s.out, "Verbosity level: {}", s.verbosity)?;
            return Ok(Flow::Continue);
        }
        2 => {}
        _ => return Err(TermError::Usage("Usage: verbose [<value>]".to_string())),
    }

    let scan = scan_uint(args[1], 0).ok_or_else(|| TermError::parse("verbosity level", args[1]))?;
    if scan.negative && scan.magnitude != 0 {
        return Err(TermError::Usage(
            "verbosity level must be positive".to_string(),
        ));
    }
    let level = u8::try_from(scan.magnitude).unwrap_or(u8::MAX);
    s.set_verbosity(level);
    writeln!(s.out, "New verbosity level: {}", level)?;
    Ok(Flow::Continue)
}

/// List the commands
pub(crate) fn help(s: &mut Session<'_>, _args: &[&str]) -> Result<Flow, TermError> {
    writeln!(s.out, "Valid commands:")?;
    writeln!(s.out)?;
    for cmd in COMMANDS {
        writeln!(s.out, "  {:<6} : {}", cmd.name, cmd.help())?;
    }
    writeln!(s.out)?;
    writeln!(
        s.out,
        "Use the 'part' command to display valid memory types for use with the"
    )?;
    writeln!(s.out, "'dump' and 'write' commands.")?;
    writeln!(s.out)?;
    Ok(Flow::Continue)
}
