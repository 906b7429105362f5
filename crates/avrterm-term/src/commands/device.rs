//! Commands that pass straight through to the programmer

use std::io::Write;

use avrterm_core::programmer::ProgrammerFeatures;

use crate::command::Flow;
use crate::error::TermError;
use crate::number::{scan_f64, scan_uint};
use crate::session::Session;

/// Perform a chip erase
pub(crate) fn erase(s: &mut Session<'_>, _args: &[&str]) -> Result<Flow, TermError> {
    log::info!("erasing chip");
    s.pgm.chip_erase(s.part).map_err(|e| TermError::Device {
        what: "chip erase failed".to_string(),
        source: e,
    })?;
    Ok(Flow::Continue)
}

/// Read and print the signature bytes
pub(crate) fn sig(s: &mut Session<'_>, _args: &[&str]) -> Result<Flow, TermError> {
    let part = s.part;
    let Some(mem) = part.memory("signature") else {
        log::error!("signature data not defined for device \"{}\"", part.desc);
        return Ok(Flow::Continue);
    };

    let mut bytes = Vec::with_capacity(mem.size as usize);
    for addr in 0..mem.size {
        match s.pgm.read_byte(part, mem, addr) {
            Ok(b) => bytes.push(b),
            Err(e) => {
                log::error!("error reading signature data: {}", e);
                bytes.push(0xFF);
            }
        }
    }

    write!(s.out, "Device signature = 0x")?;
    for b in &bytes {
        write!(s.out, "{:02x}", b)?;
    }
    writeln!(s.out)?;
    writeln!(s.out)?;
    Ok(Flow::Continue)
}

/// Print part information
pub(crate) fn part(s: &mut Session<'_>, _args: &[&str]) -> Result<Flow, TermError> {
    writeln!(s.out)?;
    write!(s.out, "{}", s.part)?;
    writeln!(s.out)?;
    Ok(Flow::Continue)
}

/// Print the programmer's adjustable parameters
pub(crate) fn parms(s: &mut Session<'_>, _args: &[&str]) -> Result<Flow, TermError> {
    if !s.pgm.features().contains(ProgrammerFeatures::PARAMETERS) {
        return Err(s.unsupported("does not support adjustable parameters"));
    }
    let params = s.pgm.parameters().map_err(|e| TermError::Device {
        what: "can't read parameters".to_string(),
        source: e,
    })?;
    for p in &params {
        writeln!(s.out, "{}", p)?;
    }
    writeln!(s.out)?;
    Ok(Flow::Continue)
}

/// Parse a leading floating point number, ignoring trailing text
fn leading_f64(arg: &str) -> Option<(f64, &str)> {
    scan_f64(arg).map(|(v, end)| (v, &arg[end..]))
}

fn require(s: &Session<'_>, feature: ProgrammerFeatures, what: &'static str) -> Result<(), TermError> {
    if s.pgm.features().contains(feature) {
        Ok(())
    } else {
        Err(s.unsupported(what))
    }
}

/// Set the target supply voltage
pub(crate) fn vtarg(s: &mut Session<'_>, args: &[&str]) -> Result<Flow, TermError> {
    if args.len() != 2 {
        return Err(TermError::Usage("Usage: vtarg <value>".to_string()));
    }
    let (v, _) = leading_f64(args[1]).ok_or_else(|| TermError::parse("voltage", args[1]))?;
    require(s, ProgrammerFeatures::VTARGET, "cannot set V[target]")?;
    s.pgm.set_vtarget(v).map_err(|e| TermError::Rejected {
        what: "set V[target]",
        source: e,
    })?;
    Ok(Flow::Continue)
}

/// Set an analog reference voltage
pub(crate) fn varef(s: &mut Session<'_>, args: &[&str]) -> Result<Flow, TermError> {
    if args.len() != 2 && args.len() != 3 {
        return Err(TermError::Usage(
            "Usage: varef [channel] <value>".to_string(),
        ));
    }

    let mut channel = 0;
    if args.len() == 3 {
        channel = scan_uint(args[1], 10)
            .filter(|c| c.end == args[1].len() && !c.negative)
            .and_then(|c| u32::try_from(c.value).ok())
            .ok_or_else(|| TermError::parse("channel", args[1]))?;
    }
    let arg = args[args.len() - 1];
    let (v, _) = leading_f64(arg).ok_or_else(|| TermError::parse("voltage", arg))?;

    require(s, ProgrammerFeatures::VAREF, "cannot set V[aref]")?;
    s.pgm.set_varef(channel, v).map_err(|e| TermError::Rejected {
        what: "set V[aref]",
        source: e,
    })?;
    Ok(Flow::Continue)
}

/// Set the oscillator frequency; `off` stops it
pub(crate) fn fosc(s: &mut Session<'_>, args: &[&str]) -> Result<Flow, TermError> {
    if args.len() != 2 {
        return Err(TermError::Usage(
            "Usage: fosc <value>[M|k] | off".to_string(),
        ));
    }

    let hz = match leading_f64(args[1]) {
        Some((v, rest)) => match rest.bytes().next() {
            Some(b'M' | b'm') => v * 1e6,
            Some(b'k' | b'K') => v * 1e3,
            _ => v,
        },
        None if args[1] == "off" => 0.0,
        None => return Err(TermError::parse("frequency", args[1])),
    };

    require(s, ProgrammerFeatures::FOSC, "cannot set oscillator frequency")?;
    s.pgm.set_fosc(hz).map_err(|e| TermError::Rejected {
        what: "set oscillator frequency",
        source: e,
    })?;
    Ok(Flow::Continue)
}

/// Set the ISP clock period in microseconds
pub(crate) fn sck(s: &mut Session<'_>, args: &[&str]) -> Result<Flow, TermError> {
    if args.len() != 2 {
        return Err(TermError::Usage("Usage: sck <value>".to_string()));
    }
    let (us, _) = leading_f64(args[1]).ok_or_else(|| TermError::parse("period", args[1]))?;

    require(s, ProgrammerFeatures::SCK_PERIOD, "cannot set SCK period")?;
    s.pgm.set_sck_period(us * 1e-6).map_err(|e| TermError::Rejected {
        what: "set SCK period",
        source: e,
    })?;
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use crate::error::TermError;
    use crate::test_support::{output, part, session};
    use avrterm_core::part::Part;
    use avrterm_core::programmer::ProgrammerFeatures;
    use avrterm_dummy::{DummyConfig, DummyProgrammer};

    #[test]
    fn test_sig() {
        let part = part();
        let mut pgm = DummyProgrammer::new_default(&part);
        let mut out = Vec::new();
        {
            let mut s = session(&mut pgm, &part, &mut out);
            s.execute("sig").unwrap();
        }
        assert_eq!(output(&out), ">>> sig \nDevice signature = 0x1e950f\n\n");
    }

    #[test]
    fn test_sig_without_signature_memory() {
        let part = Part::new("x", "Unknown", [0; 3]);
        let mut pgm = DummyProgrammer::new_default(&part);
        let mut out = Vec::new();
        {
            let mut s = session(&mut pgm, &part, &mut out);
            s.execute("sig").unwrap();
        }
        assert_eq!(output(&out), ">>> sig \n");
    }

    #[test]
    fn test_part() {
        let part = part();
        let mut pgm = DummyProgrammer::new_default(&part);
        let mut out = Vec::new();
        {
            let mut s = session(&mut pgm, &part, &mut out);
            s.execute("part").unwrap();
        }
        let text = output(&out);
        assert!(text.contains("AVR Part                      : ATmega328P\n"));
        assert!(text.contains("  flash             32768        128  rw\n"));
        assert!(text.ends_with("r\n\n"));
    }

    #[test]
    fn test_erase() {
        let part = part();
        let mut pgm = DummyProgrammer::new_default(&part);
        pgm.load("flash", 0, &[1, 2, 3]);
        {
            let mut out = Vec::new();
            let mut s = session(&mut pgm, &part, &mut out);
            s.execute("erase").unwrap();
        }
        assert_eq!(&pgm.memory("flash").unwrap()[..3], &[0xFF; 3]);
    }

    #[test]
    fn test_parms() {
        let part = part();
        let mut pgm = DummyProgrammer::new_default(&part);
        let mut out = Vec::new();
        {
            let mut s = session(&mut pgm, &part, &mut out);
            s.execute("parms").unwrap();
        }
        let text = output(&out);
        assert!(text.contains("Vtarget       : 5 V\n"));
        assert!(text.contains("Varef 1       : 5 V\n"));
        assert!(text.contains("SCK period    : 1 us\n"));
    }

    #[test]
    fn test_analog_setters() {
        let part = part();
        let mut pgm = DummyProgrammer::new_default(&part);
        {
            let mut out = Vec::new();
            let mut s = session(&mut pgm, &part, &mut out);
            s.execute("vtarg 3.3V").unwrap();
            s.execute("varef 1 2.5").unwrap();
            s.execute("varef 1.25").unwrap();
            s.execute("fosc 8M").unwrap();
            s.execute("sck 10").unwrap();
        }
        let config = pgm.config();
        assert_eq!(config.vtarget, 3.3);
        assert_eq!(config.varef, [1.25, 2.5]);
        assert_eq!(config.fosc, 8e6);
        assert!((config.sck_period - 10e-6).abs() < 1e-12);
    }

    #[test]
    fn test_fosc_variants() {
        let part = part();
        let mut pgm = DummyProgrammer::new_default(&part);
        let mut out = Vec::new();
        let mut s = session(&mut pgm, &part, &mut out);
        s.execute("fosc 500k").unwrap();
        s.execute("fosc off").unwrap();
        assert!(matches!(
            s.execute("fosc fast"),
            Err(TermError::Parse { what: "frequency", .. })
        ));
        assert!(matches!(s.execute("fosc"), Err(TermError::Usage(_))));
    }

    #[test]
    fn test_setter_errors() {
        let part = part();
        let config = DummyConfig {
            features: ProgrammerFeatures::VTARGET,
            ..Default::default()
        };
        let mut pgm = DummyProgrammer::new(&part, config);
        let mut out = Vec::new();
        let mut s = session(&mut pgm, &part, &mut out);

        let err = s.execute("vtarg 12").unwrap_err();
        assert_eq!(err.code(), -3);
        assert_eq!(err.to_string(), "failed to set V[target] (setting rejected by programmer)");

        let err = s.execute("sck 1").unwrap_err();
        assert_eq!(err.code(), -2);
        assert_eq!(err.to_string(), "the dummy programmer cannot set SCK period");

        assert_eq!(s.execute("vtarg x").unwrap_err().code(), -1);
        assert_eq!(s.execute("varef x 1").unwrap_err().code(), -1);
        assert_eq!(s.execute("parms").unwrap_err().code(), -2);
    }
}
