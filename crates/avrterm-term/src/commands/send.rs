//! `send`: raw ISP instructions and SPI transfers

use std::io::Write;

use avrterm_core::programmer::ProgrammerFeatures;

use crate::command::Flow;
use crate::error::TermError;
use crate::number::parse_ulong;
use crate::session::Session;

/// Send raw bytes to the target
///
/// In programming mode exactly four bytes form one ISP instruction; in SPI
/// mode one to four bytes are clocked out directly.
pub(crate) fn send(s: &mut Session<'_>, args: &[&str]) -> Result<Flow, TermError> {
    let features = s.pgm.features();
    if !features.contains(ProgrammerFeatures::ISP_COMMAND) {
        return Err(s.unsupported("does not support direct ISP commands"));
    }
    if s.spi_mode && !features.contains(ProgrammerFeatures::SPI) {
        return Err(s.unsupported("does not support direct SPI transfers"));
    }

    let n = args.len() - 1;
    if n > 4 || n == 0 || (n < 4 && !s.spi_mode) {
        return Err(TermError::Usage(
            if s.spi_mode {
                "Usage: send <byte1> [<byte2> [<byte3> [<byte4>]]]"
            } else {
                "Usage: send <byte1> <byte2> <byte3> <byte4>"
            }
            .to_string(),
        ));
    }

    let mut tx = [0u8; 4];
    for (slot, arg) in tx.iter_mut().zip(&args[1..]) {
        let value = parse_ulong(arg).ok_or_else(|| TermError::parse("byte", arg))?;
        *slot = u8::try_from(value)
            .map_err(|_| TermError::Usage(format!("byte \"{}\" does not fit into 8 bits", arg)))?;
    }

    s.err_led(false);

    let mut rx = [0u8; 4];
    if s.spi_mode {
        s.pgm
            .spi_transfer(&tx[..n], &mut rx[..n])
            .map_err(|e| TermError::Device {
                what: "SPI transfer failed".to_string(),
                source: e,
            })?;
    } else {
        rx = s.pgm.isp_command(tx).map_err(|e| TermError::Device {
            what: "ISP command failed".to_string(),
            source: e,
        })?;
    }

    write!(s.out, "results:")?;
    for b in &rx[..n] {
        write!(s.out, " {:02x}", b)?;
    }
    writeln!(s.out)?;
    writeln!(s.out)?;

    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use crate::error::TermError;
    use crate::test_support::{output, part, session};
    use avrterm_core::programmer::ProgrammerFeatures;
    use avrterm_dummy::{DummyConfig, DummyProgrammer};

    #[test]
    fn test_send_isp_instruction() {
        let part = part();
        let mut pgm = DummyProgrammer::new_default(&part);
        let mut out = Vec::new();
        {
            let mut s = session(&mut pgm, &part, &mut out);
            s.execute("send 0x30 0 1 0").unwrap();
        }
        assert_eq!(
            output(&out),
            ">>> send 0x30 0 1 0 \nresults: 00 30 00 95\n\n"
        );
    }

    #[test]
    fn test_send_needs_four_bytes_outside_spi_mode() {
        let part = part();
        let mut pgm = DummyProgrammer::new_default(&part);
        let mut out = Vec::new();
        let mut s = session(&mut pgm, &part, &mut out);
        assert!(matches!(s.execute("send 0x30 0 1"), Err(TermError::Usage(_))));
        assert!(matches!(
            s.execute("send 1 2 3 4 5"),
            Err(TermError::Usage(_))
        ));
        assert!(matches!(
            s.execute("send 0x130 0 0 0"),
            Err(TermError::Usage(_))
        ));
        assert!(matches!(
            s.execute("send x 0 0 0"),
            Err(TermError::Parse { what: "byte", .. })
        ));
    }

    #[test]
    fn test_send_in_spi_mode() {
        let part = part();
        let mut pgm = DummyProgrammer::new_default(&part);
        let mut out = Vec::new();
        {
            let mut s = session(&mut pgm, &part, &mut out);
            s.execute("spi").unwrap();
            s.execute("send 0x12 0x34").unwrap();
        }
        assert!(output(&out).contains("results: 00 12\n\n"));
    }

    #[test]
    fn test_send_without_capability() {
        let part = part();
        let config = DummyConfig {
            features: ProgrammerFeatures::all() - ProgrammerFeatures::ISP_COMMAND,
            ..Default::default()
        };
        let mut pgm = DummyProgrammer::new(&part, config);
        let mut out = Vec::new();
        let mut s = session(&mut pgm, &part, &mut out);
        let err = s.execute("send 1 2 3 4").unwrap_err();
        assert_eq!(err.code(), -2);
    }
}
