//! `dump` / `read`: show memory contents

use std::io::Write;

use avrterm_core::Error;

use crate::command::Flow;
use crate::error::TermError;
use crate::hexdump::hexdump;
use crate::number::{parse_long, parse_ulong};
use crate::session::{Session, DEFAULT_DUMP_LEN};

fn usage(cmd: &str) -> TermError {
    TermError::Usage(format!(
        "Usage: {0} <memtype> [<start addr> <len>]\n       \
         {0} <memtype> [<start addr> <...>]\n       \
         {0} <memtype> <...>\n       \
         {0} <memtype>",
        cmd
    ))
}

/// Show memory contents
///
/// `dump <mem>` shows 256 bytes after the previous dump of the same memory
/// (wrapping to 0 at the end) and starts at 0 on a different memory.
/// `<addr>` and `<len>` override the cursor; a trailing `...` reads to the
/// end of the memory, from `<addr>` or from 0 when `...` is the address.
pub(crate) fn dump(s: &mut Session<'_>, args: &[&str]) -> Result<Flow, TermError> {
    if args.len() < 2 || args.len() > 4 {
        return Err(usage(args[0]));
    }

    let part = s.part;
    let mem = s.memory(args[1])?;
    let size = mem.size;
    let to_end = args.len() >= 3 && args[args.len() - 1] == "...";

    let mut addr = s.cursor.addr;
    let mut len = DEFAULT_DUMP_LEN;

    if args.len() == 2 {
        if s.cursor.memory.as_deref() != Some(mem.name.as_str()) || addr >= size {
            addr = 0;
        }
    } else {
        if args[2] == "..." {
            if args.len() == 4 && !to_end {
                return Err(usage(args[0]));
            }
            addr = 0;
        } else {
            let a = parse_ulong(args[2]).ok_or_else(|| TermError::parse("address", args[2]))?;
            if a >= size as u64 {
                return Err(TermError::AddressOutOfRange {
                    addr: a,
                    memory: mem.name.clone(),
                });
            }
            addr = a as u32;
        }

        if to_end {
            len = size.saturating_sub(addr);
        } else if args.len() == 4 {
            let l = parse_long(args[3]).ok_or_else(|| TermError::parse("length", args[3]))?;
            len = u32::try_from(l).map_err(|_| TermError::parse("length", args[3]))?;
        }
    }
    s.cursor.memory = Some(mem.name.clone());

    let count = len.min(size.saturating_sub(addr)) as usize;
    let mut buf: Vec<u8> = Vec::new();
    buf.try_reserve_exact(count)
        .map_err(|_| TermError::OutOfMemory {
            what: "dump buffer",
        })?;

    s.progress.report(0, 1, Some("Reading"));
    for i in 0..count {
        let at = addr + i as u32;
        match s.pgm.read_byte(part, mem, at) {
            Ok(b) => buf.push(b),
            Err(e) => {
                s.progress.report(1, 1, None);
                if e == Error::NotSupported {
                    log::error!(
                        "read operation not supported on memory type \"{}\"",
                        mem.name
                    );
                }
                return Err(TermError::Device {
                    what: format!(
                        "error reading {} address 0x{:05x} of part {}",
                        mem.name, at, part.desc
                    ),
                    source: e,
                });
            }
        }
        s.progress.report(i, count, None);
    }
    s.progress.report(1, 1, None);

    hexdump(&mut *s.out, addr, &buf)?;
    writeln!(s.out)?;

    s.cursor.addr = addr + count as u32;
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use crate::command::Flow;
    use crate::error::TermError;
    use crate::test_support::{output, part, session};
    use avrterm_core::part::{Memory, Part};
    use avrterm_dummy::{DummyConfig, DummyProgrammer};

    #[test]
    fn test_dump_continues_and_resets() {
        let part = part();
        let mut pgm = DummyProgrammer::new_default(&part);
        let mut out = Vec::new();
        let mut s = session(&mut pgm, &part, &mut out);

        s.execute("dump flash").unwrap();
        assert_eq!(s.cursor().addr, 256);
        s.execute("dump flash").unwrap();
        assert_eq!(s.cursor().addr, 512);

        s.execute("dump flash 0").unwrap();
        assert_eq!(s.cursor().addr, 256);

        // another memory starts over
        s.execute("dump eeprom").unwrap();
        assert_eq!(s.cursor().memory.as_deref(), Some("eeprom"));
        assert_eq!(s.cursor().addr, 256);
    }

    #[test]
    fn test_bare_dump_uses_default_length() {
        let part = part();
        let mut pgm = DummyProgrammer::new_default(&part);
        let mut out = Vec::new();
        let mut s = session(&mut pgm, &part, &mut out);

        s.execute("dump flash 0 16").unwrap();
        assert_eq!(s.cursor().addr, 0x10);
        s.execute("dump flash").unwrap();
        assert_eq!(s.cursor().addr, 0x110);
    }

    #[test]
    fn test_ellipsis_address_ignores_other_memory_cursor() {
        let part = part();
        let mut pgm = DummyProgrammer::new_default(&part);
        let mut out = Vec::new();
        {
            let mut s = session(&mut pgm, &part, &mut out);
            s.execute("dump flash 0x2000").unwrap();
            assert_eq!(s.cursor().addr, 0x2100);

            assert!(matches!(
                s.execute("dump eeprom ... 5"),
                Err(TermError::Usage(_))
            ));

            s.execute("dump eeprom ... ...").unwrap();
            assert_eq!(s.cursor().memory.as_deref(), Some("eeprom"));
            assert_eq!(s.cursor().addr, 1024);
        }
        let text = output(&out);
        assert!(text.contains("\n0000  ff"));
        assert!(text.contains("\n03f0  ff"));
    }

    #[test]
    fn test_dump_output_format() {
        let part = part();
        let mut pgm = DummyProgrammer::new_default(&part);
        pgm.load("eeprom", 0x10, b"Hello");
        let mut out = Vec::new();
        {
            let mut s = session(&mut pgm, &part, &mut out);
            s.execute("dump eeprom 0x10 5").unwrap();
        }
        assert_eq!(
            output(&out),
            format!(
                ">>> dump eeprom 0x10 5 \n0010  48 65 6c 6c 6f {}  |Hello           |\n\n",
                " ".repeat(33)
            )
        );
    }

    #[test]
    fn test_dump_trims_and_wraps() {
        let part = part();
        let mut pgm = DummyProgrammer::new_default(&part);
        let mut out = Vec::new();
        let mut s = session(&mut pgm, &part, &mut out);

        s.execute("dump eeprom 1000").unwrap();
        assert_eq!(s.cursor().addr, 1024);

        // cursor at the end wraps to the start
        s.execute("dump eeprom").unwrap();
        assert_eq!(s.cursor().addr, 256);
    }

    #[test]
    fn test_dump_to_end() {
        let part = part();
        let mut pgm = DummyProgrammer::new_default(&part);
        let mut out = Vec::new();
        {
            let mut s = session(&mut pgm, &part, &mut out);
            s.execute("dump eeprom 0x3f0 ...").unwrap();
            assert_eq!(s.cursor().addr, 1024);
            s.execute("read ee ...").unwrap();
            assert_eq!(s.cursor().addr, 1024);
        }
        let text = output(&out);
        assert!(text.contains("03f0  ff"));
        assert_eq!(text.lines().filter(|l| l.starts_with("03f0")).count(), 2);
    }

    #[test]
    fn test_dump_errors() {
        let part = part();
        let mut pgm = DummyProgrammer::new_default(&part);
        let mut out = Vec::new();
        let mut s = session(&mut pgm, &part, &mut out);

        assert!(matches!(s.execute("dump"), Err(TermError::Usage(_))));
        assert!(matches!(
            s.execute("dump flash 0 1 2"),
            Err(TermError::Usage(_))
        ));
        assert!(matches!(
            s.execute("dump nvm"),
            Err(TermError::UnknownMemory { .. })
        ));
        assert!(matches!(
            s.execute("dump eeprom 1024"),
            Err(TermError::AddressOutOfRange { addr: 1024, .. })
        ));
        assert!(matches!(
            s.execute("dump eeprom zero"),
            Err(TermError::Parse { what: "address", .. })
        ));
        assert!(matches!(
            s.execute("dump eeprom 0 -1"),
            Err(TermError::Parse { what: "length", .. })
        ));
    }

    #[test]
    fn test_dump_read_failure() {
        let part = part().with_memory(Memory::new("usersig", 32));
        let mut pgm = DummyProgrammer::new(&Part::new("x", "X", [0; 3]), DummyConfig::default());
        let mut out = Vec::new();
        let mut s = session(&mut pgm, &part, &mut out);

        let err = s.execute("dump usersig").unwrap_err();
        assert!(matches!(err, TermError::Device { .. }));
        assert_eq!(
            err.to_string(),
            "error reading usersig address 0x00000 of part ATmega328P: operation not supported"
        );
        assert_eq!(s.execute("dump flash 0 0").unwrap(), Flow::Continue);
    }

    #[test]
    fn test_dump_reports_failing_address() {
        let part = part();
        let mut pgm = DummyProgrammer::new_default(&part);
        pgm.fail_read_at("eeprom", 0x12);
        let mut out = Vec::new();
        let mut s = session(&mut pgm, &part, &mut out);

        let err = s.execute("dump eeprom 0x10 8").unwrap_err();
        assert_eq!(
            err.to_string(),
            "error reading eeprom address 0x00012 of part ATmega328P: read operation failed"
        );
        assert_eq!(err.code(), -1);
    }
}
