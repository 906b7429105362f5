//! `write`: encode data literals and write them with verification

use avrterm_core::Error;

use crate::command::Flow;
use crate::error::TermError;
use crate::literal::Literal;
use crate::number::parse_ulong;
use crate::session::Session;

const WRITE_USAGE: &str = "\
Usage: write <memory> <addr> <data>[,] {<data>[,]}
       write <memory> <addr> <len> <data>[,] {<data>[,]} ...

Ellipsis ... writes <len> bytes padded by repeating the last <data> item.

<data> can be hexadecimal, octal or decimal integers, double, float or
C-style strings and chars. For numbers, an optional case-insensitive suffix
specifies the data size: HH: 8 bit, H/S: 16 bit, L: 32 bit, LL: 64 bit, F:
32-bit float. Hexadecimal floating point notation is supported. The
ambiguous trailing F in 0x1.8F makes the number be interpreted as double;
use a zero exponent as in 0x1.8p0F to denote a hexadecimal float.

An optional U suffix makes a number unsigned. Ordinary 0x hex numbers are
always treated as unsigned. +0x or -0x hex numbers are treated as signed
unless they have a U suffix. Unsigned integers cannot be larger than 2^64-1.
If n is an unsigned integer then -n is also a valid unsigned integer as in C.
Signed integers must fall into the [-2^63, 2^63-1] range or a correspondingly
smaller range when a suffix specifies a smaller type. Out of range signed
numbers trigger a warning.

Ordinary 0x hex numbers with n hex digits (counting leading zeros) use
the smallest size of 1, 2, 4 and 8 bytes that can accommodate any n-digit hex
number. If a suffix specifies a size explicitly the corresponding number of
least significant bytes are written. Otherwise, signed and unsigned integers
alike occupy the smallest of 1, 2, 4, or 8 bytes needed to accommodate them
in their respective representation.
Strings are written with their terminating NUL byte.";

/// A single trailing comma is dropped so pasted lists work
fn strip_comma(arg: &str) -> &str {
    arg.strip_suffix(',').unwrap_or(arg)
}

fn reserve(len: usize) -> Result<Vec<u8>, TermError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| TermError::OutOfMemory {
            what: "write buffer",
        })?;
    Ok(buf)
}

/// Lay out the bytes of a fill-mode write: the items in order, the last one
/// repeated, cut to exactly `len` bytes
fn fill(literals: &[Literal], len: usize) -> Result<Vec<u8>, TermError> {
    let mut buf = reserve(len)?;
    for lit in literals {
        if buf.len() >= len {
            break;
        }
        lit.encode(&mut buf);
    }
    if let Some(last) = literals.last() {
        while buf.len() < len {
            last.encode(&mut buf);
        }
    }
    buf.truncate(len);
    Ok(buf)
}

/// Write data to a memory
///
/// Every byte is written and read back. A failing byte lights the error LED
/// and is reported, but the remaining bytes are still written.
pub(crate) fn write(s: &mut Session<'_>, args: &[&str]) -> Result<Flow, TermError> {
    if args.len() < 4 {
        return Err(TermError::Usage(WRITE_USAGE.to_string()));
    }

    let part = s.part;
    let mem = s.memory(args[1])?;
    let size = mem.size as u64;

    let addr = parse_ulong(args[2]).ok_or_else(|| TermError::parse("address", args[2]))?;
    if addr > size {
        return Err(TermError::AddressOutOfRange {
            addr,
            memory: mem.name.clone(),
        });
    }

    let fill_len = if args[args.len() - 1] == "..." {
        let len = parse_ulong(args[3]).ok_or_else(|| TermError::parse("length", args[3]))?;
        if args.len() < 6 {
            return Err(TermError::Usage(
                "Usage: write <memory> <addr> <len> <data>[,] {<data>[,]} ...".to_string(),
            ));
        }
        if !u32::try_from(len).is_ok_and(|n| mem.contains(addr as u32, n)) {
            return Err(TermError::RangeExceeded {
                memory: mem.name.clone(),
            });
        }
        Some(len as usize)
    } else {
        None
    };

    let items = match fill_len {
        Some(_) => &args[4..args.len() - 1],
        None => &args[3..],
    };
    let literals = items
        .iter()
        .map(|arg| Literal::parse(strip_comma(arg)))
        .collect::<Result<Vec<_>, _>>()?;

    let buf = match fill_len {
        Some(len) => fill(&literals, len)?,
        None => {
            let total: usize = literals.iter().map(Literal::encoded_len).sum();
            if !u32::try_from(total).is_ok_and(|n| mem.contains(addr as u32, n)) {
                return Err(TermError::RangeExceeded {
                    memory: mem.name.clone(),
                });
            }
            let mut buf = reserve(total)?;
            for lit in &literals {
                lit.encode(&mut buf);
            }
            buf
        }
    };

    log::debug!(
        "Writing {} bytes starting from address 0x{:02x}{}",
        buf.len(),
        addr,
        match fill_len {
            Some(_) => format!(". Remaining space filled with {}", args[args.len() - 2]),
            None => String::new(),
        }
    );

    let addr = addr as u32;
    let total = buf.len();
    let mut failed = 0;

    s.err_led(false);
    s.progress.report(0, 1, Some("Writing"));
    for (i, &byte) in buf.iter().enumerate() {
        let at = addr + i as u32;
        let mut ok = true;

        if let Err(e) = s.pgm.write_byte(part, mem, at, byte) {
            log::error!("error writing 0x{:02x} at 0x{:05x}: {}", byte, at, e);
            if e == Error::NotSupported {
                log::error!(
                    "write operation not supported on memory type \"{}\"",
                    mem.name
                );
            }
            ok = false;
        }

        match s.pgm.read_byte(part, mem, at) {
            Ok(cell) if cell == byte => {}
            Ok(cell) => {
                log::error!(
                    "error writing 0x{:02x} at 0x{:05x} cell=0x{:02x}",
                    byte,
                    at,
                    cell
                );
                ok = false;
            }
            Err(e) => {
                log::error!("error verifying 0x{:02x} at 0x{:05x}: {}", byte, at, e);
                ok = false;
            }
        }

        if !ok {
            failed += 1;
            s.err_led(true);
        }
        s.progress.report(i, total, None);
    }
    s.progress.report(1, 1, None);

    if failed > 0 {
        return Err(TermError::Verify { failed, total });
    }
    Ok(Flow::Continue)
}
