//! Hex and ASCII rendering of memory contents

use std::fmt::Write as _;
use std::io::{self, Write};

use crate::token::is_space;

/// Bytes per line
pub const LINE_LEN: usize = 16;

/// Width of the hex column
const HEX_WIDTH: usize = 48;

/// Hex column: pairs separated by spaces, extra space after the 8th byte
pub fn hex_line(data: &[u8]) -> String {
    let mut line = String::with_capacity(HEX_WIDTH + 2);
    for (i, b) in data.iter().take(LINE_LEN).enumerate() {
        if i > 0 && i % 8 == 0 {
            line.push(' ');
        }
        let _ = write!(line, "{:02x}", b);
        if i < LINE_LEN - 1 {
            line.push(' ');
        }
    }
    while line.len() < HEX_WIDTH {
        line.push(' ');
    }
    line
}

/// ASCII column: printable characters as-is, whitespace as space, the rest
/// as `.`
pub fn ascii_line(data: &[u8]) -> String {
    let mut line: String = data
        .iter()
        .take(LINE_LEN)
        .map(|&b| {
            if b.is_ascii_graphic() {
                b as char
            } else if is_space(b) {
                ' '
            } else {
                '.'
            }
        })
        .collect();
    while line.len() < LINE_LEN {
        line.push(' ');
    }
    line
}

/// Write `data` as a table, one line per 16 bytes, addresses from `start`
pub fn hexdump(out: &mut dyn Write, start: u32, data: &[u8]) -> io::Result<()> {
    let mut addr = start;
    for chunk in data.chunks(LINE_LEN) {
        writeln!(
            out,
            "{:04x}  {}  |{}|",
            addr,
            hex_line(chunk),
            ascii_line(chunk)
        )?;
        addr = addr.wrapping_add(chunk.len() as u32);
    }
    Ok(())
}
