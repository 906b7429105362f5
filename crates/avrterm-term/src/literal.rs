//! Data literals of the `write` command
//!
//! Each argument becomes one [`Literal`]: an integer with an inferred or
//! suffix-selected width, a 32-bit float (`F` suffix), a 64-bit double, or a
//! C-style quoted string or character. Literals encode little-endian.

use crate::error::TermError;
use crate::number::{scan_f32, scan_f64, scan_uint};

/// Integer width in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IntSize {
    /// 8 bits
    Char = 1,
    /// 16 bits
    Short = 2,
    /// 32 bits
    Long = 4,
    /// 64 bits
    LongLong = 8,
}

impl IntSize {
    /// Width in bytes
    pub fn bytes(self) -> usize {
        self as usize
    }

    /// Width in bits
    pub fn bits(self) -> usize {
        self.bytes() * 8
    }

    fn for_signed(value: i64) -> Self {
        if i8::try_from(value).is_ok() {
            IntSize::Char
        } else if i16::try_from(value).is_ok() {
            IntSize::Short
        } else if i32::try_from(value).is_ok() {
            IntSize::Long
        } else {
            IntSize::LongLong
        }
    }

    fn for_unsigned(value: u64) -> Self {
        if value <= u8::MAX as u64 {
            IntSize::Char
        } else if value <= u16::MAX as u64 {
            IntSize::Short
        } else if value <= u32::MAX as u64 {
            IntSize::Long
        } else {
            IntSize::LongLong
        }
    }

    fn for_hex_digits(digits: usize) -> Self {
        match digits {
            0..=2 => IntSize::Char,
            3..=4 => IntSize::Short,
            5..=8 => IntSize::Long,
            _ => IntSize::LongLong,
        }
    }
}

/// One parsed `write` argument
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Integer; `value` holds the two's complement bits
    Int {
        /// Inferred or suffix-selected width
        size: IntSize,
        /// Value
        value: i64,
    },
    /// 32-bit float
    Float32(f32),
    /// 64-bit double
    Float64(f64),
    /// Decoded contents of a double-quoted string
    Text(Vec<u8>),
}

impl Literal {
    /// Parse one argument
    ///
    /// Integers are tried first, then floats with an `F` suffix, then
    /// doubles, then quoted strings and characters.
    pub fn parse(arg: &str) -> Result<Self, TermError> {
        parse_int(arg)
            .or_else(|| parse_float(arg))
            .or_else(|| parse_double(arg))
            .or_else(|| parse_quoted(arg))
            .ok_or_else(|| TermError::parse("data", arg))
    }

    /// Number of bytes [`Literal::encode`] appends
    ///
    /// For integers this follows the magnitude as well as the width: a value
    /// that needs more bytes than its width still gets them.
    pub fn encoded_len(&self) -> usize {
        match self {
            Literal::Int { size, value } => {
                let magnitude = value.unsigned_abs();
                let width = size.bytes();
                if magnitude > 0xFFFF_FFFF || width == 8 {
                    8
                } else if magnitude > 0xFFFF || width >= 4 {
                    4
                } else if magnitude > 0xFF || width >= 2 {
                    2
                } else {
                    1
                }
            }
            Literal::Float32(_) => 4,
            Literal::Float64(_) => 8,
            Literal::Text(text) => text_len(text) + 1,
        }
    }

    /// Append the little-endian encoding to `out`
    ///
    /// Strings end at their first NUL and are written NUL-terminated.
    pub fn encode(&self, out: &mut Vec<u8>) {
        match self {
            Literal::Int { value, .. } => {
                out.extend_from_slice(&value.to_le_bytes()[..self.encoded_len()])
            }
            Literal::Float32(f) => out.extend_from_slice(&f.to_le_bytes()),
            Literal::Float64(d) => out.extend_from_slice(&d.to_le_bytes()),
            Literal::Text(text) => {
                out.extend_from_slice(&text[..text_len(text)]);
                out.push(0);
            }
        }
    }
}

fn text_len(text: &[u8]) -> usize {
    text.iter().position(|&b| b == 0).unwrap_or(text.len())
}

fn parse_int(arg: &str) -> Option<Literal> {
    let scan = scan_uint(arg, 0)?;
    if scan.overflow {
        return None;
    }

    let suffix = &arg.as_bytes()[scan.end..];
    let (mut nu, mut nl, mut nh, mut ns) = (0, 0, 0, 0);
    for b in suffix {
        match b.to_ascii_uppercase() {
            b'U' => nu += 1,
            b'L' => nl += 1,
            b'H' => nh += 1,
            b'S' => ns += 1,
            _ => return None,
        }
    }
    if nu > 1 || nl > 2 || nh > 2 || ns > 1 {
        return None;
    }
    let is_u = |b: Option<&u8>| b.is_some_and(|b| b.to_ascii_uppercase() == b'U');
    if nu == 1 && !is_u(suffix.first()) && !is_u(suffix.last()) {
        return None;
    }

    let bytes = arg.as_bytes();
    // ordinary hex has no sign in front of the 0x
    let is_hex = bytes.len() >= 2 && bytes[0] == b'0' && (bytes[1] | 0x20) == b'x';
    let is_signed = nu == 0 && !is_hex;
    let outside_i64 = is_signed && !scan.fits_i64();

    let mut value = scan.as_i64();
    let mut truncated = false;
    let size = match (nl, nh, ns) {
        (0, 0, 0) if is_hex => IntSize::for_hex_digits(scan.digits),
        (0, 0, 0) if outside_i64 => IntSize::LongLong,
        (0, 0, 0) if is_signed => IntSize::for_signed(value),
        (0, 0, 0) => IntSize::for_unsigned(scan.value),
        (0, 2, 0) => {
            if outside_i64 || (is_signed && i8::try_from(value).is_err()) {
                truncated = true;
                value = value as i8 as i64;
            }
            IntSize::Char
        }
        (0, 1, 0) | (0, 0, 1) => {
            if outside_i64 || (is_signed && i16::try_from(value).is_err()) {
                truncated = true;
                value = value as i16 as i64;
            }
            IntSize::Short
        }
        (1, 0, 0) => {
            if outside_i64 || (is_signed && i32::try_from(value).is_err()) {
                truncated = true;
                value = value as i32 as i64;
            }
            IntSize::Long
        }
        (2, 0, 0) => IntSize::LongLong,
        _ => return None,
    };

    if outside_i64 || truncated {
        log::warn!(
            "{} out of int{}_t range, interpreted as {}-byte {}{}; consider 'U' suffix",
            arg,
            size.bits(),
            size.bytes(),
            value,
            if truncated {
                " (unlikely what you want)"
            } else {
                ""
            }
        );
    }

    Some(Literal::Int { size, value })
}

fn parse_float(arg: &str) -> Option<Literal> {
    let (value, end) = scan_f32(arg)?;
    match &arg.as_bytes()[end..] {
        [b'f' | b'F'] => Some(Literal::Float32(value)),
        _ => None,
    }
}

fn parse_double(arg: &str) -> Option<Literal> {
    let (value, end) = scan_f64(arg)?;
    (end == arg.len()).then_some(Literal::Float64(value))
}

/// A char literal that decodes to more than one C character; the text ends
/// at the first NUL
fn has_extra_chars(text: &[u8]) -> bool {
    text.first().is_some_and(|&b| b != 0) && text.get(1).is_some_and(|&b| b != 0)
}

fn parse_quoted(arg: &str) -> Option<Literal> {
    let bytes = arg.as_bytes();
    if bytes.len() < 2 {
        return None;
    }
    let quote = bytes[0];
    if (quote != b'\'' && quote != b'"') || bytes[bytes.len() - 1] != quote {
        return None;
    }

    let text = unescape(&bytes[1..bytes.len() - 1]);
    if quote == b'"' {
        return Some(Literal::Text(text));
    }

    if has_extra_chars(&text) {
        log::warn!("only using first character of {}", arg);
    }
    let first = text.first().copied().unwrap_or(0);
    Some(Literal::Int {
        size: IntSize::Char,
        value: first as i8 as i64,
    })
}

fn hex_digits_value(digits: &[u8]) -> u32 {
    digits.iter().fold(0u32, |acc, &b| {
        acc.wrapping_mul(16)
            .wrapping_add((b as char).to_digit(16).unwrap_or(0))
    })
}

fn count_hex_digits(s: &[u8], max: usize) -> usize {
    s.iter().take(max).take_while(|b| b.is_ascii_hexdigit()).count()
}

/// Encode a code point as UTF-8, permitting surrogates and values up to
/// 31 bits with the historic 5- and 6-byte forms
fn push_utf8(out: &mut Vec<u8>, wc: u32) {
    let cont = |shift: u32| (((wc >> shift) & 0x3f) | 0x80) as u8;
    if wc < 0x80 {
        out.push(wc as u8);
    } else if wc < 0x800 {
        out.extend_from_slice(&[((wc >> 6) | 0xc0) as u8, cont(0)]);
    } else if wc < 0x1_0000 {
        out.extend_from_slice(&[((wc >> 12) | 0xe0) as u8, cont(6), cont(0)]);
    } else if wc < 0x20_0000 {
        out.extend_from_slice(&[((wc >> 18) | 0xf0) as u8, cont(12), cont(6), cont(0)]);
    } else if wc < 0x400_0000 {
        out.extend_from_slice(&[
            ((wc >> 24) | 0xf8) as u8,
            cont(18),
            cont(12),
            cont(6),
            cont(0),
        ]);
    } else {
        out.extend_from_slice(&[
            ((wc >> 30) | 0xfc) as u8,
            cont(24),
            cont(18),
            cont(12),
            cont(6),
            cont(0),
        ]);
    }
}

/// Decode C escape sequences
///
/// Unknown escapes are kept as written, backslash included.
pub fn unescape(s: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    let mut i = 0;

    while i < s.len() {
        if s[i] != b'\\' {
            out.push(s[i]);
            i += 1;
            continue;
        }

        let Some(&c) = s.get(i + 1) else {
            out.push(b'\\');
            break;
        };
        i += 2;

        match c {
            b'n' => out.push(b'\n'),
            b't' => out.push(b'\t'),
            b'a' => out.push(0x07),
            b'b' => out.push(0x08),
            b'e' => out.push(0x1b),
            b'f' => out.push(0x0c),
            b'r' => out.push(b'\r'),
            b'v' => out.push(0x0b),
            b'?' | b'`' | b'"' | b'\'' | b'\\' => out.push(c),
            b'0'..=b'7' => {
                let mut n = (c - b'0') as u32;
                let mut k = 0;
                while k < 2 && i < s.len() && (b'0'..=b'7').contains(&s[i]) {
                    n = n * 8 + (s[i] - b'0') as u32;
                    i += 1;
                    k += 1;
                }
                out.push(n as u8);
            }
            b'x' => {
                let k = count_hex_digits(&s[i..], usize::MAX);
                if k > 0 {
                    out.push(hex_digits_value(&s[i..i + k]) as u8);
                    i += k;
                } else {
                    out.extend_from_slice(b"\\x");
                }
            }
            b'u' | b'U' => {
                let want = if c == b'u' { 4 } else { 6 };
                if count_hex_digits(&s[i..], want) == want {
                    push_utf8(&mut out, hex_digits_value(&s[i..i + want]));
                    i += want;
                } else {
                    out.extend_from_slice(&[b'\\', c]);
                }
            }
            _ => out.extend_from_slice(&[b'\\', c]),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(arg: &str) -> Vec<u8> {
        let mut out = Vec::new();
        Literal::parse(arg).unwrap().encode(&mut out);
        out
    }

    fn int(arg: &str) -> (IntSize, i64) {
        match Literal::parse(arg).unwrap() {
            Literal::Int { size, value } => (size, value),
            other => panic!("{} parsed as {:?}", arg, other),
        }
    }

    #[test]
    fn test_hex_width_from_digits() {
        assert_eq!(bytes("0x1"), [0x01]);
        assert_eq!(bytes("0x1234"), [0x34, 0x12]);
        assert_eq!(bytes("0x0001"), [0x01, 0x00]);
        assert_eq!(bytes("0x12345"), [0x45, 0x23, 0x01, 0x00]);
        assert_eq!(bytes("0xFF"), [0xFF]);
        assert_eq!(int("0xFF"), (IntSize::Char, 255));
    }

    #[test]
    fn test_decimal_width_from_range() {
        assert_eq!(bytes("65"), [0x41]);
        assert_eq!(bytes("256"), [0x00, 0x01]);
        assert_eq!(bytes("-1"), [0xFF]);
        assert_eq!(int("-128"), (IntSize::Char, -128));
        assert_eq!(int("128"), (IntSize::Short, 128));
        assert_eq!(int("200U"), (IntSize::Char, 200));
        assert_eq!(int("70000"), (IntSize::Long, 70000));
        assert_eq!(bytes("-0x10"), [0xF0]);
    }

    #[test]
    fn test_size_suffixes() {
        assert_eq!(bytes("300L"), [0x2C, 0x01, 0x00, 0x00]);
        assert_eq!(bytes("1LL").len(), 8);
        assert_eq!(bytes("1s"), [0x01, 0x00]);
        assert_eq!(bytes("1h"), [0x01, 0x00]);
        assert_eq!(bytes("7hh"), [0x07]);
        assert_eq!(bytes("1UL"), [0x01, 0x00, 0x00, 0x00]);
        assert_eq!(bytes("1LU"), [0x01, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_signed_suffix_truncates() {
        assert_eq!(int("300HH"), (IntSize::Char, 44));
        assert_eq!(int("-40000H"), (IntSize::Short, 25536));
        assert_eq!(int("0x100000000L"), (IntSize::Long, 0x1_0000_0000));
    }

    #[test]
    fn test_magnitude_drives_emitted_bytes() {
        // unsigned hex keeps its value, so its magnitude needs two bytes
        assert_eq!(bytes("0x1FFHH"), [0xFF, 0x01]);
        // 0xFFFFFFFFFFFFFFFF has magnitude 1 but width 8
        assert_eq!(bytes("0xFFFFFFFFFFFFFFFF"), [0xFF; 8]);
    }

    #[test]
    fn test_invalid_suffixes_fall_through() {
        assert!(Literal::parse("1ULU").is_err());
        assert!(Literal::parse("1LUL").is_err());
        assert!(Literal::parse("1HL").is_err());
        assert!(Literal::parse("1LLL").is_err());
        assert!(Literal::parse("0x").is_err());
        assert!(Literal::parse("18446744073709551616U").is_err());
    }

    #[test]
    fn test_unsigned_wrap_of_negative() {
        // -1U is 2^64-1 and needs the full width
        assert_eq!(bytes("-1U"), [0xFF; 8]);
        assert_eq!(int("9223372036854775808"), (IntSize::LongLong, i64::MIN));
    }

    #[test]
    fn test_floats() {
        assert_eq!(Literal::parse("1.5F").unwrap(), Literal::Float32(1.5));
        assert_eq!(bytes("1.5f"), 1.5f32.to_le_bytes());
        assert_eq!(Literal::parse("1.5").unwrap(), Literal::Float64(1.5));
        assert_eq!(bytes("0x1.8p0F"), 1.5f32.to_le_bytes());
        // trailing F is a hex digit here, so this is a double
        assert!(matches!(Literal::parse("0x1.8F").unwrap(), Literal::Float64(_)));
        assert!(matches!(Literal::parse("08").unwrap(), Literal::Float64(d) if d == 8.0));
        assert!(Literal::parse("1.5x").is_err());
    }

    #[test]
    fn test_strings_and_chars() {
        assert_eq!(bytes("\"hi\""), [b'h', b'i', 0]);
        assert_eq!(bytes("\"\""), [0]);
        assert_eq!(bytes("\"a\\0b\""), [b'a', 0]);
        assert_eq!(bytes("'A'"), [0x41]);
        assert_eq!(bytes("'\\n'"), [0x0a]);
        assert_eq!(int("'\\xff'"), (IntSize::Char, -1));
        assert_eq!(bytes("'ab'"), [b'a']);
        assert!(Literal::parse("\"open").is_err());
        assert!(Literal::parse("'").is_err());
    }

    #[test]
    fn test_char_extra_characters() {
        assert!(has_extra_chars(b"ab"));
        assert!(!has_extra_chars(b"a"));
        assert!(!has_extra_chars(b"a\0b"));
        assert!(!has_extra_chars(b"\0b"));
        assert!(!has_extra_chars(b""));
        assert_eq!(bytes("'a\\0b'"), [b'a']);
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(b"a\\tb"), b"a\tb");
        assert_eq!(unescape(b"\\e\\?\\`"), [0x1b, b'?', b'`']);
        assert_eq!(unescape(b"\\101\\7"), [b'A', 7]);
        assert_eq!(unescape(b"\\x41\\x"), b"A\\x");
        assert_eq!(unescape(b"\\x1234"), [0x34]);
        assert_eq!(unescape(b"\\u00e9"), "é".as_bytes());
        assert_eq!(unescape(b"\\U01F600"), "😀".as_bytes());
        assert_eq!(unescape(b"\\u12"), b"\\u12");
        assert_eq!(unescape(b"\\q"), b"\\q");
        assert_eq!(unescape(b"end\\"), b"end\\");
    }
}
