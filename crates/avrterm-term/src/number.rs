//! C-style number scanners
//!
//! The console accepts numbers the way the C library reads them: integers
//! with automatic base detection (`0x` hex, leading `0` octal), and floating
//! point numbers including hexadecimal floats and `inf`/`nan`. Scanners
//! report how much of the input they consumed so callers can inspect any
//! suffix.

use crate::token::is_space;

/// Result of scanning an unsigned integer prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UintScan {
    /// Value as an unsigned 64-bit number; negative input wraps
    pub value: u64,
    /// Magnitude before applying the sign
    pub magnitude: u64,
    /// A leading `-` was present
    pub negative: bool,
    /// Radix the digits were read in
    pub radix: u32,
    /// Number of digits read (after any `0x` prefix)
    pub digits: usize,
    /// The magnitude did not fit into 64 bits
    pub overflow: bool,
    /// Bytes consumed from the input
    pub end: usize,
}

impl UintScan {
    /// Whether the signed reading of the input fits `i64`
    pub fn fits_i64(&self) -> bool {
        if self.overflow {
            return false;
        }
        if self.negative {
            self.magnitude <= i64::MAX as u64 + 1
        } else {
            self.magnitude <= i64::MAX as u64
        }
    }

    /// Value read as a signed 64-bit number (two's complement wrap)
    pub fn as_i64(&self) -> i64 {
        self.value as i64
    }
}

fn digit_value(b: u8) -> Option<u32> {
    (b as char).to_digit(16)
}

fn skip_space(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && is_space(bytes[i]) {
        i += 1;
    }
    i
}

/// Scan an integer prefix like `strtoull`
///
/// `base` 0 detects the radix from the prefix. Returns `None` if no digits
/// were read.
pub fn scan_uint(s: &str, base: u32) -> Option<UintScan> {
    let bytes = s.as_bytes();
    let mut i = skip_space(bytes, 0);

    let mut negative = false;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        negative = bytes[i] == b'-';
        i += 1;
    }

    let has_hex_prefix = |i: usize| {
        bytes.len() > i + 2
            && bytes[i] == b'0'
            && (bytes[i + 1] | 0x20) == b'x'
            && bytes[i + 2].is_ascii_hexdigit()
    };

    let radix = match base {
        0 if has_hex_prefix(i) => {
            i += 2;
            16
        }
        0 if i < bytes.len() && bytes[i] == b'0' => 8,
        0 => 10,
        16 if has_hex_prefix(i) => {
            i += 2;
            16
        }
        b => b,
    };

    let mut magnitude = 0u64;
    let mut digits = 0;
    let mut overflow = false;
    while i < bytes.len() {
        let Some(d) = digit_value(bytes[i]).filter(|&d| d < radix) else {
            break;
        };
        match magnitude
            .checked_mul(radix as u64)
            .and_then(|m| m.checked_add(d as u64))
        {
            Some(m) => magnitude = m,
            None => overflow = true,
        }
        digits += 1;
        i += 1;
    }

    if digits == 0 {
        return None;
    }

    let value = if overflow {
        u64::MAX
    } else if negative {
        magnitude.wrapping_neg()
    } else {
        magnitude
    };

    Some(UintScan {
        value,
        magnitude,
        negative,
        radix,
        digits,
        overflow,
        end: i,
    })
}

/// Parse a whole string as an unsigned long (`strtoul` with base 0)
///
/// Trailing characters fail the parse. Overflow saturates, negative input
/// wraps.
pub fn parse_ulong(s: &str) -> Option<u64> {
    scan_uint(s, 0)
        .filter(|scan| scan.end == s.len())
        .map(|scan| scan.value)
}

/// Parse a whole string as a signed long (`strtol` with base 0)
///
/// Out-of-range values saturate.
pub fn parse_long(s: &str) -> Option<i64> {
    let scan = scan_uint(s, 0).filter(|scan| scan.end == s.len())?;
    Some(if !scan.fits_i64() {
        if scan.negative {
            i64::MIN
        } else {
            i64::MAX
        }
    } else if scan.negative {
        (scan.magnitude as i64).wrapping_neg()
    } else {
        scan.magnitude as i64
    })
}

/// A floating point number recognised at the start of a string
#[derive(Debug, Clone, Copy, PartialEq)]
enum FloatText<'a> {
    Infinity { negative: bool },
    Nan,
    Decimal {
        negative: bool,
        int: &'a str,
        frac: &'a str,
        exp: i32,
    },
    Hex {
        negative: bool,
        int: &'a str,
        frac: &'a str,
        exp: i32,
    },
}

fn starts_with_ignore_case(bytes: &[u8], i: usize, word: &str) -> bool {
    bytes.len() >= i + word.len() && bytes[i..i + word.len()].eq_ignore_ascii_case(word.as_bytes())
}

fn take_while(bytes: &[u8], mut i: usize, f: impl Fn(u8) -> bool) -> usize {
    while i < bytes.len() && f(bytes[i]) {
        i += 1;
    }
    i
}

/// Optional exponent: marker, sign, at least one decimal digit
fn scan_exponent(bytes: &[u8], i: usize, marker: u8) -> (i32, usize) {
    if i >= bytes.len() || (bytes[i] | 0x20) != marker {
        return (0, i);
    }
    let mut j = i + 1;
    let mut negative = false;
    if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
        negative = bytes[j] == b'-';
        j += 1;
    }
    let end = take_while(bytes, j, |b| b.is_ascii_digit());
    if end == j {
        return (0, i);
    }
    let mut exp: i32 = 0;
    for &b in &bytes[j..end] {
        exp = exp.saturating_mul(10).saturating_add((b - b'0') as i32);
    }
    (if negative { -exp } else { exp }, end)
}

fn scan_float_text(s: &str) -> Option<(FloatText<'_>, usize)> {
    let bytes = s.as_bytes();
    let mut i = skip_space(bytes, 0);

    let mut negative = false;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        negative = bytes[i] == b'-';
        i += 1;
    }

    if starts_with_ignore_case(bytes, i, "infinity") {
        return Some((FloatText::Infinity { negative }, i + 8));
    }
    if starts_with_ignore_case(bytes, i, "inf") {
        return Some((FloatText::Infinity { negative }, i + 3));
    }
    if starts_with_ignore_case(bytes, i, "nan") {
        let mut end = i + 3;
        // nan(n-char-sequence)
        if end < bytes.len() && bytes[end] == b'(' {
            let close = take_while(bytes, end + 1, |b| b.is_ascii_alphanumeric() || b == b'_');
            if close < bytes.len() && bytes[close] == b')' {
                end = close + 1;
            }
        }
        return Some((FloatText::Nan, end));
    }

    let hex = bytes.len() > i + 2 && bytes[i] == b'0' && (bytes[i + 1] | 0x20) == b'x';
    if hex {
        let start = i + 2;
        let int_end = take_while(bytes, start, |b| b.is_ascii_hexdigit());
        let (frac_start, frac_end) = if int_end < bytes.len() && bytes[int_end] == b'.' {
            (int_end + 1, take_while(bytes, int_end + 1, |b| b.is_ascii_hexdigit()))
        } else {
            (int_end, int_end)
        };
        if int_end > start || frac_end > frac_start {
            let (exp, end) = scan_exponent(bytes, frac_end, b'p');
            return Some((
                FloatText::Hex {
                    negative,
                    int: &s[start..int_end],
                    frac: &s[frac_start..frac_end],
                    exp,
                },
                end,
            ));
        }
        // "0x" without hex digits reads as the decimal 0
    }

    let int_end = take_while(bytes, i, |b| b.is_ascii_digit());
    let (frac_start, frac_end) = if int_end < bytes.len() && bytes[int_end] == b'.' {
        (int_end + 1, take_while(bytes, int_end + 1, |b| b.is_ascii_digit()))
    } else {
        (int_end, int_end)
    };
    if int_end == i && frac_end == frac_start {
        return None;
    }
    let (exp, end) = scan_exponent(bytes, frac_end, b'e');
    Some((
        FloatText::Decimal {
            negative,
            int: &s[i..int_end],
            frac: &s[frac_start..frac_end],
            exp,
        },
        end,
    ))
}

/// Multiply by a power of two without intermediate overflow
fn ldexp(mut value: f64, mut exp: i32) -> f64 {
    while exp > 0 {
        let step = exp.min(1000);
        value *= 2f64.powi(step);
        exp -= step;
    }
    while exp < 0 {
        let step = exp.max(-1000);
        value *= 2f64.powi(step);
        exp -= step;
    }
    value
}

fn hex_value(negative: bool, int: &str, frac: &str, exp: i32) -> f64 {
    let mut mantissa = 0u64;
    let mut shift: i32 = 0;
    for (pos, b) in int.bytes().chain(frac.bytes()).enumerate() {
        let d = digit_value(b).unwrap_or(0) as u64;
        let in_frac = pos >= int.len();
        if mantissa >> 56 == 0 {
            mantissa = (mantissa << 4) | d;
            if in_frac {
                shift -= 4;
            }
        } else if !in_frac {
            // digits beyond 64 bits of precision only scale the value
            shift += 4;
        }
    }
    let value = ldexp(mantissa as f64, shift.saturating_add(exp));
    if negative {
        -value
    } else {
        value
    }
}

fn decimal_text(negative: bool, int: &str, frac: &str, exp: i32) -> String {
    format!(
        "{}{}.{}e{}",
        if negative { "-" } else { "" },
        if int.is_empty() { "0" } else { int },
        if frac.is_empty() { "0" } else { frac },
        exp
    )
}

/// Scan a double prefix like `strtod`; returns the value and bytes consumed
pub fn scan_f64(s: &str) -> Option<(f64, usize)> {
    let (text, end) = scan_float_text(s)?;
    let value = match text {
        FloatText::Infinity { negative: true } => f64::NEG_INFINITY,
        FloatText::Infinity { negative: false } => f64::INFINITY,
        FloatText::Nan => f64::NAN,
        FloatText::Decimal {
            negative,
            int,
            frac,
            exp,
        } => decimal_text(negative, int, frac, exp).parse().ok()?,
        FloatText::Hex {
            negative,
            int,
            frac,
            exp,
        } => hex_value(negative, int, frac, exp),
    };
    Some((value, end))
}

/// Scan a float prefix like `strtof`; returns the value and bytes consumed
pub fn scan_f32(s: &str) -> Option<(f32, usize)> {
    let (text, end) = scan_float_text(s)?;
    let value = match text {
        FloatText::Infinity { negative: true } => f32::NEG_INFINITY,
        FloatText::Infinity { negative: false } => f32::INFINITY,
        FloatText::Nan => f32::NAN,
        FloatText::Decimal {
            negative,
            int,
            frac,
            exp,
        } => decimal_text(negative, int, frac, exp).parse().ok()?,
        FloatText::Hex {
            negative,
            int,
            frac,
            exp,
        } => hex_value(negative, int, frac, exp) as f32,
    };
    Some((value, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_uint_bases() {
        let hex = scan_uint("0x1F", 0).unwrap();
        assert_eq!((hex.value, hex.radix, hex.digits, hex.end), (0x1f, 16, 2, 4));

        let oct = scan_uint("017", 0).unwrap();
        assert_eq!((oct.value, oct.radix), (0o17, 8));

        let dec = scan_uint("42U", 0).unwrap();
        assert_eq!((dec.value, dec.end), (42, 2));

        // "0x" without digits reads the leading zero only
        let zero = scan_uint("0xg", 0).unwrap();
        assert_eq!((zero.value, zero.end), (0, 1));

        assert!(scan_uint("abc", 0).is_none());
        assert!(scan_uint("-", 0).is_none());
    }

    #[test]
    fn test_scan_uint_sign_and_overflow() {
        let neg = scan_uint("-1", 0).unwrap();
        assert_eq!(neg.value, u64::MAX);
        assert_eq!(neg.as_i64(), -1);
        assert!(neg.fits_i64());

        let big = scan_uint("18446744073709551616", 0).unwrap();
        assert!(big.overflow);
        assert!(!big.fits_i64());

        assert!(!scan_uint("9223372036854775808", 0).unwrap().fits_i64());
        assert!(scan_uint("-9223372036854775808", 0).unwrap().fits_i64());
    }

    #[test]
    fn test_parse_ulong_and_long() {
        assert_eq!(parse_ulong("0x100"), Some(256));
        assert_eq!(parse_ulong("12k"), None);
        assert_eq!(parse_ulong(""), None);
        assert_eq!(parse_long("-16"), Some(-16));
        assert_eq!(parse_long("99999999999999999999"), Some(i64::MAX));
    }

    #[test]
    fn test_scan_f64() {
        assert_eq!(scan_f64("3.3"), Some((3.3, 3)));
        assert_eq!(scan_f64("2.5V"), Some((2.5, 3)));
        assert_eq!(scan_f64(".5"), Some((0.5, 2)));
        assert_eq!(scan_f64("1e3"), Some((1000.0, 3)));
        assert_eq!(scan_f64("1e"), Some((1.0, 1)));
        assert_eq!(scan_f64("-2"), Some((-2.0, 2)));
        assert_eq!(scan_f64("0x1.8p1"), Some((3.0, 7)));
        assert_eq!(scan_f64("0x1.8F"), Some((1.0 + 0x8f as f64 / 256.0, 6)));
        assert_eq!(scan_f64("inf"), Some((f64::INFINITY, 3)));
        assert!(scan_f64("nan").unwrap().0.is_nan());
        assert!(scan_f64("off").is_none());
        assert!(scan_f64(".").is_none());
    }

    #[test]
    fn test_scan_f32() {
        assert_eq!(scan_f32("1.5F"), Some((1.5, 3)));
        assert_eq!(scan_f32("0x1.8p0F"), Some((1.5, 7)));
    }
}
