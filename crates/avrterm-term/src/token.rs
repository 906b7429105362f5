//! Command line tokenizer
//!
//! Tokens are separated by whitespace. A double quote stops whitespace from
//! ending the token, except for whitespace directly after a double quote.
//! Quotes stay part of the token, so `"a b" c` yields `"a b"` and `c`. The
//! quote count is never reset within a token: a token that opens a quote
//! right before a space (`" a`) ends at that space.

use std::ops::Range;

/// C `isspace` in the default locale
pub(crate) fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

/// Iterator over the tokens of one line
pub struct Tokens<'a> {
    line: &'a str,
    pos: usize,
}

impl<'a> Tokens<'a> {
    /// Start tokenizing `line`
    pub fn new(line: &'a str) -> Self {
        Self { line, pos: 0 }
    }

    /// Byte range of the next token
    pub fn next_span(&mut self) -> Option<Range<usize>> {
        let bytes = self.line.as_bytes();

        let mut start = self.pos;
        while start < bytes.len() && is_space(bytes[start]) {
            start += 1;
        }
        if start >= bytes.len() {
            self.pos = start;
            return None;
        }

        let mut end = start;
        let mut quotes = 0u32;
        while end < bytes.len() {
            let c = bytes[end];
            if is_space(c) && quotes == 0 {
                break;
            }
            if c == b'"' {
                quotes += 1;
            } else if is_space(c) && bytes[end - 1] == b'"' {
                break;
            }
            end += 1;
        }

        // the terminator belongs to neither token
        self.pos = (end + 1).min(bytes.len());
        Some(start..end)
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.line;
        self.next_span().map(|span| &line[span])
    }
}

/// Split a line into owned arguments; argument 0 is the command name
pub fn tokenize(line: &str) -> Vec<String> {
    Tokens::new(line).map(str::to_string).collect()
}

/// Byte ranges of all tokens of a line
pub fn spans(line: &str) -> Vec<Range<usize>> {
    let mut tokens = Tokens::new(line);
    std::iter::from_fn(|| tokens.next_span()).collect()
}
