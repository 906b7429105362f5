//! Completion and highlighting for the interactive console

use std::borrow::Cow;

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::command;
use crate::number::parse_ulong;
use crate::token::spans;

/// Commands whose first argument names a memory
const MEMORY_COMMANDS: &[&str] = &["dump", "read", "write"];

/// Helper struct for rustyline that completes command and memory names and
/// colours the input line.
#[derive(Helper)]
pub struct TermHelper {
    /// Memory names of the current part
    memories: Vec<String>,
}

impl TermHelper {
    /// Create a helper completing the given memory names
    pub fn new(memories: Vec<String>) -> Self {
        Self { memories }
    }

    fn takes_memory(&self, cmd: &str) -> bool {
        command::lookup(cmd)
            .map(|c| MEMORY_COMMANDS.contains(&c.name))
            .unwrap_or(false)
    }

    /// Candidates for the word at `pos`; returns its start and the words
    fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<String>) {
        let spans = spans(line);
        let index = spans
            .iter()
            .position(|r| r.start <= pos && pos <= r.end)
            .unwrap_or_else(|| spans.iter().filter(|r| r.end < pos).count());
        let (start, word) = match spans.get(index) {
            Some(r) if r.start <= pos => (r.start, &line[r.start..pos]),
            _ => (pos, ""),
        };

        let words = match index {
            0 => command::completions(word).map(str::to_string).collect(),
            1 if self.takes_memory(&line[spans[0].clone()]) => self
                .memories
                .iter()
                .filter(|m| m.starts_with(word))
                .cloned()
                .collect(),
            _ => Vec::new(),
        };
        (start, words)
    }
}

impl Completer for TermHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Self::Candidate>)> {
        let (start, words) = self.candidates(line, pos);
        let pairs = words
            .into_iter()
            .map(|w| Pair {
                display: w.clone(),
                replacement: w,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for TermHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _context: &Context<'_>) -> Option<String> {
        None
    }
}

impl Validator for TermHelper {}

impl Highlighter for TermHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let spans = spans(line);
        if spans.is_empty() || line.trim_start().starts_with('#') {
            return Cow::Borrowed(line);
        }

        let mut highlighted = String::with_capacity(line.len() * 2);
        let mut last = 0;
        for (i, range) in spans.into_iter().enumerate() {
            highlighted.push_str(&line[last..range.start]);
            let word = &line[range.clone()];
            let colored = if i == 0 {
                if command::lookup(word).is_ok() {
                    word.bright_blue().bold().to_string()
                } else {
                    word.bright_red().to_string()
                }
            } else if word.starts_with('"') || word.starts_with('\'') {
                word.bright_green().to_string()
            } else if parse_ulong(word).is_some() {
                word.bright_yellow().to_string()
            } else {
                word.to_string()
            };
            highlighted.push_str(&colored);
            last = range.end;
        }
        highlighted.push_str(&line[last..]);

        Cow::Owned(highlighted)
    }

    fn highlight_char(&self, line: &str, _pos: usize, _forced: bool) -> bool {
        !line.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn helper() -> TermHelper {
        TermHelper::new(vec![
            "eeprom".to_string(),
            "efuse".to_string(),
            "flash".to_string(),
        ])
    }

    #[test]
    fn test_complete_command() {
        let (start, words) = helper().candidates("va", 2);
        assert_eq!(start, 0);
        assert_eq!(words, ["varef"]);

        let (_, words) = helper().candidates("", 0);
        assert_eq!(words.len(), command::COMMANDS.len());
    }

    #[test]
    fn test_complete_memory() {
        let (start, words) = helper().candidates("dump e", 6);
        assert_eq!(start, 5);
        assert_eq!(words, ["eeprom", "efuse"]);

        let (start, words) = helper().candidates("w ", 2);
        assert_eq!(start, 2);
        assert_eq!(words.len(), 3);

        let (_, words) = helper().candidates("sig f", 5);
        assert!(words.is_empty());
    }

    #[test]
    fn test_no_completion_past_memory() {
        let (_, words) = helper().candidates("dump flash 0", 12);
        assert!(words.is_empty());
    }

    #[test]
    fn test_highlight_keeps_text() {
        colored::control::set_override(false);
        let line = "write eeprom 0 \"hi\" 0x10";
        assert_eq!(helper().highlight(line, 0), line);
    }
}
