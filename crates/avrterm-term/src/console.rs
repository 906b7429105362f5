//! The read-dispatch loop

use std::io::BufRead;
use std::path::PathBuf;

use colored::Colorize;
use directories::ProjectDirs;
use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;
use rustyline::Editor;

use crate::command::Flow;
use crate::error::TermError;
use crate::highlight::TermHelper;
use crate::session::Session;

/// Prompt shown by the interactive console
pub const PROMPT: &str = "avrterm> ";

/// Source of console input lines
pub trait LineInput {
    /// Read the next line; `None` at end of input
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, TermError>;
}

/// Reads lines from any buffered reader without prompting
pub struct ReaderInput<R> {
    reader: R,
}

impl<R: BufRead> ReaderInput<R> {
    /// Wrap a reader
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineInput for ReaderInput<R> {
    fn read_line(&mut self, _prompt: &str) -> Result<Option<String>, TermError> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

/// Get the history file path
fn history_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "avrterm") {
        let mut path = proj_dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&path).ok();
        path.push("term_history");
        path
    } else {
        PathBuf::from(".avrterm_history")
    }
}

/// Line editor input with history and completion
///
/// History is saved when the input is dropped.
pub struct EditorInput {
    editor: Editor<TermHelper, FileHistory>,
    history: PathBuf,
}

impl EditorInput {
    /// Create an editor completing the given memory names
    pub fn new(memories: Vec<String>) -> Result<Self, TermError> {
        let mut editor = Editor::<TermHelper, FileHistory>::new()
            .map_err(|e| TermError::Readline(e.to_string()))?;
        editor.set_helper(Some(TermHelper::new(memories)));

        let history = history_path();
        if editor.load_history(&history).is_err() {
            log::debug!("no history at {}", history.display());
        }
        Ok(Self { editor, history })
    }
}

impl LineInput for EditorInput {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, TermError> {
        loop {
            match self.editor.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = self.editor.add_history_entry(line.as_str());
                    }
                    return Ok(Some(line));
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => return Ok(None),
                Err(err) => return Err(TermError::Readline(err.to_string())),
            }
        }
    }
}

impl Drop for EditorInput {
    fn drop(&mut self) {
        if let Err(e) = self.editor.save_history(&self.history) {
            eprintln!(
                "{}: Failed to save history: {}",
                "Warning".bright_yellow(),
                e
            );
        }
    }
}

/// Print a command error the way the console reports it
pub fn report(err: &TermError) {
    match err {
        TermError::Usage(text) => eprintln!("{}", text),
        _ => eprintln!("{}: {}", "Error".bright_red().bold(), err),
    }
}

/// Run commands until `quit` or end of input
///
/// Returns the status of the last command: `0` on success, otherwise the
/// error's status code.
pub fn run(session: &mut Session<'_>, input: &mut dyn LineInput) -> Result<i32, TermError> {
    let mut status = 0;
    while let Some(line) = input.read_line(PROMPT)? {
        let result = session.execute(&line);
        session.flush()?;
        match result {
            Ok(Flow::Continue) => status = 0,
            Ok(Flow::Quit) => {
                status = 0;
                break;
            }
            Err(e) => {
                report(&e);
                status = e.code();
            }
        }
    }
    Ok(status)
}
