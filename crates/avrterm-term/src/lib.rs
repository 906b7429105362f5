//! Interactive command console for AVR device programmers
//!
//! The console reads one command per line, tokenizes it, resolves the
//! (possibly abbreviated) command name and runs the handler against a
//! [`Programmer`] and the [`Part`] it talks to.
//!
//! # Example Session
//!
//! ```text
//! avrterm> dump eeprom 0 16
//! >>> dump eeprom 0 16
//! 0000  ff ff ff ff ff ff ff ff  ff ff ff ff ff ff ff ff  |................|
//!
//! avrterm> write eeprom 0 0x1234 'A' "hi"
//! >>> write eeprom 0 0x1234 'A' "hi"
//! avrterm> write flash 0x100 32 0xff ...
//! ```
//!
//! [`Programmer`]: avrterm_core::programmer::Programmer
//! [`Part`]: avrterm_core::part::Part

pub mod command;
mod commands;
pub mod console;
mod error;
pub mod hexdump;
pub mod highlight;
pub mod literal;
pub mod number;
pub mod progress;
pub mod session;
pub mod token;

#[cfg(test)]
mod test_support;

pub use command::Flow;
pub use console::{EditorInput, LineInput, ReaderInput};
pub use error::TermError;
pub use progress::{NoProgress, Progress};
pub use session::Session;

use std::io::BufRead;

use colored::Colorize;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the startup banner
fn banner() -> String {
    format!(
        r#"
   __ ___ ___ _ _ ___ _ _ _ __
  / _` \ V / '_|  _/ -_) '_| '  \    Version {}
  \__,_|\_/|_|  \__\___|_| |_|_|_|   'help' for commands
"#,
        VERSION
    )
    .bright_yellow()
    .bold()
    .to_string()
}

/// Run the interactive console on the terminal
///
/// Returns the status of the last command.
pub fn run_interactive(session: &mut Session<'_>) -> Result<i32, TermError> {
    let memories = session
        .part()
        .memories
        .iter()
        .map(|m| m.name.clone())
        .collect();
    let mut input = EditorInput::new(memories)?;

    println!("{}", banner());
    println!(
        "Talking to {} ({}). Type {} to leave.",
        session.part().desc.bright_cyan(),
        session.part().id,
        "quit".bright_cyan()
    );
    println!();

    console::run(session, &mut input)
}

/// Run console commands read from `reader`
pub fn run_script<R: BufRead>(session: &mut Session<'_>, reader: R) -> Result<i32, TermError> {
    console::run(session, &mut ReaderInput::new(reader))
}
