//! Command table and dispatch

use crate::commands;
use crate::error::TermError;
use crate::session::Session;

/// What the console does after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Prompt for the next command
    Continue,
    /// Leave the console
    Quit,
}

/// Command handler; `args[0]` is the command name as typed
pub type Handler = fn(&mut Session<'_>, &[&str]) -> Result<Flow, TermError>;

/// A console command
pub struct Command {
    /// Full command name
    pub name: &'static str,
    /// Function run for the command
    pub handler: Handler,
    /// Help text; `%s` stands for the command name
    pub desc: &'static str,
}

impl Command {
    /// Help text with the command name filled in
    pub fn help(&self) -> String {
        self.desc.replace("%s", self.name)
    }
}

/// All commands, in help order
pub static COMMANDS: &[Command] = &[
    Command {
        name: "dump",
        handler: commands::dump,
        desc: "dump memory  : %s <memtype> <addr> <N-Bytes>",
    },
    Command {
        name: "read",
        handler: commands::dump,
        desc: "alias for dump",
    },
    Command {
        name: "write",
        handler: commands::write,
        desc: "write memory : %s <memtype> <addr> <b1> <b2> ... <bN>",
    },
    Command {
        name: "erase",
        handler: commands::erase,
        desc: "perform a chip erase",
    },
    Command {
        name: "sig",
        handler: commands::sig,
        desc: "display device signature bytes",
    },
    Command {
        name: "part",
        handler: commands::part,
        desc: "display the current part information",
    },
    Command {
        name: "send",
        handler: commands::send,
        desc: "send a raw command : %s <b1> <b2> <b3> <b4>",
    },
    Command {
        name: "parms",
        handler: commands::parms,
        desc: "display adjustable parameters",
    },
    Command {
        name: "vtarg",
        handler: commands::vtarg,
        desc: "set <V[target]>",
    },
    Command {
        name: "varef",
        handler: commands::varef,
        desc: "set <V[aref]>",
    },
    Command {
        name: "fosc",
        handler: commands::fosc,
        desc: "set <oscillator frequency>",
    },
    Command {
        name: "sck",
        handler: commands::sck,
        desc: "set <SCK period>",
    },
    Command {
        name: "spi",
        handler: commands::spi,
        desc: "enter direct SPI mode",
    },
    Command {
        name: "pgm",
        handler: commands::pgm,
        desc: "return to programming mode",
    },
    Command {
        name: "verbose",
        handler: commands::verbose,
        desc: "change verbosity",
    },
    Command {
        name: "help",
        handler: commands::help,
        desc: "help",
    },
    Command {
        name: "?",
        handler: commands::help,
        desc: "help",
    },
    Command {
        name: "quit",
        handler: commands::quit,
        desc: "quit",
    },
];

fn is_prefix_ignore_case(name: &str, prefix: &str) -> bool {
    name.len() >= prefix.len()
        && name.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Resolve a command name or abbreviation
///
/// An exact (case-insensitive) name always wins; otherwise the abbreviation
/// must match exactly one command.
pub fn lookup(name: &str) -> Result<&'static Command, TermError> {
    if let Some(cmd) = COMMANDS.iter().find(|c| c.name.eq_ignore_ascii_case(name)) {
        return Ok(cmd);
    }

    let mut matches = COMMANDS.iter().filter(|c| is_prefix_ignore_case(c.name, name));
    match (matches.next(), matches.next()) {
        (Some(cmd), None) => Ok(cmd),
        (Some(_), Some(_)) => Err(TermError::Ambiguous(name.to_string())),
        _ => Err(TermError::UnknownCommand(name.to_string())),
    }
}

/// Names of commands starting with `prefix` (case-insensitive)
pub fn completions(prefix: &str) -> impl Iterator<Item = &'static str> + '_ {
    COMMANDS
        .iter()
        .map(|c| c.name)
        .filter(move |name| is_prefix_ignore_case(name, prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert_eq!(lookup("dump").unwrap().name, "dump");
        assert_eq!(lookup("READ").unwrap().name, "read");
        assert_eq!(lookup("?").unwrap().name, "?");
    }

    #[test]
    fn test_unique_prefix() {
        assert_eq!(lookup("w").unwrap().name, "write");
        assert_eq!(lookup("var").unwrap().name, "varef");
        assert_eq!(lookup("vare").unwrap().name, "varef");
        assert_eq!(lookup("VT").unwrap().name, "vtarg");
        assert_eq!(lookup("q").unwrap().name, "quit");
    }

    #[test]
    fn test_ambiguous_prefix() {
        assert!(matches!(lookup("v"), Err(TermError::Ambiguous(n)) if n == "v"));
        assert!(matches!(lookup("p"), Err(TermError::Ambiguous(_))));
        assert!(matches!(lookup("s"), Err(TermError::Ambiguous(_))));
    }

    #[test]
    fn test_unknown() {
        assert!(matches!(lookup("flash"), Err(TermError::UnknownCommand(_))));
        assert!(matches!(lookup("dumpx"), Err(TermError::UnknownCommand(_))));
    }

    #[test]
    fn test_help_substitutes_name() {
        assert_eq!(
            lookup("write").unwrap().help(),
            "write memory : write <memtype> <addr> <b1> <b2> ... <bN>"
        );
    }

    #[test]
    fn test_completions() {
        let names: Vec<_> = completions("p").collect();
        assert_eq!(names, ["part", "parms", "pgm"]);
    }
}
