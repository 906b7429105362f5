//! CLI argument parsing

use crate::programmers;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Generate dynamic help text for the programmer argument
fn programmer_help() -> String {
    format!(
        "Programmer to use [available: {}]",
        programmers::programmer_names_short()
    )
}

#[derive(Parser)]
#[command(name = "avrterm")]
#[command(author, version, about = "Interactive AVR programmer console", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to part database directory or file (.ron)
    /// Defaults to looking in ./parts/ and /usr/share/avrterm/parts/
    #[arg(long, global = true)]
    pub part_db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive console
    Term {
        /// Programmer to use
        #[arg(short = 'c', long, help = programmer_help())]
        programmer: String,

        /// Part id or name (e.g. m328p)
        #[arg(short, long)]
        part: String,

        /// Read commands from a file ("-" for stdin) instead of the terminal
        #[arg(long)]
        script: Option<PathBuf>,
    },

    /// List supported programmers
    ListProgrammers,

    /// List parts in the database
    ListParts {
        /// Filter by family (case-insensitive substring)
        #[arg(short, long)]
        family: Option<String>,
    },
}
