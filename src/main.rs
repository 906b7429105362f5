//! avrterm - Interactive console for AVR device programmers
//!
//! Opens a programmer for one part and hands both to the command console,
//! either on the terminal with line editing or fed from a script file.

mod cli;
mod programmers;
mod progress;

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use avrterm_core::part::PartDatabase;
use avrterm_term::Session;
use clap::Parser;
use cli::{Cli, Commands};
use progress::BarProgress;

/// Parts built into the binary, used when no database is found on disk
const BUILTIN_PARTS: &[(&str, &str)] = &[
    ("atmega.ron", include_str!("../parts/atmega.ron")),
    ("attiny.ron", include_str!("../parts/attiny.ron")),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let db = match load_part_database(cli.part_db.as_deref()) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Failed to load part database: {}", e);
            std::process::exit(1);
        }
    };

    log::debug!("Loaded {} part definitions", db.len());

    match cli.command {
        Commands::Term {
            programmer,
            part,
            script,
        } => {
            let Some(part) = db.find(&part) else {
                return Err(format!(
                    "Unknown part: {} (use 'avrterm list-parts' to see the database)",
                    part
                )
                .into());
            };
            let mut pgm = programmers::open_programmer(&programmer, part)?;

            let mut stdout = io::stdout();
            let mut session = Session::new(&mut *pgm, part, &mut stdout)
                .with_progress(Box::new(BarProgress::new()))
                .with_verbosity(cli.verbose);

            let status = match script {
                Some(path) if path.as_os_str() == "-" => {
                    avrterm_term::run_script(&mut session, io::stdin().lock())?
                }
                Some(path) => {
                    let file = File::open(&path)
                        .map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;
                    avrterm_term::run_script(&mut session, BufReader::new(file))?
                }
                None => avrterm_term::run_interactive(&mut session)?,
            };

            if status < 0 {
                std::process::exit(1);
            }
        }
        Commands::ListProgrammers => {
            print!("{}", programmers::programmer_help());
        }
        Commands::ListParts { family } => {
            list_parts(&db, family.as_deref());
        }
    }

    Ok(())
}

/// Print the parts in the database
fn list_parts(db: &PartDatabase, family_filter: Option<&str>) {
    println!("{:<10} {:<8} {:<16} {:>10} {:>8}", "Family", "Id", "Name", "Flash", "EEPROM");
    println!("{}", "-".repeat(56));

    for part in db.iter() {
        if let Some(family) = family_filter {
            if !part.family.to_lowercase().contains(&family.to_lowercase()) {
                continue;
            }
        }
        let size_of = |name: &str| {
            part.memory(name)
                .map(|m| format_size(m.size))
                .unwrap_or_else(|| "-".to_string())
        };
        println!(
            "{:<10} {:<8} {:<16} {:>10} {:>8}",
            part.family,
            part.id,
            part.desc,
            size_of("flash"),
            size_of("eeprom")
        );
    }
}

fn format_size(bytes: u32) -> String {
    if bytes >= 1024 && bytes % 1024 == 0 {
        format!("{} KiB", bytes / 1024)
    } else {
        format!("{} B", bytes)
    }
}

/// Load part database from the specified path or default locations
fn load_part_database(path: Option<&Path>) -> Result<PartDatabase, Box<dyn std::error::Error>> {
    let mut db = PartDatabase::new();

    if let Some(path) = path {
        // User specified a path
        if path.is_dir() {
            db.load_dir(path)?;
        } else if path.is_file() {
            db.load_file(path)?;
        } else {
            return Err(format!("Part database path not found: {}", path.display()).into());
        }
        return Ok(db);
    }

    // Try default locations
    let default_paths = [
        PathBuf::from("parts"),
        PathBuf::from("/usr/share/avrterm/parts"),
        PathBuf::from("/usr/local/share/avrterm/parts"),
    ];

    for dir in &default_paths {
        if dir.is_dir() {
            match db.load_dir(dir) {
                Ok(count) => {
                    log::debug!("Loaded {} parts from {}", count, dir.display());
                }
                Err(e) => {
                    log::warn!("Failed to load parts from {}: {}", dir.display(), e);
                }
            }
        }
    }

    if db.is_empty() {
        log::debug!("No part database found in default locations, using built-in parts");
        for (name, content) in BUILTIN_PARTS {
            db.load_ron(content)
                .map_err(|e| format!("built-in {}: {}", name, e))?;
        }
    }

    Ok(db)
}
