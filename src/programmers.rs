//! Programmer registration and dispatch
//!
//! This module provides a centralized registry for all programmers, with support
//! for feature-gated inclusion and dynamic help text generation.

use std::collections::HashMap;

use avrterm_core::part::Part;
use avrterm_core::programmer::Programmer;
use thiserror::Error;

/// Information about a programmer
pub struct ProgrammerInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Errors opening a programmer
#[derive(Error, Debug)]
pub enum OpenError {
    #[error("Invalid parameter format: '{0}' (expected key=value)")]
    BadParameter(String),

    #[error("Unknown programmer: {0}\n\n{help}", help = programmer_help())]
    UnknownProgrammer(String),

    #[error("Unknown option '{option}' for programmer {programmer}")]
    UnknownOption {
        programmer: &'static str,
        option: String,
    },

    #[error("Invalid value '{value}' for option {option}: {reason}")]
    BadValue {
        option: &'static str,
        value: String,
        reason: String,
    },

    #[error("Failed to initialize {programmer}: {source}")]
    Init {
        programmer: &'static str,
        source: avrterm_core::Error,
    },
}

/// Get information about all available programmers (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_programmers() -> Vec<ProgrammerInfo> {
    let mut programmers = Vec::new();

    #[cfg(feature = "dummy")]
    programmers.push(ProgrammerInfo {
        name: "dummy",
        aliases: &["emulator"],
        description: "In-memory part emulator for testing (caps=<FLAG|FLAG...>,vtarget=<V>)",
    });

    programmers
}

/// Generate help text listing all available programmers
pub fn programmer_help() -> String {
    let programmers = available_programmers();

    if programmers.is_empty() {
        return "No programmers available (recompile with programmer features enabled)".to_string();
    }

    let mut help = String::from("Available programmers:\n");
    for p in &programmers {
        help.push_str(&format!("  {:12} - {}\n", p.name, p.description));
    }
    help
}

/// Generate a short list of programmer names for CLI help
pub fn programmer_names_short() -> String {
    let programmers = available_programmers();
    let names: Vec<&str> = programmers.iter().map(|p| p.name).collect();
    names.join(", ")
}

/// Parsed programmer parameters
pub struct ProgrammerParams {
    /// Programmer name as given
    pub name: String,
    /// Key-value parameters
    pub params: HashMap<String, String>,
}

/// Parse a programmer string into name and parameters
///
/// Format: "name" or "name:key1=value1,key2=value2"
pub fn parse_programmer_params(s: &str) -> Result<ProgrammerParams, OpenError> {
    let (name, opts_str) = s.split_once(':').unwrap_or((s, ""));

    let mut params = HashMap::new();
    if !opts_str.is_empty() {
        for opt in opts_str.split(',') {
            let (key, value) = opt
                .split_once('=')
                .ok_or_else(|| OpenError::BadParameter(opt.to_string()))?;
            params.insert(key.to_string(), value.to_string());
        }
    }

    Ok(ProgrammerParams {
        name: name.to_string(),
        params,
    })
}

/// Open a programmer and put it into programming mode for `part`
///
/// # Arguments
/// * `programmer` - Programmer specification (e.g., "dummy" or "dummy:caps=ISP_COMMAND|SPI")
/// * `part` - The part the console will talk to
pub fn open_programmer(programmer: &str, part: &Part) -> Result<Box<dyn Programmer>, OpenError> {
    let params = parse_programmer_params(programmer)?;

    let found = available_programmers()
        .into_iter()
        .find(|p| p.name == params.name || p.aliases.contains(&params.name.as_str()));

    match found.map(|p| p.name) {
        #[cfg(feature = "dummy")]
        Some("dummy") => open_dummy(&params, part),
        _ => {
            let _ = part;
            Err(OpenError::UnknownProgrammer(params.name))
        }
    }
}

#[cfg(feature = "dummy")]
fn open_dummy(params: &ProgrammerParams, part: &Part) -> Result<Box<dyn Programmer>, OpenError> {
    use avrterm_core::programmer::ProgrammerFeatures;
    use avrterm_dummy::{DummyConfig, DummyProgrammer};

    let mut config = DummyConfig::default();
    for (key, value) in &params.params {
        match key.as_str() {
            "caps" => {
                let mut features = ProgrammerFeatures::empty();
                for flag in value.split('|').filter(|f| !f.is_empty()) {
                    features |= ProgrammerFeatures::from_name(&flag.to_ascii_uppercase())
                        .ok_or_else(|| OpenError::BadValue {
                            option: "caps",
                            value: value.clone(),
                            reason: format!("unknown capability {}", flag),
                        })?;
                }
                config.features = features;
            }
            "vtarget" => {
                config.vtarget = value.parse().map_err(|e| OpenError::BadValue {
                    option: "vtarget",
                    value: value.clone(),
                    reason: format!("{}", e),
                })?;
            }
            _ => {
                return Err(OpenError::UnknownOption {
                    programmer: "dummy",
                    option: key.clone(),
                })
            }
        }
    }

    let mut pgm = DummyProgrammer::new(part, config);
    pgm.initialize(part).map_err(|e| OpenError::Init {
        programmer: "dummy",
        source: e,
    })?;
    log::info!("Opened dummy programmer emulating {}", part.desc);
    Ok(Box::new(pgm))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_programmer_params() {
        let params = parse_programmer_params("dummy:caps=SPI|SET_PIN,vtarget=3.3").unwrap();
        assert_eq!(params.name, "dummy");
        assert_eq!(params.params["caps"], "SPI|SET_PIN");
        assert_eq!(params.params["vtarget"], "3.3");

        assert!(matches!(
            parse_programmer_params("dummy:caps"),
            Err(OpenError::BadParameter(_))
        ));
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_open_dummy() {
        use avrterm_core::programmer::ProgrammerFeatures;

        let part = Part::new("m8", "ATmega8", [0x1e, 0x93, 0x07]);
        let pgm = open_programmer("dummy:caps=isp_command|spi", &part).unwrap();
        assert_eq!(pgm.name(), "dummy");
        assert_eq!(
            pgm.features(),
            ProgrammerFeatures::ISP_COMMAND | ProgrammerFeatures::SPI
        );

        assert!(matches!(
            open_programmer("dummy:caps=FLUX", &part),
            Err(OpenError::BadValue { .. })
        ));
        assert!(matches!(
            open_programmer("dummy:speed=1", &part),
            Err(OpenError::UnknownOption { .. })
        ));
    }

    #[test]
    fn test_unknown_programmer() {
        let part = Part::new("m8", "ATmega8", [0x1e, 0x93, 0x07]);
        assert!(matches!(
            open_programmer("usbasp", &part),
            Err(OpenError::UnknownProgrammer(name)) if name == "usbasp"
        ));
    }
}
