//! Part descriptions and database
//!
//! This module provides types for describing AVR parts and their memories,
//! as well as a database of known parts.

mod types;

#[cfg(feature = "std")]
mod database;

pub use types::*;

#[cfg(feature = "std")]
pub use database::*;
