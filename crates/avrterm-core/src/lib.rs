//! avrterm-core - Core types for AVR device programmers
//!
//! This crate describes the two things a programmer console talks about:
//! the target part (its memories and their sizes) and the programmer that
//! reaches it (byte access plus a set of optional capabilities). It is
//! `no_std` compatible; the `std` feature adds the RON part database.
//!
//! # Features
//!
//! - `std` - Enable the runtime part database and `std::error::Error` impls
//!
//! # Example
//!
//! ```ignore
//! use avrterm_core::programmer::Programmer;
//!
//! fn first_flash_byte<P: Programmer>(pgm: &mut P, part: &avrterm_core::part::Part) {
//!     if let Some(flash) = part.locate_memory("flash") {
//!         match pgm.read_byte(part, flash, 0) {
//!             Ok(b) => println!("flash[0] = 0x{:02x}", b),
//!             Err(e) => println!("read failed: {}", e),
//!         }
//!     }
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod error;
pub mod part;
pub mod programmer;

pub use error::{Error, Result};
