//! Programmer traits and abstractions
//!
//! This module defines the trait every programmer driver implements so the
//! terminal can talk to a part through it.

mod traits;

pub use traits::*;
