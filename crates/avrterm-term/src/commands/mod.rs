//! Console command handlers

mod device;
mod dump;
mod mode;
mod send;
mod write;

pub(crate) use device::{erase, fosc, parms, part, sck, sig, varef, vtarg};
pub(crate) use dump::dump;
pub(crate) use mode::{help, pgm, quit, spi, verbose};
pub(crate) use send::send;
pub(crate) use write::write;
