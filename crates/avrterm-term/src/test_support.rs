//! Shared fixtures for console tests

use avrterm_core::part::{Memory, Part};
use avrterm_dummy::DummyProgrammer;

use crate::progress::Progress;
use crate::session::Session;

/// An ATmega328P-like part
pub(crate) fn part() -> Part {
    Part::new("m328p", "ATmega328P", [0x1e, 0x95, 0x0f])
        .with_memory(Memory::new("eeprom", 1024).with_page_size(4))
        .with_memory(Memory::new("efuse", 1))
        .with_memory(Memory::new("flash", 32768).with_page_size(128))
        .with_memory(Memory::new("hfuse", 1))
        .with_memory(Memory::new("lfuse", 1))
        .with_memory(Memory::new("lock", 1))
        .with_memory(Memory::new("signature", 3).read_only())
        .with_memory(Memory::new("calibration", 1).read_only())
}

pub(crate) fn session<'a>(
    pgm: &'a mut DummyProgrammer,
    part: &'a Part,
    out: &'a mut Vec<u8>,
) -> Session<'a> {
    Session::new(pgm, part, out)
}

pub(crate) fn output(out: &[u8]) -> String {
    String::from_utf8_lossy(out).into_owned()
}

/// Progress sink that records every report
pub(crate) struct Recorder<'a>(pub(crate) &'a mut Vec<(usize, usize, Option<String>)>);

impl Progress for Recorder<'_> {
    fn report(&mut self, step: usize, total: usize, label: Option<&str>) {
        self.0.push((step, total, label.map(str::to_string)));
    }
}
