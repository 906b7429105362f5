//! avrterm-dummy - In-memory AVR programmer emulator for testing
//!
//! This crate provides a dummy programmer that emulates a part's memories
//! in memory. It's useful for testing and development without real hardware.

use std::collections::{BTreeMap, BTreeSet};

use avrterm_core::error::{Error, Result};
use avrterm_core::part::{Memory, Part};
use avrterm_core::programmer::{Parameter, Pin, Programmer, ProgrammerFeatures};

/// Configuration for the dummy programmer
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Capabilities to advertise
    pub features: ProgrammerFeatures,
    /// Initial target voltage in volts
    pub vtarget: f64,
    /// Initial analog reference voltages, one per channel
    pub varef: Vec<f64>,
    /// Initial oscillator frequency in Hz
    pub fosc: f64,
    /// Initial ISP clock period in seconds
    pub sck_period: f64,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            features: ProgrammerFeatures::all(),
            vtarget: 5.0,
            varef: vec![5.0, 5.0],
            fosc: 0.0,
            sck_period: 1e-6,
        }
    }
}

/// Highest target voltage the emulated supply accepts
const VTARGET_MAX: f64 = 6.0;

/// Dummy AVR programmer
///
/// Emulates every memory of a part in memory for testing purposes.
pub struct DummyProgrammer {
    config: DummyConfig,
    signature: [u8; 3],
    memories: BTreeMap<String, Vec<u8>>,
    readonly: BTreeSet<String>,
    failing: BTreeSet<(String, u32)>,
    unreadable: BTreeSet<(String, u32)>,
    stuck: BTreeMap<(String, u32), u8>,
    write_attempts: usize,
    reset_high: bool,
    init_count: usize,
    led: bool,
    pins: BTreeMap<&'static str, bool>,
}

impl DummyProgrammer {
    /// Create a dummy programmer emulating `part`
    pub fn new(part: &Part, config: DummyConfig) -> Self {
        let mut memories = BTreeMap::new();
        let mut readonly = BTreeSet::new();

        for mem in &part.memories {
            let mut data = vec![0xFF; mem.size as usize];
            if mem.name == "signature" {
                for (dst, src) in data.iter_mut().zip(part.signature) {
                    *dst = src;
                }
            }
            memories.insert(mem.name.clone(), data);
            if mem.readonly {
                readonly.insert(mem.name.clone());
            }
        }

        Self {
            config,
            signature: part.signature,
            memories,
            readonly,
            failing: BTreeSet::new(),
            unreadable: BTreeSet::new(),
            stuck: BTreeMap::new(),
            write_attempts: 0,
            reset_high: false,
            init_count: 0,
            led: false,
            pins: BTreeMap::new(),
        }
    }

    /// Create a dummy programmer with every capability enabled
    pub fn new_default(part: &Part) -> Self {
        Self::new(part, DummyConfig::default())
    }

    /// Get the configuration (analog parameters reflect later setter calls)
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Get the contents of a memory
    pub fn memory(&self, name: &str) -> Option<&[u8]> {
        self.memories.get(name).map(Vec::as_slice)
    }

    /// Preload a memory with data starting at `addr`
    ///
    /// Bytes past the end of the memory are ignored.
    pub fn load(&mut self, name: &str, addr: u32, data: &[u8]) {
        if let Some(buf) = self.memories.get_mut(name) {
            let start = (addr as usize).min(buf.len());
            for (dst, src) in buf[start..].iter_mut().zip(data) {
                *dst = *src;
            }
        }
    }

    /// Make every write to `name[addr]` fail
    pub fn fail_write_at(&mut self, name: &str, addr: u32) {
        self.failing.insert((name.to_string(), addr));
    }

    /// Make every read of `name[addr]` fail
    pub fn fail_read_at(&mut self, name: &str, addr: u32) {
        self.unreadable.insert((name.to_string(), addr));
    }

    /// Force bits of `name[addr]` to stay set, so verification mismatches
    pub fn stick_bits(&mut self, name: &str, addr: u32, mask: u8) {
        self.stuck.insert((name.to_string(), addr), mask);
    }

    /// Number of `write_byte` calls so far
    pub fn write_attempts(&self) -> usize {
        self.write_attempts
    }

    /// Number of times the programmer was initialized
    pub fn init_count(&self) -> usize {
        self.init_count
    }

    /// Current RESET pin level
    pub fn reset_level(&self) -> bool {
        self.reset_high
    }

    /// Level last driven on a pin ("reset", "sck" or "mosi")
    pub fn pin_level(&self, name: &str) -> Option<bool> {
        self.pins.get(name).copied()
    }

    /// Whether the error LED is lit
    pub fn err_led_on(&self) -> bool {
        self.led
    }

    fn cell(&self, name: &str, addr: u32) -> u8 {
        self.memories
            .get(name)
            .and_then(|m| m.get(addr as usize))
            .copied()
            .unwrap_or(0xFF)
    }

    /// Answer one AVR serial-programming instruction
    fn isp_instruction(&self, cmd: [u8; 4]) -> [u8; 4] {
        let addr = u16::from_be_bytes([cmd[1], cmd[2]]) as u32;
        let data = match (cmd[0], cmd[1]) {
            (0xAC, 0x53) => cmd[2],
            (0x30, _) => self.signature.get((cmd[2] & 0x03) as usize).copied().unwrap_or(0xFF),
            (0x20, _) => self.cell("flash", addr * 2),
            (0x28, _) => self.cell("flash", addr * 2 + 1),
            (0xA0, _) => self.cell("eeprom", addr),
            (0x50, 0x00) => self.cell("lfuse", 0),
            (0x58, 0x08) => self.cell("hfuse", 0),
            (0x50, 0x08) => self.cell("efuse", 0),
            (0x58, 0x00) => self.cell("lock", 0),
            _ => 0x00,
        };
        [0x00, cmd[0], cmd[1], data]
    }

    fn require(&self, feature: ProgrammerFeatures) -> Result<()> {
        if self.config.features.contains(feature) {
            Ok(())
        } else {
            Err(Error::NotSupported)
        }
    }
}

impl Programmer for DummyProgrammer {
    fn name(&self) -> &str {
        "dummy"
    }

    fn features(&self) -> ProgrammerFeatures {
        self.config.features
    }

    fn initialize(&mut self, part: &Part) -> Result<()> {
        log::debug!("dummy: entering programming mode for {}", part.desc);
        self.reset_high = false;
        self.init_count += 1;
        Ok(())
    }

    fn read_byte(&mut self, _part: &Part, mem: &Memory, addr: u32) -> Result<u8> {
        let buf = self.memories.get(&mem.name).ok_or(Error::NotSupported)?;
        if self.unreadable.contains(&(mem.name.clone(), addr)) {
            return Err(Error::ReadFailed);
        }
        buf.get(addr as usize)
            .copied()
            .ok_or(Error::AddressOutOfBounds)
    }

    fn write_byte(&mut self, _part: &Part, mem: &Memory, addr: u32, value: u8) -> Result<()> {
        self.write_attempts += 1;

        if self.readonly.contains(&mem.name) {
            return Err(Error::NotSupported);
        }
        if self.failing.contains(&(mem.name.clone(), addr)) {
            return Err(Error::WriteFailed);
        }

        let mask = self.stuck.get(&(mem.name.clone(), addr)).copied().unwrap_or(0);
        let buf = self.memories.get_mut(&mem.name).ok_or(Error::NotSupported)?;
        let cell = buf.get_mut(addr as usize).ok_or(Error::AddressOutOfBounds)?;
        *cell = value | mask;
        Ok(())
    }

    fn chip_erase(&mut self, _part: &Part) -> Result<()> {
        for (name, buf) in self.memories.iter_mut() {
            if self.readonly.contains(name) || name.ends_with("fuse") {
                continue;
            }
            buf.fill(0xFF);
        }
        Ok(())
    }

    fn err_led(&mut self, on: bool) {
        self.led = on;
    }

    fn isp_command(&mut self, cmd: [u8; 4]) -> Result<[u8; 4]> {
        self.require(ProgrammerFeatures::ISP_COMMAND)?;
        if self.reset_high {
            return Err(Error::ProgrammerNotReady);
        }
        Ok(self.isp_instruction(cmd))
    }

    fn spi_transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<()> {
        self.require(ProgrammerFeatures::SPI)?;
        if tx.len() != rx.len() {
            return Err(Error::CommandFailed);
        }

        if let Ok(cmd) = <[u8; 4]>::try_from(tx) {
            rx.copy_from_slice(&self.isp_instruction(cmd));
        } else {
            // Plain shift register: each byte clocks out the previous one
            for (i, out) in rx.iter_mut().enumerate() {
                *out = if i == 0 { 0x00 } else { tx[i - 1] };
            }
        }
        Ok(())
    }

    fn set_pin(&mut self, pin: Pin, level: bool) -> Result<()> {
        self.require(ProgrammerFeatures::SET_PIN)?;
        let name = match pin {
            Pin::Reset => {
                self.reset_high = level;
                "reset"
            }
            Pin::Sck => "sck",
            Pin::Mosi => "mosi",
            Pin::Miso => return Err(Error::Rejected),
        };
        self.pins.insert(name, level);
        Ok(())
    }

    fn set_vtarget(&mut self, volts: f64) -> Result<()> {
        self.require(ProgrammerFeatures::VTARGET)?;
        if !(0.0..=VTARGET_MAX).contains(&volts) {
            return Err(Error::Rejected);
        }
        self.config.vtarget = volts;
        Ok(())
    }

    fn set_varef(&mut self, channel: u32, volts: f64) -> Result<()> {
        self.require(ProgrammerFeatures::VAREF)?;
        if volts < 0.0 || volts > self.config.vtarget {
            return Err(Error::Rejected);
        }
        let slot = self
            .config
            .varef
            .get_mut(channel as usize)
            .ok_or(Error::Rejected)?;
        *slot = volts;
        Ok(())
    }

    fn set_fosc(&mut self, hz: f64) -> Result<()> {
        self.require(ProgrammerFeatures::FOSC)?;
        if hz < 0.0 {
            return Err(Error::Rejected);
        }
        self.config.fosc = hz;
        Ok(())
    }

    fn set_sck_period(&mut self, seconds: f64) -> Result<()> {
        self.require(ProgrammerFeatures::SCK_PERIOD)?;
        if seconds <= 0.0 {
            return Err(Error::Rejected);
        }
        self.config.sck_period = seconds;
        Ok(())
    }

    fn parameters(&mut self) -> Result<Vec<Parameter>> {
        self.require(ProgrammerFeatures::PARAMETERS)?;
        let mut params = vec![Parameter::new("Vtarget", self.config.vtarget, "V")];
        for (i, v) in self.config.varef.iter().enumerate() {
            params.push(Parameter::new(format!("Varef {}", i), *v, "V"));
        }
        params.push(Parameter::new("Oscillator", self.config.fosc, "Hz"));
        params.push(Parameter::new(
            "SCK period",
            self.config.sck_period * 1e6,
            "us",
        ));
        Ok(params)
    }
}
