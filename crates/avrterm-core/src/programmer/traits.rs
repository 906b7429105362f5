//! Programmer trait definitions

use alloc::{string::String, vec::Vec};
use bitflags::bitflags;
use core::fmt;

use crate::error::{Error, Result};
use crate::part::{Memory, Part};

bitflags! {
    /// Programmer capability flags
    ///
    /// Operations whose flag is missing are reported as unsupported instead
    /// of being attempted.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ProgrammerFeatures: u32 {
        /// Can send raw 4-byte ISP instructions
        const ISP_COMMAND = 1 << 0;
        /// Has a direct SPI mode with variable-length transfers
        const SPI         = 1 << 1;
        /// Can drive individual pins (used to enter/leave SPI mode)
        const SET_PIN     = 1 << 2;
        /// Can set the target supply voltage
        const VTARGET     = 1 << 3;
        /// Can set analog reference voltages
        const VAREF       = 1 << 4;
        /// Can generate a target oscillator clock
        const FOSC        = 1 << 5;
        /// Can change the ISP clock period
        const SCK_PERIOD  = 1 << 6;
        /// Can report its parameters
        const PARAMETERS  = 1 << 7;
        /// Has an error indicator LED
        const ERR_LED     = 1 << 8;
    }
}

impl Default for ProgrammerFeatures {
    fn default() -> Self {
        ProgrammerFeatures::empty()
    }
}

/// Programmer pins that can be driven directly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pin {
    /// Target RESET line
    Reset,
    /// Serial clock
    Sck,
    /// Programmer to target data
    Mosi,
    /// Target to programmer data
    Miso,
}

/// A named programmer parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Parameter name (e.g. "Vtarget")
    pub name: String,
    /// Current value
    pub value: f64,
    /// Unit suffix, empty when unitless
    pub unit: &'static str,
}

impl Parameter {
    /// Create a parameter
    pub fn new(name: impl Into<String>, value: f64, unit: &'static str) -> Self {
        Self {
            name: name.into(),
            value,
            unit,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<14}: {}", self.name, self.value)?;
        if !self.unit.is_empty() {
            write!(f, " {}", self.unit)?;
        }
        Ok(())
    }
}

/// Programmer driver
///
/// Only the byte-level memory operations are mandatory. Every optional
/// operation defaults to [`Error::NotSupported`]; callers check
/// [`Programmer::features`] first so that the default is never reached for
/// an advertised capability.
pub trait Programmer {
    /// Name of the programmer (e.g. "dummy")
    fn name(&self) -> &str;

    /// Capabilities this programmer has
    fn features(&self) -> ProgrammerFeatures;

    /// Put the target into programming mode
    fn initialize(&mut self, part: &Part) -> Result<()>;

    /// Read one byte of a memory
    fn read_byte(&mut self, part: &Part, mem: &Memory, addr: u32) -> Result<u8>;

    /// Write one byte of a memory
    fn write_byte(&mut self, part: &Part, mem: &Memory, addr: u32, value: u8) -> Result<()>;

    /// Erase the whole chip
    fn chip_erase(&mut self, part: &Part) -> Result<()>;

    /// Switch the error LED on or off
    fn err_led(&mut self, _on: bool) {}

    /// Send a raw 4-byte ISP instruction and return the 4 response bytes
    fn isp_command(&mut self, _cmd: [u8; 4]) -> Result<[u8; 4]> {
        Err(Error::NotSupported)
    }

    /// Full-duplex SPI transfer; `rx` has the same length as `tx`
    fn spi_transfer(&mut self, _tx: &[u8], _rx: &mut [u8]) -> Result<()> {
        Err(Error::NotSupported)
    }

    /// Drive a pin high (`true`) or low
    fn set_pin(&mut self, _pin: Pin, _level: bool) -> Result<()> {
        Err(Error::NotSupported)
    }

    /// Set the target supply voltage in volts
    fn set_vtarget(&mut self, _volts: f64) -> Result<()> {
        Err(Error::NotSupported)
    }

    /// Set an analog reference voltage in volts
    fn set_varef(&mut self, _channel: u32, _volts: f64) -> Result<()> {
        Err(Error::NotSupported)
    }

    /// Set the oscillator frequency in Hz, 0 switches it off
    fn set_fosc(&mut self, _hz: f64) -> Result<()> {
        Err(Error::NotSupported)
    }

    /// Set the ISP clock period in seconds
    fn set_sck_period(&mut self, _seconds: f64) -> Result<()> {
        Err(Error::NotSupported)
    }

    /// Report programmer parameters
    fn parameters(&mut self) -> Result<Vec<Parameter>> {
        Err(Error::NotSupported)
    }
}

// Blanket impl for boxed programmers so the binary can pick one at runtime
impl<P: Programmer + ?Sized> Programmer for alloc::boxed::Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn features(&self) -> ProgrammerFeatures {
        (**self).features()
    }

    fn initialize(&mut self, part: &Part) -> Result<()> {
        (**self).initialize(part)
    }

    fn read_byte(&mut self, part: &Part, mem: &Memory, addr: u32) -> Result<u8> {
        (**self).read_byte(part, mem, addr)
    }

    fn write_byte(&mut self, part: &Part, mem: &Memory, addr: u32, value: u8) -> Result<()> {
        (**self).write_byte(part, mem, addr, value)
    }

    fn chip_erase(&mut self, part: &Part) -> Result<()> {
        (**self).chip_erase(part)
    }

    fn err_led(&mut self, on: bool) {
        (**self).err_led(on)
    }

    fn isp_command(&mut self, cmd: [u8; 4]) -> Result<[u8; 4]> {
        (**self).isp_command(cmd)
    }

    fn spi_transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<()> {
        (**self).spi_transfer(tx, rx)
    }

    fn set_pin(&mut self, pin: Pin, level: bool) -> Result<()> {
        (**self).set_pin(pin, level)
    }

    fn set_vtarget(&mut self, volts: f64) -> Result<()> {
        (**self).set_vtarget(volts)
    }

    fn set_varef(&mut self, channel: u32, volts: f64) -> Result<()> {
        (**self).set_varef(channel, volts)
    }

    fn set_fosc(&mut self, hz: f64) -> Result<()> {
        (**self).set_fosc(hz)
    }

    fn set_sck_period(&mut self, seconds: f64) -> Result<()> {
        (**self).set_sck_period(seconds)
    }

    fn parameters(&mut self) -> Result<Vec<Parameter>> {
        (**self).parameters()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_features_from_name() {
        assert_eq!(
            ProgrammerFeatures::from_name("SPI"),
            Some(ProgrammerFeatures::SPI)
        );
        assert_eq!(ProgrammerFeatures::from_name("spi"), None);
    }

    #[test]
    fn test_parameter_display() {
        assert_eq!(
            Parameter::new("Vtarget", 5.0, "V").to_string(),
            "Vtarget       : 5 V"
        );
        assert_eq!(
            Parameter::new("count", 3.0, "").to_string(),
            "count         : 3"
        );
    }
}
