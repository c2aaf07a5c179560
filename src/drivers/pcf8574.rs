//! PCF8574 8-bit quasi-bidirectional I/O expander.
//!
//! The chip has no direction register: writing `1` to a pin enables its
//! weak pull-up and lets an external device pull it low, so "input mode"
//! means setting that bit in the output latch. Reading returns the live
//! level of all eight pins in one byte.

use embedded_hal::i2c::{Error as _, I2c};
use log::debug;

use crate::app::ports::InputExpanderPort;
use crate::error::ExpanderError;

pub struct Pcf8574<I2C> {
    i2c: I2C,
    address: u8,
    /// Last value written to the output latch.
    latch: u8,
    present: bool,
}

impl<I2C: I2c> Pcf8574<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            latch: 0xFF,
            present: false,
        }
    }

    /// Probe the device by writing the latch (all pins high).
    pub fn begin(&mut self) -> Result<(), ExpanderError> {
        match self.i2c.write(self.address, &[self.latch]) {
            Ok(()) => {
                self.present = true;
                Ok(())
            }
            Err(e) => {
                self.present = false;
                Err(ExpanderError::Bus(e.kind()))
            }
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn latch(&self) -> u8 {
        self.latch
    }

    /// Read all eight pin levels.
    pub fn read_port(&mut self) -> Result<u8, ExpanderError> {
        if !self.present {
            return Err(ExpanderError::NotPresent);
        }
        let mut buf = [0u8; 1];
        self.i2c
            .read(self.address, &mut buf)
            .map_err(|e| ExpanderError::Bus(e.kind()))?;
        Ok(buf[0])
    }
}

fn check_pin(pin: u8) -> Result<u8, ExpanderError> {
    if pin < 8 { Ok(1 << pin) } else { Err(ExpanderError::InvalidPin(pin)) }
}

impl<I2C: I2c> InputExpanderPort for Pcf8574<I2C> {
    fn read_pin(&mut self, pin: u8) -> Result<bool, ExpanderError> {
        let mask = check_pin(pin)?;
        Ok(self.read_port()? & mask != 0)
    }

    fn set_input_mode(&mut self, pin: u8) -> Result<(), ExpanderError> {
        let mask = check_pin(pin)?;
        if !self.present {
            return Err(ExpanderError::NotPresent);
        }
        let latch = self.latch | mask;
        self.i2c
            .write(self.address, &[latch])
            .map_err(|e| ExpanderError::Bus(e.kind()))?;
        self.latch = latch;
        debug!("pcf8574@{:#04x}: P{} input (latch {:#010b})", self.address, pin, latch);
        Ok(())
    }

    fn is_present(&self) -> bool {
        self.present
    }
}
