//! DS3231 battery-backed real-time clock.
//!
//! Timekeeping registers 0x00–0x06 hold seconds..year in BCD. The chip is
//! kept in 24-hour mode and UTC; the century bit is ignored, so the usable
//! range is 2000–2099. Bit 7 of the status register (OSF) is set whenever
//! the oscillator stopped, i.e. the stored time cannot be trusted.

use embedded_hal::i2c::I2c;

use crate::error::ClockError;
use crate::time::{CalendarTime, WallTime};

const REG_SECONDS: u8 = 0x00;
const REG_STATUS: u8 = 0x0F;
const STATUS_OSF: u8 = 0x80;
const HOUR_12H_MODE: u8 = 0x40;
const HOUR_PM: u8 = 0x20;

pub struct Ds3231<I2C> {
    i2c: I2C,
    address: u8,
}

fn bcd2bin(v: u8) -> u8 {
    (v >> 4) * 10 + (v & 0x0F)
}

fn bin2bcd(v: u8) -> u8 {
    ((v / 10) << 4) | (v % 10)
}

impl<I2C: I2c> Ds3231<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    fn read_regs(&mut self, start: u8, buf: &mut [u8]) -> Result<(), ClockError> {
        self.i2c
            .write_read(self.address, &[start], buf)
            .map_err(|_| ClockError::RtcNotFound)
    }

    fn write_regs(&mut self, data: &[u8]) -> Result<(), ClockError> {
        self.i2c
            .write(self.address, data)
            .map_err(|_| ClockError::RtcNotFound)
    }

    /// Check the chip answers on the bus.
    pub fn begin(&mut self) -> Result<(), ClockError> {
        let mut status = [0u8; 1];
        self.read_regs(REG_STATUS, &mut status)
    }

    /// Oscillator stopped since the time was last set.
    pub fn lost_power(&mut self) -> Result<bool, ClockError> {
        let mut status = [0u8; 1];
        self.read_regs(REG_STATUS, &mut status)?;
        Ok(status[0] & STATUS_OSF != 0)
    }

    pub fn now(&mut self) -> Result<WallTime, ClockError> {
        let mut r = [0u8; 7];
        self.read_regs(REG_SECONDS, &mut r)?;

        let hour = if r[2] & HOUR_12H_MODE != 0 {
            let h12 = bcd2bin(r[2] & 0x1F) % 12;
            if r[2] & HOUR_PM != 0 { h12 + 12 } else { h12 }
        } else {
            bcd2bin(r[2] & 0x3F)
        };

        let cal = CalendarTime {
            year: 2000 + u16::from(bcd2bin(r[6])),
            month: bcd2bin(r[5] & 0x1F),
            day: bcd2bin(r[4] & 0x3F),
            hour,
            minute: bcd2bin(r[1] & 0x7F),
            second: bcd2bin(r[0] & 0x7F),
        };
        WallTime::from_calendar(cal).ok_or(ClockError::RtcInvalidTime)
    }

    /// Set the clock and clear the oscillator-stop flag.
    pub fn adjust(&mut self, t: WallTime) -> Result<(), ClockError> {
        let c = t.to_calendar();
        if !(2000..=2099).contains(&c.year) {
            return Err(ClockError::OutOfRange);
        }
        // Day-of-week register is 1..=7 with Sunday = 1; 1970-01-01 was a Thursday.
        let dow = (t.unix_secs().div_euclid(86_400) + 4).rem_euclid(7) as u8 + 1;

        self.write_regs(&[
            REG_SECONDS,
            bin2bcd(c.second),
            bin2bcd(c.minute),
            bin2bcd(c.hour),
            dow,
            bin2bcd(c.day),
            bin2bcd(c.month),
            bin2bcd((c.year - 2000) as u8),
        ])?;

        let mut status = [0u8; 1];
        self.read_regs(REG_STATUS, &mut status)?;
        self.write_regs(&[REG_STATUS, status[0] & !STATUS_OSF])
    }
}
