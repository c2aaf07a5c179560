//! On-board status LED.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives an active-low GPIO via hw_init.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::pins;

pub struct StatusLed {
    gpio: i32,
    on: bool,
}

impl Default for StatusLed {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusLed {
    pub fn new() -> Self {
        Self {
            gpio: pins::STATUS_LED_GPIO,
            on: false,
        }
    }

    pub fn set(&mut self, on: bool) {
        // Active low: driving the pin LOW lights the LED.
        hw_init::gpio_write(self.gpio, !on);
        self.on = on;
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
