//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the expander array and the status LED, exposing them through
//! [`ExpanderBank`] and [`StatusLedPort`]. Channels never own an expander;
//! they borrow one from this adapter for each bind or sample.

use log::{info, warn};

use crate::app::ports::{ExpanderBank, ExpanderId, StatusLedPort};
use crate::drivers::pcf8574::Pcf8574;
use crate::drivers::status_led::StatusLed;
use embedded_hal::i2c::I2c;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<I2C, const N: usize> {
    expanders: [Pcf8574<I2C>; N],
    led: StatusLed,
}

impl<I2C: I2c + Clone, const N: usize> HardwareAdapter<I2C, N> {
    /// One expander per address, all sharing clones of `i2c`.
    pub fn new(i2c: I2C, addresses: [u8; N], led: StatusLed) -> Self {
        Self {
            expanders: addresses.map(|addr| Pcf8574::new(i2c.clone(), addr)),
            led,
        }
    }
}

impl<I2C: I2c, const N: usize> HardwareAdapter<I2C, N> {
    /// Probe every expander. Absent devices stay offline; channels bound to
    /// them are left unbound. Returns how many answered.
    pub fn begin(&mut self) -> usize {
        let mut online = 0;
        for (i, dev) in self.expanders.iter_mut().enumerate() {
            match dev.begin() {
                Ok(()) => {
                    info!("Init sensors block {} ({:#04x})... OK", i + 1, dev.address());
                    online += 1;
                }
                Err(e) => warn!("Init sensors block {} ({:#04x})... KO: {}", i + 1, dev.address(), e),
            }
        }
        online
    }
}

// ── ExpanderBank implementation ───────────────────────────────

impl<I2C: I2c, const N: usize> ExpanderBank for HardwareAdapter<I2C, N> {
    type Port = Pcf8574<I2C>;

    fn port(&mut self, id: ExpanderId) -> Option<&mut Self::Port> {
        self.expanders[..].port(id)
    }
}

// ── StatusLedPort implementation ──────────────────────────────

impl<I2C, const N: usize> StatusLedPort for HardwareAdapter<I2C, N> {
    fn set_status_led(&mut self, on: bool) {
        self.led.set(on);
    }
}
