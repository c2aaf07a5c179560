//! ESP32 clock adapter.
//!
//! Implements [`ClockPort`]:
//!
//! - monotonic uptime from `esp_timer_get_time()` on **`target_os = "espidf"`**,
//!   or `std::time::Instant` on host;
//! - wall time from the DS3231, which is seeded once from NTP at boot
//!   ([`Esp32Clock::sync_at_boot`]).
//!
//! At boot NTP is preferred. Without it the RTC is trusted only if its
//! oscillator never stopped; otherwise there is no valid time source.
//!
//! A failed RTC read falls back to the last good reading advanced by the
//! elapsed uptime, so a glitch on the bus never stalls publication.

use core::cell::{Cell, RefCell};

use embedded_hal::i2c::I2c;
use log::{error, info, warn};

use crate::app::ports::ClockPort;
use crate::drivers::ds3231::Ds3231;
use crate::error::ClockError;
use crate::time::WallTime;

pub struct Esp32Clock<I2C> {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
    rtc: RefCell<Ds3231<I2C>>,
    /// Last good RTC reading and the uptime (ms) it was taken at.
    last_good: Cell<(WallTime, u64)>,
}

impl<I2C: I2c> Esp32Clock<I2C> {
    /// Wrap an RTC that already answered [`Ds3231::begin`].
    pub fn new(rtc: Ds3231<I2C>) -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
            rtc: RefCell::new(rtc),
            last_good: Cell::new((WallTime::default(), 0)),
        }
    }

    /// Seed the RTC from NTP. Blocks up to `timeout_ms`.
    #[cfg(target_os = "espidf")]
    pub fn sync_from_ntp(&self, timeout_ms: u32) -> Result<WallTime, ClockError> {
        use esp_idf_svc::sntp::{EspSntp, SyncStatus};

        let sntp = EspSntp::new_default().map_err(|_| ClockError::NtpSyncTimeout)?;
        let mut waited = 0;
        while sntp.get_sync_status() != SyncStatus::Completed {
            if waited >= timeout_ms {
                return Err(ClockError::NtpSyncTimeout);
            }
            esp_idf_hal::delay::FreeRtos::delay_ms(100);
            waited += 100;
        }

        let secs = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_err(|_| ClockError::NtpSyncTimeout)?
            .as_secs() as i64;
        self.seed(WallTime::from_unix_secs(secs))
    }

    /// Host: the system clock stands in for NTP.
    #[cfg(not(target_os = "espidf"))]
    pub fn sync_from_ntp(&self, _timeout_ms: u32) -> Result<WallTime, ClockError> {
        let secs = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_err(|_| ClockError::NtpSyncTimeout)?
            .as_secs() as i64;
        self.seed(WallTime::from_unix_secs(secs))
    }

    /// Establish wall time at boot: NTP if it answers within `timeout_ms`,
    /// else the RTC as long as it kept time. Fails with
    /// [`ClockError::RtcInvalidTime`] when neither is usable.
    pub fn sync_at_boot(&self, timeout_ms: u32) -> Result<WallTime, ClockError> {
        let ntp = self.sync_from_ntp(timeout_ms);
        self.settle_boot_time(ntp)
    }

    fn settle_boot_time(&self, ntp: Result<WallTime, ClockError>) -> Result<WallTime, ClockError> {
        let e = match ntp {
            Ok(t) => return Ok(t),
            Err(e) => e,
        };
        // Unreadable status counts as lost power.
        if self.rtc.borrow_mut().lost_power().unwrap_or(true) {
            error!("NTP sync failed ({}) and RTC lost power", e);
            return Err(ClockError::RtcInvalidTime);
        }
        error!("NTP sync failed ({}), keeping RTC time", e);
        Ok(self.now_wall_time())
    }

    /// Write `t` into the RTC.
    pub fn seed(&self, t: WallTime) -> Result<WallTime, ClockError> {
        self.rtc.borrow_mut().adjust(t)?;
        self.last_good.set((t, self.uptime_ms()));
        info!("RTC adjusted to {}", t.to_iso8601());
        Ok(t)
    }

    #[cfg(target_os = "espidf")]
    fn uptime_ms(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1000
    }

    #[cfg(not(target_os = "espidf"))]
    fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl<I2C: I2c> ClockPort for Esp32Clock<I2C> {
    fn now_millis(&self) -> u64 {
        self.uptime_ms()
    }

    fn now_wall_time(&self) -> WallTime {
        let now_ms = self.uptime_ms();
        match self.rtc.borrow_mut().now() {
            Ok(t) => {
                self.last_good.set((t, now_ms));
                t
            }
            Err(e) => {
                let (t, at) = self.last_good.get();
                warn!("RTC read failed ({}), extrapolating from last good time", e);
                WallTime::from_unix_secs(t.unix_secs() + (now_ms.saturating_sub(at) / 1000) as i64)
            }
        }
    }
}
