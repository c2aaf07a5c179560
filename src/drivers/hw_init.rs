//! One-shot hardware peripheral initialization and the shared I²C handle.
//!
//! Configures the I²C master used by the PCF8574 expanders and the DS3231,
//! plus the status-LED GPIO, using raw ESP-IDF sys calls. Called once from
//! `main()` before the driver loop starts.
//!
//! [`SysI2c`] is a `Copy` handle onto the installed legacy I²C driver and
//! implements `embedded_hal::i2c::I2c`, so every device driver on the bus
//! can own its own handle. On host targets it is backed by simulated input
//! bytes per expander address.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation, SevenBitAddress};

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    I2cConfigFailed(i32),
    I2cInstallFailed(i32),
    GpioConfigFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::I2cConfigFailed(rc)  => write!(f, "I2C param config failed (rc={})", rc),
            Self::I2cInstallFailed(rc) => write!(f, "I2C driver install failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
        }
    }
}

impl From<HwInitError> for crate::error::Error {
    fn from(_: HwInitError) -> Self {
        Self::Init("peripheral init failed")
    }
}

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the driver loop; single-threaded.
    unsafe {
        init_i2c()?;
        init_gpio_outputs()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── I²C master ────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_i2c() -> Result<(), HwInitError> {
    let cfg = i2c_config_t {
        mode: i2c_mode_t_I2C_MODE_MASTER,
        sda_io_num: pins::I2C_SDA_GPIO,
        sda_pullup_en: true,
        scl_io_num: pins::I2C_SCL_GPIO,
        scl_pullup_en: true,
        __bindgen_anon_1: i2c_config_t__bindgen_ty_1 {
            master: i2c_config_t__bindgen_ty_1__bindgen_ty_1 {
                clk_speed: pins::I2C_FREQ_HZ,
            },
        },
        ..Default::default()
    };

    let ret = unsafe { i2c_param_config(pins::I2C_PORT, &cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::I2cConfigFailed(ret)); }

    let ret = unsafe { i2c_driver_install(pins::I2C_PORT, i2c_mode_t_I2C_MODE_MASTER, 0, 0, 0) };
    if ret != ESP_OK as i32 { return Err(HwInitError::I2cInstallFailed(ret)); }

    info!(
        "hw_init: I2C{} master SDA={} SCL={} @ {} Hz",
        pins::I2C_PORT, pins::I2C_SDA_GPIO, pins::I2C_SCL_GPIO, pins::I2C_FREQ_HZ
    );
    Ok(())
}

/// Handle onto the installed I²C master.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SysI2c {
    port: i32,
}

impl SysI2c {
    /// Only valid after [`init_peripherals`] succeeded.
    pub const fn new(port: i32) -> Self {
        Self { port }
    }

    pub fn port(&self) -> i32 {
        self.port
    }

    #[cfg(target_os = "espidf")]
    fn ticks() -> TickType_t {
        (crate::pins::I2C_TIMEOUT_MS * configTICK_RATE_HZ / 1000).max(1) as TickType_t
    }

    #[cfg(target_os = "espidf")]
    fn check(ret: esp_err_t) -> Result<(), ErrorKind> {
        if ret == ESP_OK as i32 {
            Ok(())
        } else if ret == ESP_FAIL {
            // The legacy driver reports a missing ACK as a generic failure.
            Err(ErrorKind::NoAcknowledge(embedded_hal::i2c::NoAcknowledgeSource::Unknown))
        } else {
            Err(ErrorKind::Other)
        }
    }

    #[cfg(target_os = "espidf")]
    fn read_raw(&mut self, address: u8, buf: &mut [u8]) -> Result<(), ErrorKind> {
        // SAFETY: the driver for `self.port` was installed in init_i2c();
        // the buffer pointer/length come from a live mutable slice.
        let ret = unsafe {
            i2c_master_read_from_device(self.port, address, buf.as_mut_ptr(), buf.len(), Self::ticks())
        };
        Self::check(ret)
    }

    #[cfg(target_os = "espidf")]
    fn write_raw(&mut self, address: u8, bytes: &[u8]) -> Result<(), ErrorKind> {
        // SAFETY: as above; the driver only reads from `bytes`.
        let ret = unsafe {
            i2c_master_write_to_device(self.port, address, bytes.as_ptr(), bytes.len(), Self::ticks())
        };
        Self::check(ret)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_raw(&mut self, address: u8, buf: &mut [u8]) -> Result<(), ErrorKind> {
        let level = sim::inputs(address)?;
        buf.fill(level);
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_raw(&mut self, address: u8, _bytes: &[u8]) -> Result<(), ErrorKind> {
        sim::inputs(address).map(|_| ())
    }
}

impl ErrorType for SysI2c {
    type Error = ErrorKind;
}

impl I2c<SevenBitAddress> for SysI2c {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        // Each operation is issued as its own bus transfer. Neither device
        // on this bus needs a repeated start between pointer write and read.
        for op in operations {
            match op {
                Operation::Read(buf) => self.read_raw(address, buf)?,
                Operation::Write(bytes) => self.write_raw(address, bytes)?,
            }
        }
        Ok(())
    }
}

/// Host simulation of the expander inputs. Addresses 0x20–0x27 answer
/// when marked present; everything else NACKs.
#[cfg(not(target_os = "espidf"))]
pub mod sim {
    use core::sync::atomic::{AtomicU8, Ordering};

    use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

    const BASE: u8 = 0x20;

    static SIM_INPUTS: [AtomicU8; 8] = [const { AtomicU8::new(0) }; 8];
    static SIM_PRESENT: AtomicU8 = AtomicU8::new(0);

    fn slot(address: u8) -> Option<usize> {
        address.checked_sub(BASE).filter(|i| *i < 8).map(usize::from)
    }

    pub fn sim_set_present(address: u8, present: bool) {
        if let Some(i) = slot(address) {
            if present {
                SIM_PRESENT.fetch_or(1 << i, Ordering::Relaxed);
            } else {
                SIM_PRESENT.fetch_and(!(1 << i), Ordering::Relaxed);
            }
        }
    }

    pub fn sim_set_inputs(address: u8, levels: u8) {
        if let Some(i) = slot(address) {
            SIM_INPUTS[i].store(levels, Ordering::Relaxed);
        }
    }

    pub(super) fn inputs(address: u8) -> Result<u8, ErrorKind> {
        match slot(address) {
            Some(i) if SIM_PRESENT.load(Ordering::Relaxed) & (1 << i) != 0 => {
                Ok(SIM_INPUTS[i].load(Ordering::Relaxed))
            }
            _ => Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)),
        }
    }
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::STATUS_LED_GPIO,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
    // Active-low LED: start dark.
    unsafe { gpio_set_level(pins::STATUS_LED_GPIO, 1) };

    info!("hw_init: GPIO outputs configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin;
    // pin was validated during init_gpio_outputs(). Main-loop only.
    unsafe { gpio_set_level(pin, if high { 1 } else { 0 }); }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}
