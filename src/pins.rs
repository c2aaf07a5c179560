//! GPIO / bus assignments for the MHAS controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers or bus addresses.

// ---------------------------------------------------------------------------
// I²C bus (PCF8574 expanders + DS3231 RTC)
// ---------------------------------------------------------------------------

/// ESP-IDF I²C controller used for the sensor bus.
pub const I2C_PORT: i32 = 0;
pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
/// Standard-mode clock. PCF8574 is specified up to 100 kHz.
pub const I2C_FREQ_HZ: u32 = 100_000;
/// Per-transfer timeout.
pub const I2C_TIMEOUT_MS: u32 = 50;

/// PCF8574 addresses, one per sensor block (A2..A0 strapped 000, 001, 010).
pub const EXPANDER_ADDRESSES: [u8; 3] = [0x20, 0x21, 0x22];

/// DS3231 fixed address.
pub const RTC_ADDRESS: u8 = 0x68;

// ---------------------------------------------------------------------------
// Expander pin handles
// ---------------------------------------------------------------------------

pub const P0: u8 = 0;
pub const P1: u8 = 1;
pub const P2: u8 = 2;
pub const P3: u8 = 3;
pub const P4: u8 = 4;
pub const P5: u8 = 5;
pub const P6: u8 = 6;
pub const P7: u8 = 7;

// ---------------------------------------------------------------------------
// Status LED
// ---------------------------------------------------------------------------

/// On-board LED, active LOW.
pub const STATUS_LED_GPIO: i32 = 2;
