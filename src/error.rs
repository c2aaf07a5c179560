//! Unified error types for the MHAS firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping
//! bring-up error handling uniform. All variants are `Copy` so they can be
//! passed through the event sink and the publish path without allocation.
//!
//! Nothing in the sampling/publish core is fatal: these errors are logged
//! and absorbed to fail-safe defaults. Only bring-up in `main` escalates.

use core::fmt;

use embedded_hal::i2c::ErrorKind;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An I/O expander could not be configured or read.
    Expander(ExpanderError),
    /// A communication subsystem failed.
    Comms(CommsError),
    /// The real-time clock or its NTP seed is unavailable.
    Clock(ClockError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expander(e) => write!(f, "expander: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Clock(e) => write!(f, "clock: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Expander errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpanderError {
    /// Pin index outside 0..8.
    InvalidPin(u8),
    /// The device did not answer its address during `begin()`.
    NotPresent,
    /// The I²C transfer failed.
    Bus(ErrorKind),
}

impl fmt::Display for ExpanderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPin(pin) => write!(f, "invalid pin P{pin}"),
            Self::NotPresent => write!(f, "device not present"),
            Self::Bus(kind) => write!(f, "I2C bus error: {kind}"),
        }
    }
}

impl From<ExpanderError> for Error {
    fn from(e: ExpanderError) -> Self {
        Self::Expander(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    WifiConnectFailed,
    WifiDisconnected,
    MqttConnectFailed,
    MqttDisconnected,
    MqttPublishFailed,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WifiConnectFailed => write!(f, "WiFi connect failed"),
            Self::WifiDisconnected => write!(f, "WiFi disconnected"),
            Self::MqttConnectFailed => write!(f, "MQTT connect failed"),
            Self::MqttDisconnected => write!(f, "MQTT session not connected"),
            Self::MqttPublishFailed => write!(f, "MQTT publish failed"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

// ---------------------------------------------------------------------------
// Clock errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockError {
    /// The DS3231 did not respond on the bus.
    RtcNotFound,
    /// The RTC returned register values that are not a valid date.
    RtcInvalidTime,
    /// SNTP did not complete within the boot timeout.
    NtpSyncTimeout,
    /// Wall time outside the range the RTC can hold (2000–2099).
    OutOfRange,
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RtcNotFound => write!(f, "RTC not found"),
            Self::RtcInvalidTime => write!(f, "RTC holds an invalid time"),
            Self::NtpSyncTimeout => write!(f, "NTP sync timed out"),
            Self::OutOfRange => write!(f, "time out of RTC range"),
        }
    }
}

impl From<ClockError> for Error {
    fn from(e: ClockError) -> Self {
        Self::Clock(e)
    }
}

// ---------------------------------------------------------------------------
// Codec errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// The payload could not be serialised.
    Serialize,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serialize => write!(f, "payload serialisation failed"),
        }
    }
}
