//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AlarmService (domain)
//! ```
//!
//! Driven adapters (expanders, clock, MQTT, event sinks, status LED)
//! implement these traits. The [`AlarmService`](super::service::AlarmService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use crate::error::{CommsError, ExpanderError};
use crate::time::WallTime;

// ───────────────────────────────────────────────────────────────
// Input expander port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// One addressable digital-input expander.
pub trait InputExpanderPort {
    /// Read the logic level of `pin` (`true` = HIGH).
    fn read_pin(&mut self, pin: u8) -> Result<bool, ExpanderError>;

    /// Configure `pin` as a pulled-up digital input.
    fn set_input_mode(&mut self, pin: u8) -> Result<(), ExpanderError>;

    /// Whether the device answered during bring-up.
    fn is_present(&self) -> bool {
        true
    }
}

/// Opaque handle selecting one expander within an [`ExpanderBank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExpanderId(pub u8);

/// Resolves [`ExpanderId`] handles to live expanders.
///
/// The bank is owned by the top-level assembly; channels only borrow a
/// port for the duration of a bind or a sample.
pub trait ExpanderBank {
    type Port: InputExpanderPort + ?Sized;

    /// The expander behind `id`, or `None` if it is absent.
    fn port(&mut self, id: ExpanderId) -> Option<&mut Self::Port>;
}

impl<P: InputExpanderPort> ExpanderBank for [P] {
    type Port = P;

    fn port(&mut self, id: ExpanderId) -> Option<&mut P> {
        self.get_mut(id.0 as usize).filter(|p| p.is_present())
    }
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

pub trait ClockPort {
    /// Milliseconds since boot (monotonic).
    fn now_millis(&self) -> u64;

    /// RTC-backed wall-clock time.
    fn now_wall_time(&self) -> WallTime;
}

// ───────────────────────────────────────────────────────────────
// Publish port (driven adapter: domain → message broker)
// ───────────────────────────────────────────────────────────────

/// Best-effort message publication. The core never retries; a failed
/// publish is superseded by the next change or heartbeat.
pub trait PublishPort {
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError>;

    /// Whether a broker session is up. The service does not sample while
    /// this is false.
    fn is_connected(&self) -> bool {
        true
    }
}

// ───────────────────────────────────────────────────────────────
// Status LED port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

pub trait StatusLedPort {
    fn set_status_led(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from configuration validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
        }
    }
}
