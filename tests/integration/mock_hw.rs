//! Mock hardware for integration tests.
//!
//! Expanders are plain byte latches the test drives directly; the clock is
//! stepped by hand; the broker and event sink record everything they see.

use std::cell::Cell;

use mhas::app::events::AppEvent;
use mhas::app::ports::{ClockPort, EventSink, InputExpanderPort, PublishPort, StatusLedPort};
use mhas::error::{CommsError, ExpanderError};
use mhas::time::WallTime;

// ── MockExpander ──────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MockExpander {
    pub present: bool,
    pub levels: u8,
    pub reads: usize,
    /// Pins whose `set_input_mode` fails.
    pub broken_pins: u8,
}

#[allow(dead_code)]
impl MockExpander {
    pub fn online() -> Self {
        Self { present: true, levels: 0, reads: 0, broken_pins: 0 }
    }

    pub fn offline() -> Self {
        Self { present: false, ..Self::online() }
    }

    pub fn set(&mut self, pin: u8, high: bool) {
        if high {
            self.levels |= 1 << pin;
        } else {
            self.levels &= !(1 << pin);
        }
    }
}

impl InputExpanderPort for MockExpander {
    fn read_pin(&mut self, pin: u8) -> Result<bool, ExpanderError> {
        if pin >= 8 {
            return Err(ExpanderError::InvalidPin(pin));
        }
        if !self.present {
            return Err(ExpanderError::NotPresent);
        }
        self.reads += 1;
        Ok(self.levels & (1 << pin) != 0)
    }

    fn set_input_mode(&mut self, pin: u8) -> Result<(), ExpanderError> {
        if pin >= 8 {
            return Err(ExpanderError::InvalidPin(pin));
        }
        if self.broken_pins & (1 << pin) != 0 {
            return Err(ExpanderError::NotPresent);
        }
        Ok(())
    }

    fn is_present(&self) -> bool {
        self.present
    }
}

// ── MockClock ─────────────────────────────────────────────────

pub struct MockClock {
    pub millis: Cell<u64>,
    pub wall: Cell<WallTime>,
    pub wall_reads: Cell<usize>,
}

#[allow(dead_code)]
impl MockClock {
    pub fn at(millis: u64) -> Self {
        Self {
            millis: Cell::new(millis),
            wall: Cell::new(WallTime(1_709_214_307)),
            wall_reads: Cell::new(0),
        }
    }

    pub fn set(&self, millis: u64) {
        self.millis.set(millis);
    }
}

impl ClockPort for MockClock {
    fn now_millis(&self) -> u64 {
        self.millis.get()
    }

    fn now_wall_time(&self) -> WallTime {
        self.wall_reads.set(self.wall_reads.get() + 1);
        self.wall.get()
    }
}

// ── RecordingBroker ───────────────────────────────────────────

#[derive(Default)]
pub struct RecordingBroker {
    pub messages: Vec<(String, String)>,
    /// Session still reported up, but every publish is rejected.
    pub offline: bool,
}

#[allow(dead_code)]
impl RecordingBroker {
    pub fn topics(&self) -> Vec<&str> {
        self.messages.iter().map(|(t, _)| t.as_str()).collect()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Last payload on `topic`, parsed.
    pub fn last_json(&self, topic: &str) -> Option<serde_json::Value> {
        self.messages
            .iter()
            .rev()
            .find(|(t, _)| t == topic)
            .and_then(|(_, p)| serde_json::from_str(p).ok())
    }
}

impl PublishPort for RecordingBroker {
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
        if self.offline {
            return Err(CommsError::MqttDisconnected);
        }
        let body = String::from_utf8(payload.to_vec()).map_err(|_| CommsError::MqttPublishFailed)?;
        self.messages.push((topic.to_owned(), body));
        Ok(())
    }
}

// ── RecordingSink / MockLed ───────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

#[derive(Default)]
pub struct MockLed {
    pub history: Vec<bool>,
}

impl StatusLedPort for MockLed {
    fn set_status_led(&mut self, on: bool) {
        self.history.push(on);
    }
}
