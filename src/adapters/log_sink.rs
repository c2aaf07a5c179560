//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the ESP-IDF
//! logger (UART / USB-CDC in production), one tagged line per event.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

fn flag(on: bool) -> &'static str {
    if on { "ON" } else { "off" }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { channels, bound } => {
                info!("START | channels={} bound={}", channels, bound);
            }
            AppEvent::ChannelUnbound { topic } => {
                warn!("UNBOUND | {} | expander offline, reporting inactive", topic);
            }
            AppEvent::Published { topic, reason, motion, tamper } => {
                info!(
                    "PUB | {} | {:?} | motion={} tamper={}",
                    topic,
                    reason,
                    flag(*motion),
                    flag(*tamper),
                );
            }
            AppEvent::PublishFailed { topic, error } => {
                warn!("PUBFAIL | {} | {}", topic, error);
            }
            AppEvent::EncodeFailed { topic, error } => {
                warn!("PUBFAIL | {} | {}", topic, error);
            }
            AppEvent::StatusLed(on) => {
                info!("LED | {}", flag(*on));
            }
        }
    }
}
