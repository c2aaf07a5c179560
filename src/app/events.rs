//! Outbound application events.
//!
//! The [`AlarmService`](super::service::AlarmService) emits these through
//! the [`EventSink`](super::ports::EventSink) port. Adapters on the other
//! side decide what to do with them (serial log, diagnostics topic, ...).

use crate::error::{CodecError, CommsError};
use crate::sensors::PublishReason;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The service has started.
    Started { channels: usize, bound: usize },

    /// A configured channel has no live expander and will be skipped.
    ChannelUnbound { topic: &'static str },

    /// A channel state message was handed to the broker.
    Published {
        topic: &'static str,
        reason: PublishReason,
        motion: bool,
        tamper: bool,
    },

    /// The broker rejected or could not accept a message.
    PublishFailed { topic: &'static str, error: CommsError },

    /// A payload could not be rendered.
    EncodeFailed { topic: &'static str, error: CodecError },

    /// The status LED was switched by a command.
    StatusLed(bool),
}
