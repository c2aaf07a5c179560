//! Inbound commands to the application service.
//!
//! Commands arrive as raw payloads on the MQTT command topic and are
//! interpreted by the [`AlarmService`](super::service::AlarmService).

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Switch the on-board status LED.
    SetStatusLed(bool),
}

/// Decode a command-topic payload. The first byte `'1'` switches the LED
/// on, any other byte switches it off; an empty payload is ignored.
pub fn parse_command(payload: &[u8]) -> Option<AppCommand> {
    let first = *payload.first()?;
    Some(AppCommand::SetStatusLed(first == b'1'))
}
