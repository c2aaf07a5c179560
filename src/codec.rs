//! Wire payload for channel state messages.
//!
//! ```json
//! {"motion":false,"tamper":true,"time":"2024-02-29T13:45:07"}
//! ```
//!
//! Field names and presence are the contract with broker-side consumers.

use serde::Serialize;

use crate::error::CodecError;
use crate::sensors::SensorChannel;
use crate::time::WallTime;

#[derive(Debug, Serialize)]
struct StatePayload<'a> {
    motion: bool,
    tamper: bool,
    time: &'a str,
}

/// Render `channel`'s current state stamped with `wall_time`.
pub fn encode(channel: &SensorChannel, wall_time: WallTime) -> Result<Vec<u8>, CodecError> {
    let time = wall_time.to_iso8601();
    let payload = StatePayload {
        motion: channel.motion(),
        tamper: channel.tamper(),
        time: time.as_str(),
    };
    serde_json::to_vec(&payload).map_err(|_| CodecError::Serialize)
}
