//! Build-time sensor topology.
//!
//! Each entry maps one PIR (motion + tamper pair) to an expander and two of
//! its pins, and names the MQTT topic its state is published on. Order here
//! is the publication order within a cycle.

use crate::app::ports::ExpanderId;
use crate::pins::{P0, P1, P2, P3, P4, P5, P6, P7};

/// Sensor block 1 (0x20): indoor living area.
pub const BLOCK_1: ExpanderId = ExpanderId(0);
/// Sensor block 2 (0x21): garage, with three spare pin pairs.
pub const BLOCK_2: ExpanderId = ExpanderId(1);
/// Sensor block 3 (0x22): outdoor perimeter.
pub const BLOCK_3: ExpanderId = ExpanderId(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSpec {
    pub topic: &'static str,
    pub expander: ExpanderId,
    pub motion_pin: u8,
    pub tamper_pin: u8,
}

impl ChannelSpec {
    pub const fn new(topic: &'static str, expander: ExpanderId, motion_pin: u8, tamper_pin: u8) -> Self {
        Self {
            topic,
            expander,
            motion_pin,
            tamper_pin,
        }
    }
}

pub const CHANNELS: &[ChannelSpec] = &[
    ChannelSpec::new("mhas/pir/interno/soggiorno-1", BLOCK_1, P0, P1),
    ChannelSpec::new("mhas/pir/interno/soggiorno-2", BLOCK_1, P2, P3),
    ChannelSpec::new("mhas/pir/interno/corridoio", BLOCK_1, P4, P5),
    ChannelSpec::new("mhas/pir/interno/matrimoniale", BLOCK_1, P6, P7),
    ChannelSpec::new("mhas/pir/interno/garage", BLOCK_2, P0, P1),
    ChannelSpec::new("mhas/pir/esterno/fronte", BLOCK_3, P0, P1),
    ChannelSpec::new("mhas/pir/esterno/retro", BLOCK_3, P2, P3),
    ChannelSpec::new("mhas/pir/esterno/portico", BLOCK_3, P4, P5),
    ChannelSpec::new("mhas/pir/esterno/veranda", BLOCK_3, P6, P7),
];
