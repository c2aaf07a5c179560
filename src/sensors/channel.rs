//! One PIR motion + tamper sensor pair wired to a single expander.
//!
//! PIR modules pulse their alarm contact briefly. The motion line is
//! therefore stretched: once raw motion is seen, the logical signal stays
//! asserted for [`MOTION_HOLD_MS`] after the most recent raw assertion,
//! and every new assertion re-arms the window. Tamper loops are read
//! as-is.
//!
//! Both signals are double-buffered so a change between two consecutive
//! samples can be detected without keeping a history.

use log::{debug, warn};

use crate::app::ports::{ExpanderId, InputExpanderPort};

/// Minimum time logical motion stays active after the last raw pulse.
pub const MOTION_HOLD_MS: u64 = 1000;

/// Where a channel's two inputs live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinBinding {
    pub expander: ExpanderId,
    pub motion_pin: u8,
    pub tamper_pin: u8,
}

/// Why a channel is part of this cycle's publish set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishReason {
    /// Motion or tamper differs from the previous sample.
    Changed,
    /// The global heartbeat interval elapsed.
    Heartbeat,
}

/// Per-cycle publish decision; `None` means the channel stays silent.
pub type PublishDecision = Option<PublishReason>;

#[derive(Debug, Clone)]
pub struct SensorChannel {
    topic: &'static str,
    binding: Option<PinBinding>,

    previous_motion: bool,
    current_motion: bool,

    previous_tamper: bool,
    current_tamper: bool,

    motion_hold_until: u64,
}

impl SensorChannel {
    /// Create an unbound channel publishing on `topic`.
    pub const fn new(topic: &'static str) -> Self {
        Self {
            topic,
            binding: None,
            previous_motion: false,
            current_motion: false,
            previous_tamper: false,
            current_tamper: false,
            motion_hold_until: 0,
        }
    }

    /// Configure both pins as pulled-up inputs and mark the channel live.
    ///
    /// An absent port leaves the channel unbound. A port that rejects the
    /// pin-mode write is treated the same way: the channel is never
    /// sampled and never published.
    pub fn bind<P: InputExpanderPort + ?Sized>(
        &mut self,
        port: Option<&mut P>,
        expander: ExpanderId,
        motion_pin: u8,
        tamper_pin: u8,
    ) {
        let Some(port) = port else {
            return;
        };

        let configured = port
            .set_input_mode(motion_pin)
            .and_then(|()| port.set_input_mode(tamper_pin));

        match configured {
            Ok(()) => {
                self.binding = Some(PinBinding {
                    expander,
                    motion_pin,
                    tamper_pin,
                });
            }
            Err(e) => warn!("{}: pin setup failed ({}), channel left unbound", self.topic, e),
        }
    }

    /// Take one sample at monotonic time `now` (ms).
    ///
    /// Does nothing on an unbound channel. Reads that fail, or a port that
    /// has disappeared, count as `false`: a broken channel never reports an
    /// intrusion.
    pub fn sample<P: InputExpanderPort + ?Sized>(&mut self, now: u64, mut port: Option<&mut P>) {
        let Some(binding) = self.binding else {
            return;
        };

        self.previous_motion = self.current_motion;
        self.previous_tamper = self.current_tamper;

        self.current_tamper = read_bit(port.as_deref_mut(), binding.tamper_pin);

        let raw_motion = read_bit(port.as_deref_mut(), binding.motion_pin);
        if raw_motion {
            self.motion_hold_until = now.saturating_add(MOTION_HOLD_MS);
        }
        self.current_motion = raw_motion || now < self.motion_hold_until;

        debug!(
            "{} - tamper: {} - motion: {} (raw {})",
            self.topic, self.current_tamper, self.current_motion, raw_motion
        );
    }

    /// Motion or tamper differs between the last two samples.
    pub fn is_changed(&self) -> bool {
        self.previous_motion != self.current_motion || self.previous_tamper != self.current_tamper
    }

    /// Publish decision for this cycle given the global heartbeat state.
    pub fn decision(&self, heartbeat_due: bool) -> PublishDecision {
        if !self.is_initialized() {
            None
        } else if heartbeat_due {
            Some(PublishReason::Heartbeat)
        } else if self.is_changed() {
            Some(PublishReason::Changed)
        } else {
            None
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.binding.is_some()
    }

    pub fn topic(&self) -> &'static str {
        self.topic
    }

    pub fn binding(&self) -> Option<PinBinding> {
        self.binding
    }

    /// Logical (stretched) motion state.
    pub fn motion(&self) -> bool {
        self.current_motion
    }

    pub fn tamper(&self) -> bool {
        self.current_tamper
    }

    pub fn motion_hold_until(&self) -> u64 {
        self.motion_hold_until
    }
}

fn read_bit<P: InputExpanderPort + ?Sized>(port: Option<&mut P>, pin: u8) -> bool {
    match port {
        Some(p) => p.read_pin(pin).unwrap_or_else(|e| {
            debug!("read P{} failed ({}), treating as inactive", pin, e);
            false
        }),
        None => false,
    }
}
