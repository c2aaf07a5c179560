//! Sensor subsystem: per-channel motion-stretch state and the aggregating
//! [`SensorRegistry`].
//!
//! The registry owns every [`SensorChannel`] in registration order. Each
//! driver cycle it samples all bound channels, then decides which ones
//! must be published: those that changed, or all of them when the global
//! heartbeat is due.

pub mod channel;

use heapless::Vec;
use log::{debug, warn};

use crate::app::ports::ExpanderBank;
use crate::topology::ChannelSpec;
pub use channel::{PublishDecision, PublishReason, SensorChannel};

/// Upper bound on channels (three 8-bit expanders, two pins per channel,
/// minus spare slots on the controller board).
pub const MAX_CHANNELS: usize = 12;

/// One entry of a cycle's publish set.
#[derive(Debug, Clone, Copy)]
pub struct Publication<'a> {
    pub channel: &'a SensorChannel,
    pub reason: PublishReason,
}

pub type PublishSet<'a> = Vec<Publication<'a>, MAX_CHANNELS>;

/// A cycle's publish set together with whether the heartbeat fired.
///
/// Derefs to the ordered slice of [`Publication`]s.
#[derive(Debug)]
pub struct PublishPlan<'a> {
    /// The heartbeat fired this cycle and its timestamp moved to `now`.
    pub forced: bool,
    items: PublishSet<'a>,
}

impl<'a> core::ops::Deref for PublishPlan<'a> {
    type Target = [Publication<'a>];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

/// Fixed-size, ordered collection of sensor channels plus the shared
/// heartbeat timestamp.
#[derive(Debug, Default)]
pub struct SensorRegistry {
    // Same capacity as `PublishSet`, so a plan always holds every channel.
    channels: Vec<SensorChannel, MAX_CHANNELS>,
    /// Monotonic ms of the last forced publication; 0 = never.
    last_forced_publish_at: u64,
}

impl SensorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and bind one channel per topology entry, in table order.
    /// Entries beyond [`MAX_CHANNELS`] are dropped with a warning.
    pub fn from_topology<B: ExpanderBank + ?Sized>(specs: &[ChannelSpec], bank: &mut B) -> Self {
        let mut registry = Self::new();
        for spec in specs {
            let mut ch = SensorChannel::new(spec.topic);
            ch.bind(
                bank.port(spec.expander),
                spec.expander,
                spec.motion_pin,
                spec.tamper_pin,
            );
            if registry.register(ch).is_err() {
                warn!("registry full, dropping channel {}", spec.topic);
            }
        }
        registry
    }

    /// Append a channel. Returns it back if the registry is full.
    pub fn register(&mut self, channel: SensorChannel) -> Result<(), SensorChannel> {
        self.channels.push(channel)
    }

    /// Sample every bound channel at time `now`, in registration order.
    pub fn sample_all<B: ExpanderBank + ?Sized>(&mut self, now: u64, bank: &mut B) {
        for ch in self.channels.iter_mut() {
            let Some(binding) = ch.binding() else {
                continue;
            };
            ch.sample(now, bank.port(binding.expander));
        }
    }

    /// Whether a forced (heartbeat) publication is due at `now`.
    fn heartbeat_due(&self, now: u64, heartbeat_interval_ms: u64) -> bool {
        self.last_forced_publish_at == 0
            || now.saturating_sub(self.last_forced_publish_at) > heartbeat_interval_ms
    }

    /// Decide which channels to publish this cycle.
    ///
    /// When the heartbeat is due every bound channel is included with
    /// [`PublishReason::Heartbeat`] and the heartbeat timestamp moves to
    /// `now` exactly once, however many channels are included. The returned
    /// plan's `forced` flag is the only record of whether that happened.
    pub fn collect_publish_set(&mut self, now: u64, heartbeat_interval_ms: u64) -> PublishPlan<'_> {
        let force = self.heartbeat_due(now, heartbeat_interval_ms);
        if force {
            debug!("heartbeat at {} ms (previous {} ms)", now, self.last_forced_publish_at);
            self.last_forced_publish_at = now;
        }

        let mut items = PublishSet::new();
        for ch in &self.channels {
            if let Some(reason) = ch.decision(force) {
                let pushed = items.push(Publication { channel: ch, reason });
                debug_assert!(pushed.is_ok(), "publish set smaller than registry");
            }
        }
        PublishPlan { forced: force, items }
    }

    pub fn last_forced_publish_at(&self) -> u64 {
        self.last_forced_publish_at
    }

    pub fn channels(&self) -> &[SensorChannel] {
        &self.channels
    }

    pub fn channel(&self, topic: &str) -> Option<&SensorChannel> {
        self.channels.iter().find(|c| c.topic() == topic)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of channels bound to a live expander.
    pub fn bound_count(&self) -> usize {
        self.channels.iter().filter(|c| c.is_initialized()).count()
    }
}
