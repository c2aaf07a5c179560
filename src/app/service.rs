//! Application service: the hexagonal core.
//!
//! [`AlarmService`] owns the sensor registry and configuration and runs one
//! driver cycle per [`tick`](AlarmService::tick). All I/O flows through
//! port traits passed in at call sites, making the whole cycle testable
//! with mock adapters.
//!
//! ```text
//!  ExpanderBank ──▶ ┌──────────────────────────┐ ──▶ PublishPort
//!                   │       AlarmService       │
//!     ClockPort ──▶ │  sample · decide · encode │ ──▶ EventSink
//!                   └──────────────────────────┘
//! ```
//!
//! A cycle holds `&mut self` from sampling through the last publish, so
//! the heartbeat timestamp and channel buffers are only ever touched by one
//! logical turn at a time.

use log::{info, warn};

use crate::codec;
use crate::config::SystemConfig;
use crate::sensors::SensorRegistry;

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{ClockPort, EventSink, ExpanderBank, PublishPort, StatusLedPort};

/// Outcome of one driver cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Monotonic time the cycle was evaluated at.
    pub now_ms: u64,
    /// Channels in the publish set.
    pub selected: usize,
    /// Messages accepted by the publisher.
    pub published: usize,
    /// Messages that failed to encode or publish.
    pub failed: usize,
    /// Whether this cycle was a heartbeat.
    pub heartbeat: bool,
    /// The publisher had no session, so the cycle was skipped entirely.
    pub offline: bool,
}

// ───────────────────────────────────────────────────────────────
// AlarmService
// ───────────────────────────────────────────────────────────────

pub struct AlarmService {
    registry: SensorRegistry,
    config: SystemConfig,
    cycle_count: u64,
    published_total: u64,
    failed_total: u64,
}

impl AlarmService {
    pub fn new(config: SystemConfig, registry: SensorRegistry) -> Self {
        Self {
            registry,
            config,
            cycle_count: 0,
            published_total: 0,
            failed_total: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Announce the topology. Unbound channels are reported once here and
    /// then silently skipped for the life of the process.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        let channels = self.registry.len();
        let bound = self.registry.bound_count();
        sink.emit(&AppEvent::Started { channels, bound });
        for ch in self.registry.channels().iter().filter(|c| !c.is_initialized()) {
            sink.emit(&AppEvent::ChannelUnbound { topic: ch.topic() });
        }
        info!("AlarmService started: {}/{} channels bound", bound, channels);
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one driver cycle: sample → decide → encode → publish.
    ///
    /// Publish failures are reported and counted but never retried; the
    /// next change or heartbeat re-sends the state.
    ///
    /// With no broker session nothing is sampled and the heartbeat does not
    /// advance, so the first connected cycle still sees any change made
    /// during the outage and a heartbeat that fell due in it.
    pub fn tick<B, C, P, S>(
        &mut self,
        bank: &mut B,
        clock: &C,
        publisher: &mut P,
        sink: &mut S,
    ) -> CycleReport
    where
        B: ExpanderBank + ?Sized,
        C: ClockPort + ?Sized,
        P: PublishPort + ?Sized,
        S: EventSink + ?Sized,
    {
        let now = clock.now_millis();
        if !publisher.is_connected() {
            return CycleReport { now_ms: now, offline: true, ..CycleReport::default() };
        }
        self.cycle_count += 1;

        // 1. Sample every bound channel
        self.registry.sample_all(now, bank);

        // 2. Publish decisions (single heartbeat update inside)
        let set = self
            .registry
            .collect_publish_set(now, self.config.heartbeat_interval_ms);

        let mut report = CycleReport {
            now_ms: now,
            selected: set.len(),
            heartbeat: set.forced,
            ..CycleReport::default()
        };
        if set.is_empty() {
            return report;
        }

        // 3. One wall-clock read per cycle stamps every message
        let wall_time = clock.now_wall_time();

        // 4. Encode + publish in registration order
        for item in set.iter() {
            let ch = item.channel;
            let topic = ch.topic();

            let payload = match codec::encode(ch, wall_time) {
                Ok(p) => p,
                Err(error) => {
                    warn!("{}: encode failed: {}", topic, error);
                    sink.emit(&AppEvent::EncodeFailed { topic, error });
                    report.failed += 1;
                    continue;
                }
            };

            match publisher.publish(topic, &payload) {
                Ok(()) => {
                    sink.emit(&AppEvent::Published {
                        topic,
                        reason: item.reason,
                        motion: ch.motion(),
                        tamper: ch.tamper(),
                    });
                    report.published += 1;
                }
                Err(error) => {
                    sink.emit(&AppEvent::PublishFailed { topic, error });
                    report.failed += 1;
                }
            }
        }

        self.published_total += report.published as u64;
        self.failed_total += report.failed as u64;
        report
    }

    // ── Command handling ──────────────────────────────────────

    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        led: &mut impl StatusLedPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::SetStatusLed(on) => {
                led.set_status_led(on);
                sink.emit(&AppEvent::StatusLed(on));
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn registry(&self) -> &SensorRegistry {
        &self.registry
    }

    /// Driver cycles executed since startup.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn published_total(&self) -> u64 {
        self.published_total
    }

    pub fn failed_total(&self) -> u64 {
        self.failed_total
    }
}
