//! End-to-end driver cycles through `AlarmService` against mock adapters.
//!
//! Topology: four channels on one expander, pin pairs (0,1) (2,3) (4,5)
//! (6,7). Cycles run every 100 ms with a 60 s heartbeat.

use mhas::app::commands::AppCommand;
use mhas::app::events::AppEvent;
use mhas::app::ports::ExpanderId;
use mhas::app::service::{AlarmService, CycleReport};
use mhas::config::SystemConfig;
use mhas::sensors::{PublishReason, SensorRegistry};
use mhas::topology::ChannelSpec;

use crate::mock_hw::{MockClock, MockExpander, MockLed, RecordingBroker, RecordingSink};

const TOPO: &[ChannelSpec] = &[
    ChannelSpec::new("test/pir/a", ExpanderId(0), 0, 1),
    ChannelSpec::new("test/pir/b", ExpanderId(0), 2, 3),
    ChannelSpec::new("test/pir/c", ExpanderId(0), 4, 5),
    ChannelSpec::new("test/pir/d", ExpanderId(0), 6, 7),
];

struct Rig {
    app: AlarmService,
    bank: Vec<MockExpander>,
    clock: MockClock,
    broker: RecordingBroker,
    sink: RecordingSink,
}

impl Rig {
    fn with(topology: &[ChannelSpec], mut bank: Vec<MockExpander>) -> Self {
        let registry = SensorRegistry::from_topology(topology, bank.as_mut_slice());
        let mut rig = Self {
            app: AlarmService::new(SystemConfig::default(), registry),
            bank,
            clock: MockClock::at(0),
            broker: RecordingBroker::default(),
            sink: RecordingSink::default(),
        };
        rig.app.start(&mut rig.sink);
        rig
    }

    fn new() -> Self {
        Self::with(TOPO, vec![MockExpander::online()])
    }

    fn cycle(&mut self, t: u64) -> CycleReport {
        self.clock.set(t);
        self.app
            .tick(self.bank.as_mut_slice(), &self.clock, &mut self.broker, &mut self.sink)
    }

    /// Run every 100 ms cycle in `from..=to`, asserting nothing is published.
    fn quiet(&mut self, from: u64, to: u64) {
        for t in (from..=to).step_by(100) {
            let r = self.cycle(t);
            assert_eq!(r.selected, 0, "unexpected publication at t={t}");
        }
    }

    fn last_published(&self) -> Option<&AppEvent> {
        self.sink
            .events
            .iter()
            .rev()
            .find(|e| matches!(e, AppEvent::Published { .. }))
    }
}

#[test]
fn first_cycle_heartbeats_every_channel() {
    let mut rig = Rig::new();
    let r = rig.cycle(100);

    assert!(r.heartbeat);
    assert_eq!((r.selected, r.published, r.failed), (4, 4, 0));
    assert_eq!(rig.broker.topics(), ["test/pir/a", "test/pir/b", "test/pir/c", "test/pir/d"]);
    assert_eq!(rig.app.registry().last_forced_publish_at(), 100);

    let body = rig.broker.last_json("test/pir/b").unwrap();
    assert_eq!(body["motion"], false);
    assert_eq!(body["tamper"], false);
    assert_eq!(body["time"], "2024-02-29T13:45:07");

    let heartbeats = rig
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::Published { reason: PublishReason::Heartbeat, .. }))
        .count();
    assert_eq!(heartbeats, 4);
}

#[test]
fn quiet_until_next_heartbeat() {
    let mut rig = Rig::new();
    rig.cycle(100);
    rig.quiet(200, 60_100);
    assert_eq!(rig.broker.messages.len(), 4);
    // Wall time is only read on cycles that publish.
    assert_eq!(rig.clock.wall_reads.get(), 1);

    let r = rig.cycle(60_200);
    assert!(r.heartbeat);
    assert_eq!(r.published, 4);
    assert_eq!(rig.app.registry().last_forced_publish_at(), 60_200);
}

#[test]
fn tamper_flip_publishes_only_that_channel() {
    let mut rig = Rig::new();
    rig.cycle(100);
    rig.quiet(200, 4_900);
    rig.broker.clear();

    rig.bank[0].set(5, true);
    let r = rig.cycle(5_000);

    assert!(!r.heartbeat);
    assert_eq!(r.selected, 1);
    assert_eq!(rig.broker.topics(), ["test/pir/c"]);
    assert_eq!(rig.broker.last_json("test/pir/c").unwrap()["tamper"], true);
    assert_eq!(
        rig.last_published(),
        Some(&AppEvent::Published {
            topic: "test/pir/c",
            reason: PublishReason::Changed,
            motion: false,
            tamper: true,
        })
    );

    // Steady tamper is not a change.
    assert_eq!(rig.cycle(5_100).selected, 0);
}

#[test]
fn single_motion_pulse_is_stretched_for_one_second() {
    let mut rig = Rig::new();
    rig.cycle(100);
    rig.quiet(200, 900);

    rig.bank[0].set(0, true);
    let r = rig.cycle(1_000);
    assert_eq!(r.selected, 1);
    assert_eq!(rig.broker.last_json("test/pir/a").unwrap()["motion"], true);

    rig.bank[0].set(0, false);
    rig.quiet(1_100, 1_900);
    rig.cycle(1_999);
    assert!(rig.app.registry().channel("test/pir/a").unwrap().motion());

    let r = rig.cycle(2_000);
    assert_eq!(r.selected, 1);
    assert_eq!(rig.broker.last_json("test/pir/a").unwrap()["motion"], false);
}

#[test]
fn absent_expander_leaves_its_channels_out() {
    let topo = [
        TOPO[0],
        TOPO[1],
        ChannelSpec::new("test/pir/remote", ExpanderId(1), 0, 1),
    ];
    let mut rig = Rig::with(&topo, vec![MockExpander::online(), MockExpander::offline()]);

    assert_eq!(rig.sink.events[0], AppEvent::Started { channels: 3, bound: 2 });
    assert_eq!(rig.sink.events[1], AppEvent::ChannelUnbound { topic: "test/pir/remote" });

    rig.bank[1].levels = 0xFF;
    let r = rig.cycle(100);
    assert_eq!(r.published, 2);
    assert_eq!(rig.broker.topics(), ["test/pir/a", "test/pir/b"]);
    assert_eq!(rig.bank[1].reads, 0);
}

#[test]
fn publish_failures_are_counted_not_retried() {
    let mut rig = Rig::new();
    rig.broker.offline = true;

    let r = rig.cycle(100);
    assert_eq!((r.published, r.failed), (0, 4));
    assert_eq!(rig.app.failed_total(), 4);
    assert!(
        rig.sink
            .events
            .iter()
            .any(|e| matches!(e, AppEvent::PublishFailed { topic: "test/pir/a", .. }))
    );

    // The heartbeat was consumed; the next change or heartbeat re-sends.
    rig.broker.offline = false;
    assert_eq!(rig.cycle(200).selected, 0);
    assert!(rig.broker.messages.is_empty());
}

#[test]
fn status_led_command_reaches_led_port() {
    let mut rig = Rig::new();
    let mut led = MockLed::default();

    rig.app.handle_command(AppCommand::SetStatusLed(true), &mut led, &mut rig.sink);
    rig.app.handle_command(AppCommand::SetStatusLed(false), &mut led, &mut rig.sink);

    assert_eq!(led.history, [true, false]);
    assert_eq!(rig.sink.events.last(), Some(&AppEvent::StatusLed(false)));
}
