//! Driver cycles against the simulated MQTT publisher while the broker
//! session comes and goes.
//!
//! `MqttPublisher::connect` returns before the session is up, so the loop
//! parks in `wait_connected` before ticking, the same way `main` does.

use mhas::adapters::mqtt::MqttPublisher;
use mhas::app::ports::{ExpanderId, PublishPort};
use mhas::app::service::{AlarmService, CycleReport};
use mhas::config::SystemConfig;
use mhas::sensors::SensorRegistry;
use mhas::topology::ChannelSpec;

use crate::mock_hw::{MockClock, MockExpander, RecordingSink};

const TOPO: &[ChannelSpec] = &[
    ChannelSpec::new("test/pir/a", ExpanderId(0), 0, 1),
    ChannelSpec::new("test/pir/b", ExpanderId(0), 2, 3),
    ChannelSpec::new("test/pir/c", ExpanderId(0), 4, 5),
];

struct Loop {
    app: AlarmService,
    bank: Vec<MockExpander>,
    clock: MockClock,
    mqtt: MqttPublisher,
    sink: RecordingSink,
}

impl Loop {
    fn boot() -> Self {
        let config = SystemConfig::default();
        let mut bank = vec![MockExpander::online()];
        let registry = SensorRegistry::from_topology(TOPO, bank.as_mut_slice());
        let mut mqtt = MqttPublisher::connect(&config, "mhas-EFCAFE").unwrap();
        // Session still handshaking when `connect` returns.
        mqtt.sim_connect_after(3);
        let mut sink = RecordingSink::default();
        let mut app = AlarmService::new(config, registry);
        app.start(&mut sink);
        Self { app, bank, clock: MockClock::at(0), mqtt, sink }
    }

    /// Tick without waiting for the session.
    fn tick(&mut self, t: u64) -> CycleReport {
        self.clock.set(t);
        self.app
            .tick(self.bank.as_mut_slice(), &self.clock, &mut self.mqtt, &mut self.sink)
    }

    /// One iteration of the firmware loop: wait for the broker, then tick.
    fn iteration(&mut self, t: u64) -> CycleReport {
        assert!(self.mqtt.wait_connected(0));
        self.tick(t)
    }

    fn payload(&self, i: usize) -> (&str, serde_json::Value) {
        let (topic, bytes) = &self.mqtt.sent()[i];
        (topic.as_str(), serde_json::from_slice(bytes).unwrap())
    }
}

#[test]
fn boot_heartbeat_waits_for_session() {
    let mut lp = Loop::boot();
    assert!(!lp.mqtt.is_connected());

    let r = lp.iteration(100);
    assert!(r.heartbeat);
    assert_eq!(r.published, 3);
    let topics: Vec<&str> = lp.mqtt.sent().iter().map(|(t, _)| t.as_str()).collect();
    assert_eq!(topics, ["test/pir/a", "test/pir/b", "test/pir/c"]);
    assert!(lp.mqtt.is_subscribed());
}

#[test]
fn cycle_without_session_is_skipped_not_lost() {
    let mut lp = Loop::boot();

    let r = lp.tick(100);
    assert!(r.offline);
    assert_eq!(r.failed, 0);
    assert!(lp.mqtt.sent().is_empty());
    assert_eq!(lp.app.registry().last_forced_publish_at(), 0);

    lp.iteration(200);
    assert_eq!(lp.mqtt.sent().len(), 3, "boot heartbeat after connect");
    assert_eq!(lp.app.registry().last_forced_publish_at(), 200);
}

#[test]
fn tamper_during_outage_published_on_reconnect() {
    let mut lp = Loop::boot();
    lp.iteration(100);
    let before = lp.mqtt.sent().len();

    lp.mqtt.sim_connect_after(2);
    lp.bank[0].set(5, true);
    assert!(lp.tick(200).offline);
    assert!(lp.tick(300).offline);
    assert_eq!(lp.mqtt.sent().len(), before);

    let r = lp.iteration(400);
    assert!(!r.heartbeat);
    assert_eq!(r.published, 1);
    let (topic, v) = lp.payload(before);
    assert_eq!(topic, "test/pir/c");
    assert_eq!(v["tamper"], true);
    assert_eq!(v["motion"], false);
}

#[test]
fn heartbeat_due_during_outage_fires_on_reconnect() {
    let mut lp = Loop::boot();
    lp.iteration(100);

    lp.mqtt.sim_connect_after(1);
    assert!(lp.tick(60_200).offline);
    assert_eq!(lp.app.registry().last_forced_publish_at(), 100);

    let r = lp.iteration(60_300);
    assert!(r.heartbeat);
    assert_eq!(r.published, 3);
    assert_eq!(lp.app.registry().last_forced_publish_at(), 60_300);
}
