//! `SensorRegistry` against the real topology table and mock expanders.

use mhas::app::ports::ExpanderId;
use mhas::sensors::{PublishReason, SensorRegistry};
use mhas::topology::{BLOCK_1, BLOCK_2, BLOCK_3, CHANNELS};

use crate::mock_hw::MockExpander;

const HEARTBEAT: u64 = 60_000;

fn full_bank() -> Vec<MockExpander> {
    vec![MockExpander::online(); 3]
}

#[test]
fn production_topology_binds_every_channel() {
    let mut bank = full_bank();
    let reg = SensorRegistry::from_topology(CHANNELS, bank.as_mut_slice());
    assert_eq!(reg.len(), CHANNELS.len());
    assert_eq!(reg.bound_count(), CHANNELS.len());
    let blocks: Vec<ExpanderId> =
        reg.channels().iter().filter_map(|c| c.binding()).map(|b| b.expander).collect();
    for block in [BLOCK_1, BLOCK_2, BLOCK_3] {
        assert!(blocks.contains(&block), "{block:?} unused");
    }
}

#[test]
fn heartbeat_timestamp_moves_once_per_cycle() {
    let mut bank = full_bank();
    let mut reg = SensorRegistry::from_topology(CHANNELS, bank.as_mut_slice());

    reg.sample_all(100, bank.as_mut_slice());
    let set = reg.collect_publish_set(100, HEARTBEAT);
    assert!(set.forced);
    assert_eq!(set.len(), CHANNELS.len());
    assert!(set.iter().all(|p| p.reason == PublishReason::Heartbeat));
    // The plan borrows the registry until it is gone.
    drop(set);
    assert_eq!(reg.last_forced_publish_at(), 100);

    // A second evaluation in the same cycle is not a heartbeat.
    let again = reg.collect_publish_set(100, HEARTBEAT);
    assert!(!again.forced && again.is_empty());
    drop(again);
    assert_eq!(reg.last_forced_publish_at(), 100);
}

#[test]
fn every_channel_once_per_interval() {
    let mut bank = full_bank();
    let mut reg = SensorRegistry::from_topology(CHANNELS, bank.as_mut_slice());

    let mut heartbeats = Vec::new();
    for t in (100..=180_500).step_by(100) {
        reg.sample_all(t, bank.as_mut_slice());
        let set = reg.collect_publish_set(t, HEARTBEAT);
        if set.forced {
            assert_eq!(set.len(), CHANNELS.len());
            heartbeats.push(t);
        } else {
            assert!(set.is_empty(), "t={t}");
        }
    }
    assert_eq!(heartbeats, [100, 60_200, 120_300, 180_400]);
}

#[test]
fn missing_block_does_not_disturb_others() {
    let mut bank = full_bank();
    bank[BLOCK_2.0 as usize] = MockExpander::offline();
    let mut reg = SensorRegistry::from_topology(CHANNELS, bank.as_mut_slice());
    assert_eq!(reg.bound_count(), CHANNELS.len() - 1);

    // Block 2 coming back later does not rebind its channel.
    bank[BLOCK_2.0 as usize].present = true;
    bank[BLOCK_2.0 as usize].levels = 0xFF;
    bank[0].set(0, true);

    reg.sample_all(100, bank.as_mut_slice());
    let set = reg.collect_publish_set(100, HEARTBEAT);
    assert_eq!(set.len(), CHANNELS.len() - 1);
    assert!(set.iter().all(|p| p.channel.topic() != "mhas/pir/interno/garage"));
    assert!(set[0].channel.motion());
    assert_eq!(bank[BLOCK_2.0 as usize].reads, 0);
}

#[test]
fn failed_pin_setup_leaves_channel_unbound() {
    let mut bank = full_bank();
    bank[0].broken_pins = 1 << 3;
    let reg = SensorRegistry::from_topology(CHANNELS, bank.as_mut_slice());

    let ch = reg.channel("mhas/pir/interno/soggiorno-2").unwrap();
    assert!(!ch.is_initialized());
    assert!(reg.channel("mhas/pir/interno/soggiorno-1").unwrap().is_initialized());
    assert_eq!(ch.binding().map(|b| b.expander), None::<ExpanderId>);
}
