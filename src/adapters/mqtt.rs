//! MQTT publisher adapter.
//!
//! Implements [`PublishPort`] over the ESP-IDF MQTT client. The client's
//! event callback runs on the MQTT task, so it only touches atomics in
//! [`Shared`]: connection state, whether the command topic still needs
//! subscribing, and the last command received. The main loop drains those
//! through [`MqttPublisher::poll`] and [`MqttPublisher::take_pending_command`].
//!
//! The client reconnects on its own; the command topic is re-subscribed
//! after every (re)connect. The driver loop must not run a cycle while the
//! session is down, so it parks in [`MqttPublisher::wait_connected`].

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};

#[cfg(target_os = "espidf")]
use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration, QoS};

use crate::app::commands::{AppCommand, parse_command};
use crate::app::ports::PublishPort;
use crate::config::SystemConfig;
use crate::error::CommsError;

const CMD_NONE: u8 = 0;
const CMD_LED_OFF: u8 = 1;
const CMD_LED_ON: u8 = 2;

/// Poll interval while waiting for the broker session.
pub const RECONNECT_POLL_MS: u32 = 500;

/// State shared between the client callback and the main loop.
#[derive(Debug, Default)]
struct Shared {
    connected: AtomicBool,
    subscribed: AtomicBool,
    pending: AtomicU8,
}

impl Shared {
    fn on_connected(&self) {
        self.subscribed.store(false, Ordering::Release);
        self.connected.store(true, Ordering::Release);
    }

    fn on_disconnected(&self) {
        self.connected.store(false, Ordering::Release);
    }

    /// Latest command wins; earlier unprocessed ones are dropped.
    fn on_message(&self, topic: Option<&str>, command_topic: &str, data: &[u8]) {
        if topic.is_some_and(|t| t != command_topic) {
            return;
        }
        match parse_command(data) {
            Some(AppCommand::SetStatusLed(on)) => {
                let code = if on { CMD_LED_ON } else { CMD_LED_OFF };
                self.pending.store(code, Ordering::Release);
            }
            None => debug!("MQTT: empty command ignored"),
        }
    }

    fn take(&self) -> Option<AppCommand> {
        match self.pending.swap(CMD_NONE, Ordering::AcqRel) {
            CMD_LED_ON => Some(AppCommand::SetStatusLed(true)),
            CMD_LED_OFF => Some(AppCommand::SetStatusLed(false)),
            _ => None,
        }
    }
}

pub struct MqttPublisher {
    shared: Arc<Shared>,
    command_topic: heapless::String<64>,
    #[cfg(target_os = "espidf")]
    client: EspMqttClient<'static>,
    /// Simulation: every accepted publication, in order.
    #[cfg(not(target_os = "espidf"))]
    sent: Vec<(String, Vec<u8>)>,
    /// Simulation: wait polls left before the broker accepts the session.
    #[cfg(not(target_os = "espidf"))]
    sim_connect_in: Option<u32>,
}

impl MqttPublisher {
    /// Start the client. Returns once the client task is running; the
    /// broker connection itself completes asynchronously.
    #[cfg(target_os = "espidf")]
    pub fn connect(config: &SystemConfig, client_id: &str) -> Result<Self, CommsError> {
        let shared = Arc::new(Shared::default());
        let command_topic = config.command_topic.clone();

        let conf = MqttClientConfiguration {
            client_id: Some(client_id),
            username: (!config.mqtt_username.is_empty()).then_some(config.mqtt_username.as_str()),
            password: (!config.mqtt_password.is_empty()).then_some(config.mqtt_password.as_str()),
            ..Default::default()
        };

        let cb_shared = shared.clone();
        let cb_topic = command_topic.clone();
        let client = EspMqttClient::new_cb(&config.mqtt_url, &conf, move |event| match event.payload() {
            EventPayload::Connected(_) => {
                info!("MQTT: connected");
                cb_shared.on_connected();
            }
            EventPayload::Disconnected => {
                warn!("MQTT: disconnected, client will retry");
                cb_shared.on_disconnected();
            }
            EventPayload::Received { topic, data, .. } => {
                cb_shared.on_message(topic, &cb_topic, data);
            }
            EventPayload::Error(e) => warn!("MQTT: {:?}", e),
            _ => {}
        })
        .map_err(|_| CommsError::MqttConnectFailed)?;

        info!("MQTT: client '{}' -> {}", client_id, config.mqtt_url);
        Ok(Self { shared, command_topic, client })
    }

    /// Simulation: immediately connected, records publications.
    #[cfg(not(target_os = "espidf"))]
    pub fn connect(config: &SystemConfig, client_id: &str) -> Result<Self, CommsError> {
        if config.mqtt_url.is_empty() {
            return Err(CommsError::MqttConnectFailed);
        }
        let shared = Arc::new(Shared::default());
        shared.on_connected();
        info!("MQTT(sim): client '{}' -> {}", client_id, config.mqtt_url);
        Ok(Self {
            shared,
            command_topic: config.command_topic.clone(),
            sent: Vec::new(),
            sim_connect_in: None,
        })
    }

    /// Block until the broker session is up, checking every
    /// [`RECONNECT_POLL_MS`]. `timeout_ms == 0` waits forever. Returns
    /// whether the session is up; the command topic is subscribed before
    /// returning `true`.
    pub fn wait_connected(&mut self, timeout_ms: u32) -> bool {
        if !self.is_connected() {
            info!("MQTT: waiting for broker session");
        }
        let mut waited: u32 = 0;
        loop {
            if self.is_connected() {
                self.poll();
                return true;
            }
            if timeout_ms != 0 && waited >= timeout_ms {
                warn!("MQTT: broker still unreachable after {} ms", waited);
                return false;
            }
            self.platform_wait(RECONNECT_POLL_MS);
            waited = waited.saturating_add(RECONNECT_POLL_MS);
        }
    }

    /// (Re)subscribe to the command topic after a connect. Call once per
    /// loop iteration.
    pub fn poll(&mut self) {
        if !self.is_connected() || self.shared.subscribed.load(Ordering::Acquire) {
            return;
        }
        match self.platform_subscribe() {
            Ok(()) => {
                self.shared.subscribed.store(true, Ordering::Release);
                info!("MQTT: subscribed to {}", self.command_topic);
            }
            Err(e) => warn!("MQTT: subscribe to {} failed: {}", self.command_topic, e),
        }
    }

    pub fn take_pending_command(&self) -> Option<AppCommand> {
        self.shared.take()
    }

    #[cfg(target_os = "espidf")]
    fn platform_wait(&mut self, ms: u32) {
        esp_idf_hal::delay::FreeRtos::delay_ms(ms);
    }

    /// Simulation: no real delay; counts down a scheduled reconnect.
    #[cfg(not(target_os = "espidf"))]
    fn platform_wait(&mut self, _ms: u32) {
        match self.sim_connect_in {
            Some(0) | Some(1) => {
                self.sim_connect_in = None;
                self.shared.on_connected();
            }
            Some(n) => self.sim_connect_in = Some(n - 1),
            None => {}
        }
    }

    #[cfg(target_os = "espidf")]
    fn platform_subscribe(&mut self) -> Result<(), CommsError> {
        self.client
            .subscribe(&self.command_topic, QoS::AtMostOnce)
            .map(|_| ())
            .map_err(|_| CommsError::MqttDisconnected)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_subscribe(&mut self) -> Result<(), CommsError> {
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
        self.client
            .publish(topic, QoS::AtMostOnce, false, payload)
            .map(|_| ())
            .map_err(|_| CommsError::MqttPublishFailed)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
        self.sent.push((topic.to_owned(), payload.to_vec()));
        Ok(())
    }

    // ── Simulation hooks ──────────────────────────────────────

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_connected(&mut self, connected: bool) {
        if connected {
            self.shared.on_connected();
        } else {
            self.shared.on_disconnected();
        }
    }

    /// Drop the session; the broker accepts it again after `polls` waits.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_connect_after(&mut self, polls: u32) {
        self.shared.on_disconnected();
        self.sim_connect_in = Some(polls);
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_deliver(&self, topic: &str, data: &[u8]) {
        self.shared.on_message(Some(topic), &self.command_topic, data);
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sent(&self) -> &[(String, Vec<u8>)] {
        &self.sent
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn is_subscribed(&self) -> bool {
        self.shared.subscribed.load(Ordering::Acquire)
    }
}

impl PublishPort for MqttPublisher {
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
        if !self.is_connected() {
            return Err(CommsError::MqttDisconnected);
        }
        self.platform_publish(topic, payload)
    }

    fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::Acquire)
    }
}
