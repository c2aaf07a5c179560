//! System configuration parameters
//!
//! Timing and connectivity settings for the alarm controller. The channel
//! topology itself is static (see [`crate::topology`]); nothing here is
//! reloaded at runtime. String defaults can be overridden at build time
//! through the `MHAS_*` environment variables.

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Driver cadence between sampling passes.
pub const DEFAULT_SAMPLE_PERIOD_MS: u64 = 100;
/// Interval after which every channel is re-published without a change.
pub const DEFAULT_HEARTBEAT_INTERVAL_MS: u64 = 60_000;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Timing ---
    /// Sampling pass cadence (milliseconds)
    pub sample_period_ms: u64,
    /// Forced re-publication interval (milliseconds)
    pub heartbeat_interval_ms: u64,

    // --- MQTT ---
    /// Broker URL, e.g. `mqtt://192.168.1.31:1883`
    pub mqtt_url: String<64>,
    pub mqtt_username: String<32>,
    pub mqtt_password: String<64>,
    /// Prefix for the MAC-derived client id
    pub mqtt_client_prefix: String<24>,
    /// Inbound command topic
    pub command_topic: String<64>,

    // --- WiFi ---
    pub wifi_ssid: String<32>,
    pub wifi_password: String<64>,
}

fn build_env<const N: usize>(value: Option<&str>, fallback: &str) -> String<N> {
    let mut s = String::new();
    // Over-long build-time overrides are truncated to an empty string and
    // then rejected by `validate()` where the field is mandatory.
    if s.push_str(value.unwrap_or(fallback)).is_err() {
        s.clear();
    }
    s
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Timing
            sample_period_ms: DEFAULT_SAMPLE_PERIOD_MS,         // 10 Hz
            heartbeat_interval_ms: DEFAULT_HEARTBEAT_INTERVAL_MS, // 1/min

            // MQTT
            mqtt_url: build_env(option_env!("MHAS_MQTT_URL"), "mqtt://192.168.1.31:1883"),
            mqtt_username: build_env(option_env!("MHAS_MQTT_USER"), ""),
            mqtt_password: build_env(option_env!("MHAS_MQTT_PASSWORD"), ""),
            mqtt_client_prefix: build_env(None, "mhas"),
            command_topic: build_env(None, "mhas/commands"),

            // WiFi
            wifi_ssid: build_env(option_env!("MHAS_WIFI_SSID"), ""),
            wifi_password: build_env(option_env!("MHAS_WIFI_PASSWORD"), ""),
        }
    }
}

impl SystemConfig {
    /// Range-check the configuration before it is handed to the service.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_period_ms == 0 {
            return Err(ConfigError::ValidationFailed("sample_period_ms must be > 0"));
        }
        if self.heartbeat_interval_ms < self.sample_period_ms {
            return Err(ConfigError::ValidationFailed(
                "heartbeat_interval_ms must be >= sample_period_ms",
            ));
        }
        if self.mqtt_url.is_empty() {
            return Err(ConfigError::ValidationFailed("mqtt_url is empty"));
        }
        if self.command_topic.is_empty() {
            return Err(ConfigError::ValidationFailed("command_topic is empty"));
        }
        Ok(())
    }
}
