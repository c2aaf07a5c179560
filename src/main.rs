//! MHAS Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter    Esp32Clock    MqttPublisher  LogEventSink  │
//! │  (ExpanderBank +    (ClockPort)   (PublishPort)  (EventSink)   │
//! │   StatusLedPort)                                               │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │           AlarmService (pure logic)                    │    │
//! │  │  SensorRegistry · SensorChannel · codec                │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Bring-up order: peripherals → WiFi → RTC (+ NTP seed) → expanders →
//! MQTT. After that the driver loop runs forever at `sample_period_ms`,
//! parking whenever the broker session is down.
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use log::{error, info, warn};

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

use mhas::adapters::device_id;
use mhas::adapters::hardware::HardwareAdapter;
use mhas::adapters::log_sink::LogEventSink;
use mhas::adapters::mqtt::MqttPublisher;
use mhas::adapters::time::Esp32Clock;
use mhas::adapters::wifi::WifiAdapter;
use mhas::app::ports::PublishPort;
use mhas::app::service::AlarmService;
use mhas::config::SystemConfig;
use mhas::drivers::ds3231::Ds3231;
use mhas::drivers::hw_init::{self, SysI2c};
use mhas::drivers::status_led::StatusLed;
use mhas::error::Error;
use mhas::pins;
use mhas::sensors::SensorRegistry;
use mhas::topology::CHANNELS;

const NTP_TIMEOUT_MS: u32 = 15_000;

/// Unrecoverable bring-up failure: log and park. The task watchdog is not
/// fed from here, so the board eventually resets.
fn halt(what: &str) -> ! {
    error!("{}, halting", what);
    loop {
        FreeRtos::delay_ms(1000);
    }
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  MHAS v{}                          ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    if let Err(e) = hw_init::init_peripherals() {
        halt(&format!("HAL init failed: {e}"));
    }

    let config = SystemConfig::default();
    config
        .validate()
        .map_err(Error::from)
        .context("invalid build-time configuration")?;

    // ── 2. WiFi ───────────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    let mut wifi = WifiAdapter::new(&config.wifi_ssid, &config.wifi_password)
        .map_err(|e| anyhow::anyhow!("WiFi credentials: {e}"))?;
    wifi.attach(BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs))?,
        sysloop,
    )?);
    wifi.connect_blocking(0).map_err(Error::from)?;

    // ── 3. Real-time clock ────────────────────────────────────
    let i2c = SysI2c::new(pins::I2C_PORT);
    let mut rtc = Ds3231::new(i2c, pins::RTC_ADDRESS);
    if rtc.begin().is_err() {
        halt("Couldn't find RTC");
    }
    if rtc.lost_power().unwrap_or(true) {
        warn!("RTC lost power, time invalid until NTP sync");
    }
    let clock = Esp32Clock::new(rtc);
    match clock.sync_at_boot(NTP_TIMEOUT_MS) {
        Ok(t) => info!("Wall time: {}", t.to_iso8601()),
        Err(e) => halt(&format!("No valid time source: {e}")),
    }

    // ── 4. Sensors ────────────────────────────────────────────
    let mut hw = HardwareAdapter::new(i2c, pins::EXPANDER_ADDRESSES, StatusLed::new());
    let online = hw.begin();
    info!("{} of {} sensor blocks online", online, pins::EXPANDER_ADDRESSES.len());
    let registry = SensorRegistry::from_topology(CHANNELS, &mut hw);

    // ── 5. MQTT ───────────────────────────────────────────────
    let client_id = device_id::client_id(&config.mqtt_client_prefix, &device_id::read_mac());
    let mut mqtt = MqttPublisher::connect(&config, &client_id).map_err(Error::from)?;
    mqtt.wait_connected(0);

    // ── 6. Driver loop ────────────────────────────────────────
    let mut sink = LogEventSink::new();
    let period = u32::try_from(config.sample_period_ms).unwrap_or(u32::MAX);
    let mut app = AlarmService::new(config, registry);
    app.start(&mut sink);

    loop {
        if !mqtt.is_connected() {
            warn!("MQTT: session lost, sampling paused");
            mqtt.wait_connected(0);
        }
        mqtt.poll();
        if let Some(cmd) = mqtt.take_pending_command() {
            app.handle_command(cmd, &mut hw, &mut sink);
        }

        let report = app.tick(&mut hw, &clock, &mut mqtt, &mut sink);
        if report.failed > 0 && !mqtt.is_connected() {
            warn!("MQTT offline, {} message(s) dropped", report.failed);
        }

        FreeRtos::delay_ms(period);
    }
}
