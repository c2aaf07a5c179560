//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements        | Connects to               |
//! |-------------|-------------------|---------------------------|
//! | `hardware`  | ExpanderBank      | PCF8574 expanders on I²C  |
//! |             | StatusLedPort     | Built-in LED GPIO         |
//! | `time`      | ClockPort         | esp_timer + DS3231 RTC    |
//! | `mqtt`      | PublishPort       | ESP-IDF MQTT client       |
//! | `log_sink`  | EventSink         | Serial log output         |
//! | `wifi`      | -                 | ESP-IDF WiFi STA          |
//! | `device_id` | -                 | eFuse factory MAC         |

pub mod device_id;
pub mod hardware;
pub mod log_sink;
pub mod mqtt;
pub mod time;
pub mod wifi;
