//! Device drivers and one-shot hardware initialisation.

pub mod ds3231;
pub mod hw_init;
pub mod pcf8574;
pub mod status_led;
