//! Device identity derived from the ESP32 factory MAC address.
//!
//! The last three MAC bytes in uppercase hex (`XXYYZZ`) suffix the MQTT
//! client id, so two boards on the same broker never collide and a board
//! keeps its id across reboots.

use core::fmt::Write;

/// MQTT client id: `<prefix>-XXYYZZ`.
pub type ClientIdString = heapless::String<32>;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    // SAFETY: the buffer is exactly the 6 bytes the call writes.
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// `prefix` is truncated if the id would not fit.
pub fn client_id(prefix: &str, mac: &MacAddress) -> ClientIdString {
    let mut id = ClientIdString::new();
    let room = id.capacity() - 7;
    let prefix = prefix.get(..prefix.len().min(room)).unwrap_or("mhas");
    let _ = write!(id, "{}-{:02X}{:02X}{:02X}", prefix, mac[3], mac[4], mac[5]);
    id
}
