//! Application-wide constants and compile-time configuration.
//!
//! All pin assignments, timing parameters, and protocol constants live
//! here so they can be tuned in one place.

// BLE

/// GAP device name, also used as the complete local name when advertising.
pub const DEVICE_NAME: &str = "USB Device";

/// GAP appearance: HID Keyboard.
pub const APPEARANCE_KEYBOARD: u16 = 0x03C1;

/// Advertising interval (ms). Connectable undirected advertising.
pub const ADV_INTERVAL_MS: u32 = 1000;

/// Delay before retrying after a failed advertising start (ms).
pub const ADV_RETRY_MS: u64 = 1000;

/// BLE connection interval range requested once connected (1.25 ms units).
/// 6 = 7.5 ms, 12 = 15 ms.
pub const BLE_CONN_INTERVAL_MIN: u16 = 6;
pub const BLE_CONN_INTERVAL_MAX: u16 = 12;

/// BLE slave latency (number of connection events the peripheral can skip).
pub const BLE_SLAVE_LATENCY: u16 = 0;

/// BLE supervision timeout (in 10 ms units). 400 = 4 s.
pub const BLE_SUP_TIMEOUT: u16 = 400;

/// Number of bonds the security handler keeps in RAM.
pub const MAX_BONDED_PEERS: usize = 4;

/// Battery level reported by the Battery Service (bus powered).
pub const BATTERY_LEVEL_PERCENT: u8 = 100;

/// Manufacturer string for the Device Information Service.
pub const MANUFACTURER_NAME: &[u8; 7] = b"usb2ble";

/// PnP ID vendor/product (pid.codes open-source test VID).
/// Replace with your own allocated VID/PID for production.
pub const PNP_VID: u16 = 0x1209;
pub const PNP_PID: u16 = 0x0002;
pub const PNP_VERSION: u16 = 0x0100;

// Key forwarding

/// Period of the HID report update (ms). One report (press or release)
/// per tick.
pub const REPORT_UPDATE_MS: u64 = 30;

/// Capacity of the keyboard -> BLE key channel and of the pending queue.
pub const KEY_QUEUE_CAPACITY: usize = 16;

// USB host link (UART-attached host controller)
//
//   Host link RXD  -> P0.08
//   Host link TXD  -> P0.06
//   Status LED     -> P0.13 (LED1 on nRF52840-DK, active low)

/// Interval between keyboard connect attempts while none is attached (ms).
pub const KEYBOARD_POLL_MS: u64 = 500;

/// How long to wait for the host controller to answer an enumerate request (ms).
pub const KEYBOARD_CONNECT_TIMEOUT_MS: u64 = 200;

/// UART receive/transmit ring buffer sizes (bytes).
pub const HOST_LINK_RX_BUF: usize = 128;
pub const HOST_LINK_TX_BUF: usize = 32;

// Status LED

/// LED update period (ms).
pub const BLINK_PERIOD_MS: u64 = 500;

