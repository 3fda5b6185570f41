//! Bluetooth Low Energy subsystem.
//!
//! This module drives the Nordic SoftDevice S140 in **Peripheral** role:
//!
//! 1. **Advertising** - connectable undirected advertising with the
//!    keyboard appearance and the HID service UUID.
//! 2. **HID service** - HID-over-GATT server the central subscribes to.
//! 3. **Lifecycle** - on connection the key ticker forwards keystrokes;
//!    on disconnection advertising restarts.
//!
//! Communication with other tasks is done via the Embassy channel and
//! signal defined here, plus the [`CONNECTED`] flag.

pub mod advertising;
pub mod bonder;
pub mod hid_service;
pub mod link_state;
pub mod peripheral;

use core::sync::atomic::AtomicBool;

use crate::config::KEY_QUEUE_CAPACITY;
use crate::hid::KeyStroke;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

/// Set while a central is connected.
pub static CONNECTED: AtomicBool = AtomicBool::new(false);

/// Keystrokes from the USB keyboard task, waiting for the report ticker.
pub static KEY_CHANNEL: Channel<CriticalSectionRawMutex, KeyStroke, KEY_QUEUE_CAPACITY> =
    Channel::new();

/// Latest LED output report written by the central.
pub static LED_REPORT: Signal<CriticalSectionRawMutex, u8> = Signal::new();
