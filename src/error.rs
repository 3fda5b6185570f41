//! Unified error type for usb2ble.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.

use crate::ble::advertising::AdvError;
use crate::usb_host::link::LinkError;
use defmt::Format;
use nrf_softdevice::ble::gatt_server::{NotifyValueError, RegisterError};
use nrf_softdevice::ble::peripheral::AdvertiseError;

/// Top-level error type used across the application.
#[derive(Debug, Format)]
pub enum Error {
    // BLE
    /// The SoftDevice returned a BLE-level error.
    Ble(BleError),

    /// Advertising payload did not fit in a legacy PDU.
    Advertising(AdvError),

    // USB host link
    /// Malformed frame from the USB host controller.
    Link(LinkError),

    /// UART transfer to/from the USB host controller failed.
    Uart,

    /// The USB host controller reported no keyboard.
    KeyboardNotConnected,

    // Generic
    /// Buffer too small for the requested operation.
    BufferOverflow,

    /// Operation timed out.
    Timeout,
}

/// Subset of BLE errors we propagate (keeps the enum `Copy`-friendly).
#[derive(Debug, Clone, Copy, Format)]
pub enum BleError {
    /// GAP / GATT raw error code from the SoftDevice.
    Raw(u32),
    /// GATT server registration failed.
    Register,
    /// Advertising could not be started.
    Advertise,
    /// Input report notification failed.
    Notify,
}

// Convenience conversions

impl From<BleError> for Error {
    fn from(e: BleError) -> Self {
        Error::Ble(e)
    }
}

impl From<AdvError> for Error {
    fn from(e: AdvError) -> Self {
        Error::Advertising(e)
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        match e {
            LinkError::BufferTooSmall => Error::BufferOverflow,
            other => Error::Link(other),
        }
    }
}

impl From<AdvertiseError> for Error {
    fn from(e: AdvertiseError) -> Self {
        match e {
            AdvertiseError::Timeout => Error::Timeout,
            AdvertiseError::Raw(raw) => Error::Ble(BleError::Raw(raw as u32)),
            _ => Error::Ble(BleError::Advertise),
        }
    }
}

impl From<NotifyValueError> for Error {
    fn from(e: NotifyValueError) -> Self {
        match e {
            NotifyValueError::Raw(raw) => Error::Ble(BleError::Raw(raw as u32)),
            _ => Error::Ble(BleError::Notify),
        }
    }
}

impl From<RegisterError> for Error {
    fn from(_: RegisterError) -> Self {
        Error::Ble(BleError::Register)
    }
}
