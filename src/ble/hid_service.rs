//! GATT server: HID-over-GATT keyboard plus Battery and Device
//! Information services.
//!
//! The `#[nrf_softdevice::gatt_service]` macro generates the attribute
//! table, `*_notify`/`*_set` helpers and a per-service event enum for
//! every writable characteristic.

use crate::config;
use crate::hid::keyboard::{KEYBOARD_REPORT_DESCRIPTOR, KEYBOARD_REPORT_DESCRIPTOR_LEN};

// Report Reference descriptor values: [report id, report type].
const INPUT_REPORT_REF: [u8; 2] = [0, 1];
const OUTPUT_REPORT_REF: [u8; 2] = [0, 2];

const HID_SPEC_VERSION: u16 = 0x0101;
const COUNTRY_CODE: u8 = 0;
const HID_INFO_FLAG_REMOTE_WAKE: u8 = 0x01;
const HID_INFO_FLAG_NORMALLY_CONNECTABLE: u8 = 0x02;
const HID_INFORMATION: [u8; 4] = [
    HID_SPEC_VERSION as u8,
    (HID_SPEC_VERSION >> 8) as u8,
    COUNTRY_CODE,
    HID_INFO_FLAG_REMOTE_WAKE | HID_INFO_FLAG_NORMALLY_CONNECTABLE,
];

const EMPTY_INPUT_REPORT: [u8; 8] = [0; 8];
const EMPTY_OUTPUT_REPORT: [u8; 1] = [0];
const PROTOCOL_MODE_REPORT: [u8; 1] = [1];

/// PnP ID: vendor id source (0x02 = USB-IF), VID, PID, version.
const PNP_ID: [u8; 7] = [
    0x02,
    config::PNP_VID as u8,
    (config::PNP_VID >> 8) as u8,
    config::PNP_PID as u8,
    (config::PNP_PID >> 8) as u8,
    config::PNP_VERSION as u8,
    (config::PNP_VERSION >> 8) as u8,
];

#[nrf_softdevice::gatt_service(uuid = "1812")]
pub struct HidService {
    /// Keyboard input report (report protocol).
    #[characteristic(
        uuid = "2A4D",
        security = "justworks",
        read,
        notify,
        value = "EMPTY_INPUT_REPORT",
        descriptor(uuid = "2908", security = "justworks", value = "INPUT_REPORT_REF")
    )]
    pub input_report: [u8; 8],

    /// Keyboard LED output report.
    #[characteristic(
        uuid = "2A4D",
        security = "justworks",
        read,
        write,
        write_without_response,
        value = "EMPTY_OUTPUT_REPORT",
        descriptor(uuid = "2908", security = "justworks", value = "OUTPUT_REPORT_REF")
    )]
    pub output_report: [u8; 1],

    #[characteristic(
        uuid = "2A4B",
        security = "justworks",
        read,
        value = "KEYBOARD_REPORT_DESCRIPTOR"
    )]
    pub report_map: [u8; KEYBOARD_REPORT_DESCRIPTOR_LEN],

    /// Keyboard input report (boot protocol).
    #[characteristic(
        uuid = "2A22",
        security = "justworks",
        read,
        notify,
        value = "EMPTY_INPUT_REPORT"
    )]
    pub boot_input_report: [u8; 8],

    #[characteristic(
        uuid = "2A32",
        security = "justworks",
        read,
        write,
        write_without_response,
        value = "EMPTY_OUTPUT_REPORT"
    )]
    pub boot_output_report: [u8; 1],

    #[characteristic(uuid = "2A4A", security = "justworks", read, value = "HID_INFORMATION")]
    pub hid_information: [u8; 4],

    /// Suspend (0) / exit suspend (1).
    #[characteristic(uuid = "2A4C", security = "justworks", write_without_response)]
    pub control_point: u8,

    /// 0 = boot protocol, 1 = report protocol.
    #[characteristic(
        uuid = "2A4E",
        security = "justworks",
        read,
        write_without_response,
        value = "PROTOCOL_MODE_REPORT"
    )]
    pub protocol_mode: [u8; 1],
}

#[nrf_softdevice::gatt_service(uuid = "180f")]
pub struct BatteryService {
    #[characteristic(uuid = "2a19", read, notify, value = "[config::BATTERY_LEVEL_PERCENT]")]
    pub battery_level: u8,
}

#[nrf_softdevice::gatt_service(uuid = "180a")]
pub struct DeviceInformationService {
    #[characteristic(uuid = "2a29", read, value = "config::MANUFACTURER_NAME")]
    pub manufacturer_name: [u8; 7],

    #[characteristic(uuid = "2a50", read, value = "PNP_ID")]
    pub pnp_id: [u8; 7],
}

#[nrf_softdevice::gatt_server]
pub struct Server {
    pub bas: BatteryService,
    pub dis: DeviceInformationService,
    pub hid: HidService,
}
