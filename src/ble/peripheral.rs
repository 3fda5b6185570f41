//! Advertising / connection lifecycle and the key report ticker.
//!
//! ```text
//! advertise -> connected -> (GATT events | 30 ms report ticker) -> disconnected
//!     ^                                                               |
//!     +---------------------------------------------------------------+
//! ```

use core::cell::RefCell;
use core::convert::Infallible;
use core::sync::atomic::Ordering;

use crate::ble::advertising::{format_address, interval_units, keyboard_advertisement};
use crate::ble::bonder::{bonder, Bonder};
use crate::ble::hid_service::{BatteryServiceEvent, HidServiceEvent, Server, ServerEvent};
use crate::ble::link_state::{LinkState, ProtocolMode};
use crate::ble::{CONNECTED, KEY_CHANNEL, LED_REPORT};
use crate::config::{self, KEY_QUEUE_CAPACITY};
use crate::error::Error;
use crate::hid::KeyboardReport;
use crate::keys::KeyQueue;
use defmt::{debug, info, warn};
use embassy_futures::select::select;
use embassy_time::{Duration, Ticker, Timer};
use nrf_softdevice::ble::{gatt_server, peripheral, Connection};
use nrf_softdevice::{raw, Softdevice};

/// Run the peripheral forever. Only returns if the advertising payload
/// cannot be built.
pub async fn run(sd: &'static Softdevice, server: &'static Server) -> Result<Infallible, Error> {
    log_device_address(sd);
    set_appearance();

    let adv_data = keyboard_advertisement(config::DEVICE_NAME, config::APPEARANCE_KEYBOARD)?;
    let adv_config = peripheral::Config {
        interval: interval_units(config::ADV_INTERVAL_MS),
        ..Default::default()
    };
    let bonder = bonder();

    let link = RefCell::new(LinkState::new());
    let mut queue: KeyQueue<KEY_QUEUE_CAPACITY> = KeyQueue::new();

    loop {
        link.borrow_mut().advertising_started();
        info!("Advertising as \"{}\"", config::DEVICE_NAME);

        let conn = match advertise(sd, adv_data.as_bytes(), &adv_config, bonder).await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("start advertising failed: {}", e);
                link.borrow_mut().advertising_failed();
                Timer::after(Duration::from_millis(config::ADV_RETRY_MS)).await;
                continue;
            }
        };

        link.borrow_mut().connected();
        CONNECTED.store(true, Ordering::Release);
        info!("connected. (connection #{})", link.borrow().connections());

        request_conn_params(&conn);
        // Keys typed while nobody was listening are stale.
        KEY_CHANNEL.clear();
        queue.clear();
        // A new central starts with its locks off.
        LED_REPORT.signal(0);

        let gatt = gatt_server::run(&conn, server, |event| on_server_event(event, &link));
        let reports = report_loop(&conn, server, &link, &mut queue);
        select(gatt, reports).await;

        link.borrow_mut().disconnected();
        CONNECTED.store(false, Ordering::Release);
        info!("disconnected.");
    }
}

async fn advertise(
    sd: &Softdevice,
    adv_data: &[u8],
    config: &peripheral::Config,
    bonder: &'static Bonder,
) -> Result<Connection, Error> {
    let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
        adv_data,
        scan_data: &[],
    };
    let conn = peripheral::advertise_pairable(sd, adv, config, bonder).await?;
    Ok(conn)
}

fn on_server_event(event: ServerEvent, link: &RefCell<LinkState>) {
    match event {
        ServerEvent::Hid(event) => match event {
            HidServiceEvent::InputReportCccdWrite { notifications } => {
                info!("Input report notifications: {}", notifications);
                link.borrow_mut().set_report_notifications(notifications);
            }
            HidServiceEvent::BootInputReportCccdWrite { notifications } => {
                info!("Boot input report notifications: {}", notifications);
                link.borrow_mut().set_boot_notifications(notifications);
            }
            HidServiceEvent::OutputReportWrite(leds)
            | HidServiceEvent::BootOutputReportWrite(leds) => {
                debug!("LED output report: {=u8:#04x}", leds[0]);
                LED_REPORT.signal(leds[0]);
            }
            HidServiceEvent::ProtocolModeWrite(value) => match ProtocolMode::from_byte(value[0]) {
                Some(mode) => {
                    info!("Protocol mode: {}", mode);
                    link.borrow_mut().set_protocol_mode(mode);
                }
                None => warn!("Ignoring invalid protocol mode {}", value[0]),
            },
            HidServiceEvent::ControlPointWrite(command) => {
                debug!("HID control point: {}", command);
            }
        },
        ServerEvent::Bas(BatteryServiceEvent::BatteryLevelCccdWrite { notifications }) => {
            debug!("Battery notifications: {}", notifications);
        }
        #[allow(unreachable_patterns)]
        _ => {}
    }
}

/// Every tick: top up the pending queue from the key channel and send at
/// most one report (a press or its release).
async fn report_loop(
    conn: &Connection,
    server: &Server,
    link: &RefCell<LinkState>,
    queue: &mut KeyQueue<KEY_QUEUE_CAPACITY>,
) -> ! {
    let mut ticker = Ticker::every(Duration::from_millis(config::REPORT_UPDATE_MS));

    loop {
        ticker.next().await;

        while !queue.is_full() {
            let Ok(stroke) = KEY_CHANNEL.try_receive() else {
                break;
            };
            if queue.push(stroke).is_err() {
                break;
            }
        }

        let (can_send, protocol) = {
            let link = link.borrow();
            (link.can_send(), link.protocol())
        };
        if !can_send {
            continue;
        }

        let Some(report) = queue.next_report() else {
            continue;
        };
        match send_report(conn, server, protocol, &report) {
            Ok(()) => queue.report_sent(),
            Err(e) => {
                warn!("Input report notify failed: {}", e);
                queue.report_failed();
            }
        }
    }
}

fn send_report(
    conn: &Connection,
    server: &Server,
    protocol: ProtocolMode,
    report: &KeyboardReport,
) -> Result<(), Error> {
    let bytes = report.to_bytes();
    match protocol {
        ProtocolMode::Report => server.hid.input_report_notify(conn, &bytes)?,
        ProtocolMode::Boot => server.hid.boot_input_report_notify(conn, &bytes)?,
    }
    Ok(())
}

fn request_conn_params(conn: &Connection) {
    let Some(handle) = conn.handle() else {
        return;
    };
    let params = raw::ble_gap_conn_params_t {
        min_conn_interval: config::BLE_CONN_INTERVAL_MIN,
        max_conn_interval: config::BLE_CONN_INTERVAL_MAX,
        slave_latency: config::BLE_SLAVE_LATENCY,
        conn_sup_timeout: config::BLE_SUP_TIMEOUT,
    };
    let ret = unsafe { raw::sd_ble_gap_conn_param_update(handle, &params) };
    if ret != raw::NRF_SUCCESS {
        warn!("Connection parameter update request failed: {}", ret);
    }
}

fn set_appearance() {
    let ret = unsafe { raw::sd_ble_gap_appearance_set(config::APPEARANCE_KEYBOARD) };
    if ret != raw::NRF_SUCCESS {
        warn!("Setting GAP appearance failed: {}", ret);
    }
}

fn log_device_address(sd: &Softdevice) {
    let address = nrf_softdevice::ble::get_address(sd);
    info!("Device MAC address: {}", format_address(&address.bytes()).as_str());
}
