//! usb2ble - USB keyboard to Bluetooth LE HID bridge firmware.
//!
//! Runs on an nRF52840 with the S140 SoftDevice. A USB keyboard attached
//! to a UART USB host controller is re-exposed as a BLE HID keyboard.

#![no_std]
#![no_main]

mod ble;
mod config;
mod error;
mod hid;
mod keys;
mod status_led;
mod status_logic;
mod usb_host;

use defmt::{error, info};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_nrf::buffered_uarte::{self, BufferedUarte};
use embassy_nrf::gpio::{Level, Output, OutputDrive};
use embassy_nrf::interrupt::{self, InterruptExt, Priority};
use embassy_nrf::peripherals::{TIMER1, UARTE1};
use embassy_nrf::{bind_interrupts, uarte};
use nrf_softdevice::{self as sd, Softdevice};
use panic_probe as _;
use static_cell::StaticCell;

use crate::ble::hid_service::Server;
use crate::usb_host::uart_keyboard::UartHostKeyboard;

bind_interrupts!(struct Irqs {
    UARTE1 => buffered_uarte::InterruptHandler<UARTE1>;
});

type HostLink = BufferedUarte<'static, UARTE1, TIMER1>;

static SERVER: StaticCell<Server> = StaticCell::new();
static HOST_LINK_RX: StaticCell<[u8; config::HOST_LINK_RX_BUF]> = StaticCell::new();
static HOST_LINK_TX: StaticCell<[u8; config::HOST_LINK_TX_BUF]> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("usb2ble starting");

    // Priorities 0, 1 and 4 belong to the SoftDevice.
    let mut nrf_config = embassy_nrf::config::Config::default();
    nrf_config.gpiote_interrupt_priority = Priority::P2;
    nrf_config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(nrf_config);
    interrupt::UARTE1.set_priority(Priority::P3);

    let led = Output::new(p.P0_13, Level::High, OutputDrive::Standard);
    spawner.must_spawn(led_task(led));

    let mut uart_config = uarte::Config::default();
    uart_config.parity = uarte::Parity::EXCLUDED;
    uart_config.baudrate = uarte::Baudrate::BAUD115200;
    let uart = BufferedUarte::new(
        p.UARTE1,
        p.TIMER1,
        p.PPI_CH0,
        p.PPI_CH1,
        p.PPI_GROUP0,
        Irqs,
        p.P0_08,
        p.P0_06,
        uart_config,
        HOST_LINK_RX.init([0; config::HOST_LINK_RX_BUF]),
        HOST_LINK_TX.init([0; config::HOST_LINK_TX_BUF]),
    );
    spawner.must_spawn(keyboard_task(UartHostKeyboard::new(uart)));

    let sd = Softdevice::enable(&softdevice_config());
    let server = match Server::new(sd) {
        Ok(server) => Some(SERVER.init(server)),
        Err(e) => {
            error!("BLE initialization failed: {}", error::Error::from(e));
            None
        }
    };
    let sd: &'static Softdevice = sd;
    spawner.must_spawn(softdevice_task(sd));

    if let Some(server) = server {
        spawner.must_spawn(ble_task(sd, server));
    }
}

fn softdevice_config() -> sd::Config {
    sd::Config {
        clock: Some(sd::raw::nrf_clock_lf_cfg_t {
            source: sd::raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: sd::raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(sd::raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(sd::raw::ble_gatt_conn_cfg_t { att_mtu: 64 }),
        gatts_attr_tab_size: Some(sd::raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: sd::raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(sd::raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: sd::raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(sd::raw::ble_gap_cfg_device_name_t {
            p_value: config::DEVICE_NAME.as_ptr() as _,
            current_len: config::DEVICE_NAME.len() as u16,
            max_len: config::DEVICE_NAME.len() as u16,
            write_perm: unsafe { core::mem::zeroed() },
            _bitfield_1: sd::raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                sd::raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

#[embassy_executor::task]
async fn ble_task(sd: &'static Softdevice, server: &'static Server) {
    if let Err(e) = ble::peripheral::run(sd, server).await {
        error!("BLE task stopped: {}", e);
    }
}

#[embassy_executor::task]
async fn keyboard_task(keyboard: UartHostKeyboard<HostLink>) -> ! {
    usb_host::keyboard_task(keyboard).await
}

#[embassy_executor::task]
async fn led_task(led: Output<'static>) -> ! {
    status_led::led_task(led).await
}
