//! USB host keyboard.
//!
//! The keyboard hangs off a UART-attached USB host controller (see
//! [`link`] for the framing). The task below keeps trying to connect every
//! [`KEYBOARD_POLL_MS`](crate::config::KEYBOARD_POLL_MS) until a keyboard
//! is attached, then turns every boot report into keystrokes for the BLE
//! side until the keyboard goes away.

pub mod boot_keymap;
pub mod link;
pub mod session;
pub mod uart_keyboard;

use crate::ble::{KEY_CHANNEL, LED_REPORT};
use crate::config;
use crate::error::Error;
use crate::hid::keyboard::KeyboardReport;
use boot_keymap::BootKeyDecoder;
use defmt::{debug, info, warn};
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Timer};

/// A USB keyboard reached through some host stack.
#[allow(async_fn_in_trait)]
pub trait HostKeyboard {
    /// Try to (re)attach a keyboard. `Ok(true)` once one is ready.
    async fn connect(&mut self) -> Result<bool, Error>;

    fn connected(&self) -> bool;

    /// Wait for the next boot report. `Ok(None)` means the keyboard was
    /// unplugged.
    async fn read_report(&mut self) -> Result<Option<KeyboardReport>, Error>;

    /// Forward the LED state (num/caps/scroll lock) to the keyboard.
    async fn set_leds(&mut self, leds: u8) -> Result<(), Error>;
}

/// Keyboard connect/poll loop. Never returns.
pub async fn keyboard_task<K: HostKeyboard>(mut keyboard: K) -> ! {
    let mut decoder = BootKeyDecoder::new();

    loop {
        match keyboard.connect().await {
            Ok(true) => {}
            Ok(false) | Err(Error::Timeout) => {
                Timer::after(Duration::from_millis(config::KEYBOARD_POLL_MS)).await;
                continue;
            }
            Err(e) => {
                warn!("Keyboard connect failed: {}", e);
                Timer::after(Duration::from_millis(config::KEYBOARD_POLL_MS)).await;
                continue;
            }
        }

        info!("Keyboard has been detected");
        decoder.reset();

        while keyboard.connected() {
            match select(keyboard.read_report(), LED_REPORT.wait()).await {
                Either::First(Ok(Some(report))) => forward_report(&mut decoder, &report),
                Either::First(Ok(None)) => break,
                Either::First(Err(e)) => warn!("Keyboard read failed: {}", e),
                Either::Second(leds) => {
                    decoder.set_leds(leds);
                    if let Err(e) = keyboard.set_leds(leds).await {
                        warn!("Forwarding LED state failed: {}", e);
                    }
                }
            }
        }

        info!("Keyboard disconnected");
    }
}

fn forward_report(decoder: &mut BootKeyDecoder, report: &KeyboardReport) {
    for press in decoder.decode(report) {
        debug!("Key: {}", press);
        let Some(stroke) = decoder.keystroke(&press) else {
            debug!("No HID usage for {=u8:#04x}", press.usage);
            continue;
        };
        if KEY_CHANNEL.try_send(stroke).is_err() {
            warn!("Key channel full - dropping key");
        }
    }
}
