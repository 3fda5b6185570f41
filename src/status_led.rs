//! Liveness LED: fast blink while advertising, heartbeat while connected.

use core::sync::atomic::Ordering;

use crate::ble::CONNECTED;
use crate::config;
use crate::status_logic::{led_on, pattern_for};
use defmt::{info, warn};
use embassy_time::{Duration, Ticker};
use embedded_hal::digital::OutputPin;

/// Drive an active-low LED forever.
pub async fn led_task<P: OutputPin>(mut led: P) -> ! {
    info!("Status LED task started");

    let mut ticker = Ticker::every(Duration::from_millis(config::BLINK_PERIOD_MS));
    let mut tick: u32 = 0;

    loop {
        let pattern = pattern_for(CONNECTED.load(Ordering::Acquire));
        let result = if led_on(pattern, tick) {
            led.set_low()
        } else {
            led.set_high()
        };
        if result.is_err() {
            warn!("Status LED write failed");
        }

        tick = tick.wrapping_add(1);
        ticker.next().await;
    }
}
