//! [`HostKeyboard`] over the UART link to the USB host controller.

use crate::config;
use crate::error::Error;
use crate::hid::keyboard::KeyboardReport;
use crate::usb_host::link::{self, FrameDecoder, FrameKind, LinkMessage, MAX_FRAME};
use crate::usb_host::session::{AttachStatus, HostSession, SessionEvent};
use crate::usb_host::HostKeyboard;
use defmt::{debug, warn};
use embassy_time::{with_timeout, Duration};
use embedded_io_async::{Read, Write};

const RX_CHUNK: usize = 32;

pub struct UartHostKeyboard<U> {
    uart: U,
    decoder: FrameDecoder,
    rx: [u8; RX_CHUNK],
    rx_pos: usize,
    rx_len: usize,
    session: HostSession,
}

impl<U: Read + Write> UartHostKeyboard<U> {
    pub fn new(uart: U) -> Self {
        Self {
            uart,
            decoder: FrameDecoder::new(),
            rx: [0; RX_CHUNK],
            rx_pos: 0,
            rx_len: 0,
            session: HostSession::new(),
        }
    }

    async fn send(&mut self, kind: FrameKind, payload: &[u8]) -> Result<(), Error> {
        let mut frame = [0u8; MAX_FRAME];
        let len = link::encode(kind, payload, &mut frame)?;
        self.uart
            .write_all(&frame[..len])
            .await
            .map_err(|_| Error::Uart)?;
        self.uart.flush().await.map_err(|_| Error::Uart)
    }

    /// Next well-formed message. Bad frames are logged and skipped.
    async fn next_message(&mut self) -> Result<LinkMessage, Error> {
        loop {
            while self.rx_pos < self.rx_len {
                let byte = self.rx[self.rx_pos];
                self.rx_pos += 1;
                match self.decoder.push(byte) {
                    Some(Ok(message)) => return Ok(message),
                    Some(Err(e)) => warn!("Dropping host link frame: {}", e),
                    None => {}
                }
            }

            let n = self.uart.read(&mut self.rx).await.map_err(|_| Error::Uart)?;
            self.rx_pos = 0;
            self.rx_len = n;
        }
    }

    /// Wait for the controller's answer to an enumerate request.
    async fn wait_attach_status(&mut self) -> Result<bool, Error> {
        loop {
            let message = self.next_message().await?;
            match self.session.enumerated(message) {
                AttachStatus::Pending => debug!("Skipping {} while enumerating", message),
                AttachStatus::Attached => return Ok(true),
                AttachStatus::NotKeyboard => {
                    warn!("Attached USB device is not a boot keyboard");
                    return Ok(false);
                }
                AttachStatus::Absent => return Ok(false),
            }
        }
    }
}

impl<U: Read + Write> HostKeyboard for UartHostKeyboard<U> {
    async fn connect(&mut self) -> Result<bool, Error> {
        self.decoder.reset();
        self.rx_pos = self.rx_len;
        self.session.begin();
        self.send(FrameKind::Enumerate, &[]).await?;

        let timeout = Duration::from_millis(config::KEYBOARD_CONNECT_TIMEOUT_MS);
        with_timeout(timeout, self.wait_attach_status())
            .await
            .map_err(|_| Error::Timeout)?
    }

    fn connected(&self) -> bool {
        self.session.is_attached()
    }

    async fn read_report(&mut self) -> Result<Option<KeyboardReport>, Error> {
        if !self.session.is_attached() {
            return Err(Error::KeyboardNotConnected);
        }
        loop {
            let message = self.next_message().await?;
            match self.session.on_message(message) {
                SessionEvent::Report(report) => return Ok(Some(report)),
                SessionEvent::Ended => return Ok(None),
                SessionEvent::Idle => debug!("Host controller: {}", message),
            }
        }
    }

    async fn set_leds(&mut self, leds: u8) -> Result<(), Error> {
        if !self.session.is_attached() {
            return Err(Error::KeyboardNotConnected);
        }
        self.send(FrameKind::SetLeds, &[leds]).await
    }
}
