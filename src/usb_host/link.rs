//! Serial framing between the bridge and the UART-attached USB host
//! controller.
//!
//! ```text
//! 0x57 0xAB | kind | len | payload[len] | checksum
//! ```
//! `checksum` is the wrapping sum of `kind`, `len` and the payload bytes.
//! The decoder is fed one byte at a time and resynchronises on the next
//! sync sequence after any error.

use crate::hid::keyboard::{KeyboardReport, KEYBOARD_REPORT_SIZE};
use num_enum::TryFromPrimitive;

pub const SYNC: [u8; 2] = [0x57, 0xAB];

/// Largest payload either side sends.
pub const MAX_PAYLOAD: usize = 16;

/// Largest encoded frame.
pub const MAX_FRAME: usize = SYNC.len() + 2 + MAX_PAYLOAD + 1;

/// Protocol byte the controller reports for a boot keyboard interface.
pub const PROTOCOL_BOOT_KEYBOARD: u8 = 1;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameKind {
    // Controller -> bridge
    Attached = 0x01,
    Detached = 0x02,
    Report = 0x03,
    Status = 0x04,
    // Bridge -> controller
    Enumerate = 0x81,
    SetLeds = 0x82,
}

/// A decoded controller -> bridge message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkMessage {
    /// A device finished enumeration.
    Attached { boot_keyboard: bool },
    /// The device was unplugged.
    Detached,
    /// A boot keyboard input report.
    Report(KeyboardReport),
    /// Answer to [`FrameKind::Enumerate`].
    Status { attached: bool },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Length byte larger than [`MAX_PAYLOAD`].
    Oversize(u8),
    /// Kind byte is not a known frame kind.
    UnknownKind(u8),
    /// A bridge -> controller kind arrived from the controller.
    UnexpectedKind(FrameKind),
    /// Payload does not match what the kind requires.
    BadPayload(FrameKind),
    Checksum { expected: u8, actual: u8 },
    /// Output buffer too small while encoding.
    BufferTooSmall,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Sync0,
    Sync1,
    Kind,
    Len,
    Payload,
    Checksum,
}

/// Byte-at-a-time frame decoder.
pub struct FrameDecoder {
    state: State,
    kind: u8,
    len: usize,
    payload: [u8; MAX_PAYLOAD],
    filled: usize,
    sum: u8,
}

impl FrameDecoder {
    pub const fn new() -> Self {
        Self {
            state: State::Sync0,
            kind: 0,
            len: 0,
            payload: [0; MAX_PAYLOAD],
            filled: 0,
            sum: 0,
        }
    }

    /// Drop any partially received frame.
    pub fn reset(&mut self) {
        self.state = State::Sync0;
    }

    /// Feed one byte. Returns a message or an error when a frame ends.
    pub fn push(&mut self, byte: u8) -> Option<Result<LinkMessage, LinkError>> {
        match self.state {
            State::Sync0 => {
                if byte == SYNC[0] {
                    self.state = State::Sync1;
                }
            }
            State::Sync1 => {
                self.state = match byte {
                    b if b == SYNC[1] => State::Kind,
                    b if b == SYNC[0] => State::Sync1,
                    _ => State::Sync0,
                };
            }
            State::Kind => {
                self.kind = byte;
                self.sum = byte;
                self.state = State::Len;
            }
            State::Len => {
                if byte as usize > MAX_PAYLOAD {
                    self.state = State::Sync0;
                    return Some(Err(LinkError::Oversize(byte)));
                }
                self.len = byte as usize;
                self.filled = 0;
                self.sum = self.sum.wrapping_add(byte);
                self.state = if self.len == 0 {
                    State::Checksum
                } else {
                    State::Payload
                };
            }
            State::Payload => {
                self.payload[self.filled] = byte;
                self.filled += 1;
                self.sum = self.sum.wrapping_add(byte);
                if self.filled == self.len {
                    self.state = State::Checksum;
                }
            }
            State::Checksum => {
                self.state = State::Sync0;
                if byte != self.sum {
                    return Some(Err(LinkError::Checksum {
                        expected: self.sum,
                        actual: byte,
                    }));
                }
                return Some(parse_message(self.kind, &self.payload[..self.len]));
            }
        }
        None
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_message(kind: u8, payload: &[u8]) -> Result<LinkMessage, LinkError> {
    let kind = FrameKind::try_from(kind).map_err(|e| LinkError::UnknownKind(e.number))?;
    match kind {
        FrameKind::Attached => match payload {
            [protocol] => Ok(LinkMessage::Attached {
                boot_keyboard: *protocol == PROTOCOL_BOOT_KEYBOARD,
            }),
            _ => Err(LinkError::BadPayload(kind)),
        },
        FrameKind::Detached => Ok(LinkMessage::Detached),
        FrameKind::Report => {
            if payload.len() != KEYBOARD_REPORT_SIZE {
                return Err(LinkError::BadPayload(kind));
            }
            KeyboardReport::from_bytes(payload)
                .map(LinkMessage::Report)
                .ok_or(LinkError::BadPayload(kind))
        }
        FrameKind::Status => match payload {
            [attached] => Ok(LinkMessage::Status {
                attached: *attached != 0,
            }),
            _ => Err(LinkError::BadPayload(kind)),
        },
        FrameKind::Enumerate | FrameKind::SetLeds => Err(LinkError::UnexpectedKind(kind)),
    }
}

/// Encode a frame into `buf`, returning the encoded length.
pub fn encode(kind: FrameKind, payload: &[u8], buf: &mut [u8]) -> Result<usize, LinkError> {
    if payload.len() > MAX_PAYLOAD {
        return Err(LinkError::Oversize(payload.len() as u8));
    }
    let total = SYNC.len() + 2 + payload.len() + 1;
    if buf.len() < total {
        return Err(LinkError::BufferTooSmall);
    }

    let kind = kind as u8;
    let len = payload.len() as u8;
    buf[..2].copy_from_slice(&SYNC);
    buf[2] = kind;
    buf[3] = len;
    buf[4..4 + payload.len()].copy_from_slice(payload);
    buf[total - 1] = payload
        .iter()
        .fold(kind.wrapping_add(len), |sum, &b| sum.wrapping_add(b));
    Ok(total)
}
