//! Attach/detach bookkeeping for the host controller link.
//!
//! The UART driver feeds every decoded [`LinkMessage`] through a
//! [`HostSession`] and acts on the answer; nothing here touches hardware.

use crate::hid::keyboard::KeyboardReport;
use crate::usb_host::link::LinkMessage;

/// Where an enumerate request stands after one message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AttachStatus {
    /// Not an answer yet; keep waiting.
    Pending,
    /// A boot keyboard is ready.
    Attached,
    /// Something is plugged in but it is not a boot keyboard.
    NotKeyboard,
    /// Nothing is plugged in.
    Absent,
}

/// What one message means while a keyboard is attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionEvent {
    Report(KeyboardReport),
    /// The keyboard is gone; go back to polling.
    Ended,
    /// Nothing to do.
    Idle,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct HostSession {
    attached: bool,
}

impl HostSession {
    pub const fn new() -> Self {
        Self { attached: false }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Start over before a new enumerate request.
    pub fn begin(&mut self) {
        self.attached = false;
    }

    /// Feed one message received while waiting for an enumerate answer.
    pub fn enumerated(&mut self, message: LinkMessage) -> AttachStatus {
        let status = match message {
            LinkMessage::Status { attached: true } | LinkMessage::Attached { boot_keyboard: true } => {
                AttachStatus::Attached
            }
            LinkMessage::Attached { boot_keyboard: false } => AttachStatus::NotKeyboard,
            LinkMessage::Status { attached: false } | LinkMessage::Detached => AttachStatus::Absent,
            // Reports left over from a previous session.
            LinkMessage::Report(_) => AttachStatus::Pending,
        };
        self.attached = status == AttachStatus::Attached;
        status
    }

    /// Feed one message received while reading reports.
    pub fn on_message(&mut self, message: LinkMessage) -> SessionEvent {
        if !self.attached {
            return SessionEvent::Idle;
        }
        match message {
            LinkMessage::Report(report) => SessionEvent::Report(report),
            LinkMessage::Detached
            | LinkMessage::Status { attached: false }
            | LinkMessage::Attached { boot_keyboard: false } => {
                self.attached = false;
                SessionEvent::Ended
            }
            LinkMessage::Status { attached: true } | LinkMessage::Attached { boot_keyboard: true } => {
                SessionEvent::Idle
            }
        }
    }
}
