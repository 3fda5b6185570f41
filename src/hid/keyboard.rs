//! HID keyboard input report (boot protocol compatible).
//!
//! The same 8-byte layout is received from the USB keyboard (via the
//! host link) and sent to the BLE central:
//! ```text
//! Byte 0: Modifier keys (bitfield, see [`modifier`])
//! Byte 1: Reserved (0x00)
//! Byte 2-7: Up to 6 simultaneous key codes (HID usage codes)
//! ```

/// Keyboard report size in bytes.
pub const KEYBOARD_REPORT_SIZE: usize = 8;

/// Modifier byte bits.
pub mod modifier {
    pub const LEFT_CTRL: u8 = 0x01;
    pub const LEFT_SHIFT: u8 = 0x02;
    pub const LEFT_ALT: u8 = 0x04;
    pub const LEFT_GUI: u8 = 0x08;
    pub const RIGHT_CTRL: u8 = 0x10;
    pub const RIGHT_SHIFT: u8 = 0x20;
    pub const RIGHT_ALT: u8 = 0x40;
    pub const RIGHT_GUI: u8 = 0x80;

    /// Either Shift key.
    pub const SHIFT: u8 = LEFT_SHIFT | RIGHT_SHIFT;
    /// Either Ctrl key.
    pub const CTRL: u8 = LEFT_CTRL | RIGHT_CTRL;
    /// Either Alt key.
    pub const ALT: u8 = LEFT_ALT | RIGHT_ALT;
    /// Either GUI key.
    pub const GUI: u8 = LEFT_GUI | RIGHT_GUI;
}

/// Keyboard LED output report bits (written by the central).
pub mod leds {
    pub const NUM_LOCK: u8 = 0x01;
    pub const CAPS_LOCK: u8 = 0x02;
    pub const SCROLL_LOCK: u8 = 0x04;
}

/// Key slot value a keyboard reports when too many keys are held.
pub const ERROR_ROLL_OVER: u8 = 0x01;

/// Standard HID boot-protocol keyboard report.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardReport {
    /// Modifier key bitfield.
    pub modifier: u8,
    /// Reserved byte (always 0x00 per HID spec).
    pub reserved: u8,
    /// Up to 6 simultaneously pressed key codes.
    pub keycodes: [u8; 6],
}

impl KeyboardReport {
    /// All keys released.
    pub const fn empty() -> Self {
        Self {
            modifier: 0,
            reserved: 0,
            keycodes: [0; 6],
        }
    }

    /// A report holding a single key.
    pub const fn single(modifier: u8, usage: u8) -> Self {
        Self {
            modifier,
            reserved: 0,
            keycodes: [usage, 0, 0, 0, 0, 0],
        }
    }

    /// Parse a boot keyboard report. Extra trailing bytes are ignored.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < KEYBOARD_REPORT_SIZE {
            return None;
        }
        Some(Self {
            modifier: data[0],
            reserved: data[1],
            keycodes: [data[2], data[3], data[4], data[5], data[6], data[7]],
        })
    }

    /// Serialise into a byte slice.
    /// Returns the number of bytes written (8, or 0 if `buf` is too small).
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < KEYBOARD_REPORT_SIZE {
            return 0;
        }
        buf[0] = self.modifier;
        buf[1] = self.reserved;
        buf[2..8].copy_from_slice(&self.keycodes);
        KEYBOARD_REPORT_SIZE
    }

    /// The report as the fixed-size value held by the GATT characteristic.
    pub fn to_bytes(&self) -> [u8; KEYBOARD_REPORT_SIZE] {
        let mut buf = [0u8; KEYBOARD_REPORT_SIZE];
        self.serialize(&mut buf);
        buf
    }

    /// Returns `true` if no keys and no modifiers are pressed.
    pub fn is_empty(&self) -> bool {
        self.modifier == 0 && self.keycodes.iter().all(|&k| k == 0)
    }

    /// Returns `true` for the phantom state a keyboard reports on rollover
    /// overflow (every slot set to ErrorRollOver).
    pub fn is_rollover_error(&self) -> bool {
        self.keycodes.iter().all(|&k| k == ERROR_ROLL_OVER)
    }

    /// Non-zero key codes in slot order.
    pub fn pressed(&self) -> impl Iterator<Item = u8> + '_ {
        self.keycodes.iter().copied().filter(|&k| k != 0)
    }
}

/// HID Report Map for the BLE keyboard.
///
/// Boot-compatible keyboard without report IDs:
///   - 8 modifier key bits (input)
///   - 1 reserved byte
///   - 5 LED indicators (output)
///   - 6 key code bytes (input)
pub const KEYBOARD_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x06, // Usage (Keyboard)
    0xA1, 0x01, // Collection (Application)
    //
    //   - Modifier keys (8 bits) -
    0x05, 0x07, //   Usage Page (Keyboard/Keypad)
    0x19, 0xE0, //   Usage Minimum (Left Control)
    0x29, 0xE7, //   Usage Maximum (Right GUI)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x08, //   Report Count (8)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    //   - Reserved byte -
    0x95, 0x01, //   Report Count (1)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x01, //   Input (Constant)
    //
    //   - LED output (5 bits + 3 padding) -
    0x05, 0x08, //   Usage Page (LEDs)
    0x19, 0x01, //   Usage Minimum (Num Lock)
    0x29, 0x05, //   Usage Maximum (Kana)
    0x95, 0x05, //   Report Count (5)
    0x75, 0x01, //   Report Size (1)
    0x91, 0x02, //   Output (Data, Variable, Absolute)
    0x95, 0x01, //   Report Count (1)
    0x75, 0x03, //   Report Size (3)
    0x91, 0x01, //   Output (Constant)
    //
    //   - Key codes (6 bytes) -
    0x05, 0x07, //   Usage Page (Keyboard/Keypad)
    0x19, 0x00, //   Usage Minimum (0)
    0x29, 0x65, //   Usage Maximum (101)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x65, //   Logical Maximum (101)
    0x95, 0x06, //   Report Count (6)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x00, //   Input (Data, Array)
    //
    0xC0, // End Collection
];

/// Length of [`KEYBOARD_REPORT_DESCRIPTOR`], for sizing the GATT value.
pub const KEYBOARD_REPORT_DESCRIPTOR_LEN: usize = KEYBOARD_REPORT_DESCRIPTOR.len();
