//! ASCII character to HID keyboard usage translation.
//!
//! The USB host keyboard driver hands us characters; the BLE central
//! wants (modifier, usage) pairs. Letters, digits and the control keys
//! are contiguous ranges in both tables, so they are computed. The
//! punctuation row is irregular and uses a small lookup table.

use crate::hid::keyboard::{modifier, KeyboardReport};

/// Usage IDs (Keyboard/Keypad page) used by the translation.
pub mod usage {
    pub const A: u8 = 0x04;
    pub const Z: u8 = 0x1D;
    pub const DIGIT_1: u8 = 0x1E;
    pub const DIGIT_0: u8 = 0x27;
    pub const ENTER: u8 = 0x28;
    pub const ESCAPE: u8 = 0x29;
    pub const BACKSPACE: u8 = 0x2A;
    pub const TAB: u8 = 0x2B;
    pub const SPACE: u8 = 0x2C;
    pub const MINUS: u8 = 0x2D;
    pub const NON_US_HASH: u8 = 0x32;
    pub const SLASH: u8 = 0x38;
    pub const CAPS_LOCK: u8 = 0x39;
    pub const DELETE: u8 = 0x4C;
    pub const KEYPAD_SLASH: u8 = 0x54;
    pub const KEYPAD_ENTER: u8 = 0x58;
    pub const KEYPAD_1: u8 = 0x59;
    pub const KEYPAD_0: u8 = 0x62;
    pub const KEYPAD_DOT: u8 = 0x63;
}

/// Unshifted/shifted characters for usages `MINUS..=SLASH`.
/// `NON_US_HASH` has no US layout character and holds `(0, 0)`.
pub(crate) const PUNCTUATION: [(u8, u8); 12] = [
    (b'-', b'_'),  // 0x2D
    (b'=', b'+'),  // 0x2E
    (b'[', b'{'),  // 0x2F
    (b']', b'}'),  // 0x30
    (b'\\', b'|'), // 0x31
    (0, 0),        // 0x32
    (b';', b':'),  // 0x33
    (b'\'', b'"'), // 0x34
    (b'`', b'~'),  // 0x35
    (b',', b'<'),  // 0x36
    (b'.', b'>'),  // 0x37
    (b'/', b'?'),  // 0x38
];

/// Shifted characters on the digit row, in usage order `1..=9, 0`.
pub(crate) const SHIFTED_DIGITS: &[u8; 10] = b"!@#$%^&*()";

const ESC: u8 = 0x1B;
const BS: u8 = 0x08;
const DEL: u8 = 0x7F;

/// A single translated key event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyStroke {
    /// Modifier byte sent with the key.
    pub modifier: u8,
    /// HID usage code.
    pub usage: u8,
}

impl KeyStroke {
    pub const fn new(modifier: u8, usage: u8) -> Self {
        Self { modifier, usage }
    }

    const fn plain(usage: u8) -> Self {
        Self::new(0, usage)
    }

    const fn shifted(usage: u8) -> Self {
        Self::new(modifier::LEFT_SHIFT, usage)
    }

    /// The stroke that types the same character on a host whose Caps Lock
    /// is `caps_lock`. Only letters are affected.
    pub const fn under_caps_lock(self, caps_lock: bool) -> Self {
        if caps_lock && self.usage >= usage::A && self.usage <= usage::Z {
            Self::new(self.modifier ^ modifier::LEFT_SHIFT, self.usage)
        } else {
            self
        }
    }

    /// Input report with this key held down.
    pub const fn press_report(&self) -> KeyboardReport {
        KeyboardReport::single(self.modifier, self.usage)
    }
}

/// Translate one ASCII character into the key stroke that types it on a
/// US layout. Returns `None` for characters with no keyboard equivalent.
pub fn ascii_to_keystroke(ch: u8) -> Option<KeyStroke> {
    let stroke = match ch {
        b'a'..=b'z' => KeyStroke::plain(usage::A + (ch - b'a')),
        b'A'..=b'Z' => KeyStroke::shifted(usage::A + (ch - b'A')),
        b'1'..=b'9' => KeyStroke::plain(usage::DIGIT_1 + (ch - b'1')),
        b'0' => KeyStroke::plain(usage::DIGIT_0),
        b'\n' | b'\r' => KeyStroke::plain(usage::ENTER),
        ESC => KeyStroke::plain(usage::ESCAPE),
        BS => KeyStroke::plain(usage::BACKSPACE),
        b'\t' => KeyStroke::plain(usage::TAB),
        b' ' => KeyStroke::plain(usage::SPACE),
        DEL => KeyStroke::plain(usage::DELETE),
        // Remaining C0 controls are Ctrl + letter (0x01 = Ctrl+A).
        0x01..=0x1A => KeyStroke::new(modifier::LEFT_CTRL, usage::A + (ch - 0x01)),
        _ => return symbol_to_keystroke(ch),
    };
    Some(stroke)
}

fn symbol_to_keystroke(ch: u8) -> Option<KeyStroke> {
    if let Some(pos) = SHIFTED_DIGITS.iter().position(|&c| c == ch) {
        return Some(KeyStroke::shifted(usage::DIGIT_1 + pos as u8));
    }

    PUNCTUATION
        .iter()
        .enumerate()
        .find_map(|(offset, &(plain, shifted))| {
            let code = usage::MINUS + offset as u8;
            if code == usage::NON_US_HASH {
                None
            } else if ch == plain {
                Some(KeyStroke::plain(code))
            } else if ch == shifted {
                Some(KeyStroke::shifted(code))
            } else {
                None
            }
        })
}
