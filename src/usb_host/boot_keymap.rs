//! Boot keyboard report to key presses, as the USB host class driver
//! delivers keys.
//!
//! Only keys that appear in a report and were absent from the previous
//! one produce a [`KeyPress`]; holding a key does not auto-repeat. Caps
//! Lock belongs to the central: the key itself is forwarded and the lock
//! state comes back through [`BootKeyDecoder::set_leds`].

use crate::hid::keyboard::{leds, modifier, KeyboardReport};
use crate::hid::keymap::{ascii_to_keystroke, usage, KeyStroke, PUNCTUATION, SHIFTED_DIGITS};
use heapless::Vec;

/// Modifiers that turn a key into a shortcut rather than a character.
const CHORD_MODIFIERS: u8 = modifier::CTRL | modifier::ALT | modifier::GUI;

/// One newly pressed key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyPress {
    /// ASCII the key types, if any.
    pub ch: Option<u8>,
    pub usage: u8,
    /// Modifier byte of the report the key arrived in.
    pub modifier: u8,
}

impl KeyPress {
    /// Ctrl, Alt or GUI held.
    pub const fn is_chord(&self) -> bool {
        self.modifier & CHORD_MODIFIERS != 0
    }
}

/// Tracks the previous report and the central's Caps Lock.
#[derive(Clone, Debug, Default)]
pub struct BootKeyDecoder {
    previous: [u8; 6],
    caps_lock: bool,
}

impl BootKeyDecoder {
    pub const fn new() -> Self {
        Self {
            previous: [0; 6],
            caps_lock: false,
        }
    }

    /// Forget held keys (new keyboard attached). Caps Lock is the
    /// central's and survives.
    pub fn reset(&mut self) {
        self.previous = [0; 6];
    }

    pub fn caps_lock(&self) -> bool {
        self.caps_lock
    }

    /// Take the lock state from an LED output report.
    pub fn set_leds(&mut self, led_bits: u8) {
        self.caps_lock = led_bits & leds::CAPS_LOCK != 0;
    }

    /// Keys newly pressed in `report`.
    pub fn decode(&mut self, report: &KeyboardReport) -> Vec<KeyPress, 6> {
        let mut out = Vec::new();
        if report.is_rollover_error() {
            return out;
        }

        for code in report.pressed() {
            if self.previous.contains(&code) {
                continue;
            }
            // At most six new keys fit in one report.
            let _ = out.push(KeyPress {
                ch: keycode_to_ascii(code, report.modifier, self.caps_lock),
                usage: code,
                modifier: report.modifier,
            });
        }

        self.previous = report.keycodes;
        out
    }

    /// The stroke to send for `press`.
    ///
    /// Chords and Caps Lock go out as pressed. Everything else goes through
    /// its character so the modifier byte is normalized, then gets Shift
    /// flipped on letters while the central has Caps Lock on.
    pub fn keystroke(&self, press: &KeyPress) -> Option<KeyStroke> {
        if press.is_chord() || press.usage == usage::CAPS_LOCK {
            return Some(KeyStroke::new(press.modifier, press.usage));
        }
        press
            .ch
            .and_then(ascii_to_keystroke)
            .map(|stroke| stroke.under_caps_lock(self.caps_lock))
    }
}

/// ASCII character for one key code under the given modifiers.
pub fn keycode_to_ascii(code: u8, modifiers: u8, caps_lock: bool) -> Option<u8> {
    let shift = modifiers & modifier::SHIFT != 0;
    let ctrl = modifiers & modifier::CTRL != 0;

    match code {
        0x04..=0x1D => {
            let offset = code - usage::A;
            if ctrl {
                Some(0x01 + offset)
            } else if shift != caps_lock {
                Some(b'A' + offset)
            } else {
                Some(b'a' + offset)
            }
        }
        0x1E..=0x27 => {
            let offset = (code - usage::DIGIT_1) as usize;
            if shift {
                Some(SHIFTED_DIGITS[offset])
            } else if code == usage::DIGIT_0 {
                Some(b'0')
            } else {
                Some(b'1' + offset as u8)
            }
        }
        usage::ENTER | usage::KEYPAD_ENTER => Some(b'\n'),
        usage::ESCAPE => Some(0x1B),
        usage::BACKSPACE => Some(0x08),
        usage::TAB => Some(b'\t'),
        usage::SPACE => Some(b' '),
        usage::DELETE => Some(0x7F),
        usage::MINUS..=usage::SLASH => {
            let (plain, shifted) = PUNCTUATION[(code - usage::MINUS) as usize];
            let ch = if shift { shifted } else { plain };
            (ch != 0).then_some(ch)
        }
        usage::KEYPAD_SLASH..=0x57 => Some(b"/*-+"[(code - usage::KEYPAD_SLASH) as usize]),
        usage::KEYPAD_1..=0x61 => Some(b'1' + (code - usage::KEYPAD_1)),
        usage::KEYPAD_0 => Some(b'0'),
        usage::KEYPAD_DOT => Some(b'.'),
        _ => None,
    }
}
