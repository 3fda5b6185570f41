//! HID keyboard report type and character translation.

pub mod keyboard;
pub mod keymap;


pub use keyboard::KeyboardReport;
pub use keymap::{ascii_to_keystroke, KeyStroke};
