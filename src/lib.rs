//! Test-only library interface for usb2ble.
//!
//! This module re-exports the pure logic modules that can be tested
//! on the host (no embedded hardware required): key translation, the
//! pending key queue, host link framing, advertising payloads and the
//! link/LED state logic.
//!
//! Usage: `cargo test --lib` or `cargo test --test integration`
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main].
//! This lib.rs provides a separate entry point for host-based testing.

#![cfg_attr(not(test), no_std)]

// ═══════════════════════════════════════════════════════════════════════════
// Module Re-exports
// ═══════════════════════════════════════════════════════════════════════════

pub mod hid {
    pub mod keyboard {
        pub use crate::hid_keyboard_impl::*;
    }
    pub mod keymap {
        pub use crate::hid_keymap_impl::*;
    }

    #[cfg(test)]
    mod tests;

    pub use keyboard::KeyboardReport;
    pub use keymap::{ascii_to_keystroke, KeyStroke};
}

pub mod keys {
    pub use crate::keys_impl::*;
}

pub mod usb_host {
    pub mod boot_keymap {
        pub use crate::usb_host_boot_keymap_impl::*;
    }
    pub mod link {
        pub use crate::usb_host_link_impl::*;
    }
    pub mod session {
        pub use crate::usb_host_session_impl::*;
    }
}

pub mod ble {
    pub mod advertising {
        pub use crate::ble_advertising_impl::*;
    }
    pub mod link_state {
        pub use crate::ble_link_state_impl::*;
    }
}

pub mod status_logic {
    pub use crate::status_logic_impl::*;
}

// Internal module paths for the actual implementations
#[path = "hid/keyboard.rs"]
mod hid_keyboard_impl;
#[path = "hid/keymap.rs"]
mod hid_keymap_impl;

#[path = "keys.rs"]
mod keys_impl;

#[path = "usb_host/boot_keymap.rs"]
mod usb_host_boot_keymap_impl;
#[path = "usb_host/link.rs"]
mod usb_host_link_impl;
#[path = "usb_host/session.rs"]
mod usb_host_session_impl;

#[path = "ble/advertising.rs"]
mod ble_advertising_impl;
#[path = "ble/link_state.rs"]
mod ble_link_state_impl;

#[path = "status_logic.rs"]
mod status_logic_impl;

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::ble::advertising::*;
    use super::ble::link_state::{LinkPhase, LinkState, ProtocolMode};
    use super::hid::keyboard::{leds, modifier, KeyboardReport};
    use super::hid::keymap::{usage, KeyStroke};
    use super::keys::KeyQueue;
    use super::status_logic::{led_on, pattern_for, LedPattern};
    use super::usb_host::boot_keymap::{keycode_to_ascii, BootKeyDecoder, KeyPress};
    use super::usb_host::session::{AttachStatus, HostSession, SessionEvent};
    use super::usb_host::link::{encode, FrameDecoder, FrameKind, LinkError, LinkMessage, MAX_FRAME};

    fn report(modifier: u8, keys: &[u8]) -> KeyboardReport {
        let mut report = KeyboardReport::empty();
        report.modifier = modifier;
        report.keycodes[..keys.len()].copy_from_slice(keys);
        report
    }

    fn chars(presses: &[KeyPress]) -> Vec<u8> {
        presses.iter().filter_map(|press| press.ch).collect()
    }

    fn decode_all(bytes: &[u8]) -> Vec<Result<LinkMessage, LinkError>> {
        let mut decoder = FrameDecoder::new();
        bytes.iter().filter_map(|&b| decoder.push(b)).collect()
    }

    fn frame(kind: FrameKind, payload: &[u8]) -> Vec<u8> {
        let mut buf = [0u8; MAX_FRAME];
        let len = encode(kind, payload, &mut buf).unwrap();
        buf[..len].to_vec()
    }

    // ════════════════════════════════════════════════════════════════════════
    // Key Queue Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn key_queue_empty_has_no_report() {
        let queue: KeyQueue<4> = KeyQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.next_report(), None);
    }

    #[test]
    fn key_queue_press_then_release_per_stroke() {
        let mut queue: KeyQueue<4> = KeyQueue::new();
        let a = KeyStroke::new(0, 0x04);
        let b = KeyStroke::new(modifier::LEFT_SHIFT, 0x05);
        queue.push(a).unwrap();
        queue.push(b).unwrap();

        assert_eq!(queue.next_report(), Some(a.press_report()));
        queue.report_sent();
        assert_eq!(queue.next_report(), Some(KeyboardReport::empty()));
        queue.report_sent();
        assert_eq!(queue.next_report(), Some(b.press_report()));
        queue.report_sent();
        assert_eq!(queue.next_report(), Some(KeyboardReport::empty()));
        queue.report_sent();

        assert_eq!(queue.next_report(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn key_queue_next_report_does_not_consume() {
        let mut queue: KeyQueue<4> = KeyQueue::new();
        queue.push(KeyStroke::new(0, 0x04)).unwrap();
        assert_eq!(queue.next_report(), queue.next_report());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn key_queue_failed_press_drops_stroke() {
        let mut queue: KeyQueue<4> = KeyQueue::new();
        queue.push(KeyStroke::new(0, 0x04)).unwrap();
        queue.report_failed();
        assert_eq!(queue.next_report(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn key_queue_failed_release_is_retried() {
        let mut queue: KeyQueue<4> = KeyQueue::new();
        queue.push(KeyStroke::new(0, 0x04)).unwrap();
        queue.report_sent();

        queue.report_failed();
        assert_eq!(queue.next_report(), Some(KeyboardReport::empty()));
        assert!(!queue.is_empty());

        queue.report_sent();
        assert!(queue.is_empty());
    }

    #[test]
    fn key_queue_full_hands_stroke_back() {
        let mut queue: KeyQueue<2> = KeyQueue::new();
        let stroke = KeyStroke::new(0, 0x06);
        queue.push(stroke).unwrap();
        queue.push(stroke).unwrap();
        assert!(queue.is_full());
        assert_eq!(queue.push(stroke), Err(stroke));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn key_queue_clear_forgets_owed_release() {
        let mut queue: KeyQueue<4> = KeyQueue::new();
        queue.push(KeyStroke::new(0, 0x04)).unwrap();
        queue.push(KeyStroke::new(0, 0x05)).unwrap();
        queue.report_sent();

        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.next_report(), None);
    }

    #[test]
    fn key_queue_report_sent_when_idle_is_noop() {
        let mut queue: KeyQueue<4> = KeyQueue::default();
        queue.report_sent();
        queue.report_failed();
        assert!(queue.is_empty());
    }

    // ════════════════════════════════════════════════════════════════════════
    // Boot Report -> ASCII Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn boot_decoder_emits_new_keys_only() {
        let mut decoder = BootKeyDecoder::new();
        assert_eq!(chars(&decoder.decode(&report(0, &[0x04]))), b"a");
        // Still held: no auto-repeat.
        assert!(decoder.decode(&report(0, &[0x04])).is_empty());
        // Second key joins the first.
        assert_eq!(chars(&decoder.decode(&report(0, &[0x04, 0x05]))), b"b");
        // Release everything, press again.
        assert!(decoder.decode(&KeyboardReport::empty()).is_empty());
        assert_eq!(chars(&decoder.decode(&report(0, &[0x04]))), b"a");
    }

    #[test]
    fn boot_decoder_several_keys_in_one_report() {
        let mut decoder = BootKeyDecoder::new();
        let out = decoder.decode(&report(0, &[0x0B, 0x0C, 0x2C]));
        assert_eq!(chars(&out), b"hi ");
        assert_eq!(out[2].usage, 0x2C);
    }

    #[test]
    fn boot_decoder_shift_either_side() {
        let mut decoder = BootKeyDecoder::new();
        assert_eq!(chars(&decoder.decode(&report(modifier::LEFT_SHIFT, &[0x04]))), b"A");
        decoder.decode(&KeyboardReport::empty());
        let bang = decoder.decode(&report(modifier::RIGHT_SHIFT, &[0x1E]))[0];
        assert_eq!(bang.ch, Some(b'!'));
        assert!(!bang.is_chord());
        assert_eq!(
            decoder.keystroke(&bang),
            Some(KeyStroke::new(modifier::LEFT_SHIFT, 0x1E))
        );
    }

    #[test]
    fn boot_decoder_forwards_caps_lock_key() {
        let mut decoder = BootKeyDecoder::new();
        let caps = decoder.decode(&report(0, &[usage::CAPS_LOCK]))[0];
        assert_eq!(caps.ch, None);
        assert_eq!(
            decoder.keystroke(&caps),
            Some(KeyStroke::new(0, usage::CAPS_LOCK))
        );
        // The lock only changes when the central says so.
        assert!(!decoder.caps_lock());
    }

    #[test]
    fn boot_decoder_follows_central_caps_lock() {
        let mut decoder = BootKeyDecoder::new();
        decoder.set_leds(leds::NUM_LOCK | leds::CAPS_LOCK);
        assert!(decoder.caps_lock());

        let a = decoder.decode(&report(0, &[0x04]))[0];
        assert_eq!(a.ch, Some(b'A'));
        // The central applies its own Caps Lock to an unshifted 'a'.
        assert_eq!(decoder.keystroke(&a), Some(KeyStroke::new(0, 0x04)));
        decoder.decode(&KeyboardReport::empty());

        let shifted = decoder.decode(&report(modifier::LEFT_SHIFT, &[0x04]))[0];
        assert_eq!(shifted.ch, Some(b'a'));
        assert_eq!(
            decoder.keystroke(&shifted),
            Some(KeyStroke::new(modifier::LEFT_SHIFT, 0x04))
        );
        decoder.decode(&KeyboardReport::empty());

        // Digits ignore Caps Lock.
        let one = decoder.decode(&report(0, &[0x1E]))[0];
        assert_eq!(decoder.keystroke(&one), Some(KeyStroke::new(0, 0x1E)));

        decoder.set_leds(leds::NUM_LOCK);
        assert!(!decoder.caps_lock());
    }

    #[test]
    fn boot_decoder_ignores_rollover_phantom() {
        let mut decoder = BootKeyDecoder::new();
        assert_eq!(chars(&decoder.decode(&report(0, &[0x04]))), b"a");
        assert!(decoder.decode(&report(0, &[1, 1, 1, 1, 1, 1])).is_empty());
        // The phantom report must not make 'a' look newly pressed.
        assert_eq!(chars(&decoder.decode(&report(0, &[0x04, 0x05]))), b"b");
    }

    #[test]
    fn boot_decoder_reset_forgets_held_keys_only() {
        let mut decoder = BootKeyDecoder::new();
        decoder.set_leds(leds::CAPS_LOCK);
        decoder.decode(&report(0, &[0x04]));
        decoder.reset();
        assert!(decoder.caps_lock());
        assert_eq!(chars(&decoder.decode(&report(0, &[0x04]))), b"A");
    }

    fn chord(modifier: u8, usage: u8) -> Option<KeyStroke> {
        let mut decoder = BootKeyDecoder::new();
        let press = decoder.decode(&report(modifier, &[usage]))[0];
        assert!(press.is_chord());
        decoder.keystroke(&press)
    }

    #[test]
    fn ctrl_chords_keep_key_and_modifier() {
        let ctrl = modifier::LEFT_CTRL;
        // Ctrl+I/M/H share control codes with Tab/Enter/Backspace.
        assert_eq!(chord(ctrl, 0x0C), Some(KeyStroke::new(ctrl, 0x0C)));
        assert_eq!(chord(ctrl, 0x10), Some(KeyStroke::new(ctrl, 0x10)));
        assert_eq!(chord(ctrl, 0x0B), Some(KeyStroke::new(ctrl, 0x0B)));
        assert_eq!(
            chord(modifier::RIGHT_CTRL, 0x06),
            Some(KeyStroke::new(modifier::RIGHT_CTRL, 0x06))
        );
    }

    #[test]
    fn ctrl_shift_chord_keeps_shift() {
        let ctrl_shift = modifier::LEFT_CTRL | modifier::LEFT_SHIFT;
        assert_eq!(chord(ctrl_shift, 0x17), Some(KeyStroke::new(ctrl_shift, 0x17)));
    }

    #[test]
    fn ctrl_digit_and_punctuation_keep_ctrl() {
        let ctrl = modifier::LEFT_CTRL;
        assert_eq!(chord(ctrl, 0x1E), Some(KeyStroke::new(ctrl, 0x1E)));
        assert_eq!(chord(ctrl, 0x2D), Some(KeyStroke::new(ctrl, 0x2D)));
        assert_eq!(chord(ctrl, 0x2E), Some(KeyStroke::new(ctrl, 0x2E)));
        // No ASCII at all, still a valid shortcut.
        assert_eq!(chord(ctrl, 0x3A), Some(KeyStroke::new(ctrl, 0x3A)));
    }

    #[test]
    fn alt_and_gui_chords_are_forwarded() {
        assert_eq!(
            chord(modifier::LEFT_ALT, 0x09),
            Some(KeyStroke::new(modifier::LEFT_ALT, 0x09))
        );
        assert_eq!(
            chord(modifier::RIGHT_GUI, 0x0F),
            Some(KeyStroke::new(modifier::RIGHT_GUI, 0x0F))
        );
    }

    #[test]
    fn plain_key_without_ascii_is_dropped() {
        let mut decoder = BootKeyDecoder::new();
        let f1 = decoder.decode(&report(0, &[0x3A]))[0];
        assert_eq!(decoder.keystroke(&f1), None);
    }

    #[test]
    fn keycode_ctrl_letters_give_control_codes() {
        assert_eq!(keycode_to_ascii(0x04, modifier::LEFT_CTRL, false), Some(0x01));
        assert_eq!(keycode_to_ascii(0x06, modifier::RIGHT_CTRL, false), Some(0x03));
        assert_eq!(keycode_to_ascii(0x1D, modifier::LEFT_CTRL, true), Some(0x1A));
    }

    #[test]
    fn keycode_digits_and_symbols() {
        assert_eq!(keycode_to_ascii(0x1E, 0, false), Some(b'1'));
        assert_eq!(keycode_to_ascii(0x27, 0, false), Some(b'0'));
        assert_eq!(keycode_to_ascii(0x27, modifier::LEFT_SHIFT, false), Some(b')'));
        assert_eq!(keycode_to_ascii(0x2D, 0, false), Some(b'-'));
        assert_eq!(keycode_to_ascii(0x2E, modifier::LEFT_SHIFT, false), Some(b'+'));
        assert_eq!(keycode_to_ascii(0x38, modifier::LEFT_SHIFT, false), Some(b'?'));
    }

    #[test]
    fn keycode_control_keys() {
        assert_eq!(keycode_to_ascii(0x28, 0, false), Some(b'\n'));
        assert_eq!(keycode_to_ascii(0x29, 0, false), Some(0x1B));
        assert_eq!(keycode_to_ascii(0x2A, 0, false), Some(0x08));
        assert_eq!(keycode_to_ascii(0x2B, 0, false), Some(b'\t'));
        assert_eq!(keycode_to_ascii(0x4C, 0, false), Some(0x7F));
    }

    #[test]
    fn keycode_keypad() {
        assert_eq!(keycode_to_ascii(0x54, 0, false), Some(b'/'));
        assert_eq!(keycode_to_ascii(0x55, 0, false), Some(b'*'));
        assert_eq!(keycode_to_ascii(0x57, 0, false), Some(b'+'));
        assert_eq!(keycode_to_ascii(0x58, 0, false), Some(b'\n'));
        assert_eq!(keycode_to_ascii(0x59, 0, false), Some(b'1'));
        assert_eq!(keycode_to_ascii(0x61, 0, false), Some(b'9'));
        assert_eq!(keycode_to_ascii(0x62, 0, false), Some(b'0'));
        assert_eq!(keycode_to_ascii(0x63, 0, false), Some(b'.'));
    }

    #[test]
    fn keycode_unmapped() {
        assert_eq!(keycode_to_ascii(0x00, 0, false), None);
        assert_eq!(keycode_to_ascii(0x32, 0, false), None); // Non-US #
        assert_eq!(keycode_to_ascii(0x3A, 0, false), None); // F1
        assert_eq!(keycode_to_ascii(0xE0, 0, false), None);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Host Link Framing Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn link_encode_set_leds_layout() {
        assert_eq!(
            frame(FrameKind::SetLeds, &[0x02]),
            vec![0x57, 0xAB, 0x82, 0x01, 0x02, 0x85]
        );
        assert_eq!(frame(FrameKind::Enumerate, &[]), vec![0x57, 0xAB, 0x81, 0x00, 0x81]);
    }

    #[test]
    fn link_encode_rejects_small_buffer() {
        let mut buf = [0u8; 4];
        assert_eq!(
            encode(FrameKind::Enumerate, &[], &mut buf),
            Err(LinkError::BufferTooSmall)
        );
    }

    #[test]
    fn link_decodes_controller_messages() {
        let mut bytes = frame(FrameKind::Attached, &[1]);
        bytes.extend(frame(FrameKind::Status, &[0]));
        bytes.extend(frame(FrameKind::Report, &[0x02, 0, 0x04, 0, 0, 0, 0, 0]));
        bytes.extend(frame(FrameKind::Detached, &[]));

        assert_eq!(
            decode_all(&bytes),
            vec![
                Ok(LinkMessage::Attached { boot_keyboard: true }),
                Ok(LinkMessage::Status { attached: false }),
                Ok(LinkMessage::Report(report(0x02, &[0x04]))),
                Ok(LinkMessage::Detached),
            ]
        );
    }

    #[test]
    fn link_attached_non_keyboard() {
        assert_eq!(
            decode_all(&frame(FrameKind::Attached, &[2])),
            vec![Ok(LinkMessage::Attached { boot_keyboard: false })]
        );
    }

    #[test]
    fn link_resyncs_after_garbage() {
        let mut bytes = vec![0x00, 0xAB, 0x57, 0x13, 0xFF];
        bytes.extend(frame(FrameKind::Detached, &[]));
        assert_eq!(decode_all(&bytes), vec![Ok(LinkMessage::Detached)]);
    }

    #[test]
    fn link_repeated_first_sync_byte() {
        let mut bytes = vec![0x57];
        bytes.extend(frame(FrameKind::Detached, &[]));
        assert_eq!(decode_all(&bytes), vec![Ok(LinkMessage::Detached)]);
    }

    #[test]
    fn link_rejects_oversize_length() {
        let mut bytes = vec![0x57, 0xAB, 0x03, 0x11];
        bytes.extend(frame(FrameKind::Detached, &[]));
        assert_eq!(
            decode_all(&bytes),
            vec![Err(LinkError::Oversize(0x11)), Ok(LinkMessage::Detached)]
        );
    }

    #[test]
    fn link_rejects_bad_checksum() {
        let mut bytes = frame(FrameKind::Status, &[1]);
        let last = bytes.len() - 1;
        let expected = bytes[last];
        bytes[last] = expected.wrapping_add(1);
        assert_eq!(
            decode_all(&bytes),
            vec![Err(LinkError::Checksum {
                expected,
                actual: expected.wrapping_add(1),
            })]
        );
    }

    #[test]
    fn link_rejects_unknown_kind() {
        assert_eq!(
            decode_all(&[0x57, 0xAB, 0x10, 0x00, 0x10]),
            vec![Err(LinkError::UnknownKind(0x10))]
        );
    }

    #[test]
    fn link_rejects_bridge_kinds_from_controller() {
        assert_eq!(
            decode_all(&frame(FrameKind::SetLeds, &[0])),
            vec![Err(LinkError::UnexpectedKind(FrameKind::SetLeds))]
        );
    }

    #[test]
    fn link_rejects_short_report() {
        assert_eq!(
            decode_all(&frame(FrameKind::Report, &[0x00, 0x04])),
            vec![Err(LinkError::BadPayload(FrameKind::Report))]
        );
    }

    #[test]
    fn link_decoder_survives_arbitrary_bytes() {
        let mut decoder = FrameDecoder::new();
        for i in 0..4096u32 {
            let byte = (i.wrapping_mul(2_654_435_761) >> 13) as u8;
            let _ = decoder.push(byte);
        }
    }

    #[test]
    fn link_decoder_reset_drops_partial_frame() {
        let mut decoder = FrameDecoder::new();
        for &b in &[0x57, 0xAB, 0x03, 0x08, 0x00] {
            assert_eq!(decoder.push(b), None);
        }
        decoder.reset();
        let results: Vec<_> = frame(FrameKind::Detached, &[])
            .into_iter()
            .filter_map(|b| decoder.push(b))
            .collect();
        assert_eq!(results, vec![Ok(LinkMessage::Detached)]);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Host Session Tests
    // ════════════════════════════════════════════════════════════════════════

    fn attached_session() -> HostSession {
        let mut session = HostSession::new();
        session.begin();
        assert_eq!(
            session.enumerated(LinkMessage::Attached { boot_keyboard: true }),
            AttachStatus::Attached
        );
        session
    }

    #[test]
    fn session_attaches_on_status_or_boot_attach() {
        let mut session = HostSession::new();
        assert!(!session.is_attached());
        assert_eq!(
            session.enumerated(LinkMessage::Status { attached: true }),
            AttachStatus::Attached
        );
        assert!(session.is_attached());
        assert!(attached_session().is_attached());
    }

    #[test]
    fn session_not_connected_answers() {
        let mut session = HostSession::new();
        assert_eq!(
            session.enumerated(LinkMessage::Status { attached: false }),
            AttachStatus::Absent
        );
        assert!(!session.is_attached());
        assert_eq!(
            session.enumerated(LinkMessage::Attached { boot_keyboard: false }),
            AttachStatus::NotKeyboard
        );
        assert!(!session.is_attached());
        assert_eq!(session.enumerated(LinkMessage::Detached), AttachStatus::Absent);
        assert!(!session.is_attached());
    }

    #[test]
    fn session_skips_stray_reports_while_enumerating() {
        let mut session = HostSession::new();
        let stray = LinkMessage::Report(report(0, &[0x04]));
        assert_eq!(session.enumerated(stray), AttachStatus::Pending);
        assert!(!session.is_attached());
        assert_eq!(
            session.enumerated(LinkMessage::Status { attached: true }),
            AttachStatus::Attached
        );
    }

    #[test]
    fn session_passes_reports_through() {
        let mut session = attached_session();
        let keys = report(0, &[0x04]);
        assert_eq!(
            session.on_message(LinkMessage::Report(keys)),
            SessionEvent::Report(keys)
        );
        assert_eq!(
            session.on_message(LinkMessage::Status { attached: true }),
            SessionEvent::Idle
        );
        assert_eq!(
            session.on_message(LinkMessage::Attached { boot_keyboard: true }),
            SessionEvent::Idle
        );
        assert!(session.is_attached());
    }

    #[test]
    fn session_ends_on_detach_status_or_foreign_device() {
        let endings = [
            LinkMessage::Detached,
            LinkMessage::Status { attached: false },
            LinkMessage::Attached { boot_keyboard: false },
        ];
        for message in endings {
            let mut session = attached_session();
            assert_eq!(session.on_message(message), SessionEvent::Ended);
            assert!(!session.is_attached(), "still attached after {:?}", message);
        }
    }

    #[test]
    fn session_after_disconnect_goes_back_to_polling() {
        let mut session = attached_session();
        assert_eq!(session.on_message(LinkMessage::Detached), SessionEvent::Ended);
        // Reports that trail the detach are not delivered.
        assert_eq!(
            session.on_message(LinkMessage::Report(report(0, &[0x04]))),
            SessionEvent::Idle
        );
        // The next poll can attach again.
        session.begin();
        assert_eq!(
            session.enumerated(LinkMessage::Status { attached: true }),
            AttachStatus::Attached
        );
        assert!(session.is_attached());
    }

    // ════════════════════════════════════════════════════════════════════════
    // Advertising Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn keyboard_advertisement_layout() {
        let adv = keyboard_advertisement("USB Device", 0x03C1).unwrap();
        let mut expected = vec![
            0x02, 0x01, 0x06, // flags
            0x03, 0x19, 0xC1, 0x03, // appearance
            0x03, 0x03, 0x12, 0x18, // HID service
            0x0B, 0x09, // complete local name
        ];
        expected.extend_from_slice(b"USB Device");
        assert_eq!(adv.as_bytes(), expected.as_slice());
        assert_eq!(adv.len(), 23);
    }

    #[test]
    fn advertisement_rejects_oversize_name() {
        // 11 bytes of other fields + 2 + 20 > 31
        let result = keyboard_advertisement("A keyboard name 20ch", 0x03C1);
        assert_eq!(result.err(), Some(AdvError::PayloadFull));
    }

    #[test]
    fn advertisement_fills_exactly_to_limit() {
        let mut adv = AdvertisingData::new();
        assert!(adv.is_empty());
        adv.complete_name("ABCDEFGHIJKLMNOPQRSTUVWXYZ123").unwrap();
        assert_eq!(adv.len(), LEGACY_ADV_MAX);
        assert_eq!(adv.flags().err(), Some(AdvError::PayloadFull));
        assert_eq!(adv.len(), LEGACY_ADV_MAX);
    }

    #[test]
    fn advertising_interval_units() {
        assert_eq!(interval_units(1000), 1600);
        assert_eq!(interval_units(20), 32);
    }

    #[test]
    fn address_is_printed_msb_first() {
        let le = [0x01, 0x02, 0x03, 0x0A, 0xBC, 0xFF];
        assert_eq!(format_address(&le).as_str(), "FF:BC:0A:03:02:01");
    }

    // ════════════════════════════════════════════════════════════════════════
    // Link State Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn link_state_starts_idle() {
        let link = LinkState::new();
        assert_eq!(link.phase(), LinkPhase::Idle);
        assert!(!link.can_send());
        assert_eq!(link.connections(), 0);
    }

    #[test]
    fn link_state_lifecycle() {
        let mut link = LinkState::new();
        link.advertising_started();
        assert_eq!(link.phase(), LinkPhase::Advertising);
        assert!(!link.can_send());

        link.connected();
        assert!(link.is_connected());
        assert_eq!(link.connections(), 1);

        link.disconnected();
        assert_eq!(link.phase(), LinkPhase::Idle);
        assert!(!link.can_send());
    }

    #[test]
    fn link_state_failed_advertising_returns_to_idle() {
        let mut link = LinkState::new();
        link.advertising_started();
        link.advertising_failed();
        assert_eq!(link.phase(), LinkPhase::Idle);
    }

    #[test]
    fn link_state_notifications_gate_sending() {
        let mut link = LinkState::new();
        link.connected();
        // Unknown CCCD state: a bonded central may never write it.
        assert!(link.can_send());
        link.set_report_notifications(false);
        assert!(!link.can_send());
        link.set_report_notifications(true);
        assert!(link.can_send());
    }

    #[test]
    fn link_state_each_protocol_has_its_own_cccd() {
        let mut link = LinkState::new();
        link.connected();
        link.set_boot_notifications(false);
        // Boot CCCD does not matter in report protocol.
        assert!(link.can_send());

        link.set_protocol_mode(ProtocolMode::Boot);
        assert!(!link.can_send());
        link.set_boot_notifications(true);
        link.set_report_notifications(false);
        assert!(link.can_send());

        link.set_protocol_mode(ProtocolMode::Report);
        assert!(!link.can_send());
    }

    #[test]
    fn link_state_resets_per_connection() {
        let mut link = LinkState::new();
        link.connected();
        link.set_report_notifications(false);
        link.set_boot_notifications(false);
        link.set_protocol_mode(ProtocolMode::Boot);
        link.disconnected();

        link.connected();
        assert!(link.can_send());
        assert_eq!(link.protocol(), ProtocolMode::Report);
        assert_eq!(link.connections(), 2);
    }

    #[test]
    fn protocol_mode_from_byte() {
        assert_eq!(ProtocolMode::from_byte(0), Some(ProtocolMode::Boot));
        assert_eq!(ProtocolMode::from_byte(1), Some(ProtocolMode::Report));
        assert_eq!(ProtocolMode::from_byte(2), None);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Status LED Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn led_pattern_follows_connection() {
        assert_eq!(pattern_for(false), LedPattern::Blink);
        assert_eq!(pattern_for(true), LedPattern::Heartbeat);
    }

    #[test]
    fn led_blink_toggles_every_tick() {
        let lit: Vec<bool> = (0..4).map(|t| led_on(LedPattern::Blink, t)).collect();
        assert_eq!(lit, vec![true, false, true, false]);
    }

    #[test]
    fn led_heartbeat_one_in_four() {
        let lit: Vec<bool> = (0..8).map(|t| led_on(LedPattern::Heartbeat, t)).collect();
        assert_eq!(lit, vec![true, false, false, false, true, false, false, false]);
    }
}
