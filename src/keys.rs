//! Pending key events waiting to be sent to the BLE central.
//!
//! Every stroke becomes two reports: a press and a release. The queue
//! hands them out one at a time so the report ticker sends at most one
//! report per tick.

use crate::hid::keyboard::KeyboardReport;
use crate::hid::keymap::KeyStroke;
use heapless::Deque;

/// Fixed-capacity queue of pending key strokes.
pub struct KeyQueue<const N: usize> {
    pending: Deque<KeyStroke, N>,
    /// A press report has been sent and its release is still owed.
    key_down: bool,
}

impl<const N: usize> KeyQueue<N> {
    pub const fn new() -> Self {
        Self {
            pending: Deque::new(),
            key_down: false,
        }
    }

    /// Queue a stroke. Hands it back if the queue is full.
    pub fn push(&mut self, stroke: KeyStroke) -> Result<(), KeyStroke> {
        self.pending.push_back(stroke)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && !self.key_down
    }

    pub fn is_full(&self) -> bool {
        self.pending.is_full()
    }

    /// The report to send next, without consuming it.
    pub fn next_report(&self) -> Option<KeyboardReport> {
        if self.key_down {
            Some(KeyboardReport::empty())
        } else {
            self.pending.front().map(KeyStroke::press_report)
        }
    }

    /// The report returned by [`next_report`](Self::next_report) was delivered.
    pub fn report_sent(&mut self) {
        if self.key_down {
            self.key_down = false;
        } else if self.pending.pop_front().is_some() {
            self.key_down = true;
        }
    }

    /// The report returned by [`next_report`](Self::next_report) could not
    /// be delivered. A lost press drops its stroke; a lost release stays
    /// owed so the central never sees a stuck key.
    pub fn report_failed(&mut self) {
        if !self.key_down {
            self.pending.pop_front();
        }
    }

    /// Forget every pending stroke and any owed release.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.key_down = false;
    }
}

impl<const N: usize> Default for KeyQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}
