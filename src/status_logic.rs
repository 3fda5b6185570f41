/// LED patterns driven by the status LED task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedPattern {
    /// Toggle every tick - advertising, waiting for a central.
    Blink,
    /// On for one tick in four - connected.
    Heartbeat,
}

/// Pick the pattern for the current connection state.
pub fn pattern_for(connected: bool) -> LedPattern {
    if connected {
        LedPattern::Heartbeat
    } else {
        LedPattern::Blink
    }
}

/// Decide whether the LED is lit on the given tick.
pub fn led_on(pattern: LedPattern, tick: u32) -> bool {
    match pattern {
        LedPattern::Blink => tick % 2 == 0,
        LedPattern::Heartbeat => tick % 4 == 0,
    }
}
