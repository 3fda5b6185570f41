//! Advertising/connection lifecycle of the single peripheral link.

/// Where the peripheral is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkPhase {
    /// Stack not started yet, or advertising could not be started.
    Idle,
    Advertising,
    Connected,
}

/// HID Protocol Mode characteristic values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolMode {
    Boot,
    Report,
}

impl ProtocolMode {
    pub fn from_byte(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Boot),
            1 => Some(Self::Report),
            _ => None,
        }
    }
}

/// Connection bookkeeping for the advertising/connection task.
#[derive(Clone, Copy, Debug)]
pub struct LinkState {
    phase: LinkPhase,
    /// Report protocol input report CCCD. `None` until the central writes
    /// it. A bonded central gets its CCCD restored silently, so unknown
    /// means "try".
    report_notifications: Option<bool>,
    /// Boot keyboard input report CCCD, same convention.
    boot_notifications: Option<bool>,
    protocol: ProtocolMode,
    connections: u32,
}

impl LinkState {
    pub const fn new() -> Self {
        Self {
            phase: LinkPhase::Idle,
            report_notifications: None,
            boot_notifications: None,
            protocol: ProtocolMode::Report,
            connections: 0,
        }
    }

    pub fn phase(&self) -> LinkPhase {
        self.phase
    }

    pub fn is_connected(&self) -> bool {
        self.phase == LinkPhase::Connected
    }

    pub fn protocol(&self) -> ProtocolMode {
        self.protocol
    }

    /// Number of connections accepted since boot.
    pub fn connections(&self) -> u32 {
        self.connections
    }

    pub fn advertising_started(&mut self) {
        self.phase = LinkPhase::Advertising;
    }

    pub fn advertising_failed(&mut self) {
        self.phase = LinkPhase::Idle;
    }

    /// A central connected. Per-connection GATT state starts fresh.
    pub fn connected(&mut self) {
        self.phase = LinkPhase::Connected;
        self.report_notifications = None;
        self.boot_notifications = None;
        self.protocol = ProtocolMode::Report;
        self.connections = self.connections.wrapping_add(1);
    }

    /// The link dropped.
    pub fn disconnected(&mut self) {
        self.phase = LinkPhase::Idle;
        self.report_notifications = None;
        self.boot_notifications = None;
    }

    pub fn set_report_notifications(&mut self, enabled: bool) {
        self.report_notifications = Some(enabled);
    }

    pub fn set_boot_notifications(&mut self, enabled: bool) {
        self.boot_notifications = Some(enabled);
    }

    pub fn set_protocol_mode(&mut self, mode: ProtocolMode) {
        self.protocol = mode;
    }

    /// Whether an input report may be notified right now, on the
    /// characteristic of the current protocol.
    pub fn can_send(&self) -> bool {
        let notifications = match self.protocol {
            ProtocolMode::Report => self.report_notifications,
            ProtocolMode::Boot => self.boot_notifications,
        };
        self.is_connected() && notifications != Some(false)
    }
}

impl Default for LinkState {
    fn default() -> Self {
        Self::new()
    }
}
