//! Legacy advertising payload builder.
//!
//! Builds the AD structures (`len | type | data`) the keyboard advertises
//! with. The result is handed to the SoftDevice as raw bytes.

use heapless::{String, Vec};

/// Legacy advertising PDUs carry at most 31 bytes of AD data.
pub const LEGACY_ADV_MAX: usize = 31;

/// AD types.
pub mod ad_type {
    pub const FLAGS: u8 = 0x01;
    pub const COMPLETE_16BIT_UUIDS: u8 = 0x03;
    pub const COMPLETE_LOCAL_NAME: u8 = 0x09;
    pub const APPEARANCE: u8 = 0x19;
}

/// Flags: LE General Discoverable Mode.
pub const FLAG_LE_GENERAL_DISCOVERABLE: u8 = 0x02;
/// Flags: BR/EDR Not Supported.
pub const FLAG_BR_EDR_NOT_SUPPORTED: u8 = 0x04;

/// HID Service UUID.
pub const HID_SERVICE_UUID16: u16 = 0x1812;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdvError {
    /// The AD structure does not fit in the remaining payload space.
    PayloadFull,
}

/// Accumulates AD structures up to [`LEGACY_ADV_MAX`] bytes.
#[derive(Clone, Debug, Default)]
pub struct AdvertisingData {
    buf: Vec<u8, LEGACY_ADV_MAX>,
}

impl AdvertisingData {
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    fn push_field(&mut self, ty: u8, data: &[u8]) -> Result<&mut Self, AdvError> {
        // len byte + type byte + data
        if self.buf.len() + 2 + data.len() > LEGACY_ADV_MAX {
            return Err(AdvError::PayloadFull);
        }
        self.buf
            .push(data.len() as u8 + 1)
            .map_err(|_| AdvError::PayloadFull)?;
        self.buf.push(ty).map_err(|_| AdvError::PayloadFull)?;
        self.buf
            .extend_from_slice(data)
            .map_err(|_| AdvError::PayloadFull)?;
        Ok(self)
    }

    /// General discoverable, LE only.
    pub fn flags(&mut self) -> Result<&mut Self, AdvError> {
        self.push_field(
            ad_type::FLAGS,
            &[FLAG_LE_GENERAL_DISCOVERABLE | FLAG_BR_EDR_NOT_SUPPORTED],
        )
    }

    pub fn appearance(&mut self, appearance: u16) -> Result<&mut Self, AdvError> {
        self.push_field(ad_type::APPEARANCE, &appearance.to_le_bytes())
    }

    /// Complete list of 16-bit service UUIDs exposed by this device.
    pub fn services_16(&mut self, uuids: &[u16]) -> Result<&mut Self, AdvError> {
        let mut data: Vec<u8, LEGACY_ADV_MAX> = Vec::new();
        for uuid in uuids {
            data.extend_from_slice(&uuid.to_le_bytes())
                .map_err(|_| AdvError::PayloadFull)?;
        }
        self.push_field(ad_type::COMPLETE_16BIT_UUIDS, &data)
    }

    pub fn complete_name(&mut self, name: &str) -> Result<&mut Self, AdvError> {
        self.push_field(ad_type::COMPLETE_LOCAL_NAME, name.as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

/// Payload advertised by the keyboard: flags, appearance, HID service
/// and the complete local name.
pub fn keyboard_advertisement(name: &str, appearance: u16) -> Result<AdvertisingData, AdvError> {
    let mut adv = AdvertisingData::new();
    adv.flags()?
        .appearance(appearance)?
        .services_16(&[HID_SERVICE_UUID16])?
        .complete_name(name)?;
    Ok(adv)
}

/// Convert milliseconds to advertising interval units (0.625 ms).
pub const fn interval_units(ms: u32) -> u32 {
    ms * 8 / 5
}

/// Render a little-endian BLE address as `AA:BB:CC:DD:EE:FF`, most
/// significant byte first.
pub fn format_address(le_bytes: &[u8; 6]) -> String<17> {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::new();
    for (i, &b) in le_bytes.iter().rev().enumerate() {
        if i > 0 {
            let _ = out.push(':');
        }
        let _ = out.push(HEX[(b >> 4) as usize] as char);
        let _ = out.push(HEX[(b & 0x0F) as usize] as char);
    }
    out
}
