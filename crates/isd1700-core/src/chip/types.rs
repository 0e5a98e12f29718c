//! Chip type definitions

/// ISD1700 part number
///
/// The discriminant is the device ID code the chip reports in response to
/// the DEVID command, so a detected ID converts to a `DeviceType` directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum DeviceType {
    /// ISD1730 - 30 s
    Isd1730 = 0x10,
    /// ISD1740 - 40 s
    Isd1740 = 0x16,
    /// ISD1750 - 50 s
    Isd1750 = 0x15,
    /// ISD1760 - 60 s
    Isd1760 = 0x14,
    /// ISD1790 - 90 s
    Isd1790 = 0x1A,
    /// ISD17120 - 120 s
    Isd17120 = 0x19,
    /// ISD17150 - 150 s
    Isd17150 = 0x18,
    /// ISD17180 - 180 s
    Isd17180 = 0x1E,
    /// ISD17210 - 210 s
    Isd17210 = 0x1D,
    /// ISD17240 - 240 s
    Isd17240 = 0x1C,
}

impl DeviceType {
    /// All supported parts, smallest capacity first
    pub const ALL: [DeviceType; 10] = [
        DeviceType::Isd1730,
        DeviceType::Isd1740,
        DeviceType::Isd1750,
        DeviceType::Isd1760,
        DeviceType::Isd1790,
        DeviceType::Isd17120,
        DeviceType::Isd17150,
        DeviceType::Isd17180,
        DeviceType::Isd17210,
        DeviceType::Isd17240,
    ];

    /// The device ID code this part reports via the DEVID command
    pub const fn device_id(self) -> u8 {
        self as u8
    }

    /// Convert a detected device ID back into a part number
    pub fn from_device_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.device_id() == id)
    }

    /// Descriptor with this part's capacity and timing constants
    pub const fn descriptor(self) -> &'static VariantDescriptor {
        super::variants::descriptor(self)
    }
}

/// Per-part capacity and timing constants
///
/// One static entry per [`DeviceType`]; see the table in `variants.rs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct VariantDescriptor {
    /// Part name (e.g. "ISD1760")
    pub name: &'static str,
    /// Device ID code reported by the DEVID command
    pub device_id: u8,
    /// Last valid row address of the audio store
    pub end_address: u16,
    /// Width of a row address in bits
    pub address_bits: u8,
    /// Nominal record duration at the default sample rate, in seconds
    pub duration_secs: u16,
    /// Reset line settle time in milliseconds
    pub reset_settle_ms: u32,
    /// Minimum spacing between commands, also the status poll interval
    pub command_spacing_ms: u32,
    /// Upper bound for a global erase to complete, in milliseconds
    pub global_erase_timeout_ms: u32,
}

impl VariantDescriptor {
    /// Number of addressable rows in the audio store
    pub const fn rows(&self) -> u16 {
        self.end_address + 1
    }

    /// Mask covering the valid address bits
    pub const fn address_mask(&self) -> u16 {
        (1u16 << self.address_bits) - 1
    }

    /// Check that a single row address lies within the store
    pub fn contains(&self, addr: u16) -> bool {
        addr <= self.end_address
    }

    /// Check that `start..=end` is a well-formed span within the store
    pub fn contains_span(&self, start: u16, end: u16) -> bool {
        start < end && end <= self.end_address
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_id_round_trip() {
        for t in DeviceType::ALL {
            assert_eq!(DeviceType::from_device_id(t.device_id()), Some(t));
        }
    }

    #[test]
    fn unknown_device_id() {
        assert_eq!(DeviceType::from_device_id(0x00), None);
        assert_eq!(DeviceType::from_device_id(0xFF), None);
    }

    #[test]
    fn address_mask_covers_end_address() {
        for t in DeviceType::ALL {
            let v = t.descriptor();
            assert_eq!(v.end_address & v.address_mask(), v.end_address);
        }
    }

    #[test]
    fn span_validation() {
        let v = DeviceType::Isd1730.descriptor();
        assert!(v.contains_span(0x000, 0x0FF));
        assert!(!v.contains_span(0x000, 0x100));
        assert!(!v.contains_span(0x010, 0x010));
        assert!(!v.contains_span(0x020, 0x010));
    }
}
