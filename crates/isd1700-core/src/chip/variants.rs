//! Static variant table
//!
//! Capacities and device IDs are chip-defined. The erase bound grows with
//! capacity; the values here are conservative caps, not datasheet minima.

use super::types::{DeviceType, VariantDescriptor};

/// Descriptor table, one entry per part, smallest capacity first
pub const VARIANTS: [VariantDescriptor; 10] = [
    VariantDescriptor {
        name: "ISD1730",
        device_id: 0x10,
        end_address: 0x0FF,
        address_bits: 8,
        duration_secs: 30,
        reset_settle_ms: 1,
        command_spacing_ms: 10,
        global_erase_timeout_ms: 1000,
    },
    VariantDescriptor {
        name: "ISD1740",
        device_id: 0x16,
        end_address: 0x14F,
        address_bits: 9,
        duration_secs: 40,
        reset_settle_ms: 1,
        command_spacing_ms: 10,
        global_erase_timeout_ms: 1300,
    },
    VariantDescriptor {
        name: "ISD1750",
        device_id: 0x15,
        end_address: 0x19F,
        address_bits: 9,
        duration_secs: 50,
        reset_settle_ms: 1,
        command_spacing_ms: 10,
        global_erase_timeout_ms: 1600,
    },
    VariantDescriptor {
        name: "ISD1760",
        device_id: 0x14,
        end_address: 0x1EF,
        address_bits: 9,
        duration_secs: 60,
        reset_settle_ms: 1,
        command_spacing_ms: 10,
        global_erase_timeout_ms: 1900,
    },
    VariantDescriptor {
        name: "ISD1790",
        device_id: 0x1A,
        end_address: 0x2DF,
        address_bits: 10,
        duration_secs: 90,
        reset_settle_ms: 1,
        command_spacing_ms: 10,
        global_erase_timeout_ms: 2800,
    },
    VariantDescriptor {
        name: "ISD17120",
        device_id: 0x19,
        end_address: 0x3CF,
        address_bits: 10,
        duration_secs: 120,
        reset_settle_ms: 1,
        command_spacing_ms: 10,
        global_erase_timeout_ms: 3600,
    },
    VariantDescriptor {
        name: "ISD17150",
        device_id: 0x18,
        end_address: 0x4BF,
        address_bits: 11,
        duration_secs: 150,
        reset_settle_ms: 1,
        command_spacing_ms: 10,
        global_erase_timeout_ms: 4500,
    },
    VariantDescriptor {
        name: "ISD17180",
        device_id: 0x1E,
        end_address: 0x5AF,
        address_bits: 11,
        duration_secs: 180,
        reset_settle_ms: 1,
        command_spacing_ms: 10,
        global_erase_timeout_ms: 5300,
    },
    VariantDescriptor {
        name: "ISD17210",
        device_id: 0x1D,
        end_address: 0x69F,
        address_bits: 11,
        duration_secs: 210,
        reset_settle_ms: 1,
        command_spacing_ms: 10,
        global_erase_timeout_ms: 6200,
    },
    VariantDescriptor {
        name: "ISD17240",
        device_id: 0x1C,
        end_address: 0x78F,
        address_bits: 11,
        duration_secs: 240,
        reset_settle_ms: 1,
        command_spacing_ms: 10,
        global_erase_timeout_ms: 7000,
    },
];

/// Look up the descriptor for a part by enum value
pub(super) const fn descriptor(device: DeviceType) -> &'static VariantDescriptor {
    match device {
        DeviceType::Isd1730 => &VARIANTS[0],
        DeviceType::Isd1740 => &VARIANTS[1],
        DeviceType::Isd1750 => &VARIANTS[2],
        DeviceType::Isd1760 => &VARIANTS[3],
        DeviceType::Isd1790 => &VARIANTS[4],
        DeviceType::Isd17120 => &VARIANTS[5],
        DeviceType::Isd17150 => &VARIANTS[6],
        DeviceType::Isd17180 => &VARIANTS[7],
        DeviceType::Isd17210 => &VARIANTS[8],
        DeviceType::Isd17240 => &VARIANTS[9],
    }
}

/// Look up a descriptor by the device ID a chip reported
pub fn variant_by_device_id(id: u8) -> Option<&'static VariantDescriptor> {
    VARIANTS.iter().find(|v| v.device_id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_enum() {
        for t in DeviceType::ALL {
            let v = t.descriptor();
            assert_eq!(v.device_id, t.device_id());
        }
    }

    #[test]
    fn capacities_strictly_increase() {
        for pair in VARIANTS.windows(2) {
            assert!(pair[0].end_address < pair[1].end_address);
            assert!(pair[0].duration_secs < pair[1].duration_secs);
        }
    }

    #[test]
    fn lookup_by_device_id() {
        assert_eq!(variant_by_device_id(0x14).map(|v| v.name), Some("ISD1760"));
        assert!(variant_by_device_id(0x42).is_none());
    }
}
