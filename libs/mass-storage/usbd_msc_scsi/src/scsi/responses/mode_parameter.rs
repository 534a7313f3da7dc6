// Adapted from https://github.com/stm32-rs/stm32-usbd tag v0.6.0
// Original copyright (c) 2021 Matti Virkkunen <mvirkkunen@gmail.com>, Vadim Kaushan <admin@disasm.info>,
// Nicolas Stalder <n@stalder.io>, Jonas Martin <lichtfeind@gmail.com>
// SPDX-License-Identifier: MIT
// SPDX-License-Identifier: Apache-2.0

use packing::{Packed, PackedSize};

/// Device-specific parameter byte for direct-access devices, SBC-2 6.3.1.
/// Carries the write-protect report.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Packed, Default)]
#[packed(big_endian, lsb0)]
pub struct SbcDeviceSpecificParameter {
    #[pkd(7, 7, 0, 0)]
    pub write_protect: bool,

    #[pkd(4, 4, 0, 0)]
    pub dpo_fua_available: bool,
}

/// MODE SENSE (6) parameter header. No block descriptors and no mode
/// pages follow it here, so the data length covers the header alone.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Packed)]
#[packed(big_endian, lsb0)]
pub struct ModeParameterHeader6 {
    /// Bytes after byte 0
    #[pkd(7, 0, 0, 0)]
    pub mode_data_length: u8,

    #[pkd(7, 0, 1, 1)]
    pub medium_type: u8,

    #[pkd(7, 0, 2, 2)]
    pub device_specific_parameter: SbcDeviceSpecificParameter,

    #[pkd(7, 0, 3, 3)]
    pub block_descriptor_length: u8,
}

impl Default for ModeParameterHeader6 {
    fn default() -> Self {
        Self {
            mode_data_length: Self::BYTES as u8 - 1,
            medium_type: 0,
            device_specific_parameter: Default::default(),
            block_descriptor_length: 0,
        }
    }
}

/// MODE SENSE (10) parameter header.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Packed)]
#[packed(big_endian, lsb0)]
pub struct ModeParameterHeader10 {
    /// Bytes after byte 1
    #[pkd(7, 0, 0, 1)]
    pub mode_data_length: u16,

    #[pkd(7, 0, 2, 2)]
    pub medium_type: u8,

    #[pkd(7, 0, 3, 3)]
    pub device_specific_parameter: SbcDeviceSpecificParameter,

    #[pkd(0, 0, 4, 4)]
    pub long_lba: bool,

    #[pkd(7, 0, 6, 7)]
    pub block_descriptor_length: u16,
}

impl Default for ModeParameterHeader10 {
    fn default() -> Self {
        Self {
            mode_data_length: Self::BYTES as u16 - 2,
            medium_type: 0,
            device_specific_parameter: Default::default(),
            long_lba: false,
            block_descriptor_length: 0,
        }
    }
}
