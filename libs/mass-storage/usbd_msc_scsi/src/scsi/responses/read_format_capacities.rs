// Adapted from https://github.com/stm32-rs/stm32-usbd tag v0.6.0
// Original copyright (c) 2021 Matti Virkkunen <mvirkkunen@gmail.com>, Vadim Kaushan <admin@disasm.info>,
// Nicolas Stalder <n@stalder.io>, Jonas Martin <lichtfeind@gmail.com>
// SPDX-License-Identifier: MIT
// SPDX-License-Identifier: Apache-2.0

use packing::Packed;

/// Capacity list header plus the single current/maximum capacity
/// descriptor, which is all a fixed-media device reports.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Packed)]
#[packed(big_endian, lsb0)]
pub struct ReadFormatCapacitiesResponse {
    /// Bytes of descriptors that follow the 4-byte header; 8 for the one
    /// descriptor here
    #[pkd(7, 0, 3, 3)]
    pub capacity_list_length: u8,

    #[pkd(7, 0, 4, 7)]
    pub number_of_blocks: u32,

    /// 1 unformatted, 2 formatted, 3 no cartridge in drive
    #[pkd(1, 0, 8, 8)]
    pub descriptor_code: u8,

    #[pkd(7, 0, 9, 11)]
    pub block_length: u32,
}
