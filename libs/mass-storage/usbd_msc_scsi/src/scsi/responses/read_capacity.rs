// Adapted from https://github.com/stm32-rs/stm32-usbd tag v0.6.0
// Original copyright (c) 2021 Matti Virkkunen <mvirkkunen@gmail.com>, Vadim Kaushan <admin@disasm.info>,
// Nicolas Stalder <n@stalder.io>, Jonas Martin <lichtfeind@gmail.com>
// SPDX-License-Identifier: MIT
// SPDX-License-Identifier: Apache-2.0

use packing::Packed;

#[derive(Clone, Copy, Eq, PartialEq, Debug, Packed)]
#[packed(big_endian, lsb0)]
pub struct ReadCapacity10Response {
    /// Address of the last block, one less than the block count
    #[pkd(7, 0, 0, 3)]
    pub max_lba: u32,

    #[pkd(7, 0, 4, 7)]
    pub block_size: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use packing::PackedSize;

    #[test]
    fn test_read_capacity_pack() {
        assert_eq!(ReadCapacity10Response::BYTES, 8);

        let resp = ReadCapacity10Response {
            max_lba: 7,
            block_size: 512,
        };
        let mut raw = [0u8; 8];
        resp.pack(&mut raw).unwrap();
        assert_eq!(raw, [0, 0, 0, 7, 0, 0, 2, 0]);
    }
}
