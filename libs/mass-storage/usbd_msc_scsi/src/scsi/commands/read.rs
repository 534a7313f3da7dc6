// Adapted from https://github.com/stm32-rs/stm32-usbd tag v0.6.0
// Original copyright (c) 2021 Matti Virkkunen <mvirkkunen@gmail.com>, Vadim Kaushan <admin@disasm.info>,
// Nicolas Stalder <n@stalder.io>, Jonas Martin <lichtfeind@gmail.com>
// SPDX-License-Identifier: MIT
// SPDX-License-Identifier: Apache-2.0

use packing::Packed;

use crate::scsi::{commands::Control, packing::ParsePackedStruct};

#[derive(Clone, Copy, Eq, PartialEq, Debug, Packed)]
#[packed(big_endian, lsb0)]
pub struct Read10Command {
    #[pkd(7, 0, 0, 0)]
    pub op_code: u8,

    #[pkd(7, 5, 1, 1)]
    pub rd_protect: u8,

    #[pkd(4, 4, 1, 1)]
    pub dpo: bool,

    #[pkd(3, 3, 1, 1)]
    pub fua: bool,

    #[pkd(1, 1, 1, 1)]
    pub fua_nv: bool,

    #[pkd(7, 0, 2, 5)]
    pub lba: u32,

    #[pkd(4, 0, 6, 6)]
    pub group_number: u8,

    #[pkd(7, 0, 7, 8)]
    pub transfer_length: u16,

    #[pkd(7, 0, 9, 9)]
    pub control: Control,
}
impl ParsePackedStruct for Read10Command {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read10_parse() {
        let data = [0x28, 0, 0, 0, 0x1E, 0x80, 0, 0, 0x08, 0];
        let cmd = Read10Command::parse(&data).unwrap();
        assert_eq!(cmd.lba, 0x1E80);
        assert_eq!(cmd.transfer_length, 8);
    }
}
