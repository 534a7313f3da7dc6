// Adapted from https://github.com/stm32-rs/stm32-usbd tag v0.6.0
// Original copyright (c) 2021 Matti Virkkunen <mvirkkunen@gmail.com>, Vadim Kaushan <admin@disasm.info>,
// Nicolas Stalder <n@stalder.io>, Jonas Martin <lichtfeind@gmail.com>
// SPDX-License-Identifier: MIT
// SPDX-License-Identifier: Apache-2.0

use packing::Packed;

use crate::scsi::{commands::Control, packing::ParsePackedStruct};

#[derive(Clone, Copy, Eq, PartialEq, Debug, Default, Packed)]
#[packed(big_endian, lsb0)]
pub struct InquiryCommand {
    #[pkd(7, 0, 0, 0)]
    pub op_code: u8,

    /// If set, return the vital product data page named by `page_code`
    /// instead of the standard inquiry data
    #[pkd(0, 0, 1, 1)]
    pub enable_vital_product_data: bool,

    #[pkd(7, 0, 2, 2)]
    pub page_code: u8,

    #[pkd(7, 0, 3, 4)]
    pub allocation_length: u16,

    #[pkd(7, 0, 5, 5)]
    pub control: Control,
}
impl ParsePackedStruct for InquiryCommand {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inquiry_parse() {
        let data = [0x12, 0x01, 0x80, 0x02, 0x44, 0x00];
        let cmd = InquiryCommand::parse(&data).unwrap();
        assert!(cmd.enable_vital_product_data);
        assert_eq!(cmd.page_code, 0x80);
        assert_eq!(cmd.allocation_length, 0x0244);
    }
}
