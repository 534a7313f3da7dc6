// Adapted from https://github.com/stm32-rs/stm32-usbd tag v0.6.0
// Original copyright (c) 2021 Matti Virkkunen <mvirkkunen@gmail.com>, Vadim Kaushan <admin@disasm.info>,
// Nicolas Stalder <n@stalder.io>, Jonas Martin <lichtfeind@gmail.com>
// SPDX-License-Identifier: MIT
// SPDX-License-Identifier: Apache-2.0

use packing::Packed;

use crate::scsi::{commands::Control, packing::ParsePackedStruct};

#[derive(Clone, Copy, Eq, PartialEq, Debug, Packed)]
#[packed(big_endian, lsb0)]
pub struct PreventAllowMediumRemovalCommand {
    #[pkd(7, 0, 0, 0)]
    pub op_code: u8,

    /// Nonzero asks the unit to refuse medium removal. Meaningless for
    /// fixed flash media, accepted either way.
    #[pkd(1, 0, 4, 4)]
    pub prevent: u8,

    #[pkd(7, 0, 5, 5)]
    pub control: Control,
}
impl ParsePackedStruct for PreventAllowMediumRemovalCommand {}
