// Adapted from https://github.com/stm32-rs/stm32-usbd tag v0.6.0
// Original copyright (c) 2021 Matti Virkkunen <mvirkkunen@gmail.com>, Vadim Kaushan <admin@disasm.info>,
// Nicolas Stalder <n@stalder.io>, Jonas Martin <lichtfeind@gmail.com>
// SPDX-License-Identifier: MIT
// SPDX-License-Identifier: Apache-2.0

use packing::Packed;

/// The PC field of MODE SENSE, SPC-3 6.11.2. Two bits, so unpacking never
/// fails.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Packed)]
pub enum PageControl {
    CurrentValues = 0b00,
    ChangeableValues = 0b01,
    DefaultValues = 0b10,
    SavedValues = 0b11,
}

impl Default for PageControl {
    fn default() -> Self {
        PageControl::CurrentValues
    }
}
