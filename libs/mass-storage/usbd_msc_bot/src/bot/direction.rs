// Adapted from https://github.com/stm32-rs/stm32-usbd tag v0.6.0
// Original copyright (c) 2021 Matti Virkkunen <mvirkkunen@gmail.com>, Vadim Kaushan <admin@disasm.info>,
// Nicolas Stalder <n@stalder.io>, Jonas Martin <lichtfeind@gmail.com>
// SPDX-License-Identifier: MIT
// SPDX-License-Identifier: Apache-2.0

/// The direction of a data transfer, from bit 7 of the CBW flags byte.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Direction {
    /// Host to device, OUT in USB parlance
    HostToDevice,
    /// Device to host, IN in USB parlance
    DeviceToHost,
}

impl Direction {
    pub(crate) fn from_flags(flags: u8) -> Self {
        if flags & 0x80 != 0 {
            Direction::DeviceToHost
        } else {
            Direction::HostToDevice
        }
    }
}
