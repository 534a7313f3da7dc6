// Adapted from https://github.com/stm32-rs/stm32-usbd tag v0.6.0
// Original copyright (c) 2021 Matti Virkkunen <mvirkkunen@gmail.com>, Vadim Kaushan <admin@disasm.info>,
// Nicolas Stalder <n@stalder.io>, Jonas Martin <lichtfeind@gmail.com>
// SPDX-License-Identifier: MIT
// SPDX-License-Identifier: Apache-2.0

use packing::Packed;

/// Signature that identifies a packet as a CSW
pub const CSW_SIGNATURE: u32 = 0x53425355;

/// Outcome reported in the CSW status byte.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Packed)]
pub enum CommandStatus {
    /// Command completed successfully
    Passed = 0x00,
    /// Command failed; the host learns why via REQUEST SENSE
    Failed = 0x01,
    /// The transport state machine lost sync; the host is expected to run
    /// reset recovery before issuing further commands
    PhaseError = 0x02,
}

/// The 13-byte wrapper the device sends on the IN endpoint after the data
/// stage, reporting how the command went. Little endian.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Packed)]
#[packed(little_endian, lsb0)]
pub struct CommandStatusWrapper {
    /// Must contain [`CSW_SIGNATURE`]
    #[pkd(7, 0, 0, 3)]
    pub signature: u32,

    /// Copied from the CBW that started the command
    #[pkd(7, 0, 4, 7)]
    pub tag: u32,

    /// Declared transfer length minus the bytes actually moved. Never
    /// exceeds dCBWDataTransferLength.
    #[pkd(7, 0, 8, 11)]
    pub data_residue: u32,

    #[pkd(7, 0, 12, 12)]
    pub status: CommandStatus,
}

impl Default for CommandStatusWrapper {
    fn default() -> Self {
        Self {
            signature: CSW_SIGNATURE,
            tag: 0,
            data_residue: 0,
            status: CommandStatus::Passed,
        }
    }
}
