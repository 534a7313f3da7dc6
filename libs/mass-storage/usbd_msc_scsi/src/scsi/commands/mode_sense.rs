// Adapted from https://github.com/stm32-rs/stm32-usbd tag v0.6.0
// Original copyright (c) 2021 Matti Virkkunen <mvirkkunen@gmail.com>, Vadim Kaushan <admin@disasm.info>,
// Nicolas Stalder <n@stalder.io>, Jonas Martin <lichtfeind@gmail.com>
// SPDX-License-Identifier: MIT
// SPDX-License-Identifier: Apache-2.0

use packing::Packed;

use crate::scsi::{commands::Control, enums::PageControl, packing::ParsePackedStruct};

/// Whether a command arrived as its 6- or 10-byte form; the response
/// header layout follows suit.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum CommandLength {
    C6,
    C10,
}

/// The parts of MODE SENSE the dispatcher acts on, common to both forms.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct ModeSenseXCommand {
    pub command_length: CommandLength,
    pub page_control: PageControl,
}

#[derive(Clone, Copy, Eq, PartialEq, Debug, Packed)]
#[packed(big_endian, lsb0)]
pub struct ModeSense6Command {
    #[pkd(7, 0, 0, 0)]
    pub op_code: u8,

    #[pkd(3, 3, 1, 1)]
    pub disable_block_descriptors: bool,

    #[pkd(7, 6, 2, 2)]
    pub page_control: PageControl,

    #[pkd(5, 0, 2, 2)]
    pub page_code: u8,

    #[pkd(7, 0, 3, 3)]
    pub subpage_code: u8,

    #[pkd(7, 0, 4, 4)]
    pub allocation_length: u8,

    #[pkd(7, 0, 5, 5)]
    pub control: Control,
}
impl ParsePackedStruct for ModeSense6Command {}
impl From<ModeSense6Command> for ModeSenseXCommand {
    fn from(m: ModeSense6Command) -> Self {
        Self {
            command_length: CommandLength::C6,
            page_control: m.page_control,
        }
    }
}

#[derive(Clone, Copy, Eq, PartialEq, Debug, Packed)]
#[packed(big_endian, lsb0)]
pub struct ModeSense10Command {
    #[pkd(7, 0, 0, 0)]
    pub op_code: u8,

    #[pkd(4, 4, 1, 1)]
    pub long_lba_accepted: bool,

    #[pkd(3, 3, 1, 1)]
    pub disable_block_descriptors: bool,

    #[pkd(7, 6, 2, 2)]
    pub page_control: PageControl,

    #[pkd(5, 0, 2, 2)]
    pub page_code: u8,

    #[pkd(7, 0, 3, 3)]
    pub subpage_code: u8,

    #[pkd(7, 0, 7, 8)]
    pub allocation_length: u16,

    #[pkd(7, 0, 9, 9)]
    pub control: Control,
}
impl ParsePackedStruct for ModeSense10Command {}
impl From<ModeSense10Command> for ModeSenseXCommand {
    fn from(m: ModeSense10Command) -> Self {
        Self {
            command_length: CommandLength::C10,
            page_control: m.page_control,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packing::PackedSize;

    #[test]
    fn test_mode_sense_cdb_lengths() {
        assert_eq!(ModeSense6Command::BYTES, 6);
        assert_eq!(ModeSense10Command::BYTES, 10);
    }

    #[test]
    fn test_mode_sense6_parse() {
        let data = [0x1A, 0x00, 0x3F, 0x00, 0xC0, 0x00];
        let cmd = ModeSense6Command::parse(&data).unwrap();
        assert_eq!(cmd.page_control, PageControl::CurrentValues);
        assert_eq!(cmd.page_code, 0x3F);
        assert_eq!(cmd.allocation_length, 0xC0);
    }
}
