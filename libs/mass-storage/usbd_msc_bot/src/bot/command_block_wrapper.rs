// Adapted from https://github.com/stm32-rs/stm32-usbd tag v0.6.0
// Original copyright (c) 2021 Matti Virkkunen <mvirkkunen@gmail.com>, Vadim Kaushan <admin@disasm.info>,
// Nicolas Stalder <n@stalder.io>, Jonas Martin <lichtfeind@gmail.com>
// SPDX-License-Identifier: MIT
// SPDX-License-Identifier: Apache-2.0

use packing::Packed;

use super::Direction;

/// Signature that identifies a packet as a CBW
pub const CBW_SIGNATURE: u32 = 0x43425355;

/// Shortest and longest command block a CBW may carry
pub const MIN_CB_LENGTH: u8 = 1;
pub const MAX_CB_LENGTH: u8 = 16;

/// Why a received wrapper was rejected. All of these take the same abort
/// path; the distinction only shows up in logs.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum CbwError {
    /// Wrapper was not exactly 31 bytes on the wire
    BadLength,
    /// dCBWSignature mismatch
    BadSignature,
    /// bCBWLUN above the configured maximum
    BadLun,
    /// bCBWCBLength outside [1, 16]
    BadCbLength,
}

/// The 31-byte wrapper the host sends on the OUT endpoint to start a
/// command. Describes the data transfer, IN or OUT, that follows it.
/// Little endian.
#[derive(Packed, Clone, Copy, Eq, PartialEq, Debug)]
#[packed(little_endian, lsb0)]
pub struct CommandBlockWrapper {
    /// Must contain [`CBW_SIGNATURE`]
    #[pkd(7, 0, 0, 3)]
    pub signature: u32,

    /// Opaque host value, echoed back in the CSW so the host can pair the
    /// status with the command that produced it
    #[pkd(7, 0, 4, 7)]
    pub tag: u32,

    /// Bytes the host expects to move during the data stage. Zero means
    /// the CSW follows the wrapper directly.
    #[pkd(7, 0, 8, 11)]
    pub data_transfer_length: u32,

    /// Bit 7 carries the data-stage direction; the remaining bits are
    /// obsolete or reserved and ignored on receipt
    #[pkd(7, 0, 12, 12)]
    pub flags: u8,

    /// Logical unit the command addresses; only the low nibble is
    /// significant
    #[pkd(7, 0, 13, 13)]
    pub lun: u8,

    /// Valid bytes in `cb`
    #[pkd(7, 0, 14, 14)]
    pub cb_length: u8,

    /// The embedded command block, zero padded on the wire
    #[pkd(7, 0, 15, 30)]
    pub cb: [u8; 16],
}

impl Default for CommandBlockWrapper {
    fn default() -> Self {
        Self {
            signature: CBW_SIGNATURE,
            tag: 0,
            data_transfer_length: 0,
            flags: 0,
            lun: 0,
            cb_length: 0,
            cb: [0; 16],
        }
    }
}

impl CommandBlockWrapper {
    /// Data-stage direction declared by the host.
    pub fn direction(&self) -> Direction {
        Direction::from_flags(self.flags)
    }

    /// The meaningful prefix of the embedded command block.
    pub fn command_block(&self) -> &[u8] {
        let len = (self.cb_length as usize).min(self.cb.len());
        &self.cb[..len]
    }

    /// Checks the BOT 1.0 §6.2 validity rules: signature, LUN bound and command
    /// block length. Wire length is checked by the caller since it is a
    /// property of the packet, not the parsed struct.
    pub fn validate(&self, max_lun: u8) -> Result<(), CbwError> {
        if self.signature != CBW_SIGNATURE {
            return Err(CbwError::BadSignature);
        }
        if (self.lun & 0x0F) > max_lun {
            return Err(CbwError::BadLun);
        }
        if self.cb_length < MIN_CB_LENGTH || self.cb_length > MAX_CB_LENGTH {
            return Err(CbwError::BadCbLength);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packing::{Packed, PackedSize};

    fn raw_cbw() -> [u8; 31] {
        let mut raw = [0u8; 31];
        raw[0..4].copy_from_slice(&CBW_SIGNATURE.to_le_bytes());
        raw[4..8].copy_from_slice(&0xDEAD_BEEFu32.to_le_bytes());
        raw[8..12].copy_from_slice(&512u32.to_le_bytes());
        raw[12] = 0x80;
        raw[13] = 0;
        raw[14] = 10;
        raw[15] = 0x28;
        raw
    }

    #[test]
    fn test_cbw_unpack() {
        assert_eq!(CommandBlockWrapper::BYTES, 31);

        let cbw = CommandBlockWrapper::unpack(&raw_cbw()).unwrap();
        assert_eq!(cbw.signature, CBW_SIGNATURE);
        assert_eq!(cbw.tag, 0xDEAD_BEEF);
        assert_eq!(cbw.data_transfer_length, 512);
        assert_eq!(cbw.direction(), Direction::DeviceToHost);
        assert_eq!(cbw.lun, 0);
        assert_eq!(cbw.command_block(), &[0x28, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert!(cbw.validate(0).is_ok());
    }

    #[test]
    fn test_cbw_reserved_flag_bits_ignored() {
        let mut raw = raw_cbw();
        raw[12] = 0x7F;
        let cbw = CommandBlockWrapper::unpack(&raw).unwrap();
        assert_eq!(cbw.direction(), Direction::HostToDevice);
        assert!(cbw.validate(0).is_ok());
    }

    #[test]
    fn test_cbw_validation_rejects() {
        let good = CommandBlockWrapper::unpack(&raw_cbw()).unwrap();

        let mut bad = good;
        bad.signature = 0x4342_5356;
        assert_eq!(bad.validate(0), Err(CbwError::BadSignature));

        let mut bad = good;
        bad.lun = 1;
        assert_eq!(bad.validate(0), Err(CbwError::BadLun));
        assert!(bad.validate(1).is_ok());

        let mut bad = good;
        bad.cb_length = 0;
        assert_eq!(bad.validate(0), Err(CbwError::BadCbLength));
        bad.cb_length = 17;
        assert_eq!(bad.validate(0), Err(CbwError::BadCbLength));
    }
}
