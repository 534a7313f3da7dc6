// Adapted from https://github.com/stm32-rs/stm32-usbd tag v0.6.0
// Original copyright (c) 2021 Matti Virkkunen <mvirkkunen@gmail.com>, Vadim Kaushan <admin@disasm.info>,
// Nicolas Stalder <n@stalder.io>, Jonas Martin <lichtfeind@gmail.com>
// SPDX-License-Identifier: MIT
// SPDX-License-Identifier: Apache-2.0

use packing::{Packed, PackedSize};

use usbd_msc_bot::{SenseData, SenseKey};

/// Fixed-format sense data, SPC-3 4.5.3, in the 18-byte form. Descriptor
/// format is not supported.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Packed)]
#[packed(big_endian, lsb0)]
pub struct RequestSenseResponse {
    /// The INFORMATION field is never filled in, so never valid
    #[pkd(7, 7, 0, 0)]
    pub valid: bool,

    /// 0x70, current errors in fixed format
    #[pkd(6, 0, 0, 0)]
    pub response_code: u8,

    #[pkd(3, 0, 2, 2)]
    pub sense_key: SenseKey,

    #[pkd(7, 0, 3, 6)]
    pub information: u32,

    /// Bytes after byte 7, so total length minus 8
    #[pkd(7, 0, 7, 7)]
    pub additional_sense_length: u8,

    #[pkd(7, 0, 8, 11)]
    pub command_specific_information: u32,

    #[pkd(7, 0, 12, 12)]
    pub additional_sense_code: u8,

    #[pkd(7, 0, 13, 13)]
    pub additional_sense_code_qualifier: u8,

    #[pkd(7, 0, 14, 14)]
    pub field_replaceable_unit_code: u8,

    #[pkd(7, 0, 15, 17)]
    pub sense_key_specific: u32,
}

impl Default for RequestSenseResponse {
    fn default() -> Self {
        Self {
            valid: false,
            response_code: 0x70,
            sense_key: SenseKey::NoSense,
            information: 0,
            additional_sense_length: Self::BYTES as u8 - 8,
            command_specific_information: 0,
            additional_sense_code: 0,
            additional_sense_code_qualifier: 0,
            field_replaceable_unit_code: 0,
            sense_key_specific: 0,
        }
    }
}

impl RequestSenseResponse {
    /// Build the report for the oldest queued condition; `None` reports
    /// NO SENSE.
    pub fn from_sense(sense: Option<SenseData>) -> Self {
        let mut resp = Self::default();
        if let Some(sense) = sense {
            resp.sense_key = sense.key;
            resp.additional_sense_code = sense.code.asc();
            resp.additional_sense_code_qualifier = sense.code.ascq();
        }
        resp
    }
}
