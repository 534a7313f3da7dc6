// Adapted from https://github.com/stm32-rs/stm32-usbd tag v0.6.0
// Original copyright (c) 2021 Matti Virkkunen <mvirkkunen@gmail.com>, Vadim Kaushan <admin@disasm.info>,
// Nicolas Stalder <n@stalder.io>, Jonas Martin <lichtfeind@gmail.com>
// SPDX-License-Identifier: MIT
// SPDX-License-Identifier: Apache-2.0

use packing::Packed;

// Shorter identification strings are padded with spaces as per SPC
const ASCII_SPACE: u8 = 0x20;

/// Standard inquiry data, the 36-byte form every host accepts. Vital
/// product data pages are built separately by the dispatcher.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Packed)]
#[packed(big_endian, lsb0)]
pub struct InquiryResponse {
    #[pkd(7, 5, 0, 0)]
    pub peripheral_qualifier: u8,

    #[pkd(4, 0, 0, 0)]
    pub peripheral_device_type: u8,

    #[pkd(7, 7, 1, 1)]
    pub removable_medium: bool,

    /// 0x02, the value MSC hosts expect from legacy direct-access devices
    #[pkd(7, 0, 2, 2)]
    pub version: u8,

    /// 0x02 indicates the layout defined by SPC; lower values are obsolete
    #[pkd(3, 0, 3, 3)]
    pub response_data_format: u8,

    /// Remaining bytes after byte 4, so total length minus 5
    #[pkd(7, 0, 4, 4)]
    pub additional_length: u8,

    #[pkd(7, 0, 8, 15)]
    pub vendor_identification: [u8; 8],

    #[pkd(7, 0, 16, 31)]
    pub product_identification: [u8; 16],

    #[pkd(7, 0, 32, 35)]
    pub product_revision_level: [u8; 4],
}

impl Default for InquiryResponse {
    fn default() -> Self {
        Self {
            peripheral_qualifier: 0,
            peripheral_device_type: 0,
            removable_medium: true,
            version: 0x02,
            response_data_format: 0x02,
            additional_length: 31,
            vendor_identification: [ASCII_SPACE; 8],
            product_identification: [ASCII_SPACE; 16],
            product_revision_level: [ASCII_SPACE; 4],
        }
    }
}

impl InquiryResponse {
    /// Panics if more than 8 bytes are supplied.
    pub fn set_vendor_identification<V: AsRef<[u8]>>(&mut self, v: V) {
        pad_copy(&mut self.vendor_identification, v.as_ref());
    }

    /// Panics if more than 16 bytes are supplied.
    pub fn set_product_identification<P: AsRef<[u8]>>(&mut self, p: P) {
        pad_copy(&mut self.product_identification, p.as_ref());
    }

    /// Panics if more than 4 bytes are supplied.
    pub fn set_product_revision_level<R: AsRef<[u8]>>(&mut self, r: R) {
        pad_copy(&mut self.product_revision_level, r.as_ref());
    }
}

fn pad_copy(dst: &mut [u8], src: &[u8]) {
    assert!(src.len() <= dst.len());
    dst[..src.len()].copy_from_slice(src);
    for b in dst[src.len()..].iter_mut() {
        *b = ASCII_SPACE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packing::PackedSize;

    #[test]
    fn test_inquiry_response_pack() {
        assert_eq!(InquiryResponse::BYTES, 36);

        let mut resp = InquiryResponse::default();
        resp.set_vendor_identification("VENDOR");
        resp.set_product_identification("PRODUCT");
        resp.set_product_revision_level("1.0");

        let mut raw = [0u8; 36];
        resp.pack(&mut raw).unwrap();

        assert_eq!(raw[0], 0x00);
        assert_eq!(raw[1], 0x80);
        assert_eq!(raw[3], 0x02);
        assert_eq!(raw[4], 31);
        assert_eq!(&raw[8..16], b"VENDOR  ");
        assert_eq!(&raw[16..32], b"PRODUCT         ");
        assert_eq!(&raw[32..36], b"1.0 ");
    }
}
