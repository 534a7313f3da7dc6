// Adapted from https://github.com/stm32-rs/stm32-usbd tag v0.6.0
// Original copyright (c) 2021 Matti Virkkunen <mvirkkunen@gmail.com>, Vadim Kaushan <admin@disasm.info>,
// Nicolas Stalder <n@stalder.io>, Jonas Martin <lichtfeind@gmail.com>
// SPDX-License-Identifier: MIT
// SPDX-License-Identifier: Apache-2.0

use packing::{Packed, PackedSize};

use crate::scsi::Error;

/// Unpack-then-verify helper for CDB structs. `verify` hooks per-command
/// validation that the bit-level unpack cannot express.
pub trait ParsePackedStruct: Packed
where
    Error: From<<Self as Packed>::Error>,
{
    fn parse(data: &[u8]) -> Result<Self, Error> {
        if data.len() < Self::BYTES {
            return Err(Error::InsufficientCommandBytes);
        }
        let mut ret = Self::unpack(&data[..Self::BYTES])?;
        ret.verify()?;
        Ok(ret)
    }

    fn verify(&mut self) -> Result<(), Error> {
        Ok(())
    }
}
