// Adapted from https://github.com/stm32-rs/stm32-usbd tag v0.6.0
// Original copyright (c) 2021 Matti Virkkunen <mvirkkunen@gmail.com>, Vadim Kaushan <admin@disasm.info>,
// Nicolas Stalder <n@stalder.io>, Jonas Martin <lichtfeind@gmail.com>
// SPDX-License-Identifier: MIT
// SPDX-License-Identifier: Apache-2.0

use packing::Packed;

use crate::scsi::{
    commands::*,
    enums::OpCode,
    packing::ParsePackedStruct,
    Error,
};

/// A fully parsed SCSI command block.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Command {
    Inquiry(InquiryCommand),
    TestUnitReady(TestUnitReadyCommand),
    RequestSense(RequestSenseCommand),
    ReadCapacity(ReadCapacity10Command),
    ReadFormatCapacities(ReadFormatCapacitiesCommand),
    ModeSense(ModeSenseXCommand),
    PreventAllowMediumRemoval(PreventAllowMediumRemovalCommand),
    StartStopUnit(StartStopUnitCommand),
    SynchronizeCache(SynchronizeCache10Command),
    Verify(Verify10Command),
    Read(Read10Command),
    Write(Write10Command),
}

impl Command {
    /// Parse the command block embedded in a CBW. `cb` is the valid prefix
    /// the transport extracted, so a block that is shorter than its op code
    /// demands is rejected here rather than read out of bounds.
    pub fn extract(cb: &[u8]) -> Result<Command, Error> {
        let op = *cb.first().ok_or(Error::InsufficientCommandBytes)?;
        let op_code = OpCode::from_primitive(op).map_err(|_| Error::UnhandledOpCode)?;
        match op_code {
            OpCode::Inquiry => Ok(Command::Inquiry(checked_extract(cb)?)),
            OpCode::TestUnitReady => Ok(Command::TestUnitReady(checked_extract(cb)?)),
            OpCode::RequestSense => Ok(Command::RequestSense(checked_extract(cb)?)),
            OpCode::ReadCapacity10 => Ok(Command::ReadCapacity(checked_extract(cb)?)),
            OpCode::ReadFormatCapacities => {
                Ok(Command::ReadFormatCapacities(checked_extract(cb)?))
            }
            OpCode::ModeSense6 => {
                Ok(Command::ModeSense(checked_extract::<ModeSense6Command>(cb)?.into()))
            }
            OpCode::ModeSense10 => {
                Ok(Command::ModeSense(checked_extract::<ModeSense10Command>(cb)?.into()))
            }
            OpCode::PreventAllowMediumRemoval => {
                Ok(Command::PreventAllowMediumRemoval(checked_extract(cb)?))
            }
            OpCode::StartStopUnit => Ok(Command::StartStopUnit(checked_extract(cb)?)),
            OpCode::SynchronizeCache10 => Ok(Command::SynchronizeCache(checked_extract(cb)?)),
            OpCode::Verify10 => Ok(Command::Verify(checked_extract(cb)?)),
            OpCode::Read10 => Ok(Command::Read(checked_extract(cb)?)),
            OpCode::Write10 => Ok(Command::Write(checked_extract(cb)?)),
        }
    }
}

fn checked_extract<T>(cb: &[u8]) -> Result<T, Error>
where
    T: ParsePackedStruct,
    Error: From<<T as Packed>::Error>,
{
    T::parse(cb)
}
